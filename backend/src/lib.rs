//! # Rosterload - bulk legacy member migration
//!
//! Rosterload onboards historical alumni records from CSV exports into the
//! live identity-and-profile store: it reconciles column-naming
//! inconsistencies, validates every record against the association's
//! business rules, avoids creating duplicate identities, and reports a
//! precise per-record outcome. A partially failed record never leaves an
//! orphaned identity behind.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐   ┌──────────┐   ┌────────────┐   ┌───────────┐   ┌──────────────┐
//! │  CSV File │──▶│  Parser  │──▶│ Normalizer │──▶│ Validator │──▶│ Dedup+Writer │
//! │ (any enc) │   │ (rows)   │   │ (aliases)  │   │ (rules)   │   │ (two-phase)  │
//! └───────────┘   └──────────┘   └────────────┘   └───────────┘   └──────┬───────┘
//!                                                                        ▼
//!                                                                  BatchReport
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use rosterload::{import_file, ImportOptions, MemoryStore};
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = MemoryStore::new();
//!     let report = import_file("members.csv", &store, &ImportOptions::default())
//!         .await
//!         .unwrap();
//!     println!("{} imported, {} failed", report.processed, report.failed);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Domain models (records, profile, outcomes, report)
//! - [`parser`] - Tabular parsing with encoding detection
//! - [`normalize`] - Header alias resolution and type coercion
//! - [`validate`] - Business rules and placeholder identity synthesis
//! - [`store`] - Store interface and in-memory implementation
//! - [`import`] - Duplicate resolution, transactional write, batch pipeline

// Core modules
pub mod error;
pub mod models;

// Parsing
pub mod parser;

// Normalization
pub mod normalize;

// Validation
pub mod validate;

// Store seam
pub mod store;

// Import pipeline
pub mod import;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    CsvError, DuplicateError, ImportError, RecordError, StoreError, ValidationError, WriteError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    BatchReport, IdentityHandle, NormalizedRecord, Profile, RecordOutcome, RecordStatus,
    ValidatedRecord,
};

// =============================================================================
// Re-exports - Parsing
// =============================================================================

pub use parser::{
    decode_content, detect_encoding, parse_bytes, parse_file, parse_str, ParsedFile, RawRow,
    DEFAULT_DELIMITER,
};

// =============================================================================
// Re-exports - Normalization & Validation
// =============================================================================

pub use normalize::{canonical_field, normalize, parse_flag, parse_int_loose};
pub use validate::{synthesize_email, validate, MAX_CLASS, MIN_CLASS, MIN_YEAR};

// =============================================================================
// Re-exports - Store
// =============================================================================

pub use store::{MemberStore, MemoryStore, NewIdentity};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use import::{
    check_duplicates, import_bytes, import_file, import_rows, write_record, ImportOptions,
    PendingIdentity,
};
pub use import::pipeline::{DEFAULT_CHUNK_SIZE, DEFAULT_EMAIL_DOMAIN, DEFAULT_PROVENANCE};
