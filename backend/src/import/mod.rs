//! Import module.
//!
//! This module drives records into the store:
//! - Resolve: pre-write duplicate detection
//! - Writer: two-phase identity + profile write with compensation
//! - Pipeline: batch orchestration and result aggregation

pub mod pipeline;
pub mod resolve;
pub mod writer;

pub use pipeline::{import_bytes, import_file, import_rows, ImportOptions};
pub use resolve::check_duplicates;
pub use writer::{write_record, PendingIdentity};
