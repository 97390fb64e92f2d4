//! Error types for the Rosterload migration pipeline.
//!
//! This module defines a hierarchy of error types:
//!
//! - [`CsvError`] - file-level parsing errors (fatal, abort the run)
//! - [`ValidationError`] - per-record business-rule violations
//! - [`DuplicateError`] - per-record identity/reference collisions
//! - [`StoreError`] - faults reported by the identity/profile store
//! - [`WriteError`] - two-phase write failures, including the compensated case
//! - [`RecordError`] - everything that can fail for a single record
//! - [`ImportError`] - top-level pipeline errors
//!
//! Error conversion is automatic via `From` implementations, allowing `?`
//! to work across error boundaries. Only [`ImportError`] ever escapes the
//! pipeline; per-record errors are caught and turned into outcomes.

use thiserror::Error;

// =============================================================================
// CSV Parsing Errors (file-level, fatal)
// =============================================================================

/// Errors during tabular parsing. Any of these aborts the whole run.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// Fewer than two non-blank lines: a header alone is not a data set.
    #[error("File contains no data rows")]
    NoData,

    /// Header line produced no column names.
    #[error("No headers found in file")]
    NoHeaders,
}

// =============================================================================
// Validation Errors (per-record)
// =============================================================================

/// Business-rule violations for a single record.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field was absent or empty.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// A numeric field fell outside its allowed range.
    #[error("Field '{field}' value {value} is outside [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: u16,
        min: u16,
        max: u16,
    },

    /// A deceased member cannot have died after leaving school.
    #[error("Deceased year {deceased} is after leaving year {leaving}")]
    DeceasedAfterLeaving { deceased: u16, leaving: u16 },

    /// The supplied email does not look like an email address.
    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    /// No email and no registration number: nothing to build an identity from.
    #[error("Cannot synthesize identity: record has neither email nor registration number")]
    CannotSynthesizeIdentity,
}

// =============================================================================
// Duplicate Errors (per-record)
// =============================================================================

/// Collisions detected by the pre-write duplicate check.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DuplicateError {
    /// An identity with this email already exists.
    #[error("Duplicate email: an account with '{0}' already exists")]
    Email(String),

    /// A profile already carries this registration number.
    #[error("Duplicate registration number: '{0}' is already assigned")]
    Registration(String),
}

// =============================================================================
// Store Errors
// =============================================================================

/// Faults reported by the identity/profile store.
///
/// The store itself is an external collaborator; these variants are the
/// shape its failures take at the pipeline boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store rejected the write (constraint violation, bad input).
    #[error("Store rejected the operation: {0}")]
    Rejected(String),

    /// The referenced row does not exist.
    #[error("Not found in store: {0}")]
    NotFound(String),

    /// Backend fault (connection lost, timeout, internal error).
    #[error("Store backend error: {0}")]
    Backend(String),
}

// =============================================================================
// Write Errors (two-phase, per-record)
// =============================================================================

/// Failures of the two-phase identity + profile write.
#[derive(Debug, Error)]
pub enum WriteError {
    /// Phase 1 failed: the identity was never created, nothing to undo.
    #[error("Identity creation failed: {0}")]
    Identity(#[source] StoreError),

    /// Phase 2 failed and the identity was rolled back successfully.
    #[error("Profile creation failed (identity rolled back): {0}")]
    Profile(#[source] StoreError),

    /// Phase 2 failed AND the compensating delete failed: an orphaned
    /// identity now exists in the store. Surfaced distinctly so callers
    /// can alert on it.
    #[error("Profile creation failed ({profile}) and identity cleanup also failed ({cleanup}): orphaned identity {identity_id}")]
    ProfileWithOrphan {
        profile: StoreError,
        cleanup: StoreError,
        identity_id: uuid::Uuid,
    },
}

// =============================================================================
// Record Errors (per-record, recoverable)
// =============================================================================

/// Everything that can go wrong for one record. Always caught by the
/// orchestrator and translated into a failed [`crate::models::RecordOutcome`].
#[derive(Debug, Error)]
pub enum RecordError {
    /// Validation failure.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Duplicate detected before any write.
    #[error("{0}")]
    Duplicate(#[from] DuplicateError),

    /// Store fault during the duplicate pre-check.
    #[error("Duplicate check failed: {0}")]
    Check(#[from] StoreError),

    /// Two-phase write failure.
    #[error("{0}")]
    Write(#[from] WriteError),
}

// =============================================================================
// Import Errors (top-level)
// =============================================================================

/// Top-level pipeline errors.
///
/// This is the only error type returned by [`crate::import::import_bytes`]
/// and friends. Per-record failures never appear here; they live in the
/// [`crate::models::BatchReport`].
#[derive(Debug, Error)]
pub enum ImportError {
    /// File-level parsing error.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// IO error reading the input file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for parsing operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for validation.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type for per-record processing.
pub type RecordResult<T> = Result<T, RecordError>;

/// Result type for whole-pipeline operations.
pub type ImportResult<T> = Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // ValidationError -> RecordError
        let err = ValidationError::MissingField("last_name");
        let record_err: RecordError = err.into();
        assert!(record_err.to_string().contains("last_name"));

        // CsvError -> ImportError
        let csv_err = CsvError::NoData;
        let import_err: ImportError = csv_err.into();
        assert!(import_err.to_string().contains("no data"));
    }

    #[test]
    fn test_out_of_range_format() {
        let err = ValidationError::OutOfRange {
            field: "leaving_class",
            value: 14,
            min: 1,
            max: 12,
        };
        let msg = err.to_string();
        assert!(msg.contains("leaving_class"));
        assert!(msg.contains("14"));
        assert!(msg.contains("[1, 12]"));
    }

    #[test]
    fn test_orphan_error_names_identity() {
        let id = uuid::Uuid::new_v4();
        let err = WriteError::ProfileWithOrphan {
            profile: StoreError::Rejected("bad row".into()),
            cleanup: StoreError::Backend("connection lost".into()),
            identity_id: id,
        };
        let msg = err.to_string();
        assert!(msg.contains("orphaned identity"));
        assert!(msg.contains(&id.to_string()));
    }
}
