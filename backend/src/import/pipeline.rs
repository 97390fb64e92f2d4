//! Batch orchestrator and result aggregator.
//!
//! Drives a whole file through the pipeline in chunks, strictly
//! sequentially: normalize, validate, resolve duplicates, write. Any failure
//! at any step produces one failed outcome and processing continues with the
//! next record; one bad record never aborts the batch. Only file-level
//! errors (unreadable input, no data rows) propagate out.
//!
//! Chunking bounds memory and leaves room for progress reporting later; it
//! has no transactional meaning. The orchestrator holds no record-to-record
//! state beyond the running counters.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::{ImportResult, RecordError};
use crate::models::{BatchReport, NormalizedRecord};
use crate::normalize::normalize;
use crate::parser::{self, RawRow, DEFAULT_DELIMITER};
use crate::store::MemberStore;
use crate::validate::validate;

use super::resolve::check_duplicates;
use super::writer::write_record;

/// Records per chunk by default.
pub const DEFAULT_CHUNK_SIZE: usize = 50;

/// Organizational domain appended to synthesized placeholder emails.
pub const DEFAULT_EMAIL_DOMAIN: &str = "bghsa.org";

/// Provenance tag stamped on every imported profile.
pub const DEFAULT_PROVENANCE: &str = "legacy-import";

/// Options for an import run.
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Cell delimiter of the input file.
    pub delimiter: char,

    /// Records processed per chunk.
    pub chunk_size: usize,

    /// Domain for placeholder emails synthesized from registration numbers.
    pub email_domain: String,

    /// Provenance tag written into each profile's source field.
    pub provenance: String,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
            chunk_size: DEFAULT_CHUNK_SIZE,
            email_domain: DEFAULT_EMAIL_DOMAIN.to_string(),
            provenance: DEFAULT_PROVENANCE.to_string(),
        }
    }
}

/// Import a file from disk.
pub async fn import_file<S: MemberStore, P: AsRef<Path>>(
    path: P,
    store: &S,
    options: &ImportOptions,
) -> ImportResult<BatchReport> {
    let bytes = tokio::fs::read(path.as_ref()).await?;
    import_bytes(&bytes, store, options).await
}

/// Import raw file bytes: decode, parse, then run every record.
///
/// This is the main entry point for the pipeline.
pub async fn import_bytes<S: MemberStore>(
    bytes: &[u8],
    store: &S,
    options: &ImportOptions,
) -> ImportResult<BatchReport> {
    let parsed = parser::parse_bytes(bytes, options.delimiter)?;
    info!(
        rows = parsed.rows.len(),
        encoding = %parsed.encoding,
        columns = parsed.headers.len(),
        "parsed input file"
    );
    Ok(import_rows(&parsed.rows, store, options).await)
}

/// Run already-parsed rows through normalize -> validate -> resolve -> write.
pub async fn import_rows<S: MemberStore>(
    rows: &[RawRow],
    store: &S,
    options: &ImportOptions,
) -> BatchReport {
    let mut report = BatchReport::default();
    let chunk_size = options.chunk_size.max(1);

    for (index, chunk) in rows.chunks(chunk_size).enumerate() {
        debug!(chunk = index, records = chunk.len(), "processing chunk");

        for row in chunk {
            match process_row(row, store, options).await {
                Ok(email) => {
                    debug!(identifier = %email, "record imported");
                    report.record_success(email);
                }
                Err((identifier, err)) => {
                    warn!(identifier = %identifier, error = %err, "record failed");
                    report.record_failure(identifier, err.to_string());
                }
            }
        }
    }

    report.success = report.failed == 0;
    info!(
        processed = report.processed,
        failed = report.failed,
        "import finished"
    );
    report
}

/// Process one record end to end.
///
/// Returns the email the record was imported under, or the best available
/// identifier paired with the error.
async fn process_row<S: MemberStore>(
    row: &RawRow,
    store: &S,
    options: &ImportOptions,
) -> Result<String, (String, RecordError)> {
    let record = normalize(row);
    let fallback = identifier_for(&record, row.line);

    let validated = validate(record, &options.email_domain)
        .map_err(|e| (fallback.clone(), RecordError::from(e)))?;
    let email = validated.email.clone();

    check_duplicates(store, &validated)
        .await
        .map_err(|e| (email.clone(), e))?;

    write_record(store, &validated, &options.provenance)
        .await
        .map_err(|e| (email.clone(), RecordError::from(e)))?;

    Ok(email)
}

/// Best identifier for a record that failed before an email was settled:
/// supplied email, then registration number, then the source line.
fn identifier_for(record: &NormalizedRecord, line: usize) -> String {
    record
        .email
        .clone()
        .or_else(|| record.reference_number().map(str::to_string))
        .unwrap_or_else(|| format!("row {}", line))
}
