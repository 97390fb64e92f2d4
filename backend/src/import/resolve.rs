//! Pre-write duplicate detection.
//!
//! Two independent checks, both of which must pass before anything is
//! written: the candidate email must not belong to an existing identity, and
//! any supplied registration number must not already be carried by a profile.
//!
//! This is a best-effort pre-check, not a serializable transaction: a
//! concurrent import could pass it and still collide at write time. The
//! store's own uniqueness constraint is the authoritative signal; this check
//! exists to skip doomed records with a friendlier error.

use crate::error::{DuplicateError, RecordResult};
use crate::models::ValidatedRecord;
use crate::store::MemberStore;

/// Check a record for collisions with the existing store.
///
/// Returns a [`DuplicateError`] on collision; the record must then be
/// skipped without creating anything.
pub async fn check_duplicates<S: MemberStore>(
    store: &S,
    record: &ValidatedRecord,
) -> RecordResult<()> {
    if store.email_exists(&record.email).await? {
        return Err(DuplicateError::Email(record.email.clone()).into());
    }

    // Both numbering schemes are alternate uniqueness keys.
    let references = [
        record.rest.registration_no.as_deref(),
        record.rest.old_registration_no.as_deref(),
    ];
    for reference in references.into_iter().flatten() {
        if store.registration_exists(reference).await? {
            return Err(DuplicateError::Registration(reference.to_string()).into());
        }
    }

    Ok(())
}
