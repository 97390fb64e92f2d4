//! Transactional writer: the two-phase identity + profile write.
//!
//! The store must end up in one of exactly two states per record: identity
//! and profile both present, or neither. Phase 1 creates the authentication
//! identity; phase 2 creates the profile referencing it. If phase 2 fails,
//! the identity is deleted synchronously before the error surfaces.
//!
//! The compensation is modeled as an explicit guard ([`PendingIdentity`])
//! that is disarmed once the identity is either promoted or rolled back,
//! making the invariant visible instead of relying on call-order discipline.

use tracing::error;
use uuid::Uuid;

use crate::error::WriteError;
use crate::models::{IdentityHandle, Profile, ValidatedRecord};
use crate::store::{MemberStore, NewIdentity};

/// A phase-1 identity that has not yet been promoted into a profile.
///
/// Must be disarmed before it goes out of scope: either the profile write
/// succeeded, or the compensating delete ran (successfully or not). Dropping
/// an armed guard means a code path skipped the compensation entirely, which
/// is logged at error level.
#[derive(Debug)]
pub struct PendingIdentity {
    handle: IdentityHandle,
    armed: bool,
}

impl PendingIdentity {
    fn new(handle: IdentityHandle) -> Self {
        Self {
            handle,
            armed: true,
        }
    }

    pub fn id(&self) -> Uuid {
        self.handle.id
    }

    pub fn handle(&self) -> &IdentityHandle {
        &self.handle
    }

    /// Mark the pending identity as settled (promoted or compensated).
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for PendingIdentity {
    fn drop(&mut self) {
        if self.armed {
            error!(
                identity_id = %self.handle.id,
                "pending identity dropped without promotion or rollback"
            );
        }
    }
}

/// Generated temporary credential for an imported identity.
fn temporary_password() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Perform the two-phase write for one validated, de-duplicated record.
///
/// On success the created identity handle is returned with its profile in
/// place. On phase-2 failure the identity is deleted before the error is
/// returned; if that compensating delete itself fails, the error is
/// [`WriteError::ProfileWithOrphan`] and the orphan is logged at error
/// severity.
pub async fn write_record<S: MemberStore>(
    store: &S,
    record: &ValidatedRecord,
    provenance: &str,
) -> Result<IdentityHandle, WriteError> {
    // Phase 1: create the identity. Failure here needs no rollback.
    let handle = store
        .create_identity(NewIdentity {
            email: record.email.clone(),
            password: temporary_password(),
            confirmed: true,
        })
        .await
        .map_err(WriteError::Identity)?;

    let mut pending = PendingIdentity::new(handle);

    // Phase 2: create the profile referencing the identity.
    let profile = Profile::from_record(pending.id(), record, provenance);
    match store.create_profile(&profile).await {
        Ok(()) => {
            pending.disarm();
            Ok(pending.handle().clone())
        }
        Err(profile_err) => {
            let cleanup = store.delete_identity(pending.handle()).await;
            let identity_id = pending.id();
            // Compensation was attempted either way; the guard's job is done.
            pending.disarm();

            match cleanup {
                Ok(()) => Err(WriteError::Profile(profile_err)),
                Err(cleanup_err) => {
                    error!(
                        identity_id = %identity_id,
                        profile_error = %profile_err,
                        cleanup_error = %cleanup_err,
                        "compensating delete failed, orphaned identity left in store"
                    );
                    Err(WriteError::ProfileWithOrphan {
                        profile: profile_err,
                        cleanup: cleanup_err,
                        identity_id,
                    })
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NormalizedRecord;
    use crate::store::MemoryStore;

    fn validated(email: &str) -> ValidatedRecord {
        ValidatedRecord {
            email: email.into(),
            placeholder_email: false,
            first_name: "Alice".into(),
            last_name: "Rahman".into(),
            leaving_class: 10,
            leaving_year: 2005,
            batch_year: 2005,
            rest: NormalizedRecord::default(),
        }
    }

    #[tokio::test]
    async fn test_success_leaves_identity_and_profile() {
        let store = MemoryStore::new();
        let handle = write_record(&store, &validated("a@x.com"), "legacy-import")
            .await
            .unwrap();

        assert_eq!(store.identity_count(), 1);
        assert_eq!(store.profile_count(), 1);
        let profile = store.profile_by_email("a@x.com").unwrap();
        assert_eq!(profile.identity_id, handle.id);
        assert!(profile.approved);
        assert_eq!(profile.source, "legacy-import");
    }

    #[tokio::test]
    async fn test_phase1_failure_needs_no_rollback() {
        let store = MemoryStore::new();
        write_record(&store, &validated("a@x.com"), "t").await.unwrap();

        // Same email again: the store's constraint rejects phase 1.
        let err = write_record(&store, &validated("a@x.com"), "t")
            .await
            .unwrap_err();
        assert!(matches!(err, WriteError::Identity(_)));
        assert_eq!(store.identity_count(), 1);
        assert_eq!(store.profile_count(), 1);
    }

    #[tokio::test]
    async fn test_phase2_failure_rolls_back_identity() {
        let store = MemoryStore::new();
        store.fail_profile_for("a@x.com");

        let err = write_record(&store, &validated("a@x.com"), "t")
            .await
            .unwrap_err();
        assert!(matches!(err, WriteError::Profile(_)));

        // The compensation law: neither identity nor profile remains.
        assert_eq!(store.identity_count(), 0);
        assert_eq!(store.profile_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_compensation_surfaces_orphan() {
        let store = MemoryStore::new();
        store.fail_profile_for("a@x.com");
        store.fail_identity_deletes(true);

        let err = write_record(&store, &validated("a@x.com"), "t")
            .await
            .unwrap_err();
        let message = err.to_string();
        match err {
            WriteError::ProfileWithOrphan { identity_id, .. } => {
                // The orphan really is still there, and the error names it.
                assert_eq!(store.identity_count(), 1);
                assert!(message.contains(&identity_id.to_string()));
            }
            other => panic!("expected orphan error, got {other:?}"),
        }
        assert_eq!(store.profile_count(), 0);
    }
}
