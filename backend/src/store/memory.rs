//! In-memory member store.
//!
//! Backs the CLI staging harness and the test suite. Enforces email
//! uniqueness at create time the way a real backend's constraint would, and
//! offers failure injection so the writer's rollback paths can be exercised.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::models::{IdentityHandle, Profile};

use super::{MemberStore, NewIdentity};

#[derive(Debug, Default)]
struct Inner {
    /// identity id -> email
    identities: HashMap<Uuid, String>,
    /// identity id -> profile
    profiles: HashMap<Uuid, Profile>,
    /// Emails whose profile creation is forced to fail.
    fail_profile_for: HashSet<String>,
    /// When set, identity deletion fails (simulates a half-broken backend).
    fail_identity_delete: bool,
}

/// `Mutex<HashMap>`-backed store implementation.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Force `create_profile` to fail for the given email. Rollback-path
    /// testing hook.
    pub fn fail_profile_for(&self, email: &str) {
        self.inner
            .lock()
            .expect("store mutex poisoned")
            .fail_profile_for
            .insert(email.to_string());
    }

    /// Force `delete_identity` to fail. Orphan-path testing hook.
    pub fn fail_identity_deletes(&self, fail: bool) {
        self.inner.lock().expect("store mutex poisoned").fail_identity_delete = fail;
    }

    pub fn identity_count(&self) -> usize {
        self.inner.lock().expect("store mutex poisoned").identities.len()
    }

    pub fn profile_count(&self) -> usize {
        self.inner.lock().expect("store mutex poisoned").profiles.len()
    }

    /// Fetch a stored profile by the email it was imported under.
    pub fn profile_by_email(&self, email: &str) -> Option<Profile> {
        self.inner
            .lock()
            .expect("store mutex poisoned")
            .profiles
            .values()
            .find(|p| p.email == email)
            .cloned()
    }

    /// Seed an existing member (identity + profile), for duplicate tests.
    pub fn seed_profile(&self, profile: Profile) {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        inner
            .identities
            .insert(profile.identity_id, profile.email.clone());
        inner.profiles.insert(profile.identity_id, profile);
    }
}

impl MemberStore for MemoryStore {
    async fn email_exists(&self, email: &str) -> StoreResult<bool> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        Ok(inner.identities.values().any(|e| e == email))
    }

    async fn registration_exists(&self, reference: &str) -> StoreResult<bool> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        Ok(inner.profiles.values().any(|p| {
            p.registration_no.as_deref() == Some(reference)
                || p.old_registration_no.as_deref() == Some(reference)
        }))
    }

    async fn create_identity(&self, identity: NewIdentity) -> StoreResult<IdentityHandle> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        // Uniqueness constraint, the authoritative duplicate signal.
        if inner.identities.values().any(|e| *e == identity.email) {
            return Err(StoreError::Rejected(format!(
                "email '{}' already registered",
                identity.email
            )));
        }
        let id = Uuid::new_v4();
        inner.identities.insert(id, identity.email);
        Ok(IdentityHandle { id })
    }

    async fn delete_identity(&self, handle: &IdentityHandle) -> StoreResult<()> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        if inner.fail_identity_delete {
            return Err(StoreError::Backend("injected delete failure".into()));
        }
        inner
            .identities
            .remove(&handle.id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("identity {}", handle.id)))
    }

    async fn create_profile(&self, profile: &Profile) -> StoreResult<()> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        if inner.fail_profile_for.contains(&profile.email) {
            return Err(StoreError::Rejected("injected profile failure".into()));
        }
        if !inner.identities.contains_key(&profile.identity_id) {
            return Err(StoreError::NotFound(format!(
                "identity {} for profile",
                profile.identity_id
            )));
        }
        inner.profiles.insert(profile.identity_id, profile.clone());
        Ok(())
    }
}
