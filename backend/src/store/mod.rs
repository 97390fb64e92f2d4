//! Store seam: the identity/profile store the pipeline writes into.
//!
//! The real store (relational schema, auth provider) lives outside this
//! crate; [`MemberStore`] is the interface the pipeline needs from it.
//! [`MemoryStore`] is the bundled implementation used by tests and the CLI
//! staging harness.
//!
//! The duplicate pre-check and the subsequent write are not atomic together,
//! so concurrent imports over overlapping emails or registration numbers are
//! not safe. Callers must serialize imports; real backends should also carry
//! a uniqueness constraint on identity email as the last line of defense.

use crate::error::StoreResult;
use crate::models::{IdentityHandle, Profile};

pub mod memory;

pub use memory::MemoryStore;

/// Input for phase 1 of the transactional write.
#[derive(Debug, Clone)]
pub struct NewIdentity {
    pub email: String,
    /// Generated temporary credential; members reset it on first login.
    pub password: String,
    /// Imported identities are pre-confirmed, no verification email goes out.
    pub confirmed: bool,
}

/// The identity/profile store interface.
///
/// All methods are async because real backends sit behind network I/O; the
/// pipeline calls them strictly sequentially per record.
#[allow(async_fn_in_trait)]
pub trait MemberStore {
    /// Does any identity already use this email (exact match)?
    async fn email_exists(&self, email: &str) -> StoreResult<bool>;

    /// Does any profile already carry this registration number, current or
    /// legacy (exact match)?
    async fn registration_exists(&self, reference: &str) -> StoreResult<bool>;

    /// Phase 1: create an authentication identity.
    async fn create_identity(&self, identity: NewIdentity) -> StoreResult<IdentityHandle>;

    /// Compensating action for phase 1. Must remove the identity entirely.
    async fn delete_identity(&self, handle: &IdentityHandle) -> StoreResult<()>;

    /// Phase 2: persist the member profile referencing its identity.
    async fn create_profile(&self, profile: &Profile) -> StoreResult<()>;
}
