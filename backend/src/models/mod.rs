//! Domain models for the Rosterload migration pipeline.
//!
//! This module contains the core data structures flowing through the pipeline:
//!
//! - [`NormalizedRecord`] - canonical record shape after header/type normalization
//! - [`ValidatedRecord`] - a record proven to satisfy all business rules
//! - [`IdentityHandle`] - opaque reference to a created authentication identity
//! - [`Profile`] - the persisted member record
//! - [`RecordOutcome`] / [`BatchReport`] - per-record and per-file results

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

// =============================================================================
// Normalized Record
// =============================================================================

/// Canonical in-memory shape of one imported row.
///
/// Produced by the normalizer on a best-effort basis: every field is optional
/// here, and no range rules have been checked yet. Headers the alias table
/// does not recognize end up in [`NormalizedRecord::extra`], lowercased.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NormalizedRecord {
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Title prefix (Mr, Dr, Engr, ...).
    pub title: Option<String>,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    /// Class the member joined the school in (1-12).
    pub entry_class: Option<u8>,
    pub entry_year: Option<u16>,
    /// Last class attended (1-12).
    pub leaving_class: Option<u8>,
    pub leaving_year: Option<u16>,
    /// Cohort year; defaults to the leaving year during validation.
    pub batch_year: Option<u16>,
    pub profession: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub linkedin: Option<String>,
    pub website: Option<String>,
    pub role: Option<String>,
    pub professional_title: Option<String>,
    pub is_deceased: bool,
    pub deceased_year: Option<u16>,
    /// Current registration number, e.g. "BGHSA-2005-00025".
    pub registration_no: Option<String>,
    /// Registration number from the previous numbering scheme.
    pub old_registration_no: Option<String>,
    pub notes: Option<String>,
    /// Unrecognized columns, keyed by lowercased header. Forward-compatible
    /// passthrough; never validated.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl NormalizedRecord {
    /// The registration number to use as an alternate identity key:
    /// the current one if present, otherwise the legacy one.
    pub fn reference_number(&self) -> Option<&str> {
        self.registration_no
            .as_deref()
            .or(self.old_registration_no.as_deref())
    }
}

// =============================================================================
// Validated Record
// =============================================================================

/// A [`NormalizedRecord`] that passed every business rule.
///
/// Required fields are promoted out of their `Option` wrappers, and `email`
/// is guaranteed non-empty (supplied or synthesized placeholder). Constructed
/// once per raw row by the validator and consumed exactly once by the
/// duplicate resolver / writer; never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRecord {
    /// The email the identity will be created under.
    pub email: String,
    /// True when `email` was synthesized from a registration number.
    pub placeholder_email: bool,
    pub first_name: String,
    pub last_name: String,
    pub leaving_class: u8,
    pub leaving_year: u16,
    /// Cohort year, defaulted to `leaving_year` when the file omitted it.
    pub batch_year: u16,
    /// Remaining optional fields, untouched by validation.
    pub rest: NormalizedRecord,
}

impl ValidatedRecord {
    /// The registration number used as the alternate uniqueness key.
    pub fn reference_number(&self) -> Option<&str> {
        self.rest.reference_number()
    }
}

// =============================================================================
// Identity Handle
// =============================================================================

/// Opaque reference to a created authentication identity.
///
/// Exclusively owned by the transactional writer while one record is being
/// processed: either promoted into a permanent [`Profile`] or deleted before
/// the writer moves on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityHandle {
    pub id: Uuid,
}

// =============================================================================
// Profile
// =============================================================================

/// The persisted member record, keyed by the identity id.
///
/// Created at most once per successful record; this pipeline never updates
/// existing profiles.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub identity_id: Uuid,
    pub email: String,
    pub phone: Option<String>,
    pub title: Option<String>,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub entry_class: Option<u8>,
    pub entry_year: Option<u16>,
    pub leaving_class: u8,
    pub leaving_year: u16,
    pub batch_year: u16,
    pub profession: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub linkedin: Option<String>,
    pub website: Option<String>,
    pub role: Option<String>,
    pub professional_title: Option<String>,
    pub is_deceased: bool,
    pub deceased_year: Option<u16>,
    pub registration_no: Option<String>,
    pub old_registration_no: Option<String>,
    pub notes: Option<String>,

    // System fields, populated by the import itself.
    /// Imported records are auto-approved.
    pub approved: bool,
    /// Provenance tag identifying this import as the source.
    pub source: String,
    pub imported_at: DateTime<Utc>,
    /// Payment status default for migrated members.
    pub payment_status: String,
}

/// Default payment status stamped on every migrated profile.
pub const DEFAULT_PAYMENT_STATUS: &str = "unpaid";

impl Profile {
    /// Build a profile from a validated record and the identity created for it.
    pub fn from_record(identity_id: Uuid, record: &ValidatedRecord, source: &str) -> Self {
        let rest = &record.rest;
        Self {
            identity_id,
            email: record.email.clone(),
            phone: rest.phone.clone(),
            title: rest.title.clone(),
            first_name: record.first_name.clone(),
            middle_name: rest.middle_name.clone(),
            last_name: record.last_name.clone(),
            entry_class: rest.entry_class,
            entry_year: rest.entry_year,
            leaving_class: record.leaving_class,
            leaving_year: record.leaving_year,
            batch_year: record.batch_year,
            profession: rest.profession.clone(),
            company: rest.company.clone(),
            location: rest.location.clone(),
            bio: rest.bio.clone(),
            linkedin: rest.linkedin.clone(),
            website: rest.website.clone(),
            role: rest.role.clone(),
            professional_title: rest.professional_title.clone(),
            is_deceased: rest.is_deceased,
            deceased_year: rest.deceased_year,
            registration_no: rest.registration_no.clone(),
            old_registration_no: rest.old_registration_no.clone(),
            notes: rest.notes.clone(),
            approved: true,
            source: source.to_string(),
            imported_at: Utc::now(),
            payment_status: DEFAULT_PAYMENT_STATUS.to_string(),
        }
    }
}

// =============================================================================
// Outcomes and Report
// =============================================================================

/// Final state of one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    Success,
    Failed,
}

/// The outcome of processing a single record. Immutable once produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordOutcome {
    /// The email the record was (or would have been) imported under, or a
    /// positional fallback when no identifier could be derived.
    pub identifier: String,
    pub status: RecordStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RecordOutcome {
    pub fn success(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            status: RecordStatus::Success,
            error: None,
        }
    }

    pub fn failed(identifier: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            status: RecordStatus::Failed,
            error: Some(error.into()),
        }
    }
}

/// Aggregated result of one import run. The pipeline's only externally
/// visible return value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    /// True when every record produced a profile.
    pub success: bool,
    /// Records that resulted in a created profile.
    pub processed: usize,
    /// Records rejected at any stage.
    pub failed: usize,
    /// Flat list of human-readable error descriptions.
    pub errors: Vec<String>,
    /// One entry per record, in input order.
    pub details: Vec<RecordOutcome>,
}

impl BatchReport {
    /// Record a success, keeping counters and details in step.
    pub fn record_success(&mut self, identifier: impl Into<String>) {
        self.processed += 1;
        self.details.push(RecordOutcome::success(identifier));
    }

    /// Record a failure, keeping counters, details and the error list in step.
    pub fn record_failure(&mut self, identifier: impl Into<String>, error: impl Into<String>) {
        let identifier = identifier.into();
        let error = error.into();
        self.failed += 1;
        self.errors.push(format!("{}: {}", identifier, error));
        self.details.push(RecordOutcome::failed(identifier, error));
    }

    /// Total number of records that produced an outcome.
    pub fn total(&self) -> usize {
        self.processed + self.failed
    }
}
