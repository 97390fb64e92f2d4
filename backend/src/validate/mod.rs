//! Record validator: business rules and placeholder identity synthesis.
//!
//! Pure and store-free, so every rule is unit-testable without a store.
//!
//! Rules, in order:
//! 1. first name, last name, leaving class and leaving year are required;
//! 2. leaving/entry class in [1, 12], leaving/entry year in [1950, current],
//!    deceased year in [1950, current] and not after the leaving year;
//! 3. batch year defaults to the leaving year;
//! 4. a record with no email gets a placeholder synthesized from its
//!    registration number; a record with neither cannot become an identity
//!    and is rejected outright.

use chrono::{Datelike, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{ValidationError, ValidationResult};
use crate::models::{NormalizedRecord, ValidatedRecord};

/// Oldest accepted academic year. The school has no records before this.
pub const MIN_YEAR: u16 = 1950;

/// Class range of the school.
pub const MIN_CLASS: u8 = 1;
pub const MAX_CLASS: u8 = 12;

/// Minimal shape check for supplied emails. Anything stricter belongs to the
/// identity store, which has the final say anyway.
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

fn current_year() -> u16 {
    Utc::now().year() as u16
}

fn check_year(field: &'static str, value: u16, max: u16) -> ValidationResult<()> {
    if value < MIN_YEAR || value > max {
        return Err(ValidationError::OutOfRange {
            field,
            value,
            min: MIN_YEAR,
            max,
        });
    }
    Ok(())
}

fn check_class(field: &'static str, value: u8) -> ValidationResult<()> {
    if !(MIN_CLASS..=MAX_CLASS).contains(&value) {
        return Err(ValidationError::OutOfRange {
            field,
            value: u16::from(value),
            min: u16::from(MIN_CLASS),
            max: u16::from(MAX_CLASS),
        });
    }
    Ok(())
}

/// Derive a placeholder email from a registration number: lowercase, strip
/// every non-alphanumeric character, append the organizational domain.
///
/// "BGHSA-2005-00025" with domain "bghsa.org" becomes
/// "bghsa200500025@bghsa.org".
pub fn synthesize_email(reference: &str, domain: &str) -> ValidationResult<String> {
    let local: String = reference
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();

    if local.is_empty() {
        // A reference number made entirely of punctuation keys nothing.
        return Err(ValidationError::CannotSynthesizeIdentity);
    }

    Ok(format!("{}@{}", local, domain))
}

/// Validate a normalized record against every business rule.
///
/// On success the record is promoted to a [`ValidatedRecord`] with a
/// guaranteed non-empty email; on failure the error names the offending
/// field. Consumes the record either way.
pub fn validate(
    record: NormalizedRecord,
    email_domain: &str,
) -> ValidationResult<ValidatedRecord> {
    let first_name = record
        .first_name
        .clone()
        .ok_or(ValidationError::MissingField("first_name"))?;
    let last_name = record
        .last_name
        .clone()
        .ok_or(ValidationError::MissingField("last_name"))?;
    let leaving_class = record
        .leaving_class
        .ok_or(ValidationError::MissingField("leaving_class"))?;
    let leaving_year = record
        .leaving_year
        .ok_or(ValidationError::MissingField("leaving_year"))?;

    let max_year = current_year();

    check_class("leaving_class", leaving_class)?;
    check_year("leaving_year", leaving_year, max_year)?;
    if let Some(entry_class) = record.entry_class {
        check_class("entry_class", entry_class)?;
    }
    if let Some(entry_year) = record.entry_year {
        check_year("entry_year", entry_year, max_year)?;
    }
    if let Some(deceased_year) = record.deceased_year {
        check_year("deceased_year", deceased_year, max_year)?;
        if deceased_year > leaving_year {
            return Err(ValidationError::DeceasedAfterLeaving {
                deceased: deceased_year,
                leaving: leaving_year,
            });
        }
    }

    let batch_year = record.batch_year.unwrap_or(leaving_year);

    let (email, placeholder_email) = match record.email.as_deref() {
        Some(supplied) => {
            if !EMAIL_RE.is_match(supplied) {
                return Err(ValidationError::InvalidEmail(supplied.to_string()));
            }
            (supplied.to_string(), false)
        }
        None => match record.reference_number() {
            Some(reference) => (synthesize_email(reference, email_domain)?, true),
            None => return Err(ValidationError::CannotSynthesizeIdentity),
        },
    };

    Ok(ValidatedRecord {
        email,
        placeholder_email,
        first_name,
        last_name,
        leaving_class,
        leaving_year,
        batch_year,
        rest: record,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOMAIN: &str = "bghsa.org";

    fn minimal() -> NormalizedRecord {
        NormalizedRecord {
            email: Some("alice@example.com".into()),
            first_name: Some("Alice".into()),
            last_name: Some("Rahman".into()),
            leaving_class: Some(10),
            leaving_year: Some(2005),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_record_promotes_fields() {
        let validated = validate(minimal(), DOMAIN).unwrap();
        assert_eq!(validated.email, "alice@example.com");
        assert!(!validated.placeholder_email);
        assert_eq!(validated.first_name, "Alice");
        assert_eq!(validated.leaving_class, 10);
        assert_eq!(validated.leaving_year, 2005);
    }

    #[test]
    fn test_missing_required_fields_named() {
        for (field, strip) in [
            ("first_name", Box::new(|r: &mut NormalizedRecord| r.first_name = None)
                as Box<dyn Fn(&mut NormalizedRecord)>),
            ("last_name", Box::new(|r: &mut NormalizedRecord| r.last_name = None)),
            ("leaving_class", Box::new(|r: &mut NormalizedRecord| r.leaving_class = None)),
            ("leaving_year", Box::new(|r: &mut NormalizedRecord| r.leaving_year = None)),
        ] {
            let mut record = minimal();
            strip(&mut record);
            let err = validate(record, DOMAIN).unwrap_err();
            assert_eq!(err, ValidationError::MissingField(field));
        }
    }

    #[test]
    fn test_leaving_class_range() {
        let mut record = minimal();
        record.leaving_class = Some(13);
        let err = validate(record, DOMAIN).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::OutOfRange { field: "leaving_class", value: 13, .. }
        ));
    }

    #[test]
    fn test_leaving_year_range() {
        let mut record = minimal();
        record.leaving_year = Some(1949);
        assert!(validate(record, DOMAIN).is_err());

        let mut record = minimal();
        record.leaving_year = Some(current_year() + 1);
        assert!(validate(record, DOMAIN).is_err());
    }

    #[test]
    fn test_entry_fields_checked_when_present() {
        let mut record = minimal();
        record.entry_class = Some(0);
        assert!(validate(record, DOMAIN).is_err());

        let mut record = minimal();
        record.entry_year = Some(1900);
        assert!(validate(record, DOMAIN).is_err());

        let mut record = minimal();
        record.entry_class = Some(1);
        record.entry_year = Some(1997);
        assert!(validate(record, DOMAIN).is_ok());
    }

    #[test]
    fn test_deceased_year_not_after_leaving() {
        let mut record = minimal();
        record.is_deceased = true;
        record.deceased_year = Some(2010);
        let err = validate(record, DOMAIN).unwrap_err();
        assert_eq!(
            err,
            ValidationError::DeceasedAfterLeaving { deceased: 2010, leaving: 2005 }
        );

        let mut record = minimal();
        record.is_deceased = true;
        record.deceased_year = Some(2003);
        assert!(validate(record, DOMAIN).is_ok());
    }

    #[test]
    fn test_batch_year_defaults_to_leaving_year() {
        let validated = validate(minimal(), DOMAIN).unwrap();
        assert_eq!(validated.batch_year, 2005);

        let mut record = minimal();
        record.batch_year = Some(2004);
        let validated = validate(record, DOMAIN).unwrap();
        assert_eq!(validated.batch_year, 2004);
    }

    #[test]
    fn test_placeholder_email_from_registration_number() {
        let mut record = minimal();
        record.email = None;
        record.registration_no = Some("BGHSA-2005-00025".into());

        let validated = validate(record, DOMAIN).unwrap();
        assert_eq!(validated.email, "bghsa200500025@bghsa.org");
        assert!(validated.placeholder_email);
    }

    #[test]
    fn test_placeholder_falls_back_to_old_registration() {
        let mut record = minimal();
        record.email = None;
        record.old_registration_no = Some("OLD/77".into());

        let validated = validate(record, DOMAIN).unwrap();
        assert_eq!(validated.email, "old77@bghsa.org");
    }

    #[test]
    fn test_no_email_no_reference_fails_synthesis() {
        let mut record = minimal();
        record.email = None;
        let err = validate(record, DOMAIN).unwrap_err();
        assert_eq!(err, ValidationError::CannotSynthesizeIdentity);
    }

    #[test]
    fn test_all_punctuation_reference_fails_synthesis() {
        let mut record = minimal();
        record.email = None;
        record.registration_no = Some("---".into());
        let err = validate(record, DOMAIN).unwrap_err();
        assert_eq!(err, ValidationError::CannotSynthesizeIdentity);
    }

    #[test]
    fn test_malformed_supplied_email_rejected() {
        let mut record = minimal();
        record.email = Some("not-an-email".into());
        let err = validate(record, DOMAIN).unwrap_err();
        assert_eq!(err, ValidationError::InvalidEmail("not-an-email".into()));
    }
}
