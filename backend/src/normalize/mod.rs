//! Field normalizer: raw rows to the canonical record shape.
//!
//! Legacy exports spell column names dozens of different ways ("Email",
//! "E-mail", "Email Address", ...). A static alias table maps every known
//! spelling to a canonical field name; lookups fold case and punctuation so
//! "First Name", "first_name" and "FIRSTNAME" all land on the same entry.
//! Headers the table does not know are lowercased and carried through as-is.
//!
//! Normalization is best-effort and never fails: values are trimmed, empty
//! cells become absent, and unparsable optional integers become `None`.
//! Missing required fields are the validator's problem, not ours.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::models::NormalizedRecord;
use crate::parser::RawRow;

/// Canonical field names the alias table resolves to.
mod field {
    pub const EMAIL: &str = "email";
    pub const PHONE: &str = "phone";
    pub const TITLE: &str = "title";
    pub const FIRST_NAME: &str = "first_name";
    pub const MIDDLE_NAME: &str = "middle_name";
    pub const LAST_NAME: &str = "last_name";
    pub const ENTRY_CLASS: &str = "entry_class";
    pub const ENTRY_YEAR: &str = "entry_year";
    pub const LEAVING_CLASS: &str = "leaving_class";
    pub const LEAVING_YEAR: &str = "leaving_year";
    pub const BATCH_YEAR: &str = "batch_year";
    pub const PROFESSION: &str = "profession";
    pub const COMPANY: &str = "company";
    pub const LOCATION: &str = "location";
    pub const BIO: &str = "bio";
    pub const LINKEDIN: &str = "linkedin";
    pub const WEBSITE: &str = "website";
    pub const ROLE: &str = "role";
    pub const PROFESSIONAL_TITLE: &str = "professional_title";
    pub const IS_DECEASED: &str = "is_deceased";
    pub const DECEASED_YEAR: &str = "deceased_year";
    pub const REGISTRATION_NO: &str = "registration_no";
    pub const OLD_REGISTRATION_NO: &str = "old_registration_no";
    pub const NOTES: &str = "notes";
}

/// Header spelling variants -> canonical field names.
///
/// Keys are folded (lowercase, alphanumerics only), so one entry covers all
/// case and punctuation variants of the same words.
static ALIASES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    use field::*;

    let mut m = HashMap::new();
    let mut alias = |keys: &[&'static str], canonical: &'static str| {
        for key in keys {
            m.insert(*key, canonical);
        }
    };

    alias(&["email", "emailaddress", "emailid", "mail"], EMAIL);
    alias(
        &["phone", "phoneno", "phonenumber", "mobile", "mobileno", "contactno", "cell"],
        PHONE,
    );
    alias(&["title", "titleprefix", "prefix", "salutation"], TITLE);
    alias(&["firstname", "fname", "givenname"], FIRST_NAME);
    alias(&["middlename", "mname"], MIDDLE_NAME);
    alias(&["lastname", "lname", "surname", "familyname"], LAST_NAME);
    alias(
        &["startclass", "entryclass", "admissionclass", "classofadmission"],
        ENTRY_CLASS,
    );
    alias(
        &["startyear", "entryyear", "admissionyear", "yearofadmission"],
        ENTRY_YEAR,
    );
    alias(
        &["lastclass", "leavingclass", "classofleaving", "finalclass"],
        LEAVING_CLASS,
    );
    alias(
        &["yearofleaving", "leavingyear", "passingyear", "yol"],
        LEAVING_YEAR,
    );
    alias(&["batchyear", "batch", "cohort", "cohortyear"], BATCH_YEAR);
    alias(&["profession", "occupation"], PROFESSION);
    alias(
        &["company", "organization", "organisation", "employer", "companyname"],
        COMPANY,
    );
    alias(&["location", "city", "currentlocation", "address"], LOCATION);
    alias(&["bio", "about", "aboutme", "biography"], BIO);
    alias(
        &["linkedin", "linkedinurl", "linkedinprofile"],
        LINKEDIN,
    );
    alias(&["website", "websiteurl", "web", "url", "homepage"], WEBSITE);
    alias(&["role", "memberrole"], ROLE);
    alias(
        &["professionaltitle", "designation", "jobtitle"],
        PROFESSIONAL_TITLE,
    );
    alias(&["isdeceased", "deceased", "late"], IS_DECEASED);
    alias(
        &["deceasedyear", "yearofdeath", "deathyear"],
        DECEASED_YEAR,
    );
    alias(
        &[
            "registrationnumber",
            "registrationno",
            "regno",
            "regnumber",
            "currentregistrationnumber",
            "membershipno",
            "membershipnumber",
        ],
        REGISTRATION_NO,
    );
    alias(
        &[
            "oldregistrationnumber",
            "oldregistrationno",
            "oldregno",
            "legacyregistrationnumber",
            "previousregno",
        ],
        OLD_REGISTRATION_NO,
    );
    alias(&["notes", "note", "remarks", "comments", "comment"], NOTES);

    m
});

/// Fold a header for alias lookup: lowercase, alphanumerics only.
fn fold_header(header: &str) -> String {
    header
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase()
}

/// Resolve a source header to its canonical field name.
///
/// Unknown headers are lowercased and used as-is (forward-compatible
/// passthrough).
pub fn canonical_field(header: &str) -> String {
    let folded = fold_header(header);
    match ALIASES.get(folded.as_str()) {
        Some(canonical) => (*canonical).to_string(),
        None => header.trim().to_lowercase(),
    }
}

/// Permissive integer coercion: strip non-digit characters, then parse.
///
/// Handles values like "Class 8", "2005 ", or "8th". Returns `None` when no
/// digits remain or the digits overflow the target type, keeping coercion
/// failure distinguishable from a deliberate zero.
pub fn parse_int_loose<T: std::str::FromStr>(value: &str) -> Option<T> {
    let digits: String = value.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// Boolean coercion: case-insensitive "true"/"1"/"yes" are true, anything
/// else is false.
pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes"
    )
}

/// Normalize one raw row into the canonical record shape.
///
/// Best-effort: never fails. Range rules and required fields are checked
/// later by the validator.
pub fn normalize(row: &RawRow) -> NormalizedRecord {
    use field::*;

    let mut record = NormalizedRecord::default();

    for (header, raw_value) in &row.fields {
        let value = raw_value.trim();
        if value.is_empty() {
            continue;
        }

        match canonical_field(header).as_str() {
            EMAIL => record.email = Some(value.to_string()),
            PHONE => record.phone = Some(value.to_string()),
            TITLE => record.title = Some(value.to_string()),
            FIRST_NAME => record.first_name = Some(value.to_string()),
            MIDDLE_NAME => record.middle_name = Some(value.to_string()),
            LAST_NAME => record.last_name = Some(value.to_string()),
            ENTRY_CLASS => record.entry_class = parse_int_loose(value),
            ENTRY_YEAR => record.entry_year = parse_int_loose(value),
            LEAVING_CLASS => record.leaving_class = parse_int_loose(value),
            LEAVING_YEAR => record.leaving_year = parse_int_loose(value),
            BATCH_YEAR => record.batch_year = parse_int_loose(value),
            PROFESSION => record.profession = Some(value.to_string()),
            COMPANY => record.company = Some(value.to_string()),
            LOCATION => record.location = Some(value.to_string()),
            BIO => record.bio = Some(value.to_string()),
            LINKEDIN => record.linkedin = Some(value.to_string()),
            WEBSITE => record.website = Some(value.to_string()),
            ROLE => record.role = Some(value.to_string()),
            PROFESSIONAL_TITLE => record.professional_title = Some(value.to_string()),
            IS_DECEASED => record.is_deceased = parse_flag(value),
            DECEASED_YEAR => record.deceased_year = parse_int_loose(value),
            REGISTRATION_NO => record.registration_no = Some(value.to_string()),
            OLD_REGISTRATION_NO => record.old_registration_no = Some(value.to_string()),
            NOTES => record.notes = Some(value.to_string()),
            other => {
                record.extra.insert(other.to_string(), value.to_string());
            }
        }
    }

    record
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(fields: &[(&str, &str)]) -> RawRow {
        RawRow {
            line: 2,
            fields: fields
                .iter()
                .map(|(h, v)| (h.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_alias_variants_resolve() {
        assert_eq!(canonical_field("Email"), "email");
        assert_eq!(canonical_field("E-mail"), "email");
        assert_eq!(canonical_field("Email Address"), "email");
        assert_eq!(canonical_field("FIRST NAME"), "first_name");
        assert_eq!(canonical_field("first_name"), "first_name");
        assert_eq!(canonical_field("Year of Leaving"), "leaving_year");
        assert_eq!(canonical_field("Reg. No."), "registration_no");
        assert_eq!(canonical_field("Old Registration Number"), "old_registration_no");
    }

    #[test]
    fn test_unknown_header_lowercased_passthrough() {
        assert_eq!(canonical_field("Blood Group"), "blood group");

        let record = normalize(&row(&[("Blood Group", "O+")]));
        assert_eq!(record.extra.get("blood group").map(String::as_str), Some("O+"));
    }

    #[test]
    fn test_values_trimmed_and_empty_is_absent() {
        let record = normalize(&row(&[
            ("First Name", "  Alice  "),
            ("Last Name", "   "),
        ]));
        assert_eq!(record.first_name.as_deref(), Some("Alice"));
        assert_eq!(record.last_name, None);
    }

    #[test]
    fn test_loose_integer_coercion() {
        assert_eq!(parse_int_loose::<u8>("Class 8"), Some(8));
        assert_eq!(parse_int_loose::<u16>(" 2005 "), Some(2005));
        assert_eq!(parse_int_loose::<u16>("n/a"), None);
        assert_eq!(parse_int_loose::<u8>("999"), None); // overflow
    }

    #[test]
    fn test_unparsable_optional_int_becomes_absent() {
        let record = normalize(&row(&[("Start Year", "unknown")]));
        assert_eq!(record.entry_year, None);
    }

    #[test]
    fn test_boolean_coercion() {
        assert!(parse_flag("true"));
        assert!(parse_flag("TRUE"));
        assert!(parse_flag("1"));
        assert!(parse_flag("Yes"));
        assert!(!parse_flag("no"));
        assert!(!parse_flag("0"));
        assert!(!parse_flag("dead"));
    }

    #[test]
    fn test_full_row_normalization() {
        let record = normalize(&row(&[
            ("Email", "alice@example.com"),
            ("First Name", "Alice"),
            ("Last Name", "Rahman"),
            ("Last Class", "10"),
            ("Year of Leaving", "2005"),
            ("Is Deceased", "no"),
            ("Registration Number", "BGHSA-2005-00025"),
        ]));

        assert_eq!(record.email.as_deref(), Some("alice@example.com"));
        assert_eq!(record.first_name.as_deref(), Some("Alice"));
        assert_eq!(record.leaving_class, Some(10));
        assert_eq!(record.leaving_year, Some(2005));
        assert!(!record.is_deceased);
        assert_eq!(record.registration_no.as_deref(), Some("BGHSA-2005-00025"));
    }
}
