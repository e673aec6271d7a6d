//! Field-level checks producing a [`ValidationVerdict`].

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use rxscan_core::{CanonicalField, CanonicalRecord, Issue, ValidationVerdict};

static NDC_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4,5}-\d{3,4}-\d{1,2}$").unwrap());

/// Placeholder prescription numbers left on demo labels.
const TEST_RX_VALUES: &[&str] = &["test", "sample", "demo"];

/// Accepted fill-date layouts, tried in order.
pub const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", // 2025-03-15
    "%m/%d/%Y", // 03/15/2025
    "%d/%m/%Y", // 15/03/2025
    "%Y/%m/%d", // 2025/03/15
    "%d-%m-%Y", // 15-03-2025
    "%m-%d-%Y", // 03-15-2025
    "%d.%m.%Y", // 15.03.2025
    "%m.%d.%Y", // 03.15.2025
];

/// Validate a record. Every rule runs; issues keep rule order.
pub fn validate(record: &CanonicalRecord) -> ValidationVerdict {
    let mut issues = Vec::new();
    check_required(record, &mut issues);
    check_ndc(record, &mut issues);
    check_rx_number(record, &mut issues);
    check_date_filled(record, &mut issues);
    ValidationVerdict::from_issues(issues)
}

fn check_required(record: &CanonicalRecord, issues: &mut Vec<Issue>) {
    if record.present(CanonicalField::MedicationName).is_none() {
        issues.push(Issue::MissingMedicationName);
    }
    if record.present(CanonicalField::PatientName).is_none() {
        issues.push(Issue::MissingPatientName);
    }
}

fn check_ndc(record: &CanonicalRecord, issues: &mut Vec<Issue>) {
    let Some(ndc) = record.present(CanonicalField::NdcNumber) else { return };
    if !is_valid_ndc(ndc) {
        issues.push(Issue::InvalidNdcFormat);
    }
}

fn check_rx_number(record: &CanonicalRecord, issues: &mut Vec<Issue>) {
    let Some(rx) = record.present(CanonicalField::RxNumber) else { return };
    let rx = rx.trim();
    if rx.is_empty() || TEST_RX_VALUES.iter().any(|t| rx.eq_ignore_ascii_case(t)) {
        issues.push(Issue::TestRxNumber);
    }
}

fn check_date_filled(record: &CanonicalRecord, issues: &mut Vec<Issue>) {
    let Some(date) = record.present(CanonicalField::DateFilled) else { return };
    if parse_fill_date(date).is_none() {
        issues.push(Issue::InvalidDateFormat);
    }
}

pub fn is_valid_ndc(ndc: &str) -> bool {
    NDC_RE.is_match(ndc)
}

/// First accepted layout that parses the whole string.
pub fn parse_fill_date(value: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rxscan_core::RecordBuilder;
    use rxscan_core::CanonicalField::*;

    fn record(fields: &[(CanonicalField, &str)]) -> CanonicalRecord {
        let mut builder = RecordBuilder::new("raw");
        for (field, value) in fields {
            builder.set(*field, *value);
        }
        builder.build()
    }

    #[test]
    fn complete_record_is_valid() {
        let verdict = validate(&record(&[
            (PatientName, "John Smith"),
            (MedicationName, "Lisinopril 10mg"),
            (NdcNumber, "0378-1805-01"),
            (RxNumber, "1234567"),
        ]));
        assert!(verdict.is_valid);
        assert!(verdict.issues.is_empty());
    }

    #[test]
    fn issues_keep_rule_order() {
        let verdict = validate(&record(&[
            (NdcNumber, "12-34"),
            (RxNumber, "SAMPLE"),
            (DateFilled, "yesterday"),
        ]));
        assert!(!verdict.is_valid);
        assert_eq!(
            verdict.issues,
            vec![
                Issue::MissingMedicationName,
                Issue::MissingPatientName,
                Issue::InvalidNdcFormat,
                Issue::TestRxNumber,
                Issue::InvalidDateFormat,
            ]
        );
    }

    #[test]
    fn empty_strings_count_as_missing() {
        let verdict = validate(&record(&[(PatientName, ""), (MedicationName, "Aspirin")]));
        assert_eq!(verdict.issues, vec![Issue::MissingPatientName]);
    }

    #[test]
    fn whitespace_rx_is_test_data() {
        let verdict = validate(&record(&[
            (PatientName, "A"),
            (MedicationName, "B"),
            (RxNumber, "   "),
        ]));
        assert_eq!(verdict.issues, vec![Issue::TestRxNumber]);
    }

    #[test]
    fn padded_test_rx_is_flagged() {
        let verdict = validate(&record(&[
            (PatientName, "A"),
            (MedicationName, "B"),
            (RxNumber, " Demo "),
        ]));
        assert_eq!(verdict.issues, vec![Issue::TestRxNumber]);
    }

    #[test]
    fn ndc_rule_tracks_pattern_exactly() {
        for ndc in ["0378-1805-01", "12345-678-9", "1234-567-89", "12345-6789-01"] {
            assert!(is_valid_ndc(ndc), "{ndc}");
            let verdict = validate(&record(&[(PatientName, "A"), (MedicationName, "B"), (NdcNumber, ndc)]));
            assert!(verdict.is_valid, "{ndc}");
        }
        for ndc in ["123-4567-89", "123456-789-01", "1234-56-78", "1234-567-890", "1234 567 89"] {
            assert!(!is_valid_ndc(ndc), "{ndc}");
            let verdict = validate(&record(&[(PatientName, "A"), (MedicationName, "B"), (NdcNumber, ndc)]));
            assert_eq!(verdict.issues, vec![Issue::InvalidNdcFormat], "{ndc}");
        }
    }

    #[test]
    fn accepts_every_date_layout() {
        for date in [
            "2025-03-15",
            "03/15/2025",
            "15/03/2025",
            "2025/03/15",
            "15-03-2025",
            "03-15-2025",
            "15.03.2025",
            "03.15.2025",
        ] {
            assert!(parse_fill_date(date).is_some(), "{date}");
        }
        assert_eq!(parse_fill_date("31/02/2025"), None);
        assert_eq!(parse_fill_date("2025-03-15T10:00"), None);
    }

    #[test]
    fn validation_is_idempotent() {
        let r = record(&[(RxNumber, "test"), (DateFilled, "16/03/2019")]);
        assert_eq!(validate(&r), validate(&r));
    }
}
