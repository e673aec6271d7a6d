//! Log Redaction
//!
//! Masks patient-identifying values in raw label payloads (markup, JSON and
//! `KEY: value` lines) and phone numbers before they reach a log sink.

use regex::Regex;
use once_cell::sync::Lazy;

pub const REDACTED: &str = "[REDACTED]";

static MARKUP_PII_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<(patient_name|patient|birth_date|name|dob|n)\b([^>]*)>[^<]*</").unwrap()
});
static JSON_PII_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)"(patient_name|patientname|pt_name|name|patient_dob|patientdob|dob|birth_date)"(\s*:\s*)"(?:[^"\\]|\\.)*""#,
    )
    .unwrap()
});
static LINE_PII_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)^(\s*(?:patient[^:\n]*|name|pt|dob|birth[^:\n]*)\s*:)[^\n]*").unwrap()
});
static TELEPHONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\+\d{1,3}[-.\s]?)?\(\d{3}\)[-.\s]?\d{3}[-.\s]\d{4}|\b\d{3}[-.]\d{3}[-.]\d{4}\b")
        .unwrap()
});

/// Redacts patient name, date of birth and phone numbers in a payload.
pub fn redact_payload(input: &str) -> String {
    let redacted = MARKUP_PII_RE.replace_all(input, format!("<$1$2>{REDACTED}</"));
    let redacted = JSON_PII_RE.replace_all(&redacted, format!("\"$1\"$2\"{REDACTED}\""));
    let redacted = LINE_PII_RE.replace_all(&redacted, format!("$1 {REDACTED}"));
    TELEPHONE_RE
        .replace_all(&redacted, "[REDACTED_PHONE]")
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_markup_tags() {
        let raw = r#"<rx><n>John Smith</n><DOB>1980-01-01</DOB><dg>Nexium</dg><ndc>0186-5040-31</ndc></rx>"#;
        let clean = redact_payload(raw);
        assert!(!clean.contains("John Smith"));
        assert!(!clean.contains("1980-01-01"));
        assert!(clean.contains("<n>[REDACTED]</n>"));
        assert!(clean.contains("<dg>Nexium</dg>"));
        assert!(clean.contains("<ndc>0186-5040-31</ndc>"));
    }

    #[test]
    fn redacts_json_values() {
        let raw = r#"{"patient_name": "John \"Jack\" Smith", "dob":"1980-01-01", "medication_name":"Lisinopril"}"#;
        let clean = redact_payload(raw);
        assert_eq!(
            clean,
            r#"{"patient_name": "[REDACTED]", "dob":"[REDACTED]", "medication_name":"Lisinopril"}"#
        );
    }

    #[test]
    fn redacts_key_value_lines() {
        let raw = "PATIENT: Jane Doe\nDOB: 1990-07-22\nMEDICATION: Metformin 500mg";
        assert_eq!(
            redact_payload(raw),
            "PATIENT: [REDACTED]\nDOB: [REDACTED]\nMEDICATION: Metformin 500mg"
        );
    }

    #[test]
    fn redacts_phone_numbers_only() {
        let clean = redact_payload("PHARMACY: CVS (555) 123-4567\nNDC: 0378-1805-01\nRX: 5551234567");
        assert!(clean.contains("[REDACTED_PHONE]"));
        assert!(clean.contains("0378-1805-01"));
        assert!(clean.contains("RX: 5551234567"));
    }
}
