//! Synthetic payloads carrying fields recovered by the OCR fallback.

use rxscan_core::{CanonicalField, Provenance, RecordBuilder};
use tracing::debug;

use crate::classify::{LEGACY_NDC_PREFIX, TEXT_INFO_PREFIX};
use crate::ocr_fields::OcrFields;

pub(crate) fn parse_text_info(payload: &str, record: &mut RecordBuilder) {
    record.set_provenance(Provenance::TextFallback);
    let body = payload.strip_prefix(TEXT_INFO_PREFIX).unwrap_or(payload).trim();

    match decode_fields(body) {
        Some(fields) => apply(&fields, record),
        None => {
            debug!("TEXT_INFO body is not a field mapping");
            if let Some(ndc) = body.strip_prefix(LEGACY_NDC_PREFIX) {
                record.set(CanonicalField::NdcNumber, ndc.trim());
            }
        }
    }
}

/// Accepts the JSON mapping we emit, plus the single-quoted form older
/// producers wrote (`{'ndc': '0378-1805-01'}`).
fn decode_fields(body: &str) -> Option<OcrFields> {
    serde_json::from_str(body)
        .or_else(|_| serde_json::from_str(&single_quotes_to_json(body)))
        .ok()
}

/// Rewrite single-quoted strings as JSON strings. Double-quoted strings pass
/// through untouched, so `"O'Brien"` keeps its apostrophe.
fn single_quotes_to_json(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        match c {
            '\'' => {
                out.push('"');
                while let Some(c) = chars.next() {
                    match c {
                        '\'' => break,
                        '"' => out.push_str("\\\""),
                        '\\' => match chars.next() {
                            Some('\'') => out.push('\''),
                            Some(next) => {
                                out.push('\\');
                                out.push(next);
                            }
                            None => out.push('\\'),
                        },
                        _ => out.push(c),
                    }
                }
                out.push('"');
            }
            '"' => {
                out.push('"');
                while let Some(c) = chars.next() {
                    out.push(c);
                    match c {
                        '"' => break,
                        '\\' => {
                            if let Some(next) = chars.next() {
                                out.push(next);
                            }
                        }
                        _ => {}
                    }
                }
            }
            _ => out.push(c),
        }
    }
    out
}

fn apply(fields: &OcrFields, record: &mut RecordBuilder) {
    if let Some(ndc) = fields.ndc.as_deref().filter(|v| !v.is_empty()) {
        record.set(CanonicalField::NdcNumber, ndc);
    }
    if let Some(rx) = fields.rx_number.as_deref().filter(|v| !v.is_empty()) {
        record.set(CanonicalField::RxNumber, rx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rxscan_core::CanonicalField::*;

    fn parse(payload: &str) -> rxscan_core::CanonicalRecord {
        let mut record = RecordBuilder::new(payload);
        parse_text_info(payload, &mut record);
        record.build()
    }

    #[test]
    fn decodes_json_body() {
        let record = parse(r#"TEXT_INFO: {"ndc":"05678-1234-02","rx_number":"445566"}"#);
        assert_eq!(record.get(NdcNumber), Some("05678-1234-02"));
        assert_eq!(record.get(RxNumber), Some("445566"));
        assert_eq!(record.provenance(), Provenance::TextFallback);
    }

    #[test]
    fn decodes_single_quoted_body() {
        let record = parse("TEXT_INFO: {'ndc': '0378-1805-01'}");
        assert_eq!(record.get(NdcNumber), Some("0378-1805-01"));
        assert_eq!(record.get(RxNumber), None);
    }

    #[test]
    fn single_quoted_body_keeps_apostrophes() {
        let record = parse(r#"TEXT_INFO: {'ndc': '0378-1805-01', 'rx_number': "44'55"}"#);
        assert_eq!(record.get(NdcNumber), Some("0378-1805-01"));
        assert_eq!(record.get(RxNumber), Some("44'55"));
    }

    #[test]
    fn escaped_quotes_in_single_quoted_values() {
        assert_eq!(
            single_quotes_to_json(r#"{'a': 'it\'s', 'b': 'say "hi"'}"#),
            r#"{"a": "it's", "b": "say \"hi\""}"#
        );
    }

    #[test]
    fn legacy_body_inside_marker() {
        let record = parse("TEXT_INFO: NDC: 0378-1805-01");
        assert_eq!(record.get(NdcNumber), Some("0378-1805-01"));
    }

    #[test]
    fn garbage_body_yields_empty_text_record() {
        let record = parse("TEXT_INFO: ???");
        assert!(record.is_empty());
        assert_eq!(record.provenance(), Provenance::TextFallback);
    }
}
