//! Payload shape detection.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Prefix of the synthetic payload produced by the OCR fallback.
pub const TEXT_INFO_PREFIX: &str = "TEXT_INFO: ";

/// Older single-field body of a `TEXT_INFO` payload.
pub const LEGACY_NDC_PREFIX: &str = "NDC: ";

/// A line that opens with an upper-case key, e.g. `PATIENT: Jane Doe`.
pub(crate) static KEY_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{2,}:").unwrap());

/// The closed set of payload shapes the parsers understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadFormat {
    /// `TEXT_INFO: {...}` mapping from the OCR extractor.
    TextInfo,
    /// `<...>` structured markup.
    Markup,
    /// `{...}` JSON object.
    Json,
    /// At least one `KEY: value` line.
    KeyValue,
    /// Nothing recognizable; only the regex sweeps apply.
    Opaque,
}

/// Classify a raw payload. The `TEXT_INFO` marker is checked before the shape rules.
pub fn classify(payload: &str) -> PayloadFormat {
    if payload.starts_with(TEXT_INFO_PREFIX) {
        return PayloadFormat::TextInfo;
    }

    let trimmed = payload.trim();
    if trimmed.starts_with('<') && trimmed.ends_with('>') {
        return PayloadFormat::Markup;
    }
    if trimmed.starts_with('{') && trimmed.ends_with('}') {
        return PayloadFormat::Json;
    }
    if trimmed.lines().any(|line| KEY_LINE_RE.is_match(line.trim())) {
        return PayloadFormat::KeyValue;
    }
    PayloadFormat::Opaque
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_each_shape() {
        assert_eq!(classify("<p><n>Paul</n></p>"), PayloadFormat::Markup);
        assert_eq!(classify("  {\"ndc\": \"1\"}\n"), PayloadFormat::Json);
        assert_eq!(classify("PATIENT: Jane\nRX: 1"), PayloadFormat::KeyValue);
        assert_eq!(classify("just some words"), PayloadFormat::Opaque);
        assert_eq!(classify(""), PayloadFormat::Opaque);
    }

    #[test]
    fn text_info_marker_takes_priority() {
        assert_eq!(classify("TEXT_INFO: {\"ndc\": \"1\"}"), PayloadFormat::TextInfo);
        assert_eq!(classify("TEXT_INFO: NDC: 0378-1805-01"), PayloadFormat::TextInfo);
    }

    #[test]
    fn bare_ndc_line_is_key_value() {
        assert_eq!(classify("NDC: 0378-1805-01"), PayloadFormat::KeyValue);
    }

    #[test]
    fn multi_line_ndc_payload_is_key_value() {
        assert_eq!(
            classify("NDC: 0093-1095-01\nPATIENT: Jane Doe"),
            PayloadFormat::KeyValue
        );
    }

    #[test]
    fn lowercase_keys_are_not_key_lines() {
        assert_eq!(classify("note: take with food"), PayloadFormat::Opaque);
    }
}
