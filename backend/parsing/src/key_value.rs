//! Line-oriented `KEY: value` payloads, and the parser of last resort.

use once_cell::sync::Lazy;
use regex::Regex;
use rxscan_core::{CanonicalField, RecordBuilder};

use crate::aliases::LINE_KEYS;
use crate::classify::KEY_LINE_RE;

static NDC_SWEEP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{4,5}-\d{3,4}-\d{2}\b").unwrap());

static RX_SWEEP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bRx\s*#?\s*(\d+)\b").unwrap());

pub(crate) fn parse_lines(payload: &str, record: &mut RecordBuilder) {
    for line in payload.lines().map(str::trim) {
        if line.is_empty() || !KEY_LINE_RE.is_match(line) {
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim().to_lowercase();
        if let Some(field) = LINE_KEYS.field_for(&key) {
            // Later lines overwrite earlier ones.
            record.set(field, value.trim());
        }
    }

    sweep(payload, record);
}

/// Whole-payload regex sweeps that only fill fields still empty.
fn sweep(payload: &str, record: &mut RecordBuilder) {
    if let Some(m) = NDC_SWEEP_RE.find(payload) {
        record.fill(CanonicalField::NdcNumber, m.as_str());
    }
    if let Some(caps) = RX_SWEEP_RE.captures(payload) {
        record.fill(CanonicalField::RxNumber, &caps[1]);
    }
}
