//! Payload classification and parsing into [`CanonicalRecord`]s.

pub mod aliases;
pub mod classify;
mod json;
mod key_value;
mod markup;
pub mod ocr_fields;
mod text_info;

use rxscan_core::{CanonicalRecord, RecordBuilder};
use tracing::debug;

pub use aliases::{AliasTable, JSON_KEYS, LINE_KEYS, MARKUP_TAGS};
pub use classify::{classify, PayloadFormat, LEGACY_NDC_PREFIX, TEXT_INFO_PREFIX};
pub use ocr_fields::{CandidateSource, OcrFieldExtractor, OcrFields};

/// Parse a raw payload of any supported shape.
///
/// Never fails: an unusable payload yields a record whose fields are all
/// empty, carrying only `raw_payload`.
pub fn parse(payload: &str) -> CanonicalRecord {
    let format = classify(payload);
    debug!(?format, len = payload.len(), "Parsing payload");

    let mut record = RecordBuilder::new(payload);
    match format {
        PayloadFormat::TextInfo => text_info::parse_text_info(payload, &mut record),
        PayloadFormat::Markup => markup::parse_markup(payload, &mut record),
        PayloadFormat::Json => json::parse_json(payload, &mut record),
        PayloadFormat::KeyValue | PayloadFormat::Opaque => {
            key_value::parse_lines(payload, &mut record)
        }
    }
    record.build()
}
