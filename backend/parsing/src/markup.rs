//! Markup payloads such as `<p><n>Paul Smith</n><dg>Nexium</dg></p>`.
//!
//! A strict parse is attempted first. Real labels are often not well-formed,
//! so on failure each alias tag is looked up independently with a regex.

use once_cell::sync::Lazy;
use regex::Regex;
use rxscan_core::{CanonicalField, RecordBuilder};
use tracing::debug;

use crate::aliases::MARKUP_TAGS;

/// One compiled `<tag ...>text</tag>` pattern per alias, grouped by field.
static TAG_PATTERNS: Lazy<Vec<(CanonicalField, Vec<Regex>)>> = Lazy::new(|| {
    MARKUP_TAGS
        .entries()
        .map(|(field, tags)| {
            let patterns = tags
                .iter()
                .map(|tag| {
                    let tag = regex::escape(tag);
                    Regex::new(&format!(r"(?i)<{tag}(?:\s[^>]*)?>([^<]+)</{tag}\s*>")).unwrap()
                })
                .collect();
            (field, patterns)
        })
        .collect()
});

pub(crate) fn parse_markup(payload: &str, record: &mut RecordBuilder) {
    let trimmed = payload.trim();
    match roxmltree::Document::parse(trimmed) {
        Ok(doc) => extract_from_tree(&doc, record),
        Err(e) => {
            debug!(error = %e, "Malformed markup; falling back to tag patterns");
            extract_with_patterns(trimmed, record);
        }
    }
}

fn extract_from_tree(doc: &roxmltree::Document<'_>, record: &mut RecordBuilder) {
    let root = doc.root_element();
    for (field, tags) in MARKUP_TAGS.entries() {
        let value = tags.iter().find_map(|tag| {
            let element = root
                .children()
                .find(|n| n.is_element() && n.tag_name().name() == *tag)?;
            element.text().map(str::trim).filter(|t| !t.is_empty())
        });
        if let Some(value) = value {
            record.set(field, value);
        }
    }
}

fn extract_with_patterns(payload: &str, record: &mut RecordBuilder) {
    for (field, patterns) in TAG_PATTERNS.iter() {
        let value = patterns.iter().find_map(|re| {
            re.captures(payload)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().trim())
                .filter(|t| !t.is_empty())
        });
        if let Some(value) = value {
            record.set(*field, value);
        }
    }
}
