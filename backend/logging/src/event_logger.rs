//! Scan Audit Events
//!
//! One structured record per scan or parse request, emitted on the
//! `scan_events` target. Payload text is always redacted first.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::redact::redact_payload;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScanEvent {
    /// A payload was recovered and validated.
    Decoded {
        strategy: String,
        provenance: String,
        is_valid: bool,
        issues: Vec<String>,
        payload: String,
    },
    /// Every strategy ran and nothing was recovered.
    NothingDetected { degraded: bool },
    /// Payload text submitted directly, without an image.
    Parsed {
        is_valid: bool,
        issues: Vec<String>,
        payload: String,
    },
    Rejected { reason: String },
}

#[derive(Debug, Serialize)]
pub struct ScanEventEntry {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
    pub event: ScanEvent,
}

impl ScanEventEntry {
    pub fn new(request_id: &str, mut event: ScanEvent) -> Self {
        match &mut event {
            ScanEvent::Decoded { payload, .. } | ScanEvent::Parsed { payload, .. } => {
                *payload = redact_payload(payload);
            }
            ScanEvent::NothingDetected { .. } | ScanEvent::Rejected { .. } => {}
        }
        Self {
            request_id: request_id.into(),
            timestamp: Utc::now(),
            event,
        }
    }
}

pub struct EventLogger;

impl EventLogger {
    pub fn log_event(request_id: &str, event: ScanEvent) {
        let entry = ScanEventEntry::new(request_id, event);
        match serde_json::to_string(&entry) {
            Ok(json) => info!(target: "scan_events", event = %json, "Scan event"),
            Err(_) => info!(target: "scan_events", event = ?entry, "Scan event"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_is_redacted_in_entry() {
        let entry = ScanEventEntry::new(
            "req-1",
            ScanEvent::Parsed {
                is_valid: false,
                issues: vec!["Missing medication name".into()],
                payload: "PATIENT: Jane Doe\nNDC: 0378-1805-01".into(),
            },
        );
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["request_id"], "req-1");
        assert_eq!(json["event"]["type"], "parsed");
        assert_eq!(json["event"]["payload"], "PATIENT: [REDACTED]\nNDC: 0378-1805-01");
    }

    #[test]
    fn nothing_detected_serializes_flag() {
        let entry = ScanEventEntry::new("req-2", ScanEvent::NothingDetected { degraded: true });
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["event"]["type"], "nothing_detected");
        assert_eq!(json["event"]["degraded"], true);
        EventLogger::log_event("req-2", ScanEvent::Rejected { reason: "bad image".into() });
    }
}
