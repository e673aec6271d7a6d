//! Structured logging for rxscan.
//!
//! Handles subscriber setup with JSON file rotation, payload redaction and
//! per-request scan audit events.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{EventLogger, ScanEvent, ScanEventEntry};
pub use logger::{build_filter, init_logger, LogSettings, LOG_FILE_NAME};
pub use redact::{redact_payload, REDACTED};
