//! `rxscan parse`: parse and validate payload text without an image.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use rxscan_logging::{EventLogger, ScanEvent};
use serde_json::json;
use uuid::Uuid;

use crate::terminal_output::render_report;

/// Payload text from the argument, else the file, else stdin.
async fn read_payload(text: Option<String>, file: Option<PathBuf>) -> Result<String> {
    let raw = match (text, file) {
        (Some(text), _) => text,
        (None, Some(path)) => tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read payload file: {}", path.display()))?,
        (None, None) => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read payload from stdin")?;
            buf
        }
    };
    Ok(trim_line_end(&raw).to_string())
}

/// Drop the trailing newline editors and shells append.
fn trim_line_end(raw: &str) -> &str {
    raw.trim_end_matches(['\r', '\n'])
}

pub async fn run(text: Option<String>, file: Option<PathBuf>, json_output: bool) -> Result<()> {
    let payload = read_payload(text, file).await?;
    if payload.trim().is_empty() {
        bail!("No QR code data to process");
    }

    let record = rxscan_parsing::parse(&payload);
    let verdict = rxscan_report::validate(&record);

    EventLogger::log_event(
        &Uuid::new_v4().to_string(),
        ScanEvent::Parsed {
            is_valid: verdict.is_valid,
            issues: verdict.issues.iter().map(|i| i.to_string()).collect(),
            payload: payload.clone(),
        },
    );

    if json_output {
        let body = json!({
            "prescription_data": record,
            "validation": verdict,
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else {
        print!("{}", render_report(&record, &verdict));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_only_line_endings() {
        assert_eq!(trim_line_end("RX: 123\r\n"), "RX: 123");
        assert_eq!(trim_line_end("  <p></p>  \n"), "  <p></p>  ");
    }

    #[tokio::test]
    async fn argument_wins_over_file() {
        let payload = read_payload(Some("NDC: 0378-1805-01\n".into()), Some(PathBuf::from("/nonexistent")))
            .await
            .unwrap();
        assert_eq!(payload, "NDC: 0378-1805-01");
    }

    #[tokio::test]
    async fn reads_payload_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("label.txt");
        std::fs::write(&path, "PATIENT: Jane Doe\nRX: 1234567\n").unwrap();
        let payload = read_payload(None, Some(path)).await.unwrap();
        assert_eq!(payload, "PATIENT: Jane Doe\nRX: 1234567");
    }

    #[tokio::test]
    async fn empty_payload_is_error() {
        let err = run(Some("\n".into()), None, false).await.unwrap_err();
        assert_eq!(err.to_string(), "No QR code data to process");
    }
}
