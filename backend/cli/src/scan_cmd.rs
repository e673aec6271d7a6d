//! `rxscan scan`: run the decode cascade over one image file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rxscan_config::ScanConfig;
use rxscan_logging::{EventLogger, ScanEvent};
use rxscan_pipeline::{Environment, ScanOutcome, StrategyId};
use serde_json::json;
use uuid::Uuid;

use crate::config::build_scanner;
use crate::terminal_output::{note_error, note_info, note_success, note_warn, render_report, NOT_DETECTED_TIPS};

struct ScanRun {
    dimensions: (u32, u32),
    outcome: Option<ScanOutcome>,
    environment: Environment,
}

/// Returns whether anything was detected.
pub async fn run(config: &ScanConfig, image: &Path, json_output: bool) -> Result<bool> {
    let scanner = build_scanner(config);
    let path: PathBuf = image.to_path_buf();

    let run = tokio::task::spawn_blocking(move || -> Result<ScanRun> {
        let img = rxscan_vision::load_image(&path)?;
        Ok(ScanRun {
            dimensions: (img.width(), img.height()),
            outcome: scanner.scan_outcome(&img),
            environment: scanner.environment(),
        })
    })
    .await
    .context("scan task panicked")??;

    let request_id = Uuid::new_v4().to_string();
    log_outcome(&request_id, &run);

    if json_output {
        print_json(&run)?;
    } else {
        print_human(image, &run);
    }
    Ok(run.outcome.is_some())
}

fn log_outcome(request_id: &str, run: &ScanRun) {
    let event = match &run.outcome {
        Some(outcome) => ScanEvent::Decoded {
            strategy: outcome.strategy.to_string(),
            provenance: outcome.record.provenance().to_string(),
            is_valid: outcome.verdict.is_valid,
            issues: outcome.verdict.issues.iter().map(|i| i.to_string()).collect(),
            payload: outcome.record.raw_payload().to_string(),
        },
        None => ScanEvent::NothingDetected {
            degraded: !run.environment.can_read_codes(),
        },
    };
    EventLogger::log_event(request_id, event);
}

fn print_json(run: &ScanRun) -> Result<()> {
    let body = match &run.outcome {
        Some(outcome) => json!({
            "qr_detected": true,
            "strategy": outcome.strategy,
            "prescription_data": outcome.record,
            "validation": outcome.verdict,
        }),
        None => json!({
            "qr_detected": false,
            "degraded": !run.environment.can_read_codes(),
            "missing_capabilities": run.environment.missing(),
        }),
    };
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}

fn print_human(image: &Path, run: &ScanRun) {
    let (width, height) = run.dimensions;
    note_info(&format!("Analyzing image: {}", image.display()));
    note_info(&format!("Image dimensions: {width}x{height} pixels"));

    let Some(outcome) = &run.outcome else {
        if run.environment.can_read_codes() {
            note_error("No QR code found in image after trying all detection methods");
            println!("Tips:");
            for tip in NOT_DETECTED_TIPS {
                println!("- {tip}");
            }
        } else {
            note_warn(&format!(
                "Environment degraded: missing {}",
                run.environment.missing().join(", ")
            ));
        }
        note_error("No QR code detected or read");
        return;
    };

    if outcome.strategy == StrategyId::TextFallback {
        note_success("Label text recovered by OCR");
    } else {
        note_success("QR code successfully detected and decoded");
    }
    print!("{}", render_report(&outcome.record, &outcome.verdict));
}
