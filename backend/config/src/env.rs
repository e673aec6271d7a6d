//! `RXSCAN_*` environment overrides.
//!
//! Overrides are read through a lookup closure so callers (and tests) choose
//! where values come from; the binary passes `|k| std::env::var(k).ok()`.

use crate::schema::ScanConfig;
use std::path::PathBuf;
use thiserror::Error;

pub const ENV_BIND: &str = "RXSCAN_BIND";
pub const ENV_PORT: &str = "RXSCAN_PORT";
pub const ENV_LOG_LEVEL: &str = "RXSCAN_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "RXSCAN_LOG_DIR";
pub const ENV_PARALLEL_VARIANTS: &str = "RXSCAN_PARALLEL_VARIANTS";
pub const ENV_OCR_LANG: &str = "RXSCAN_OCR_LANG";

/// Every variable [`apply_env_overrides`] reads.
pub const OVERRIDE_VARS: [&str; 6] = [
    ENV_BIND,
    ENV_PORT,
    ENV_LOG_LEVEL,
    ENV_LOG_DIR,
    ENV_PARALLEL_VARIANTS,
    ENV_OCR_LANG,
];

/// An override variable is set but cannot be parsed.
#[derive(Debug, Error)]
#[error("Invalid value for {var}: '{value}' ({reason})")]
pub struct EnvOverrideError {
    pub var: &'static str,
    pub value: String,
    pub reason: String,
}

/// Apply every `RXSCAN_*` override `lookup` can resolve.
pub fn apply_env_overrides(
    mut config: ScanConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<ScanConfig, EnvOverrideError> {
    if let Some(bind) = non_empty(&lookup, ENV_BIND) {
        config.server.bind_address = bind;
    }
    if let Some(port) = non_empty(&lookup, ENV_PORT) {
        config.server.port = port.parse().map_err(|e: std::num::ParseIntError| EnvOverrideError {
            var: ENV_PORT,
            value: port.clone(),
            reason: e.to_string(),
        })?;
    }
    if let Some(level) = non_empty(&lookup, ENV_LOG_LEVEL) {
        config.logging.level = level;
    }
    if let Some(dir) = non_empty(&lookup, ENV_LOG_DIR) {
        config.logging.directory = Some(PathBuf::from(dir));
    }
    if let Some(flag) = non_empty(&lookup, ENV_PARALLEL_VARIANTS) {
        config.cascade.parallel_variants = parse_flag(&flag).ok_or_else(|| EnvOverrideError {
            var: ENV_PARALLEL_VARIANTS,
            value: flag.clone(),
            reason: "expected true/false, 1/0, yes/no or on/off".to_string(),
        })?;
    }
    if let Some(lang) = non_empty(&lookup, ENV_OCR_LANG) {
        config.ocr.language = lang;
    }
    Ok(config)
}

/// Names of the override variables currently set.
pub fn active_overrides(lookup: impl Fn(&str) -> Option<String>) -> Vec<&'static str> {
    OVERRIDE_VARS
        .into_iter()
        .filter(|var| non_empty(&lookup, var).is_some())
        .collect()
}

fn non_empty(lookup: &impl Fn(&str) -> Option<String>, var: &str) -> Option<String> {
    lookup(var)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
