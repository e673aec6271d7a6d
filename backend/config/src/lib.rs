//! `rxscan-config`: runtime configuration for the label scanner.
//!
//! Provides:
//! - Typed config schema (server, logging, cascade, OCR)
//! - YAML loading with defaults for a missing file
//! - `RXSCAN_*` environment overrides
//! - Validation with errors and warnings

pub mod defaults;
pub mod env;
pub mod io;
pub mod schema;
pub mod validation;

pub use defaults::apply_all_defaults;
pub use env::{active_overrides, apply_env_overrides, EnvOverrideError};
pub use io::{config_dir, config_file_path, load_config};
pub use schema::{CascadeConfig, LoggingConfig, OcrConfig, RegionConfig, ScanConfig, ServerConfig};
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{bail, Result};
use std::path::Path;

/// Load a config file, apply env overrides and defaults, then validate.
///
/// This is the main entry point for loading a config at runtime. Warnings
/// are logged; any validation error fails the load.
pub async fn load_and_prepare(
    path: &Path,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<ScanConfig> {
    let config = load_config(path).await?;
    let config = apply_env_overrides(config, lookup)?;
    let config = apply_all_defaults(config);

    let report = validate(&config);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for error in &report.errors {
        tracing::error!(path = %error.path, message = %error.message, "Config error");
    }
    if let Some(first) = report.errors.first() {
        bail!(
            "{} config error(s) in {}; first: {first}",
            report.errors.len(),
            path.display()
        );
    }

    Ok(config)
}
