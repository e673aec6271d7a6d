//! Config validation: checks that catch settings the cascade cannot run with.

use crate::schema::ScanConfig;
use thiserror::Error;

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// A collection of validation errors found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &ScanConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_server(config, &mut report);
    validate_cascade(config, &mut report);
    validate_ocr(config, &mut report);
    report
}

fn validate_server(config: &ScanConfig, report: &mut ValidationReport) {
    let server = &config.server;
    if server.port != 0 && server.port < 1024 && server.port != 80 && server.port != 443 {
        report.warn(
            "server.port",
            format!(
                "Port {} requires elevated privileges; consider using a port >= 1024",
                server.port
            ),
        );
    }
    if server.max_upload_bytes == 0 {
        report.error("server.maxUploadBytes", "maxUploadBytes must be > 0");
    }
}

fn validate_cascade(config: &ScanConfig, report: &mut ValidationReport) {
    let cascade = &config.cascade;
    if cascade.rescale_factors.is_empty() {
        report.error("cascade.rescaleFactors", "At least one rescale factor is required");
    }
    for factor in &cascade.rescale_factors {
        if !(*factor > 0.0) || !factor.is_finite() {
            report.error(
                "cascade.rescaleFactors",
                format!("Rescale factor {factor} must be a positive number"),
            );
        }
    }
    for gamma in &cascade.gammas {
        if !(*gamma > 0.0) || !gamma.is_finite() {
            report.error(
                "cascade.gammas",
                format!("Gamma {gamma} must be a positive number"),
            );
        }
    }

    let region = &cascade.region;
    if region.min_aspect > region.max_aspect {
        report.error(
            "cascade.region",
            format!(
                "minAspect ({}) is greater than maxAspect ({})",
                region.min_aspect, region.max_aspect
            ),
        );
    }
    if region.min_area < 0.0 {
        report.error("cascade.region.minArea", "minArea cannot be negative");
    }
}

fn validate_ocr(config: &ScanConfig, report: &mut ValidationReport) {
    let ocr = &config.ocr;
    if ocr.modes.is_empty() {
        report.error("ocr.modes", "At least one page-segmentation mode is required");
    }
    if ocr.max_dimension == 0 {
        report.error("ocr.maxDimension", "maxDimension must be > 0");
    }
    if !(ocr.upscale_factor > 0.0) {
        report.error("ocr.upscaleFactor", "upscaleFactor must be > 0");
    }
    if ocr.lenient_candidates == 0 {
        report.warn(
            "ocr.lenientCandidates",
            "lenientCandidates is 0; the token fallback is disabled",
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let report = validate(&ScanConfig::default());
        assert!(report.is_valid());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn empty_factors_is_error() {
        let mut cfg = ScanConfig::default();
        cfg.cascade.rescale_factors.clear();
        let report = validate(&cfg);
        assert!(!report.is_valid());
        assert_eq!(report.errors[0].path, "cascade.rescaleFactors");
    }

    #[test]
    fn non_positive_factor_is_error() {
        let mut cfg = ScanConfig::default();
        cfg.cascade.rescale_factors = vec![1.5, 0.0, -2.0];
        assert_eq!(validate(&cfg).errors.len(), 2);
    }

    #[test]
    fn inverted_aspect_is_error() {
        let mut cfg = ScanConfig::default();
        cfg.cascade.region.min_aspect = 1.4;
        let report = validate(&cfg);
        assert!(report.errors.iter().any(|e| e.path == "cascade.region"));
    }

    #[test]
    fn empty_modes_is_error() {
        let mut cfg = ScanConfig::default();
        cfg.ocr.modes.clear();
        let report = validate(&cfg);
        assert!(report.errors.iter().any(|e| e.path == "ocr.modes"));
    }

    #[test]
    fn privileged_port_is_warning() {
        let mut cfg = ScanConfig::default();
        cfg.server.port = 81;
        let report = validate(&cfg);
        assert!(report.is_valid());
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].to_string().contains("server.port"));
    }
}
