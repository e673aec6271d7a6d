//! Default values, plus normalization of values a user left blank.

use crate::schema::ScanConfig;

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;

/// 16 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

pub const DEFAULT_LOG_LEVEL: &str = "info";

pub const DEFAULT_RESCALE_FACTORS: [f32; 3] = [0.5, 1.5, 2.0];
pub const DEFAULT_MIN_RESCALED_DIMENSION: u32 = 50;
pub const DEFAULT_REGION_MIN_AREA: f64 = 1000.0;
pub const DEFAULT_REGION_ASPECT: (f64, f64) = (0.7, 1.3);
pub const DEFAULT_GAMMAS: [f32; 3] = [0.5, 1.5, 2.0];

pub const DEFAULT_OCR_MAX_DIMENSION: u32 = 2000;
pub const DEFAULT_OCR_UPSCALE_LIMIT: u32 = 2500;
pub const DEFAULT_OCR_UPSCALE_FACTOR: f32 = 1.5;
pub const DEFAULT_OCR_MODES: [u8; 2] = [6, 8];
pub const DEFAULT_LENIENT_CANDIDATES: usize = 2;
pub const DEFAULT_OCR_LANGUAGE: &str = "eng";

/// Replace blank strings with their defaults.
pub fn apply_all_defaults(config: ScanConfig) -> ScanConfig {
    let config = apply_server_defaults(config);
    let config = apply_logging_defaults(config);
    apply_ocr_defaults(config)
}

fn apply_server_defaults(mut config: ScanConfig) -> ScanConfig {
    if config.server.bind_address.trim().is_empty() {
        config.server.bind_address = DEFAULT_BIND_ADDRESS.to_string();
    }
    config
}

fn apply_logging_defaults(mut config: ScanConfig) -> ScanConfig {
    if config.logging.level.trim().is_empty() {
        config.logging.level = DEFAULT_LOG_LEVEL.to_string();
    }
    config
}

fn apply_ocr_defaults(mut config: ScanConfig) -> ScanConfig {
    if config.ocr.language.trim().is_empty() {
        config.ocr.language = DEFAULT_OCR_LANGUAGE.to_string();
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_blank_strings() {
        let mut cfg = ScanConfig::default();
        cfg.server.bind_address = " ".into();
        cfg.logging.level.clear();
        cfg.ocr.language.clear();
        let cfg = apply_all_defaults(cfg);
        assert_eq!(cfg.server.bind_address, DEFAULT_BIND_ADDRESS);
        assert_eq!(cfg.logging.level, "info");
        assert_eq!(cfg.ocr.language, "eng");
    }

    #[test]
    fn keeps_user_values() {
        let mut cfg = ScanConfig::default();
        cfg.ocr.language = "eng+fra".into();
        assert_eq!(apply_all_defaults(cfg).ocr.language, "eng+fra");
    }
}
