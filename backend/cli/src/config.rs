//! Turns a loaded [`ScanConfig`] into the runtime pieces: log settings,
//! cascade settings and a ready [`Scanner`].

use std::path::Path;

use anyhow::Result;
use image::DynamicImage;
use rxscan_config::ScanConfig;
use rxscan_core::RegionCriteria;
use rxscan_logging::LogSettings;
use rxscan_pipeline::{Cascade, CascadeSettings, Scanner};
use rxscan_vision::{OcrPreprocess, StandardImageOps};
use tracing::info;

/// Load the config at `path`, or the default location, with `RXSCAN_*` overrides.
pub async fn load(path: Option<&Path>) -> Result<ScanConfig> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => rxscan_config::config_file_path(&rxscan_config::config_dir()),
    };
    rxscan_config::load_and_prepare(&path, |key| std::env::var(key).ok()).await
}

pub fn log_settings(config: &ScanConfig) -> LogSettings {
    LogSettings {
        level: config.logging.level.clone(),
        directory: config.logging.directory.clone(),
        json: config.logging.json,
    }
}

pub fn cascade_settings(config: &ScanConfig) -> CascadeSettings {
    let cascade = &config.cascade;
    CascadeSettings {
        rescale_factors: cascade.rescale_factors.clone(),
        min_rescaled_dimension: cascade.min_rescaled_dimension,
        region: RegionCriteria {
            min_area: cascade.region.min_area,
            aspect_ratio: cascade.region.min_aspect..=cascade.region.max_aspect,
        },
        parallel_variants: cascade.parallel_variants,
        lenient_candidates: config.ocr.lenient_candidates,
    }
}

pub fn image_ops(config: &ScanConfig) -> StandardImageOps {
    StandardImageOps::new(
        config.cascade.gammas.clone(),
        OcrPreprocess {
            max_dimension: config.ocr.max_dimension,
            upscale_limit: config.ocr.upscale_limit,
            upscale_factor: config.ocr.upscale_factor,
        },
    )
}

/// Assemble a scanner from whichever capability backends were compiled in.
pub fn build_scanner(config: &ScanConfig) -> Scanner<DynamicImage> {
    #[allow(unused_mut)]
    let mut cascade = Cascade::new(Box::new(image_ops(config)), cascade_settings(config));

    #[cfg(feature = "rqrr")]
    {
        cascade = cascade.with_decoder(Box::new(rxscan_vision::RqrrDecoder));
    }

    #[cfg(feature = "tesseract")]
    {
        let recognizer =
            rxscan_vision::TesseractRecognizer::new(config.ocr.language.clone(), config.ocr.modes.clone());
        match recognizer.probe() {
            Ok(()) => cascade = cascade.with_recognizer(Box::new(recognizer)),
            Err(e) => tracing::warn!(error = %e, "OCR fallback disabled"),
        }
    }

    let scanner = Scanner::new(cascade);
    let env = scanner.environment();
    info!(
        decoder = env.symbol_decoder.as_deref().unwrap_or("none"),
        recognizer = env.text_recognizer.as_deref().unwrap_or("none"),
        "Scanner ready"
    );
    scanner
}
