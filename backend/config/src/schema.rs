//! rxscan runtime configuration schema.
//!
//! Every section and field is optional in YAML; missing values take the
//! constants in [`crate::defaults`].

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::defaults;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScanConfig {
    /// HTTP service settings
    pub server: ServerConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Decode cascade tuning
    pub cascade: CascadeConfig,

    /// OCR fallback tuning
    pub ocr: OcrConfig,
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    /// Request body limit for image uploads.
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: defaults::DEFAULT_BIND_ADDRESS.to_string(),
            port: defaults::DEFAULT_PORT,
            max_upload_bytes: defaults::DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive; `RUST_LOG` takes precedence.
    pub level: String,
    /// Daily-rotated JSON log files go here when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
    /// JSON console output instead of human-readable lines.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::DEFAULT_LOG_LEVEL.to_string(),
            directory: None,
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Cascade
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CascadeConfig {
    pub rescale_factors: Vec<f32>,
    pub min_rescaled_dimension: u32,
    pub region: RegionConfig,
    pub gammas: Vec<f32>,
    pub parallel_variants: bool,
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self {
            rescale_factors: defaults::DEFAULT_RESCALE_FACTORS.to_vec(),
            min_rescaled_dimension: defaults::DEFAULT_MIN_RESCALED_DIMENSION,
            region: RegionConfig::default(),
            gammas: defaults::DEFAULT_GAMMAS.to_vec(),
            parallel_variants: false,
        }
    }
}

/// Acceptance rules for the square code region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegionConfig {
    pub min_area: f64,
    pub min_aspect: f64,
    pub max_aspect: f64,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            min_area: defaults::DEFAULT_REGION_MIN_AREA,
            min_aspect: defaults::DEFAULT_REGION_ASPECT.0,
            max_aspect: defaults::DEFAULT_REGION_ASPECT.1,
        }
    }
}

// ---------------------------------------------------------------------------
// OCR
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OcrConfig {
    pub max_dimension: u32,
    pub upscale_limit: u32,
    pub upscale_factor: f32,
    /// Page-segmentation modes tried per variant.
    pub modes: Vec<u8>,
    pub lenient_candidates: usize,
    pub language: String,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            max_dimension: defaults::DEFAULT_OCR_MAX_DIMENSION,
            upscale_limit: defaults::DEFAULT_OCR_UPSCALE_LIMIT,
            upscale_factor: defaults::DEFAULT_OCR_UPSCALE_FACTOR,
            modes: defaults::DEFAULT_OCR_MODES.to_vec(),
            lenient_candidates: defaults::DEFAULT_LENIENT_CANDIDATES,
            language: defaults::DEFAULT_OCR_LANGUAGE.to_string(),
        }
    }
}
