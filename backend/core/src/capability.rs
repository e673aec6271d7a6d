//! Boundary traits for the external image capabilities.
//!
//! The pipeline never touches pixels itself. It sequences calls into these
//! traits, generic over whatever image type the host uses.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::error::ScanError;

/// Reads machine-readable code symbols.
pub trait SymbolDecoder<I>: Send + Sync {
    /// Human-readable name for logging (e.g. "rqrr").
    fn name(&self) -> &str;

    /// Decode every symbol found in the image. An empty vec means nothing was found.
    fn decode(&self, image: &I) -> Result<Vec<String>, ScanError>;
}

/// Geometric acceptance rules for a candidate code region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionCriteria {
    pub min_area: f64,
    pub aspect_ratio: RangeInclusive<f64>,
}

impl Default for RegionCriteria {
    fn default() -> Self {
        Self {
            min_area: 1000.0,
            aspect_ratio: 0.7..=1.3,
        }
    }
}

/// Pixel-level transforms supplied by the host.
pub trait ImageOps<I>: Send + Sync {
    /// Width and height in pixels.
    fn dimensions(&self, image: &I) -> (u32, u32);

    /// Enhancement variants, in order: grayscale, blur, adaptive threshold,
    /// Otsu threshold, histogram equalization, morphological close, edge map,
    /// then one gamma correction per configured gamma.
    fn enhance(&self, image: &I) -> Vec<I>;

    /// Crop the first roughly-square closed contour matching `criteria`.
    fn find_square_region(&self, image: &I, criteria: &RegionCriteria) -> Option<I>;

    /// Uniform rescale by `factor`.
    fn rescale(&self, image: &I, factor: f32) -> I;

    /// Preprocessed variants for text recognition, best first.
    fn text_variants(&self, image: &I) -> Vec<I>;
}

/// Character set a recognizer is restricted to for one reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Charset {
    /// Digits and hyphens only.
    Digits,
    /// Unrestricted.
    Full,
}

/// One recognition configuration, e.g. a Tesseract page-segmentation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecognitionMode(pub u8);

/// Optical character recognition engine.
pub trait TextRecognizer<I>: Send + Sync {
    fn name(&self) -> &str;

    /// Modes tried per image variant, in order.
    fn modes(&self) -> Vec<RecognitionMode>;

    /// Recognize text under a specific mode and charset.
    fn recognize(&self, image: &I, mode: RecognitionMode, charset: Charset)
        -> Result<String, ScanError>;

    /// Recognize with the engine's default settings.
    fn recognize_plain(&self, image: &I) -> Result<String, ScanError>;
}
