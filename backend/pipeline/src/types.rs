/// Cascade strategies, attempts, and run settings.
///
/// Strategies are tried in declaration order; the first non-empty result wins.
use std::fmt;

use rxscan_core::{Provenance, RegionCriteria};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

/// One step of the decode cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyId {
    /// Symbol decode of the unmodified image.
    Direct,
    /// Symbol decode of each enhancement variant.
    Enhanced,
    /// Symbol decode of the square code region, plain and enhanced.
    Region,
    /// Symbol decode of uniform rescales.
    Rescaled,
    /// Whole-image detector standing in for an absent symbol decoder.
    Fused,
    /// OCR of NDC and Rx number from label text.
    TextFallback,
}

impl StrategyId {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyId::Direct => "direct",
            StrategyId::Enhanced => "enhanced",
            StrategyId::Region => "region",
            StrategyId::Rescaled => "rescaled",
            StrategyId::Fused => "fused",
            StrategyId::TextFallback => "text_fallback",
        }
    }

    pub fn provenance(&self) -> Provenance {
        match self {
            StrategyId::TextFallback => Provenance::TextFallback,
            _ => Provenance::CodeScan,
        }
    }
}

impl fmt::Display for StrategyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Attempts and results
// ---------------------------------------------------------------------------

/// One decoder or extractor invocation within a strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodeAttempt {
    pub strategy: StrategyId,
    /// Index of the image variant within the strategy (0 for single-image strategies).
    pub variant: usize,
    pub result: Option<String>,
}

/// Winning payload of a cascade run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decoded {
    pub payload: String,
    pub provenance: Provenance,
    pub strategy: StrategyId,
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct CascadeSettings {
    pub rescale_factors: Vec<f32>,
    /// A rescale runs only if both new dimensions exceed this.
    pub min_rescaled_dimension: u32,
    pub region: RegionCriteria,
    /// Decode enhancement variants on the rayon pool.
    pub parallel_variants: bool,
    /// Leading OCR candidates inspected by the lenient NDC pass.
    pub lenient_candidates: usize,
}

impl Default for CascadeSettings {
    fn default() -> Self {
        Self {
            rescale_factors: vec![0.5, 1.5, 2.0],
            min_rescaled_dimension: 50,
            region: RegionCriteria::default(),
            parallel_variants: false,
            lenient_candidates: 2,
        }
    }
}

// ---------------------------------------------------------------------------
// Environment
// ---------------------------------------------------------------------------

/// Which capabilities a cascade was assembled with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Environment {
    pub symbol_decoder: Option<String>,
    pub fallback_detector: Option<String>,
    pub text_recognizer: Option<String>,
}

impl Environment {
    /// Some code-reading path exists.
    pub fn can_read_codes(&self) -> bool {
        self.symbol_decoder.is_some() || self.fallback_detector.is_some()
    }

    pub fn is_degraded(&self) -> bool {
        self.symbol_decoder.is_none() || self.text_recognizer.is_none()
    }

    /// Names of the capabilities that are absent.
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.symbol_decoder.is_none() {
            missing.push("symbol decoder");
        }
        if self.text_recognizer.is_none() {
            missing.push("text recognizer");
        }
        missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_text_fallback_is_text_provenance() {
        assert_eq!(StrategyId::TextFallback.provenance(), Provenance::TextFallback);
        assert_eq!(StrategyId::Fused.provenance(), Provenance::CodeScan);
        assert_eq!(StrategyId::Rescaled.to_string(), "rescaled");
    }

    #[test]
    fn environment_reports_missing_capabilities() {
        let env = Environment {
            symbol_decoder: None,
            fallback_detector: Some("rqrr".into()),
            text_recognizer: None,
        };
        assert!(env.can_read_codes());
        assert!(env.is_degraded());
        assert_eq!(env.missing(), vec!["symbol decoder", "text recognizer"]);
        assert!(!Environment {
            symbol_decoder: Some("zbar".into()),
            fallback_detector: None,
            text_recognizer: Some("tesseract".into()),
        }
        .is_degraded());
    }
}
