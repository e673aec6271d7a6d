//! NDC / Rx-number extraction from noisy OCR readings.
//!
//! Candidates are image variants; each is read once per recognition mode,
//! as a digits-only reading (for the NDC) and a full reading (for the Rx
//! number). The first candidate that yields any field wins outright.

use once_cell::sync::Lazy;
use regex::Regex;
use rxscan_core::Charset;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::classify::TEXT_INFO_PREFIX;

/// Hyphenated NDC shapes, most specific first.
static STRICT_NDC: Lazy<[Regex; 4]> = Lazy::new(|| {
    [
        Regex::new(r"(\d{5}-\d{4}-\d{1,2})").unwrap(),
        Regex::new(r"(\d{4}-\d{4}-\d{1,2})").unwrap(),
        Regex::new(r"(\d{5}-\d{3}-\d{1,2})").unwrap(),
        Regex::new(r"(\d{4}-\d{3}-\d{1,2})").unwrap(),
    ]
});

/// Same shapes tolerating whitespace around the hyphens.
static LOOSE_NDC: Lazy<[Regex; 4]> = Lazy::new(|| {
    [
        Regex::new(r"(\d{5})\s*-\s*(\d{4})\s*-\s*(\d{2})").unwrap(),
        Regex::new(r"(\d{4})\s*-\s*(\d{4})\s*-\s*(\d{2})").unwrap(),
        Regex::new(r"(\d{5})\s*-\s*(\d{3})\s*-\s*(\d{2})").unwrap(),
        Regex::new(r"(\d{4})\s*-\s*(\d{3})\s*-\s*(\d{2})").unwrap(),
    ]
});

static RX_PATTERNS: Lazy<[Regex; 8]> = Lazy::new(|| {
    [
        // Rx #123456
        Regex::new(r"(?i)rx\s*#?\s*(\d+)").unwrap(),
        // Prescription Number: 123456
        Regex::new(r"(?i)prescription\s*(?:number|#)?\s*:?\s*(\d+)").unwrap(),
        // Script ID: 123456
        Regex::new(r"(?i)script\s*(?:id|number)\s*:?\s*(\d+)").unwrap(),
        // Rx Number: 123456
        Regex::new(r"(?i)rx\s*(?:number|no|num)\s*:?\s*(\d+)").unwrap(),
        // Prescription: 123456
        Regex::new(r"(?i)prescription\s*:?\s*(\d+)").unwrap(),
        Regex::new(r"(?i)rx\s*(\d{6,})").unwrap(),
        Regex::new(r"(?i)rx(\d{6,})").unwrap(),
        Regex::new(r"#\s*(\d{6,})").unwrap(),
    ]
});

static NUMBER_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap());

/// Fields recovered from label text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcrFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ndc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rx_number: Option<String>,
}

impl OcrFields {
    pub fn is_empty(&self) -> bool {
        self.ndc.is_none() && self.rx_number.is_none()
    }

    fn is_complete(&self) -> bool {
        self.ndc.is_some() && self.rx_number.is_some()
    }

    /// Wrap as a `TEXT_INFO:` payload for the regular parser stage.
    pub fn to_payload(&self) -> String {
        let body = serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string());
        format!("{TEXT_INFO_PREFIX}{body}")
    }
}

/// Lazily produced OCR readings. Implementations run the recognizer on demand,
/// so candidates after the winning one are never read.
pub trait CandidateSource {
    /// Number of image variants, best first.
    fn candidate_count(&self) -> usize;

    /// Number of recognition modes tried per candidate.
    fn mode_count(&self) -> usize;

    /// Reading of one candidate under one mode. `None` if recognition failed.
    fn read(&self, candidate: usize, mode: usize, charset: Charset) -> Option<String>;

    /// Reading with default recognizer settings, used by the lenient pass.
    fn read_plain(&self, candidate: usize) -> Option<String>;
}

/// Applies the NDC and Rx pattern families across OCR candidates.
#[derive(Debug, Clone)]
pub struct OcrFieldExtractor {
    /// How many leading candidates the lenient NDC pass inspects.
    pub lenient_candidates: usize,
}

impl Default for OcrFieldExtractor {
    fn default() -> Self {
        Self { lenient_candidates: 2 }
    }
}

impl OcrFieldExtractor {
    pub fn new(lenient_candidates: usize) -> Self {
        Self { lenient_candidates }
    }

    pub fn extract(&self, source: &dyn CandidateSource) -> Option<OcrFields> {
        for candidate in 0..source.candidate_count() {
            if let Some(found) = self.extract_candidate(source, candidate) {
                debug!(candidate, ?found, "OCR candidate produced fields");
                return Some(found);
            }
        }

        let guess = self.lenient_ndc(source)?;
        debug!(ndc = %guess, "Lenient NDC guess");
        Some(OcrFields {
            ndc: Some(guess),
            rx_number: None,
        })
    }

    fn extract_candidate(&self, source: &dyn CandidateSource, candidate: usize) -> Option<OcrFields> {
        let mut found = OcrFields::default();

        for mode in 0..source.mode_count() {
            // A failed recognition abandons this candidate.
            let digits = source.read(candidate, mode, Charset::Digits)?;
            let full = source.read(candidate, mode, Charset::Full)?;
            trace!(candidate, mode, digits = %digits, "OCR reading");

            if found.ndc.is_none() {
                found.ndc = match_ndc(&digits);
            }
            if found.rx_number.is_none() {
                found.rx_number = match_rx(&full);
            }
            if found.is_complete() {
                break;
            }
        }

        (!found.is_empty()).then_some(found)
    }

    fn lenient_ndc(&self, source: &dyn CandidateSource) -> Option<String> {
        let limit = self.lenient_candidates.min(source.candidate_count());
        (0..limit).find_map(|candidate| {
            let text = source.read_plain(candidate)?;
            guess_ndc_from_tokens(&text)
        })
    }
}

/// Strict hyphenated patterns, then the whitespace-tolerant ones.
pub fn match_ndc(text: &str) -> Option<String> {
    if let Some(m) = STRICT_NDC.iter().find_map(|re| re.captures(text)) {
        return Some(m[1].to_string());
    }
    LOOSE_NDC
        .iter()
        .find_map(|re| re.captures(text))
        .map(|caps| format!("{}-{}-{}", &caps[1], &caps[2], &caps[3]))
}

pub fn match_rx(text: &str) -> Option<String> {
    RX_PATTERNS
        .iter()
        .find_map(|re| re.captures(text))
        .map(|caps| caps[1].to_string())
}

/// Three consecutive number tokens of lengths (4|5, 3|4, 2) form an NDC guess.
pub fn guess_ndc_from_tokens(text: &str) -> Option<String> {
    let tokens: Vec<&str> = NUMBER_TOKEN.find_iter(text).map(|m| m.as_str()).collect();
    tokens.windows(3).find_map(|w| {
        let shaped = matches!(w[0].len(), 4 | 5) && matches!(w[1].len(), 3 | 4) && w[2].len() == 2;
        shaped.then(|| format!("{}-{}-{}", w[0], w[1], w[2]))
    })
}
