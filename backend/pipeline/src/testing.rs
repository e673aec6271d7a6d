//! In-memory capabilities for cascade tests. Images are just path-like tags.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rxscan_core::{
    Charset, ImageOps, RecognitionMode, RegionCriteria, ScanError, SymbolDecoder, TextRecognizer,
};

#[derive(Debug, Clone, PartialEq)]
pub struct FakeImage {
    pub tag: String,
    pub width: u32,
    pub height: u32,
}

impl FakeImage {
    pub fn new(tag: &str) -> Self {
        Self::sized(tag, 400, 400)
    }

    pub fn sized(tag: &str, width: u32, height: u32) -> Self {
        Self {
            tag: tag.to_string(),
            width,
            height,
        }
    }

    fn derive(&self, suffix: &str, width: u32, height: u32) -> Self {
        Self::sized(&format!("{}/{suffix}", self.tag), width, height)
    }
}

/// Ten enhancement variants, a square region, tagged rescales and three OCR variants.
pub struct FakeOps {
    pub region: bool,
}

impl Default for FakeOps {
    fn default() -> Self {
        Self { region: true }
    }
}

impl ImageOps<FakeImage> for FakeOps {
    fn dimensions(&self, image: &FakeImage) -> (u32, u32) {
        (image.width, image.height)
    }

    fn enhance(&self, image: &FakeImage) -> Vec<FakeImage> {
        (0..10)
            .map(|i| image.derive(&format!("enh{i}"), image.width, image.height))
            .collect()
    }

    fn find_square_region(&self, image: &FakeImage, _criteria: &RegionCriteria) -> Option<FakeImage> {
        self.region.then(|| image.derive("region", image.width / 2, image.height / 2))
    }

    fn rescale(&self, image: &FakeImage, factor: f32) -> FakeImage {
        let w = (image.width as f32 * factor) as u32;
        let h = (image.height as f32 * factor) as u32;
        image.derive(&format!("x{factor}"), w, h)
    }

    fn text_variants(&self, image: &FakeImage) -> Vec<FakeImage> {
        (0..3)
            .map(|i| image.derive(&format!("ocr{i}"), image.width, image.height))
            .collect()
    }
}

/// Decoder that answers from a fixed table, counting every call.
pub struct ScriptedDecoder {
    answers: HashMap<String, String>,
    fail_on: Option<String>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedDecoder {
    pub fn new(answers: &[(&str, &str)]) -> Self {
        Self {
            answers: answers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            fail_on: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing_on(mut self, tag: &str) -> Self {
        self.fail_on = Some(tag.to_string());
        self
    }

    pub fn calls(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

impl SymbolDecoder<FakeImage> for ScriptedDecoder {
    fn name(&self) -> &str {
        "scripted"
    }

    fn decode(&self, image: &FakeImage) -> Result<Vec<String>, ScanError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_on.as_deref() == Some(image.tag.as_str()) {
            return Err(ScanError::capability("scripted", "corrupt frame"));
        }
        Ok(self.answers.get(&image.tag).cloned().into_iter().collect())
    }
}

/// Recognizer returning the same text for every mode and charset of an image.
pub struct FakeRecognizer {
    texts: HashMap<String, String>,
    fail: bool,
    calls: Arc<AtomicUsize>,
}

impl FakeRecognizer {
    pub fn new(texts: &[(&str, &str)]) -> Self {
        Self {
            texts: texts
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            fail: false,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn calls(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }

    fn text_for(&self, image: &FakeImage) -> Result<String, ScanError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ScanError::capability("fake-ocr", "engine crashed"));
        }
        Ok(self.texts.get(&image.tag).cloned().unwrap_or_default())
    }
}

impl TextRecognizer<FakeImage> for FakeRecognizer {
    fn name(&self) -> &str {
        "fake-ocr"
    }

    fn modes(&self) -> Vec<RecognitionMode> {
        vec![RecognitionMode(6), RecognitionMode(8)]
    }

    fn recognize(
        &self,
        image: &FakeImage,
        _mode: RecognitionMode,
        _charset: Charset,
    ) -> Result<String, ScanError> {
        self.text_for(image)
    }

    fn recognize_plain(&self, image: &FakeImage) -> Result<String, ScanError> {
        self.text_for(image)
    }
}
