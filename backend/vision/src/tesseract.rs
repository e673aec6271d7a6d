//! Tesseract-backed [`TextRecognizer`].
//!
//! A fresh engine is created per reading; the handle is not `Sync`.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat};
use rxscan_core::{Charset, RecognitionMode, ScanError, TextRecognizer};
use tesseract::Tesseract;

const NAME: &str = "tesseract";
const DIGIT_WHITELIST: &str = "0123456789-";

#[derive(Debug, Clone)]
pub struct TesseractRecognizer {
    language: String,
    modes: Vec<RecognitionMode>,
}

impl TesseractRecognizer {
    pub fn new(language: impl Into<String>, modes: Vec<u8>) -> Self {
        Self {
            language: language.into(),
            modes: modes.into_iter().map(RecognitionMode).collect(),
        }
    }

    /// Check that the engine and language data can be loaded.
    pub fn probe(&self) -> Result<(), ScanError> {
        Tesseract::new(None, Some(&self.language))
            .map(|_| ())
            .map_err(|e| ScanError::CapabilityUnavailable(format!("{NAME}: {e}")))
    }

    fn run(&self, image: &DynamicImage, variables: &[(&str, String)]) -> Result<String, ScanError> {
        let png = encode_png(image)?;
        let mut tess = Tesseract::new(None, Some(&self.language))
            .map_err(|e| ScanError::capability(NAME, e))?;
        for (name, value) in variables {
            tess = tess
                .set_variable(name, value)
                .map_err(|e| ScanError::capability(NAME, e))?;
        }
        let mut tess = tess
            .set_image_from_mem(&png)
            .map_err(|e| ScanError::capability(NAME, e))?;
        tess.get_text().map_err(|e| ScanError::capability(NAME, e))
    }
}

impl TextRecognizer<DynamicImage> for TesseractRecognizer {
    fn name(&self) -> &str {
        NAME
    }

    fn modes(&self) -> Vec<RecognitionMode> {
        self.modes.clone()
    }

    fn recognize(
        &self,
        image: &DynamicImage,
        mode: RecognitionMode,
        charset: Charset,
    ) -> Result<String, ScanError> {
        let mut variables = vec![("tessedit_pageseg_mode", mode.0.to_string())];
        if charset == Charset::Digits {
            variables.push(("tessedit_char_whitelist", DIGIT_WHITELIST.to_string()));
        }
        self.run(image, &variables)
    }

    fn recognize_plain(&self, image: &DynamicImage) -> Result<String, ScanError> {
        self.run(image, &[])
    }
}

fn encode_png(image: &DynamicImage) -> Result<Vec<u8>, ScanError> {
    let mut png = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| ScanError::InvalidImage(e.to_string()))?;
    Ok(png)
}
