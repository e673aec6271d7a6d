/// OCR readings over preprocessed image variants, produced on demand.
use rxscan_core::{Charset, RecognitionMode, TextRecognizer};
use rxscan_parsing::CandidateSource;
use tracing::warn;

pub(crate) struct RecognizerCandidates<'a, I> {
    recognizer: &'a dyn TextRecognizer<I>,
    variants: Vec<I>,
    modes: Vec<RecognitionMode>,
}

impl<'a, I> RecognizerCandidates<'a, I> {
    pub(crate) fn new(recognizer: &'a dyn TextRecognizer<I>, variants: Vec<I>) -> Self {
        Self {
            modes: recognizer.modes(),
            recognizer,
            variants,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.variants.len()
    }
}

impl<I> CandidateSource for RecognizerCandidates<'_, I> {
    fn candidate_count(&self) -> usize {
        self.variants.len()
    }

    fn mode_count(&self) -> usize {
        self.modes.len()
    }

    fn read(&self, candidate: usize, mode: usize, charset: Charset) -> Option<String> {
        let image = self.variants.get(candidate)?;
        let mode = *self.modes.get(mode)?;
        self.recognizer
            .recognize(image, mode, charset)
            .map_err(|e| warn!(candidate, mode = mode.0, ?charset, error = %e, "OCR reading failed"))
            .ok()
    }

    fn read_plain(&self, candidate: usize) -> Option<String> {
        let image = self.variants.get(candidate)?;
        self.recognizer
            .recognize_plain(image)
            .map_err(|e| warn!(candidate, error = %e, "Plain OCR reading failed"))
            .ok()
    }
}
