/// Decode cascade.
///
/// Strategies run in the order returned by [`Cascade::plan`]. The first one to
/// produce a non-empty payload ends the run; later strategies are never invoked.
/// Strategies whose capability is missing are left out of the plan entirely.
use std::sync::Mutex;

use rayon::prelude::*;
use rxscan_core::{ImageOps, SymbolDecoder, TextRecognizer};
use rxscan_parsing::OcrFieldExtractor;
use tracing::{debug, info, warn};

use crate::text_fallback::RecognizerCandidates;
use crate::types::{CascadeSettings, DecodeAttempt, Decoded, Environment, StrategyId};

type Attempts = Mutex<Vec<DecodeAttempt>>;

/// Ordered set of decode strategies over host-supplied capabilities.
pub struct Cascade<I> {
    decoder: Option<Box<dyn SymbolDecoder<I>>>,
    fallback_detector: Option<Box<dyn SymbolDecoder<I>>>,
    recognizer: Option<Box<dyn TextRecognizer<I>>>,
    ops: Box<dyn ImageOps<I>>,
    settings: CascadeSettings,
}

impl<I: Send + Sync> Cascade<I> {
    pub fn new(ops: Box<dyn ImageOps<I>>, settings: CascadeSettings) -> Self {
        Self {
            decoder: None,
            fallback_detector: None,
            recognizer: None,
            ops,
            settings,
        }
    }

    pub fn with_decoder(mut self, decoder: Box<dyn SymbolDecoder<I>>) -> Self {
        self.decoder = Some(decoder);
        self
    }

    /// Whole-image detector used only when no symbol decoder is installed.
    pub fn with_fallback_detector(mut self, detector: Box<dyn SymbolDecoder<I>>) -> Self {
        self.fallback_detector = Some(detector);
        self
    }

    pub fn with_recognizer(mut self, recognizer: Box<dyn TextRecognizer<I>>) -> Self {
        self.recognizer = Some(recognizer);
        self
    }

    pub fn settings(&self) -> &CascadeSettings {
        &self.settings
    }

    pub fn environment(&self) -> Environment {
        Environment {
            symbol_decoder: self.decoder.as_ref().map(|d| d.name().to_string()),
            fallback_detector: self.fallback_detector.as_ref().map(|d| d.name().to_string()),
            text_recognizer: self.recognizer.as_ref().map(|r| r.name().to_string()),
        }
    }

    /// Strategies this cascade will try, in order.
    pub fn plan(&self) -> Vec<StrategyId> {
        let mut plan = if self.decoder.is_some() {
            vec![
                StrategyId::Direct,
                StrategyId::Enhanced,
                StrategyId::Region,
                StrategyId::Rescaled,
            ]
        } else if self.fallback_detector.is_some() {
            vec![StrategyId::Fused]
        } else {
            Vec::new()
        };
        if self.recognizer.is_some() {
            plan.push(StrategyId::TextFallback);
        }
        plan
    }

    pub fn decode(&self, image: &I) -> Option<Decoded> {
        self.run(image, &Mutex::default())
    }

    /// Like [`Cascade::decode`], also returning every attempt made.
    pub fn decode_traced(&self, image: &I) -> (Option<Decoded>, Vec<DecodeAttempt>) {
        let attempts = Attempts::default();
        let decoded = self.run(image, &attempts);
        let mut attempts = attempts.into_inner().unwrap_or_else(|e| e.into_inner());
        // Parallel variants may finish out of order.
        attempts.sort_by_key(|a| (a.strategy, a.variant));
        (decoded, attempts)
    }

    fn run(&self, image: &I, attempts: &Attempts) -> Option<Decoded> {
        let plan = self.plan();
        if plan.is_empty() {
            warn!("No decode capability available; nothing to try");
            return None;
        }

        let decoded = plan.into_iter().find_map(|strategy| {
            debug!(%strategy, "Trying strategy");
            let payload = self.run_strategy(strategy, image, attempts)?;
            Some(Decoded {
                payload,
                provenance: strategy.provenance(),
                strategy,
            })
        });

        match &decoded {
            Some(d) => info!(strategy = %d.strategy, len = d.payload.len(), "Decoded payload"),
            None => debug!("Cascade exhausted"),
        }
        decoded
    }

    fn run_strategy(&self, strategy: StrategyId, image: &I, attempts: &Attempts) -> Option<String> {
        match strategy {
            StrategyId::Direct => {
                let decoder = self.decoder.as_deref()?;
                attempt(decoder, strategy, 0, image, attempts)
            }
            StrategyId::Enhanced => {
                let decoder = self.decoder.as_deref()?;
                let variants = self.ops.enhance(image);
                self.first_variant(decoder, strategy, 0, &variants, attempts)
            }
            StrategyId::Region => {
                let decoder = self.decoder.as_deref()?;
                let Some(region) = self.ops.find_square_region(image, &self.settings.region) else {
                    debug!("No square region found");
                    return None;
                };
                attempt(decoder, strategy, 0, &region, attempts).or_else(|| {
                    let variants = self.ops.enhance(&region);
                    self.first_variant(decoder, strategy, 1, &variants, attempts)
                })
            }
            StrategyId::Rescaled => {
                let decoder = self.decoder.as_deref()?;
                let (width, height) = self.ops.dimensions(image);
                let min = self.settings.min_rescaled_dimension;
                self.settings
                    .rescale_factors
                    .iter()
                    .enumerate()
                    .filter(|(_, factor)| {
                        let w = (width as f32 * **factor) as u32;
                        let h = (height as f32 * **factor) as u32;
                        let keep = w > min && h > min;
                        if !keep {
                            debug!(factor = **factor, w, h, "Skipping undersized rescale");
                        }
                        keep
                    })
                    .find_map(|(idx, factor)| {
                        let scaled = self.ops.rescale(image, *factor);
                        attempt(decoder, strategy, idx, &scaled, attempts)
                    })
            }
            StrategyId::Fused => {
                let detector = self.fallback_detector.as_deref()?;
                attempt(detector, strategy, 0, image, attempts)
            }
            StrategyId::TextFallback => self.text_fallback(image, attempts),
        }
    }

    /// First variant that decodes, honouring variant order in both modes.
    fn first_variant(
        &self,
        decoder: &dyn SymbolDecoder<I>,
        strategy: StrategyId,
        offset: usize,
        variants: &[I],
        attempts: &Attempts,
    ) -> Option<String> {
        if self.settings.parallel_variants {
            variants
                .par_iter()
                .enumerate()
                .find_map_first(|(idx, v)| attempt(decoder, strategy, offset + idx, v, attempts))
        } else {
            variants
                .iter()
                .enumerate()
                .find_map(|(idx, v)| attempt(decoder, strategy, offset + idx, v, attempts))
        }
    }

    fn text_fallback(&self, image: &I, attempts: &Attempts) -> Option<String> {
        let recognizer = self.recognizer.as_deref()?;
        let candidates = RecognizerCandidates::new(recognizer, self.ops.text_variants(image));
        debug!(
            candidates = candidates.len(),
            recognizer = recognizer.name(),
            "Running OCR fallback"
        );

        let extractor = OcrFieldExtractor::new(self.settings.lenient_candidates);
        let payload = extractor
            .extract(&candidates)
            .filter(|fields| !fields.is_empty())
            .map(|fields| fields.to_payload());
        record(attempts, StrategyId::TextFallback, 0, payload.clone());
        payload
    }
}

/// One decoder call. Errors count as "nothing found" for this input.
fn attempt<I>(
    decoder: &dyn SymbolDecoder<I>,
    strategy: StrategyId,
    variant: usize,
    image: &I,
    attempts: &Attempts,
) -> Option<String> {
    let result = match decoder.decode(image) {
        Ok(symbols) => symbols.into_iter().find(|s| !s.is_empty()),
        Err(e) => {
            warn!(decoder = decoder.name(), %strategy, variant, error = %e, "Decoder failed");
            None
        }
    };
    record(attempts, strategy, variant, result.clone());
    result
}

fn record(attempts: &Attempts, strategy: StrategyId, variant: usize, result: Option<String>) {
    let mut guard = attempts.lock().unwrap_or_else(|e| e.into_inner());
    guard.push(DecodeAttempt {
        strategy,
        variant,
        result,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeImage, FakeOps, FakeRecognizer, ScriptedDecoder};
    use rxscan_core::Provenance;

    fn cascade(decoder: ScriptedDecoder) -> Cascade<FakeImage> {
        Cascade::new(Box::new(FakeOps::default()), CascadeSettings::default())
            .with_decoder(Box::new(decoder))
    }

    #[test]
    fn plan_lists_code_strategies_before_ocr() {
        let c = cascade(ScriptedDecoder::new(&[]))
            .with_recognizer(Box::new(FakeRecognizer::new(&[])));
        assert_eq!(
            c.plan(),
            vec![
                StrategyId::Direct,
                StrategyId::Enhanced,
                StrategyId::Region,
                StrategyId::Rescaled,
                StrategyId::TextFallback,
            ]
        );
    }

    #[test]
    fn plan_without_decoder_uses_fused_detector() {
        let c = Cascade::new(Box::new(FakeOps::default()), CascadeSettings::default())
            .with_fallback_detector(Box::new(ScriptedDecoder::new(&[])));
        assert_eq!(c.plan(), vec![StrategyId::Fused]);
        assert_eq!(c.environment().missing(), vec!["symbol decoder", "text recognizer"]);
    }

    #[test]
    fn plan_is_empty_without_any_capability() {
        let c: Cascade<FakeImage> =
            Cascade::new(Box::new(FakeOps::default()), CascadeSettings::default());
        assert!(c.plan().is_empty());
        assert_eq!(c.decode(&FakeImage::new("label")), None);
    }

    #[test]
    fn direct_hit_stops_the_cascade() {
        let decoder = ScriptedDecoder::new(&[("label", "PATIENT: Jane")]);
        let calls = decoder.calls();
        let recognizer = FakeRecognizer::new(&[]);
        let ocr_calls = recognizer.calls();
        let c = cascade(decoder).with_recognizer(Box::new(recognizer));

        let decoded = c.decode(&FakeImage::new("label")).unwrap();
        assert_eq!(decoded.payload, "PATIENT: Jane");
        assert_eq!(decoded.strategy, StrategyId::Direct);
        assert_eq!(decoded.provenance, Provenance::CodeScan);
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
        assert_eq!(ocr_calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[test]
    fn enhanced_variant_wins_in_variant_order() {
        let decoder = ScriptedDecoder::new(&[("label/enh3", "third"), ("label/enh5", "fifth")]);
        let (decoded, attempts) = cascade(decoder).decode_traced(&FakeImage::new("label"));
        let decoded = decoded.unwrap();
        assert_eq!(decoded.payload, "third");
        assert_eq!(decoded.strategy, StrategyId::Enhanced);
        // direct + enh0..=enh3
        assert_eq!(attempts.len(), 5);
        assert!(attempts.iter().all(|a| a.strategy <= StrategyId::Enhanced));
    }

    #[test]
    fn parallel_variants_keep_priority() {
        let decoder = ScriptedDecoder::new(&[
            ("label/enh2", "second"),
            ("label/enh7", "seventh"),
            ("label/enh9", "ninth"),
        ]);
        let settings = CascadeSettings {
            parallel_variants: true,
            ..CascadeSettings::default()
        };
        let c = Cascade::new(Box::new(FakeOps::default()), settings).with_decoder(Box::new(decoder));
        for _ in 0..20 {
            assert_eq!(c.decode(&FakeImage::new("label")).unwrap().payload, "second");
        }
    }

    #[test]
    fn region_is_decoded_plain_then_enhanced() {
        let decoder = ScriptedDecoder::new(&[("label/region/enh1", "from region")]);
        let (decoded, attempts) = cascade(decoder).decode_traced(&FakeImage::new("label"));
        assert_eq!(decoded.unwrap().strategy, StrategyId::Region);
        let region: Vec<_> = attempts
            .iter()
            .filter(|a| a.strategy == StrategyId::Region)
            .map(|a| a.variant)
            .collect();
        assert_eq!(region, vec![0, 1, 2]);
    }

    #[test]
    fn undersized_rescales_are_skipped() {
        let decoder = ScriptedDecoder::new(&[("small/x2", "scaled")]);
        let ops = FakeOps {
            region: false,
            ..FakeOps::default()
        };
        let c = Cascade::new(Box::new(ops), CascadeSettings::default()).with_decoder(Box::new(decoder));
        let (decoded, attempts) = c.decode_traced(&FakeImage::sized("small", 80, 80));
        assert_eq!(decoded.unwrap().payload, "scaled");
        let rescaled: Vec<_> = attempts
            .iter()
            .filter(|a| a.strategy == StrategyId::Rescaled)
            .map(|a| a.variant)
            .collect();
        // 0.5x would be 40x40
        assert_eq!(rescaled, vec![1, 2]);
    }

    #[test]
    fn decoder_errors_do_not_abort() {
        let decoder = ScriptedDecoder::new(&[("label/enh0", "ok")]).failing_on("label");
        let decoded = cascade(decoder).decode(&FakeImage::new("label")).unwrap();
        assert_eq!(decoded.payload, "ok");
    }

    #[test]
    fn ocr_runs_last_and_wraps_fields() {
        let decoder = ScriptedDecoder::new(&[]);
        let recognizer = FakeRecognizer::new(&[("label/ocr0", "NDC 05678-1234-02")]);
        let c = cascade(decoder).with_recognizer(Box::new(recognizer));
        let (decoded, attempts) = c.decode_traced(&FakeImage::new("label"));
        let decoded = decoded.unwrap();
        assert_eq!(decoded.strategy, StrategyId::TextFallback);
        assert_eq!(decoded.provenance, Provenance::TextFallback);
        assert_eq!(decoded.payload, r#"TEXT_INFO: {"ndc":"05678-1234-02"}"#);
        assert_eq!(attempts.last().unwrap().strategy, StrategyId::TextFallback);
    }

    #[test]
    fn exhaustion_is_none() {
        let c = cascade(ScriptedDecoder::new(&[]))
            .with_recognizer(Box::new(FakeRecognizer::new(&[])));
        let (decoded, attempts) = c.decode_traced(&FakeImage::new("label"));
        assert_eq!(decoded, None);
        assert!(attempts.iter().all(|a| a.result.is_none()));
    }
}
