/// Image-to-verdict entry point used by the CLI and HTTP service.
use rxscan_core::{CanonicalRecord, ValidationVerdict};
use serde::Serialize;
use tracing::debug;

use crate::cascade::Cascade;
use crate::types::{Environment, StrategyId};

/// Everything a host needs to report one successful scan.
#[derive(Debug, Clone, Serialize)]
pub struct ScanOutcome {
    pub record: CanonicalRecord,
    pub verdict: ValidationVerdict,
    pub strategy: StrategyId,
}

pub struct Scanner<I> {
    cascade: Cascade<I>,
}

impl<I: Send + Sync> Scanner<I> {
    pub fn new(cascade: Cascade<I>) -> Self {
        Self { cascade }
    }

    /// Decode, parse and validate. `None` means nothing was detected.
    pub fn scan(&self, image: &I) -> Option<(CanonicalRecord, ValidationVerdict)> {
        self.scan_outcome(image).map(|o| (o.record, o.verdict))
    }

    pub fn scan_outcome(&self, image: &I) -> Option<ScanOutcome> {
        let decoded = self.cascade.decode(image)?;
        let record = rxscan_parsing::parse(&decoded.payload);
        if record.provenance() != decoded.provenance {
            // A code can carry a TEXT_INFO payload; the parser's tag is kept.
            debug!(
                decoded = %decoded.provenance,
                parsed = %record.provenance(),
                "Provenance set by payload marker"
            );
        }
        let verdict = rxscan_report::validate(&record);
        Some(ScanOutcome {
            record,
            verdict,
            strategy: decoded.strategy,
        })
    }

    /// Capabilities this scanner was built with.
    pub fn environment(&self) -> Environment {
        self.cascade.environment()
    }

    pub fn cascade(&self) -> &Cascade<I> {
        &self.cascade
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeImage, FakeOps, FakeRecognizer, ScriptedDecoder};
    use crate::types::CascadeSettings;
    use rxscan_core::{CanonicalField, Issue, Provenance};

    fn scanner(decoder: ScriptedDecoder, recognizer: FakeRecognizer) -> Scanner<FakeImage> {
        Scanner::new(
            Cascade::new(Box::new(FakeOps::default()), CascadeSettings::default())
                .with_decoder(Box::new(decoder))
                .with_recognizer(Box::new(recognizer)),
        )
    }

    #[test]
    fn scans_json_code() {
        let s = scanner(
            ScriptedDecoder::new(&[(
                "label",
                r#"{"patient_name":"John Smith","medication_name":"Lisinopril 10mg","ndc_number":"0378-1805-01","rx_number":"1234567"}"#,
            )]),
            FakeRecognizer::new(&[]),
        );
        let (record, verdict) = s.scan(&FakeImage::new("label")).unwrap();
        assert_eq!(record.get(CanonicalField::PatientName), Some("John Smith"));
        assert_eq!(record.provenance(), Provenance::CodeScan);
        assert!(verdict.is_valid);
    }

    #[test]
    fn ocr_fallback_yields_text_record() {
        let s = scanner(
            ScriptedDecoder::new(&[]),
            FakeRecognizer::new(&[("label/ocr0", "NDC 05678-1234-02")]),
        );
        let outcome = s.scan_outcome(&FakeImage::new("label")).unwrap();
        assert_eq!(outcome.strategy, StrategyId::TextFallback);
        assert_eq!(outcome.record.get(CanonicalField::NdcNumber), Some("05678-1234-02"));
        assert_eq!(outcome.record.get(CanonicalField::RxNumber), None);
        assert_eq!(outcome.record.provenance(), Provenance::TextFallback);
        assert_eq!(
            outcome.verdict.issues,
            vec![Issue::MissingMedicationName, Issue::MissingPatientName]
        );
    }

    #[test]
    fn decoded_ndc_line_stays_code_scan() {
        let s = scanner(
            ScriptedDecoder::new(&[("label", "NDC: 0378-1805-01")]),
            FakeRecognizer::new(&[]),
        );
        let outcome = s.scan_outcome(&FakeImage::new("label")).unwrap();
        assert_eq!(outcome.strategy, StrategyId::Direct);
        assert_eq!(outcome.record.get(CanonicalField::NdcNumber), Some("0378-1805-01"));
        assert_eq!(outcome.record.provenance(), Provenance::CodeScan);
    }

    #[test]
    fn decoded_text_info_with_garbled_body() {
        let s = scanner(
            ScriptedDecoder::new(&[("label", "TEXT_INFO: 0378 18O5 ??")]),
            FakeRecognizer::new(&[]),
        );
        let outcome = s.scan_outcome(&FakeImage::new("label")).unwrap();
        assert_eq!(outcome.strategy, StrategyId::Direct);
        assert!(outcome.record.is_empty());
        assert_eq!(outcome.record.provenance(), Provenance::TextFallback);
        assert_eq!(
            outcome.verdict.issues,
            vec![Issue::MissingMedicationName, Issue::MissingPatientName]
        );
    }

    #[test]
    fn nothing_detected_is_none() {
        let s = scanner(ScriptedDecoder::new(&[]), FakeRecognizer::new(&[]));
        assert!(s.scan(&FakeImage::new("blank")).is_none());
    }

    #[test]
    fn reports_degraded_environment() {
        let s: Scanner<FakeImage> = Scanner::new(
            Cascade::new(Box::new(FakeOps::default()), CascadeSettings::default())
                .with_recognizer(Box::new(FakeRecognizer::new(&[]))),
        );
        let env = s.environment();
        assert!(env.is_degraded());
        assert!(!env.can_read_codes());
        assert_eq!(env.text_recognizer.as_deref(), Some("fake-ocr"));
    }
}
