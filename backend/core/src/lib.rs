pub mod capability;
pub mod error;
pub mod record;
pub mod verdict;

pub use capability::{
    Charset, ImageOps, RecognitionMode, RegionCriteria, SymbolDecoder, TextRecognizer,
};
pub use error::ScanError;
pub use record::{CanonicalField, CanonicalRecord, Provenance, RecordBuilder};
pub use verdict::{Issue, ValidationVerdict};
