//! Reference bindings of the image capabilities for `image::DynamicImage`.
//!
//! `StandardImageOps` is always available. The QR decoder and the OCR engine
//! sit behind the `rqrr` and `tesseract` features.

pub mod filters;
pub mod geometry;
pub mod ops;
pub mod source;

#[cfg(feature = "rqrr")]
pub mod qr;
#[cfg(feature = "tesseract")]
pub mod tesseract;

pub use ops::{OcrPreprocess, StandardImageOps};
pub use source::{decode_image, detect_image_format, is_supported_image, load_image, strip_data_url};

#[cfg(feature = "rqrr")]
pub use qr::RqrrDecoder;
#[cfg(feature = "tesseract")]
pub use tesseract::TesseractRecognizer;
