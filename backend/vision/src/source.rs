//! Loading label images from files, raw bytes and data URLs.

use std::path::Path;

use image::{DynamicImage, ImageFormat};
use rxscan_core::ScanError;
use tracing::debug;

/// Formats the bundled `image` codecs read.
pub fn detect_image_format(path: &Path) -> Option<ImageFormat> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
        "png" => Some(ImageFormat::Png),
        "gif" => Some(ImageFormat::Gif),
        "webp" => Some(ImageFormat::WebP),
        "bmp" => Some(ImageFormat::Bmp),
        "tiff" | "tif" => Some(ImageFormat::Tiff),
        _ => None,
    }
}

pub fn is_supported_image(path: &Path) -> bool {
    detect_image_format(path).is_some()
}

/// Strip a `data:image/...;base64,` prefix, if any.
pub fn strip_data_url(encoded: &str) -> &str {
    let trimmed = encoded.trim();
    if trimmed.starts_with("data:image") {
        if let Some((_, body)) = trimmed.split_once(',') {
            return body;
        }
    }
    trimmed
}

/// Decode an in-memory image, sniffing the format from its magic bytes.
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage, ScanError> {
    let format = image::guess_format(bytes).map_err(|e| ScanError::InvalidImage(e.to_string()))?;
    debug!(?format, len = bytes.len(), "Decoding image");
    image::load_from_memory_with_format(bytes, format)
        .map_err(|e| ScanError::InvalidImage(e.to_string()))
}

pub fn load_image(path: &Path) -> Result<DynamicImage, ScanError> {
    if !path.exists() {
        return Err(ScanError::InvalidImage(format!(
            "file not found: {}",
            path.display()
        )));
    }
    image::open(path).map_err(|e| ScanError::InvalidImage(format!("{}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};
    use std::io::Cursor;
    use std::path::PathBuf;

    #[test]
    fn detects_jpeg() {
        assert_eq!(detect_image_format(&PathBuf::from("label.JPG")), Some(ImageFormat::Jpeg));
    }

    #[test]
    fn unknown_extension_is_unsupported() {
        assert!(!is_supported_image(&PathBuf::from("label.pdf")));
        assert!(!is_supported_image(&PathBuf::from("label")));
    }

    #[test]
    fn strips_data_url_prefix() {
        assert_eq!(strip_data_url("data:image/png;base64,iVBOR"), "iVBOR");
        assert_eq!(strip_data_url(" iVBOR "), "iVBOR");
    }

    #[test]
    fn decodes_png_bytes() {
        let mut bytes = Vec::new();
        GrayImage::from_pixel(4, 3, Luma([9]))
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        let img = decode_image(&bytes).unwrap();
        assert_eq!((img.width(), img.height()), (4, 3));
    }

    #[test]
    fn garbage_bytes_are_invalid_image() {
        assert!(matches!(decode_image(b"not an image"), Err(ScanError::InvalidImage(_))));
    }

    #[test]
    fn missing_file_is_invalid_image() {
        let err = load_image(&PathBuf::from("/nonexistent/label.png")).unwrap_err();
        assert!(err.to_string().contains("file not found"));
    }
}
