//! QR [`SymbolDecoder`] backed by `rqrr`.

use image::DynamicImage;
use rxscan_core::{ScanError, SymbolDecoder};
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct RqrrDecoder;

impl SymbolDecoder<DynamicImage> for RqrrDecoder {
    fn name(&self) -> &str {
        "rqrr"
    }

    fn decode(&self, image: &DynamicImage) -> Result<Vec<String>, ScanError> {
        let gray = image.to_luma8();
        let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
            gray.width() as usize,
            gray.height() as usize,
            |x, y| gray.get_pixel(x as u32, y as u32).0[0],
        );
        let grids = prepared.detect_grids();
        debug!(grids = grids.len(), "QR grids detected");

        let mut payloads = Vec::new();
        for grid in grids {
            match grid.decode() {
                Ok((_meta, content)) => payloads.push(content),
                Err(e) => debug!(error = %e, "QR grid failed to decode"),
            }
        }
        Ok(payloads)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    #[test]
    fn blank_image_has_no_symbols() {
        let blank = DynamicImage::ImageLuma8(GrayImage::from_pixel(64, 64, Luma([255])));
        assert!(RqrrDecoder.decode(&blank).unwrap().is_empty());
    }
}
