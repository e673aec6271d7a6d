//! Grayscale filters behind the enhancement and OCR variants.
//!
//! Thresholds are built on `map`-style pixel passes so they only rely on the
//! stable parts of the `imageproc` API.

use image::{GrayImage, Luma};
use imageproc::contrast::{equalize_histogram, otsu_level};
use imageproc::distance_transform::Norm;
use imageproc::edges::canny;
use imageproc::filter::{box_filter, gaussian_blur_f32};
use imageproc::morphology::close;

/// Sigma OpenCV derives for a 5x5 Gaussian kernel.
pub const BLUR_SIGMA: f32 = 1.1;

/// Neighbourhood radius of the adaptive threshold (11x11 block).
pub const ADAPTIVE_RADIUS: u32 = 5;

/// Offset subtracted from the local mean.
pub const ADAPTIVE_OFFSET: i16 = 2;

pub fn blur(gray: &GrayImage) -> GrayImage {
    gaussian_blur_f32(gray, BLUR_SIGMA)
}

/// Binary image: 255 where the pixel is strictly above `level`.
pub fn binarize(gray: &GrayImage, level: u8) -> GrayImage {
    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let Luma([v]) = *gray.get_pixel(x, y);
        Luma([if v > level { 255 } else { 0 }])
    })
}

pub fn otsu(gray: &GrayImage) -> GrayImage {
    binarize(gray, otsu_level(gray))
}

/// Local-mean threshold: foreground where the pixel beats its neighbourhood mean minus an offset.
pub fn adaptive_threshold(gray: &GrayImage) -> GrayImage {
    let means = box_filter(gray, ADAPTIVE_RADIUS, ADAPTIVE_RADIUS);
    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let Luma([v]) = *gray.get_pixel(x, y);
        let Luma([m]) = *means.get_pixel(x, y);
        Luma([if v as i16 > m as i16 - ADAPTIVE_OFFSET { 255 } else { 0 }])
    })
}

pub fn equalize(gray: &GrayImage) -> GrayImage {
    equalize_histogram(gray)
}

/// Morphological close with a 3x3 square element.
pub fn morph_close(gray: &GrayImage) -> GrayImage {
    close(gray, Norm::LInf, 1)
}

pub fn edges(gray: &GrayImage) -> GrayImage {
    canny(gray, 50.0, 150.0)
}

/// Gamma correction through a 256-entry lookup table.
pub fn gamma(gray: &GrayImage, gamma: f32) -> GrayImage {
    let inv = 1.0 / gamma;
    let table: Vec<u8> = (0..=255u16)
        .map(|i| ((i as f32 / 255.0).powf(inv) * 255.0) as u8)
        .collect();
    let mut out = gray.clone();
    for Luma([v]) in out.pixels_mut() {
        *v = table[*v as usize];
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> GrayImage {
        GrayImage::from_fn(64, 8, |x, _| Luma([(x * 4) as u8]))
    }

    #[test]
    fn binarize_splits_at_level() {
        let out = binarize(&ramp(), 127);
        assert_eq!(out.get_pixel(31, 0).0, [0]);
        assert_eq!(out.get_pixel(32, 0).0, [255]);
    }

    #[test]
    fn otsu_output_is_binary() {
        let out = otsu(&ramp());
        assert!(out.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
    }

    #[test]
    fn adaptive_threshold_keeps_flat_regions_white() {
        let flat = GrayImage::from_pixel(20, 20, Luma([90]));
        assert!(adaptive_threshold(&flat).pixels().all(|p| p.0[0] == 255));
    }

    #[test]
    fn gamma_lut_matches_formula() {
        let img = GrayImage::from_pixel(1, 1, Luma([64]));
        let dark = gamma(&img, 0.5);
        let bright = gamma(&img, 2.0);
        assert_eq!(dark.get_pixel(0, 0).0, [16]);
        assert_eq!(bright.get_pixel(0, 0).0, [127]);
        assert_eq!(gamma(&GrayImage::from_pixel(1, 1, Luma([255])), 1.5).get_pixel(0, 0).0, [255]);
    }
}
