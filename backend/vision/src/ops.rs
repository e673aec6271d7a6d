//! [`ImageOps`] for `image::DynamicImage`.

use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage};
use imageproc::contours::{find_contours, BorderType};
use rxscan_core::{ImageOps, RegionCriteria};
use tracing::{debug, trace};

use crate::filters;
use crate::geometry::Polygon;

/// Size rules for the OCR preprocessing variants.
#[derive(Debug, Clone, PartialEq)]
pub struct OcrPreprocess {
    /// Images whose longest side exceeds this are downscaled first.
    pub max_dimension: u32,
    /// The upscaled variant is only produced below this width.
    pub upscale_limit: u32,
    pub upscale_factor: f32,
}

impl Default for OcrPreprocess {
    fn default() -> Self {
        Self {
            max_dimension: 2000,
            upscale_limit: 2500,
            upscale_factor: 1.5,
        }
    }
}

/// Pure-Rust implementation of the cascade's image transforms.
#[derive(Debug, Clone)]
pub struct StandardImageOps {
    pub gammas: Vec<f32>,
    pub ocr: OcrPreprocess,
}

impl Default for StandardImageOps {
    fn default() -> Self {
        Self {
            gammas: vec![0.5, 1.5, 2.0],
            ocr: OcrPreprocess::default(),
        }
    }
}

impl StandardImageOps {
    pub fn new(gammas: Vec<f32>, ocr: OcrPreprocess) -> Self {
        Self { gammas, ocr }
    }

    /// Bounds of the first external contour that looks like a code symbol.
    fn square_region_bounds(
        &self,
        gray: &GrayImage,
        criteria: &RegionCriteria,
    ) -> Option<crate::geometry::Rect> {
        let binary = filters::otsu(&filters::blur(gray));
        find_contours::<u32>(&binary)
            .iter()
            .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
            .find_map(|contour| {
                let polygon = Polygon::from_contour(contour);
                if (polygon.area() as f64) < criteria.min_area {
                    return None;
                }
                let approx = polygon.approx_poly_dp(0.02 * polygon.perimeter());
                if approx.points.len() != 4 {
                    return None;
                }
                let rect = polygon.bounding_rect()?;
                let aspect = rect.aspect_ratio();
                trace!(?rect, aspect, "Quadrilateral contour");
                criteria.aspect_ratio.contains(&aspect).then_some(rect)
            })
    }
}

impl ImageOps<DynamicImage> for StandardImageOps {
    fn dimensions(&self, image: &DynamicImage) -> (u32, u32) {
        (image.width(), image.height())
    }

    fn enhance(&self, image: &DynamicImage) -> Vec<DynamicImage> {
        let gray = image.to_luma8();
        let mut variants = vec![
            filters::blur(&gray),
            filters::adaptive_threshold(&gray),
            filters::otsu(&gray),
            filters::equalize(&gray),
            filters::morph_close(&gray),
            filters::edges(&gray),
        ];
        variants.extend(self.gammas.iter().map(|g| filters::gamma(&gray, *g)));

        let mut out = Vec::with_capacity(variants.len() + 1);
        out.push(DynamicImage::ImageLuma8(gray));
        out.extend(variants.into_iter().map(DynamicImage::ImageLuma8));
        out
    }

    fn find_square_region(
        &self,
        image: &DynamicImage,
        criteria: &RegionCriteria,
    ) -> Option<DynamicImage> {
        let rect = self.square_region_bounds(&image.to_luma8(), criteria)?;
        debug!(x = rect.x, y = rect.y, w = rect.width, h = rect.height, "Square region found");
        let width = rect.width.min(image.width().saturating_sub(rect.x));
        let height = rect.height.min(image.height().saturating_sub(rect.y));
        (width > 0 && height > 0).then(|| image.crop_imm(rect.x, rect.y, width, height))
    }

    fn rescale(&self, image: &DynamicImage, factor: f32) -> DynamicImage {
        let width = ((image.width() as f32 * factor) as u32).max(1);
        let height = ((image.height() as f32 * factor) as u32).max(1);
        image.resize_exact(width, height, FilterType::CatmullRom)
    }

    fn text_variants(&self, image: &DynamicImage) -> Vec<DynamicImage> {
        let (width, height) = (image.width(), image.height());
        let longest = width.max(height);
        let base = if longest > self.ocr.max_dimension {
            let scale = self.ocr.max_dimension as f32 / longest as f32;
            let (w, h) = ((width as f32 * scale) as u32, (height as f32 * scale) as u32);
            debug!(width, height, w, h, "Downscaling for OCR");
            image.resize_exact(w.max(1), h.max(1), FilterType::Triangle)
        } else {
            image.clone()
        };

        let gray = base.to_luma8();
        let thresholded = filters::otsu(&filters::blur(&gray));
        let mut variants = vec![
            gray.clone(),
            thresholded.clone(),
            filters::adaptive_threshold(&gray),
            filters::morph_close(&thresholded),
        ];
        if gray.width() < self.ocr.upscale_limit {
            let w = (gray.width() as f32 * self.ocr.upscale_factor) as u32;
            let h = (gray.height() as f32 * self.ocr.upscale_factor) as u32;
            variants.push(imageops::resize(&gray, w, h, FilterType::CatmullRom));
        }
        variants.push(imageops::rotate90(&gray));
        variants.push(imageops::rotate270(&gray));

        variants.into_iter().map(DynamicImage::ImageLuma8).collect()
    }
}
