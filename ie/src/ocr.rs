//! OCR wrapper.
//!
//! The project relies on `ocr-rs` (Rust PaddleOCR bindings). The analyzer only
//! sees the [`TextRecognizer`] trait so tests can script recognized text.
//! OCR engines are sensitive to input quality, so the region is binarized and
//! upscaled here before it reaches the engine.

use std::{ops::RangeInclusive, path::Path};

use anyhow::{Context, Result};

use crate::{Image, OwnedImage, Rect};

/// One recognized text fragment and where it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognizedText {
    pub text: String,
    pub rect: Rect,
}

pub trait TextRecognizer {
    /// Recognize text inside `roi` (image coordinates).
    ///
    /// Pixels whose luma falls inside `threshold` are treated as glyphs; a
    /// full `0..=255` range disables binarization. Failures yield no fragments.
    fn recognize(&self, image: Image, roi: Rect, threshold: RangeInclusive<u8>) -> Vec<RecognizedText>;
}

/// OCR engines read small glyphs poorly; crops are upscaled to at least this height.
const MIN_H: u32 = 48;

pub struct Ocr {
    engine: ocr_rs::OcrEngine,
}

impl Ocr {
    /// Initialize the OCR engine with the given model paths.
    pub fn try_new(
        detection: impl AsRef<Path>,
        recognition: impl AsRef<Path>,
        charsset: impl AsRef<Path>,
    ) -> Result<Self> {
        let thread_count = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);

        let engine = ocr_rs::OcrEngine::new(
            detection,
            recognition,
            charsset,
            Some(ocr_rs::OcrEngineConfig {
                backend: ocr_rs::Backend::CPU,
                thread_count: thread_count as i32,
                // Quantity labels are a handful of small digits; High precision
                // is worth its CPU cost there.
                precision_mode: ocr_rs::PrecisionMode::High,
                enable_parallel: thread_count > 1,
                min_result_confidence: 0.5,
                ..Default::default()
            }),
        )
        .context("failed to initialize OCR engine")?;

        Ok(Self { engine })
    }

    fn preprocess(image: Image, threshold: RangeInclusive<u8>) -> OwnedImage {
        let mut gray = image.to_gray_image();
        if threshold != (0..=255) {
            for p in gray.pixels_mut() {
                p.0[0] = if threshold.contains(&p.0[0]) { 255 } else { 0 };
            }
        }

        let base = OwnedImage::from_gray_as_rgb(&ensure_dark_text_on_light(gray));
        if base.height() >= MIN_H {
            return base;
        }
        match base.clone().resized_h(MIN_H) {
            Ok(scaled) => scaled,
            Err(err) => {
                tracing::warn!(error = %err, "failed to upscale OCR crop");
                base
            }
        }
    }
}

impl TextRecognizer for Ocr {
    fn recognize(&self, image: Image, roi: Rect, threshold: RangeInclusive<u8>) -> Vec<RecognizedText> {
        let Some(crop) = image.sub_rect(roi) else {
            return Vec::new();
        };
        let roi = roi.intersection(&image.bounds()).unwrap_or(roi);

        let prepared = Self::preprocess(crop, threshold);
        let input = ocr_rs::preprocess::rgb_to_image(&prepared.as_image().get_bytes(), prepared.width(), prepared.height());

        match self.engine.recognize(&input) {
            Ok(results) => results
                .into_iter()
                .map(|v| v.text.trim().to_string())
                .filter(|text| !text.is_empty())
                .map(|text| RecognizedText { text, rect: roi })
                .collect(),
            Err(err) => {
                tracing::debug!(error = %err, "OCR engine failed");
                Vec::new()
            }
        }
    }
}

/// Invert mostly-dark crops so the engine always sees dark text on a light background.
fn ensure_dark_text_on_light(mut gray: image::GrayImage) -> image::GrayImage {
    let total = gray.pixels().map(|p| p.0[0] as u64).sum::<u64>();
    let count = (gray.width() as u64 * gray.height() as u64).max(1);
    if total / count < 128 {
        for p in gray.pixels_mut() {
            p.0[0] = 255u8.saturating_sub(p.0[0]);
        }
    }
    gray
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn light_glyphs_on_dark_are_inverted() {
        let mut gray = image::GrayImage::from_pixel(4, 1, image::Luma([0]));
        gray.put_pixel(1, 0, image::Luma([255]));
        let out = ensure_dark_text_on_light(gray);
        assert_eq!(out.as_raw(), &vec![255, 0, 255, 255]);
    }

    #[test]
    fn preprocess_binarizes_and_upscales() {
        let mut rgb = image::RgbImage::from_pixel(8, 8, image::Rgb([20, 20, 20]));
        rgb.put_pixel(3, 3, image::Rgb([230, 230, 230]));
        let img = OwnedImage::from_rgb_image(&rgb);

        let out = Ocr::preprocess(img.as_image(), 200..=255);
        assert_eq!(out.height(), MIN_H);
        assert_eq!(out.width(), MIN_H);
        // Background ends up light.
        assert!(out.as_image().get(0, 0).luma() >= 250);
    }
}
