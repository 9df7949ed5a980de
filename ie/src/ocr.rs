//! OCR wrapper.
//!
//! The production engine is `ocr-rs` (Rust PaddleOCR bindings). Detection code
//! only depends on the [`Recognize`] trait so the engine can be swapped for a
//! scripted one in tests.

use std::path::Path;

use anyhow::{Context, Result};

use crate::{Image, OwnedImage, Region};

/// One text row reported by the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct OcrRow {
    pub text: String,
    pub confidence: f32,
    /// Row bounds in screen coordinates.
    pub region: Region,
}

/// Text recognition over one region of a screen.
///
/// Rows come back in the engine's own order. An `Err` means the engine itself
/// failed; an unreadable region is just an empty or noisy row list.
pub trait Recognize: Send + Sync {
    fn recognize(&self, image: Image, region: Region) -> Result<Vec<OcrRow>>;
}

/// Crop preprocessing applied before the engine runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct OcrOptions {
    /// Crops shorter than this are upscaled; small glyphs read poorly.
    pub min_height: u32,
    /// Binarize with Otsu's level before recognition.
    pub binarize: bool,
}

impl Default for OcrOptions {
    fn default() -> Self {
        Self {
            min_height: 48,
            binarize: false,
        }
    }
}

pub struct Ocr {
    engine: ocr_rs::OcrEngine,
    options: OcrOptions,
}

impl Ocr {
    /// Initialize the OCR engine with the given model paths.
    pub fn try_new(
        detection: impl AsRef<Path>,
        recognition: impl AsRef<Path>,
        charsset: impl AsRef<Path>,
        options: OcrOptions,
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
                thread_count,
                precision_mode: ocr_rs::PrecisionMode::High,
                enable_parallel: thread_count > 1,
                min_result_confidence: 0.5,
                ..Default::default()
            }),
        )
        .context("failed to initialize OCR engine")?;

        Ok(Self { engine, options })
    }
}

impl Recognize for Ocr {
    fn recognize(&self, image: Image, region: Region) -> Result<Vec<OcrRow>> {
        let region = region.clamped(image.width(), image.height());
        if region.is_empty() {
            return Ok(Vec::new());
        }

        let crop = prepare(image.crop(region), self.options)?;
        // Engine boxes are in crop pixels; map them back through the upscale factor.
        let scale = region.height() as f32 / crop.height().max(1) as f32;

        let input = ocr_rs::preprocess::rgb_to_image(
            &crop.as_image().get_bytes(),
            crop.width(),
            crop.height(),
        );
        let results = self
            .engine
            .recognize(&input)
            .with_context(|| format!("recognize region {region}"))?;

        Ok(results
            .into_iter()
            .map(|v| {
                let rect = v.bbox.rect;
                let to_screen = |p: i32, base: u32| base + (p.max(0) as f32 * scale).round() as u32;
                let x1 = to_screen(rect.left(), region.x1);
                let y1 = to_screen(rect.top(), region.y1);
                OcrRow {
                    text: v.text,
                    confidence: v.confidence,
                    region: Region::new(
                        x1,
                        y1,
                        x1 + (rect.width() as f32 * scale).round() as u32,
                        y1 + (rect.height() as f32 * scale).round() as u32,
                    ),
                }
            })
            .collect())
    }
}

fn prepare(crop: Image, options: OcrOptions) -> Result<OwnedImage> {
    let mut img = crop.to_owned_image();
    if img.height() < options.min_height {
        img.resize_h(options.min_height)?;
    }
    if options.binarize {
        img = binarize(&img);
    }
    Ok(img)
}

/// Otsu threshold, inverted if needed so text ends up dark on light.
fn binarize(img: &OwnedImage) -> OwnedImage {
    use imageproc::contrast::{ThresholdType, otsu_level, threshold};

    let gray = img.to_gray_image();
    let level = otsu_level(&gray);
    let mut bin = threshold(&gray, level, ThresholdType::Binary);

    let white = bin.pixels().filter(|p| p.0[0] > 0).count();
    if white * 2 < (bin.width() * bin.height()) as usize {
        for p in bin.pixels_mut() {
            p.0[0] = 255 - p.0[0];
        }
    }
    OwnedImage::from_gray_as_rgb(&bin)
}
