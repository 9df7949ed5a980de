//! Image primitives and utilities.
//!
//! Screen captures are stored as a lightweight owned RGB image (`OwnedImage`).
//! Detection code works on borrowed views (`Image<'a>`) so that cropping a
//! region never copies pixels; pixels are only copied when a crop is handed to
//! the OCR engine or written out as a debug snapshot.

use anyhow::{Context, Result, anyhow};

use crate::Region;

/// Owned RGB image (no alpha).
#[derive(Clone, Debug)]
pub struct OwnedImage {
    width: u32,
    height: u32,
    data: Vec<Color>,
}

impl OwnedImage {
    /// Solid image filled with `color`.
    pub fn new(width: u32, height: u32, color: Color) -> Self {
        Self {
            width,
            height,
            data: vec![color; (width * height) as usize],
        }
    }

    /// Build an `OwnedImage` from RGBA bytes (alpha is discarded).
    ///
    /// The buffer is expected to be tightly packed: `width * height * 4` bytes.
    pub fn from_rgba(width: usize, bytes: &[u8]) -> Self {
        let height = bytes.len() / width.max(1) / 4;
        let data = bytes
            .chunks_exact(4)
            .take(width * height)
            .map(|v| Color::new(v[0], v[1], v[2]))
            .collect::<Vec<_>>();

        Self {
            width: width as u32,
            height: height as u32,
            data,
        }
    }

    /// Decode a PNG/JPEG screenshot.
    pub fn from_encoded(bytes: &[u8]) -> Result<Self> {
        let img = image::load_from_memory(bytes)
            .context("decode screenshot")?
            .to_rgb8();
        let (width, height) = img.dimensions();
        let data = img
            .pixels()
            .map(|p| Color::new(p.0[0], p.0[1], p.0[2]))
            .collect();

        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn open<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).with_context(|| format!("read {:?}", path))?;
        Self::from_encoded(&bytes).with_context(|| format!("load {:?}", path))
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Resize this image to the given height (preserving aspect ratio).
    ///
    /// Uses `fast_image_resize` (SIMD-optimized) and keeps output in `Vec<Color>`.
    pub fn resize_h(&mut self, height: u32) -> Result<()> {
        if self.height == height {
            return Ok(());
        }

        let height = height.max(1);
        let width = ((self.width as u64 * height as u64 / self.height.max(1) as u64) as u32).max(1);

        // SAFETY: `Color` is `#[repr(C)]` with 3 x `u8`, so it is layout-compatible
        // with `fast_image_resize::pixels::U8x3` (alignment 1).
        let src_pixels = unsafe {
            std::slice::from_raw_parts(
                self.data.as_ptr() as *const fast_image_resize::pixels::U8x3,
                self.data.len(),
            )
        };

        let src = fast_image_resize::images::ImageRef::from_pixels(self.width, self.height, src_pixels)
            .map_err(|err| anyhow!("resize source: {err:?}"))?;

        let mut dst = fast_image_resize::images::Image::new(width, height, fast_image_resize::PixelType::U8x3);

        let mut resizer = fast_image_resize::Resizer::new();
        let options = fast_image_resize::ResizeOptions::new().resize_alg(
            fast_image_resize::ResizeAlg::Interpolation(fast_image_resize::FilterType::CatmullRom),
        );

        resizer
            .resize(&src, &mut dst, &Some(options))
            .map_err(|err| anyhow!("resize {}x{} -> {}x{}: {err:?}", self.width, self.height, width, height))?;

        let bytes: Vec<u8> = dst.into_vec();
        self.data = bytes
            .chunks_exact(3)
            .map(|px| Color::new(px[0], px[1], px[2]))
            .collect();
        self.width = width;
        self.height = height;
        Ok(())
    }

    #[inline]
    pub fn resized_h(mut self, height: u32) -> Result<Self> {
        self.resize_h(height)?;
        Ok(self)
    }

    /// Create a borrowed view of this entire image.
    pub fn as_image<'a>(&'a self) -> Image<'a> {
        Image {
            x1: 0,
            y1: 0,
            x2: self.width,
            y2: self.height,
            true_width: self.width,
            data: &self.data,
        }
    }

    /// Paint a solid rectangle. Used to synthesize screens in tests.
    #[cfg(test)]
    pub(crate) fn fill(&mut self, region: Region, color: Color) {
        let r = region.clamped(self.width, self.height);
        for y in r.y1..r.y2 {
            for x in r.x1..r.x2 {
                self.data[(x + y * self.width) as usize] = color;
            }
        }
    }

    /// Convert to a grayscale `GrayImage` (luma).
    pub fn to_gray_image(&self) -> image::GrayImage {
        image::GrayImage::from_fn(self.width, self.height, |x, y| {
            image::Luma([self.data[(x + y * self.width) as usize].luma()])
        })
    }

    /// Create an RGB `OwnedImage` from a grayscale image (each pixel repeated into RGB).
    pub fn from_gray_as_rgb(gray: &image::GrayImage) -> Self {
        let (w, h) = gray.dimensions();
        let data = gray
            .pixels()
            .map(|p| Color::new(p.0[0], p.0[0], p.0[0]))
            .collect();
        Self {
            width: w,
            height: h,
            data,
        }
    }
}

// ----------

/// Borrowed image view into an `OwnedImage`.
#[derive(Clone, Copy)]
pub struct Image<'a> {
    x1: u32,
    y1: u32,
    x2: u32,
    y2: u32,
    true_width: u32,
    data: &'a [Color],
}

impl<'a> Image<'a> {
    #[inline(always)]
    pub fn width(&self) -> u32 {
        self.x2 - self.x1
    }

    #[inline(always)]
    pub fn height(&self) -> u32 {
        self.y2 - self.y1
    }

    #[inline(always)]
    fn pixel(&self, x: u32, y: u32) -> &Color {
        &self.data[(x + y * self.true_width) as usize]
    }

    pub fn to_owned_image(self) -> OwnedImage {
        let mut data = Vec::with_capacity((self.width() * self.height()) as usize);
        for y in self.y1..self.y2 {
            for x in self.x1..self.x2 {
                data.push(*self.pixel(x, y));
            }
        }

        OwnedImage {
            width: self.width(),
            height: self.height(),
            data,
        }
    }

    pub fn get_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity((self.width() * self.height() * 3) as usize);
        for y in self.y1..self.y2 {
            for x in self.x1..self.x2 {
                let clr = self.pixel(x, y);
                bytes.extend_from_slice(&[clr.r, clr.g, clr.b]);
            }
        }
        bytes
    }

    fn to_rgb_image(self) -> Result<image::RgbImage> {
        image::RgbImage::from_raw(self.width(), self.height(), self.get_bytes())
            .context("RgbImage::from_raw failed")
    }

    /// Save a copy with each region outlined in its color.
    pub fn save_annotated<P: AsRef<std::path::Path>>(&self, path: P, regions: &[(Region, Color)]) -> Result<()> {
        use imageproc::{drawing::draw_hollow_rect_mut, rect::Rect};

        let mut img = self.to_rgb_image()?;
        for (region, color) in regions {
            let r = region.clamped(self.width(), self.height());
            if r.is_empty() {
                continue;
            }
            let rect = Rect::at(r.x1 as i32, r.y1 as i32).of_size(r.width(), r.height());
            draw_hollow_rect_mut(&mut img, rect, image::Rgb([color.r, color.g, color.b]));
        }
        img.save_with_format(path, image::ImageFormat::Png)
            .context("save annotated png")?;
        Ok(())
    }

    /// Create an arbitrary subimage (relative coordinates).
    pub fn sub_image(&self, x: u32, y: u32, width: u32, height: u32) -> Self {
        let x = x.min(self.width());
        let y = y.min(self.height());
        let width = width.min(self.width() - x);
        let height = height.min(self.height() - y);

        Self {
            x1: self.x1 + x,
            y1: self.y1 + y,
            x2: self.x1 + x + width,
            y2: self.y1 + y + height,
            true_width: self.true_width,
            data: self.data,
        }
    }

    /// Crop to a region, clipped to the view.
    #[inline]
    pub fn crop(&self, region: Region) -> Self {
        self.sub_image(region.x1, region.y1, region.width(), region.height())
    }

    /// Number of pixels whose similarity to `color` is at least `threshold`.
    pub fn color_count(&self, color: Color, threshold: u8) -> u32 {
        let mut count = 0;
        for y in self.y1..self.y2 {
            for x in self.x1..self.x2 {
                if self.pixel(x, y).similarity(color) >= threshold {
                    count += 1;
                }
            }
        }
        count
    }
}

// ----------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[repr(C)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Self = Self::new(255, 255, 255);
    pub const BLACK: Self = Self::new(0, 0, 0);

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Similarity used for all color checks, 255 meaning identical.
    ///
    /// The largest channel overshoot and the largest channel undershoot are
    /// summed and subtracted from 255, so a uniform brightness shift costs
    /// less than a hue change.
    pub fn similarity(&self, other: Color) -> u8 {
        let channels = [
            (self.r as i16, other.r as i16),
            (self.g as i16, other.g as i16),
            (self.b as i16, other.b as i16),
        ];
        let over = channels.iter().map(|(a, b)| (a - b).max(0)).max().unwrap_or(0);
        let under = channels.iter().map(|(a, b)| (b - a).max(0)).max().unwrap_or(0);
        (255 - (over + under)).max(0) as u8
    }

    /// Compute luma (grayscale intensity).
    pub fn luma(&self) -> u8 {
        let r = self.r as u32;
        let g = self.g as u32;
        let b = self.b as u32;
        ((299 * r + 587 * g + 114 * b) / 1000) as u8
    }
}
