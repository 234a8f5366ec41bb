//! Image primitives and utilities.
//!
//! The project uses a lightweight owned RGB image type (`OwnedImage`) that is
//! optimized for repeated cropping/resizing of screen captures.
//!
//! For most operations we borrow a view (`Image<'a>`) instead of copying pixels.
//! Depot analysis crops the same working image hundreds of times (one search
//! region per catalog entry and slot), so views keep that cheap.

use anyhow::{Context, Result};

use crate::Rect;

/// Interpolation used by [`OwnedImage::resize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    /// Area averaging. Appropriate when shrinking captures down to the
    /// resolution the item templates were authored at.
    Area,
    /// Smooth interpolation for upscaling small text crops.
    CatmullRom,
}

impl Filter {
    fn alg(self) -> fast_image_resize::ResizeAlg {
        use fast_image_resize::{FilterType, ResizeAlg};
        match self {
            Self::Area => ResizeAlg::Convolution(FilterType::Box),
            Self::CatmullRom => ResizeAlg::Interpolation(FilterType::CatmullRom),
        }
    }
}

/// Owned RGB image (no alpha).
#[derive(Clone, Debug)]
pub struct OwnedImage {
    width: u32,
    height: u32,
    data: Vec<Color>,
}

impl OwnedImage {
    pub fn from_rgb_image(img: &image::RgbImage) -> Self {
        let (width, height) = img.dimensions();
        let data = img
            .pixels()
            .map(|p| Color::new(p.0[0], p.0[1], p.0[2]))
            .collect();

        Self {
            width,
            height,
            data,
        }
    }

    /// Decode an image file of any format `image` supports (alpha is discarded).
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = path.as_ref();
        let img = image::open(path)
            .with_context(|| format!("decode image {}", path.display()))?
            .to_rgb8();
        Ok(Self::from_rgb_image(&img))
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Resize this image to exactly `width`×`height`.
    ///
    /// Uses `fast_image_resize` (SIMD-optimized) and keeps output in `Vec<Color>`.
    pub fn resize(&mut self, width: u32, height: u32, filter: Filter) -> Result<()> {
        let width = width.max(1);
        let height = height.max(1);
        if self.width == width && self.height == height {
            return Ok(());
        }

        // SAFETY: `Color` is `#[repr(C)]` with 3 x `u8`, so it is layout-compatible
        // with `fast_image_resize::pixels::U8x3` (alignment 1).
        let src_pixels = unsafe {
            std::slice::from_raw_parts(
                self.data.as_ptr() as *const fast_image_resize::pixels::U8x3,
                self.data.len(),
            )
        };

        let src = fast_image_resize::images::ImageRef::from_pixels(self.width, self.height, src_pixels)
            .context("fast_image_resize: ImageRef::from_pixels")?;

        let mut dst = fast_image_resize::images::Image::new(width, height, fast_image_resize::PixelType::U8x3);

        let mut resizer = fast_image_resize::Resizer::new();
        let options = fast_image_resize::ResizeOptions::new().resize_alg(filter.alg());

        resizer
            .resize(&src, &mut dst, &Some(options))
            .context("fast_image_resize: resize")?;

        let bytes: Vec<u8> = dst.into_vec();
        let mut data = Vec::with_capacity((width * height) as usize);
        for px in bytes.chunks_exact(3) {
            data.push(Color::new(px[0], px[1], px[2]));
        }

        self.width = width;
        self.height = height;
        self.data = data;
        Ok(())
    }

    #[inline]
    pub fn resized(mut self, width: u32, height: u32, filter: Filter) -> Result<Self> {
        self.resize(width, height, filter)?;
        Ok(self)
    }

    /// Resize this image to the given height (preserving aspect ratio).
    pub fn resized_h(self, height: u32) -> Result<Self> {
        let height = height.max(1);
        let width = (self.width as u64 * height as u64 / self.height.max(1) as u64) as u32;
        self.resized(width, height, Filter::CatmullRom)
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

    /// Create an RGB `OwnedImage` from a grayscale image (each pixel repeated into RGB).
    pub fn from_gray_as_rgb(gray: &image::GrayImage) -> Self {
        let (w, h) = gray.dimensions();
        let mut data = Vec::with_capacity((w * h) as usize);
        for p in gray.pixels() {
            let v = p.0[0];
            data.push(Color::new(v, v, v));
        }
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

    /// Bounds of this view in its own coordinates.
    #[inline]
    pub fn bounds(&self) -> Rect {
        Rect::of_size(self.width(), self.height())
    }

    #[inline(always)]
    fn pixel(&self, x: u32, y: u32) -> &Color {
        &self.data[(x + y * self.true_width) as usize]
    }

    /// Pixel at view-relative coordinates.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Color {
        *self.pixel(self.x1 + x, self.y1 + y)
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
        let mut bytes = vec![0; (self.width() * self.height() * 3) as usize];
        let mut i = 0;
        for y in self.y1..self.y2 {
            for x in self.x1..self.x2 {
                let clr = self.pixel(x, y);
                bytes[i] = clr.r;
                bytes[i + 1] = clr.g;
                bytes[i + 2] = clr.b;
                i += 3;
            }
        }
        bytes
    }

    pub fn to_rgb_image(&self) -> Result<image::RgbImage> {
        image::RgbImage::from_raw(self.width(), self.height(), self.get_bytes())
            .context("RgbImage::from_raw failed")
    }

    /// Convert to a grayscale `GrayImage` (luma).
    pub fn to_gray_image(&self) -> image::GrayImage {
        image::GrayImage::from_fn(self.width(), self.height(), |x, y| image::Luma([self.get(x, y).luma()]))
    }

    /// Split into R, G and B planes.
    pub fn to_channel_images(&self) -> [image::GrayImage; 3] {
        let plane = |f: fn(&Color) -> u8| {
            image::GrayImage::from_fn(self.width(), self.height(), |x, y| image::Luma([f(&self.get(x, y))]))
        };
        [plane(|c| c.r), plane(|c| c.g), plane(|c| c.b)]
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

    /// Subimage for `rect`, clamped to this view. `None` if nothing is left.
    pub fn sub_rect(&self, rect: Rect) -> Option<Self> {
        let r = rect.intersection(&self.bounds())?;
        Some(self.sub_image(r.x as u32, r.y as u32, r.width as u32, r.height as u32))
    }

    /// Binary mask (255 inside, 0 outside) of pixels whose HSV value lies in
    /// `lower..=upper` on every channel. Same semantics as OpenCV's `inRange`.
    pub fn in_range_hsv(&self, lower: Hsv, upper: Hsv) -> image::GrayImage {
        image::GrayImage::from_fn(self.width(), self.height(), |x, y| {
            let hsv = self.get(x, y).to_hsv();
            let inside = (lower.h..=upper.h).contains(&hsv.h)
                && (lower.s..=upper.s).contains(&hsv.s)
                && (lower.v..=upper.v).contains(&hsv.v);
            image::Luma([if inside { 255 } else { 0 }])
        })
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

    /// Compute luma (grayscale intensity).
    pub fn luma(&self) -> u8 {
        let r = self.r as u32;
        let g = self.g as u32;
        let b = self.b as u32;
        ((299 * r + 587 * g + 114 * b) / 1000) as u8
    }

    /// 8-bit HSV in the OpenCV convention: hue in `0..180`, saturation and
    /// value in `0..=255`. Configured mask bounds are written against this scale.
    pub fn to_hsv(&self) -> Hsv {
        let r = self.r as i32;
        let g = self.g as i32;
        let b = self.b as i32;
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let diff = max - min;

        let s = if max == 0 {
            0
        } else {
            (255.0 * diff as f32 / max as f32).round() as i32
        };

        let h = if diff == 0 {
            0.0
        } else if max == r {
            60.0 * (g - b) as f32 / diff as f32
        } else if max == g {
            120.0 + 60.0 * (b - r) as f32 / diff as f32
        } else {
            240.0 + 60.0 * (r - g) as f32 / diff as f32
        };
        let h = if h < 0.0 { h + 360.0 } else { h };
        let h = ((h / 2.0).round() as i32) % 180;

        Hsv {
            h: h as u8,
            s: s as u8,
            v: max as u8,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct Hsv {
    pub h: u8,
    pub s: u8,
    pub v: u8,
}

impl Hsv {
    pub const fn new(h: u8, s: u8, v: u8) -> Self {
        Self { h, s, v }
    }
}
