//! Diagnostics sinks.
//!
//! The analyzer reports every intermediate rectangle to a [`Diagnostics`]
//! implementation. The default is a no-op; [`Annotator`] draws everything onto
//! a copy of the working image, labels matched items and OCR text, and writes
//! it to a debug directory.

use std::{
	path::{Path, PathBuf},
	time::{SystemTime, UNIX_EPOCH},
};

use ab_glyph::FontRef;
use anyhow::{Context, Result};
use image::Rgb;

use crate::{Image, Rect};

pub trait Diagnostics {
	/// Anchor item found in the seed region.
	fn anchor(&mut self, _rect: Rect) {}

	/// Neighbor used to derive the grid pitch.
	fn neighbor(&mut self, _rect: Rect) {}

	/// Candidate slot produced by grid tiling.
	fn slot(&mut self, _rect: Rect) {}

	/// Item matched in a slot, before quantity rejection.
	fn item(&mut self, _rect: Rect, _item_id: &str, _quantity: u64) {}

	/// Text the OCR returned for a quantity label.
	fn text(&mut self, _rect: Rect, _text: &str) {}

	/// Called once at the end of an analysis with the working-resolution image.
	fn finish(&mut self, _working: Image) {}
}

impl<D: Diagnostics + ?Sized> Diagnostics for &mut D {
	fn anchor(&mut self, rect: Rect) {
		(**self).anchor(rect)
	}

	fn neighbor(&mut self, rect: Rect) {
		(**self).neighbor(rect)
	}

	fn slot(&mut self, rect: Rect) {
		(**self).slot(rect)
	}

	fn item(&mut self, rect: Rect, item_id: &str, quantity: u64) {
		(**self).item(rect, item_id, quantity)
	}

	fn text(&mut self, rect: Rect, text: &str) {
		(**self).text(rect, text)
	}

	fn finish(&mut self, working: Image) {
		(**self).finish(working)
	}
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDiagnostics;

impl Diagnostics for NoDiagnostics {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
	Anchor,
	Slot,
	Item,
	Text,
}

impl Mark {
	fn color(self) -> Rgb<u8> {
		match self {
			Self::Anchor => Rgb([255, 0, 0]),
			Self::Slot => Rgb([0, 255, 0]),
			Self::Item => Rgb([255, 255, 0]),
			Self::Text => Rgb([0, 128, 255]),
		}
	}
}

static FONT: &[u8] = include_bytes!("../assets/DejaVuSansMono.ttf");
const LABEL_SCALE: f32 = 12.0;

/// Writes `depot_<unix-millis>.png` with every reported rectangle outlined and
/// item and text marks labeled.
pub struct Annotator {
	dir: PathBuf,
	marks: Vec<(Rect, Mark, Option<String>)>,
	written: Option<PathBuf>,
}

impl Annotator {
	pub fn new(dir: impl Into<PathBuf>) -> Self {
		Self {
			dir: dir.into(),
			marks: Vec::new(),
			written: None,
		}
	}

	/// Path of the last snapshot written by [`Diagnostics::finish`].
	pub fn written(&self) -> Option<&Path> {
		self.written.as_deref()
	}

	fn write(&self, working: Image) -> Result<PathBuf> {
		let font = FontRef::try_from_slice(FONT).context("load annotation font")?;
		let mut canvas = working.to_rgb_image()?;
		for (rect, mark, label) in &self.marks {
			if rect.is_empty() {
				continue;
			}
			imageproc::drawing::draw_hollow_rect_mut(&mut canvas, (*rect).into(), mark.color());
			if let Some(label) = label {
				// Items are labeled above, OCR text below.
				let y = match mark {
					Mark::Text => rect.bottom(),
					_ => rect.y - LABEL_SCALE as i32,
				};
				imageproc::drawing::draw_text_mut(&mut canvas, mark.color(), rect.x, y, LABEL_SCALE, &font, label);
			}
		}

		std::fs::create_dir_all(&self.dir).with_context(|| format!("create {}", self.dir.display()))?;
		let millis = SystemTime::now()
			.duration_since(UNIX_EPOCH)
			.map(|d| d.as_millis())
			.unwrap_or_default();
		let path = self.dir.join(format!("depot_{millis}.png"));
		canvas
			.save_with_format(&path, image::ImageFormat::Png)
			.with_context(|| format!("save {}", path.display()))?;
		Ok(path)
	}
}

impl Diagnostics for Annotator {
	fn anchor(&mut self, rect: Rect) {
		self.marks.push((rect, Mark::Anchor, None));
	}

	fn neighbor(&mut self, rect: Rect) {
		self.marks.push((rect, Mark::Anchor, None));
	}

	fn slot(&mut self, rect: Rect) {
		self.marks.push((rect, Mark::Slot, None));
	}

	fn item(&mut self, rect: Rect, item_id: &str, quantity: u64) {
		tracing::debug!(item_id, quantity, x = rect.x, y = rect.y, "annotate item");
		self.marks.push((rect, Mark::Item, Some(format!("{item_id} x{quantity}"))));
	}

	fn text(&mut self, rect: Rect, text: &str) {
		tracing::debug!(text, x = rect.x, y = rect.y, "annotate text");
		self.marks.push((rect, Mark::Text, Some(text.to_string())));
	}

	fn finish(&mut self, working: Image) {
		match self.write(working) {
			Ok(path) => {
				tracing::debug!(path = %path.display(), "wrote depot debug image");
				self.written = Some(path);
			}
			Err(err) => tracing::warn!(error = %err, "failed to write depot debug image"),
		}
		self.marks.clear();
	}
}
