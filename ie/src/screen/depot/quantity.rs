//! Reads the quantity label under a matched item.
//!
//! The label sits on a translucent strip that also shows UI chrome, so the
//! digits are isolated before OCR: mask glyph-colored pixels, walk the mask
//! columns right to left collecting runs of occupied columns, and stop at the
//! first gap that is too wide or too bright to be between two digits.

use std::ops::Range;

use image::GrayImage;

use crate::{Diagnostics, Image, Rect, TextRecognizer};

use super::QuantityConfig;

/// The reference digit must be taller than this.
const MIN_DIGIT_HEIGHT: i32 = 10;
/// Tolerances for the leftmost run against the reference digit.
const MAX_HEIGHT_DIFF: i32 = 2;
const MAX_TOP_DIFF: i32 = 1;
const MAX_DIGIT_WIDTH: i32 = 12;

const TEN_THOUSAND: char = '万';

/// Quantity shown for the item at `item` (working space). Every failure reads as 0.
pub fn extract(
	image: Image,
	item: Rect,
	config: &QuantityConfig,
	ocr: &dyn TextRecognizer,
	diagnostics: &mut dyn Diagnostics,
) -> u64 {
	let Some(region) = item.moved(config.offset).intersection(&image.bounds()) else {
		tracing::debug!(?item, "quantity region outside image");
		return 0;
	};
	let Some(label) = image.sub_rect(region) else {
		return 0;
	};

	let Some(bound) = digit_bounds(label, config) else {
		tracing::debug!(?region, "no digits in quantity region");
		return 0;
	};

	let roi = bound.translated(region.x, region.y).enlarged(1, 1);
	let results = ocr.recognize(image, roi, config.ocr_threshold());
	let Some(first) = results.first() else {
		tracing::debug!(?roi, "OCR found no quantity text");
		return 0;
	};
	diagnostics.text(first.rect, &first.text);

	let text = config.ocr_replace.apply(&first.text);
	let quantity = parse_quantity(&text);
	tracing::info!(raw = %first.text, text = %text, quantity, "quantity");
	quantity
}

/// Tight bounds (label coordinates) of the trailing digits in `label`.
pub(crate) fn digit_bounds(label: Image, config: &QuantityConfig) -> Option<Rect> {
	let mask = label.in_range_hsv(config.lower, config.upper);
	let mut runs = scan_runs(label, &mask, config);

	let reference = runs
		.iter()
		.filter_map(|run| glyph_bounds(&mask, run.clone()))
		.find(|b| b.height > MIN_DIGIT_HEIGHT)?;

	// Anything on the far left that does not look like a digit is UI noise.
	while let Some(last) = runs.last() {
		let fits = glyph_bounds(&mask, last.clone()).is_some_and(|b| {
			(b.height - reference.height).abs() <= MAX_HEIGHT_DIFF
				&& (b.y - reference.y).abs() <= MAX_TOP_DIFF
				&& b.width <= MAX_DIGIT_WIDTH
		});
		if fits {
			break;
		}
		runs.pop();
	}

	let left = runs.last()?.start;
	let right = runs.first()?.end;
	let vertical = runs
		.iter()
		.filter_map(|run| glyph_bounds(&mask, run.clone()))
		.reduce(|a, b| a.union(&b))?;

	Some(Rect::new(left as i32, vertical.y, (right - left) as i32, vertical.height))
}

/// Column runs `[left, right)` ordered right to left. `left` is the empty
/// column that closed the run.
fn scan_runs(label: Image, mask: &GrayImage, config: &QuantityConfig) -> Vec<Range<u32>> {
	let (width, height) = mask.dimensions();
	if width == 0 || height == 0 {
		return Vec::new();
	}

	let mut runs = Vec::new();
	let mut right = width - 1;
	let mut inside = false;
	let mut spacing = 0u32;

	for x in (0..width).rev() {
		let glyph = (0..height).any(|y| mask.get_pixel(x, y).0[0] != 0);
		match (inside, glyph) {
			(true, false) => {
				runs.push(x..right + 1);
				inside = false;
				spacing = 0;
			}
			(false, true) => {
				right = x;
				inside = true;
			}
			(false, false) => {
				spacing += 1;
				let top = label.get(x, 0).to_hsv().v;
				let bottom = label.get(x, height - 1).to_hsv().v;
				let bright = top > config.background_v_upper || bottom > config.background_v_upper;
				if !runs.is_empty() && (spacing > config.max_spacing || bright) {
					break;
				}
			}
			(true, true) => {}
		}
	}

	runs
}

/// Bounding box of mask pixels within `cols`.
fn glyph_bounds(mask: &GrayImage, cols: Range<u32>) -> Option<Rect> {
	let mut bounds: Option<Rect> = None;
	for x in cols {
		for y in 0..mask.height() {
			if mask.get_pixel(x, y).0[0] == 0 {
				continue;
			}
			let px = Rect::new(x as i32, y as i32, 1, 1);
			bounds = Some(bounds.map_or(px, |b| b.union(&px)));
		}
	}
	bounds
}

/// Parse a quantity label such as `1234` or `1.5万`. Anything else reads as 0.
pub fn parse_quantity(text: &str) -> u64 {
	let (digits, multiplier) = match text.find(TEN_THOUSAND) {
		Some(pos) => (&text[..pos], 10_000.0),
		None => (text, 1.0),
	};

	if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit() || c == '.') {
		return 0;
	}

	digits
		.parse::<f64>()
		.map(|v| (v * multiplier) as u64)
		.unwrap_or(0)
}
