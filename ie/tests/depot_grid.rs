//! End-to-end depot analysis on a synthetic 3×3 grid.
//!
//! The capture is rendered at twice the working resolution with every working
//! pixel drawn as a 2×2 block, so area downscaling reproduces the working image
//! exactly and the real `TemplateSet` scores placed icons at 1.0.

use std::ops::RangeInclusive;

use ie::screen::depot::QuantityConfig;
use ie::{
	AnalyzeError, DepotAnalyzer, DepotConfig, Diagnostics, Hsv, Image, OwnedImage, RecognizedText, Rect, TemplateSet,
	TextRecognizer,
};
use image::{Rgb, RgbImage};

const SCALE: u32 = 2;
const ICON: u32 = 32;
const BG: Rgb<u8> = Rgb([30, 30, 30]);
const GLYPH: Rgb<u8> = Rgb([240, 240, 240]);
const CATALOG_LEN: usize = 12;

fn item_id(k: usize) -> String {
	format!("item{k:02}")
}

fn catalog() -> Vec<(String, String)> {
	(0..CATALOG_LEN).map(|k| (item_id(k), format!("Item {k}"))).collect()
}

/// Deterministic gray noise, distinct per seed.
fn icon(seed: u32) -> RgbImage {
	let mut state = seed.wrapping_mul(2654435761).wrapping_add(12345);
	RgbImage::from_fn(ICON, ICON, |_, _| {
		state = state.wrapping_mul(1664525).wrapping_add(1013904223);
		let v = (state >> 24) as u8;
		Rgb([v, v, v])
	})
}

/// Working-space position of placed item `k` (column-major, 3 rows).
fn slot_of(k: usize) -> (u32, u32) {
	let col = (k / 3) as u32;
	let row = (k % 3) as u32;
	(8 + col * 44, 8 + row * 48)
}

fn config() -> DepotConfig {
	DepotConfig {
		working_region: Rect::new(0, 0, 160, 160),
		anchor_region: Rect::new(0, 0, 60, 60),
		match_threshold: 0.8,
		quantity: QuantityConfig {
			offset: Rect::new(2, 34, 30, 13),
			lower: Hsv::new(0, 0, 200),
			upper: Hsv::new(180, 40, 255),
			max_spacing: 8,
			background_v_upper: 100,
			..Default::default()
		},
	}
}

fn templates() -> TemplateSet {
	let mut set = TemplateSet::new(0.8);
	for k in 0..CATALOG_LEN {
		set.insert(item_id(k), OwnedImage::from_rgb_image(&icon(k as u32)).as_image());
	}
	set
}

struct Capture {
	raw: RgbImage,
}

impl Capture {
	fn blank() -> Self {
		Self {
			raw: RgbImage::from_pixel(160 * SCALE, 160 * SCALE, BG),
		}
	}

	/// Fill a working-space box at capture scale.
	fn fill(&mut self, x: u32, y: u32, w: u32, h: u32, color: Rgb<u8>) {
		for py in y * SCALE..(y + h) * SCALE {
			for px in x * SCALE..(x + w) * SCALE {
				self.raw.put_pixel(px, py, color);
			}
		}
	}

	fn place(&mut self, k: usize, label: bool) {
		let (x, y) = slot_of(k);
		let pattern = icon(k as u32);
		for (ix, iy, p) in pattern.enumerate_pixels() {
			self.fill(x + ix, y + iy, 1, 1, *p);
		}
		if label {
			// "42": two 5×11 glyphs, right-aligned in the label region.
			let (lx, ly) = (x + 2, y + 34);
			self.fill(lx + 16, ly + 1, 5, 11, GLYPH);
			self.fill(lx + 23, ly + 1, 5, 11, GLYPH);
		}
	}

	fn grid(skip_label: Option<usize>) -> Self {
		let mut capture = Self::blank();
		for k in 0..9 {
			capture.place(k, skip_label != Some(k));
		}
		capture
	}

	fn unlabeled_grid() -> Self {
		let mut capture = Self::blank();
		for k in 0..9 {
			capture.place(k, false);
		}
		capture
	}

	fn image(&self) -> OwnedImage {
		OwnedImage::from_rgb_image(&self.raw)
	}
}

/// Reads "42" wherever it is pointed.
struct FortyTwo;

impl TextRecognizer for FortyTwo {
	fn recognize(&self, _image: Image, roi: Rect, _threshold: RangeInclusive<u8>) -> Vec<RecognizedText> {
		vec![RecognizedText {
			text: "42".to_string(),
			rect: roi,
		}]
	}
}

#[derive(Default)]
struct Counter {
	anchors: usize,
	slots: usize,
	texts: Vec<Rect>,
	finished: usize,
}

impl Diagnostics for Counter {
	fn anchor(&mut self, _rect: Rect) {
		self.anchors += 1;
	}

	fn slot(&mut self, _rect: Rect) {
		self.slots += 1;
	}

	fn text(&mut self, rect: Rect, _text: &str) {
		self.texts.push(rect);
	}

	fn finish(&mut self, _working: Image) {
		self.finished += 1;
	}
}

#[test]
fn reads_every_item_of_a_three_by_three_grid() {
	let (config, catalog, templates) = (config(), catalog(), templates());
	let image = Capture::grid(None).image();
	let mut counter = Counter::default();

	let analysis = DepotAnalyzer::new(&config, &catalog, &templates, &FortyTwo)
		.with_diagnostics(&mut counter)
		.analyze(image.as_image(), 0)
		.unwrap();

	assert_eq!(analysis.items.len(), 9);
	assert_eq!(analysis.next_begin, 9);
	for k in 0..9 {
		let info = &analysis.items[&item_id(k)];
		let (x, y) = slot_of(k);
		assert_eq!(info.item_name, format!("Item {k}"));
		assert_eq!(info.quantity, 42);
		assert_eq!(
			info.rect,
			Rect::new((x * SCALE) as i32, (y * SCALE) as i32, (ICON * SCALE) as i32, (ICON * SCALE) as i32)
		);
	}

	assert_eq!(counter.anchors, 1);
	assert_eq!(counter.slots, 9);
	assert_eq!(counter.finished, 1);
	// OCR gets the tight digit box (plus one pixel) in working space.
	let (x, y) = slot_of(0);
	assert_eq!(counter.texts[0], Rect::new((x + 2 + 15 - 1) as i32, (y + 34) as i32, 15, 13));
}

#[test]
fn repeated_analysis_is_identical() {
	let (config, catalog, templates) = (config(), catalog(), templates());
	let image = Capture::grid(None).image();
	let mut analyzer = DepotAnalyzer::new(&config, &catalog, &templates, &FortyTwo);

	let first = analyzer.analyze(image.as_image(), 0).unwrap();
	let second = analyzer.analyze(image.as_image(), 0).unwrap();
	assert_eq!(first, second);
}

#[test]
fn blank_screenshot_has_no_anchor() {
	let (config, catalog, templates) = (config(), catalog(), templates());
	let image = Capture::blank().image();

	let err = DepotAnalyzer::new(&config, &catalog, &templates, &FortyTwo)
		.analyze(image.as_image(), 0)
		.unwrap_err();
	assert!(matches!(err, AnalyzeError::AnchorNotFound), "{err}");
}

#[test]
fn lone_item_cannot_establish_a_grid() {
	let (config, catalog, templates) = (config(), catalog(), templates());
	let mut capture = Capture::blank();
	capture.place(0, true);

	let err = DepotAnalyzer::new(&config, &catalog, &templates, &FortyTwo)
		.analyze(capture.image().as_image(), 0)
		.unwrap_err();
	assert!(matches!(err, AnalyzeError::GridNotFound), "{err}");
}

#[test]
fn unlabeled_slot_is_skipped_and_scanning_continues() {
	let (config, catalog, templates) = (config(), catalog(), templates());
	let image = Capture::grid(Some(4)).image();

	let analysis = DepotAnalyzer::new(&config, &catalog, &templates, &FortyTwo)
		.analyze(image.as_image(), 0)
		.unwrap();
	assert_eq!(analysis.items.len(), 8);
	assert!(!analysis.items.contains_key(&item_id(4)));
	assert!(analysis.items.contains_key(&item_id(8)));
	assert_eq!(analysis.next_begin, 9);
}

#[test]
fn cursor_past_the_visible_items_finds_nothing() {
	let (config, catalog, templates) = (config(), catalog(), templates());
	let image = Capture::grid(None).image();

	let err = DepotAnalyzer::new(&config, &catalog, &templates, &FortyTwo)
		.analyze(image.as_image(), 9)
		.unwrap_err();
	assert!(matches!(err, AnalyzeError::NoItems { next_begin: 9 }), "{err}");
}

#[test]
fn cursor_advances_even_when_no_quantity_is_read() {
	let (config, catalog, templates) = (config(), catalog(), templates());
	let image = Capture::unlabeled_grid().image();

	let err = DepotAnalyzer::new(&config, &catalog, &templates, &FortyTwo)
		.analyze(image.as_image(), 0)
		.unwrap_err();
	assert!(matches!(err, AnalyzeError::NoItems { next_begin: 9 }), "{err}");
}

#[test]
fn first_unmatched_slot_ends_the_scan() {
	let (config, catalog, templates) = (config(), catalog(), templates());
	// Items 0..=3 only: slot 4 (second column, middle row) is empty.
	let mut capture = Capture::blank();
	for k in 0..4 {
		capture.place(k, true);
	}
	// A stray item further down the grid is never reached.
	capture.place(6, true);

	let analysis = DepotAnalyzer::new(&config, &catalog, &templates, &FortyTwo)
		.analyze(capture.image().as_image(), 0)
		.unwrap();
	let ids = analysis.items.keys().cloned().collect::<Vec<_>>();
	assert_eq!(ids, (0..4).map(item_id).collect::<Vec<_>>());
	assert_eq!(analysis.next_begin, 4);
}
