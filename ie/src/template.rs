//! Template matching.
//!
//! Depot analysis asks "where in this region does item X appear, and how well"
//! a few hundred times per screenshot. The [`TemplateMatcher`] trait is that
//! question; [`TemplateSet`] answers it with `imageproc` over a directory of
//! PNG icons named after their item ids.

use std::{collections::HashMap, path::Path};

use anyhow::{Context, Result};
use image::{GrayImage, ImageBuffer, Luma};
use imageproc::integral_image::{integral_squared_image, sum_image_pixels};
use imageproc::template_matching::{find_extremes, match_template, MatchTemplateMethod};

use crate::{Image, ItemCatalog, OwnedImage, Rect};

/// Best match of a template: its location and a similarity score in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchRect {
	pub rect: Rect,
	pub score: f32,
}

pub trait TemplateMatcher {
	/// Best placement of template `templ` fully inside `roi` (image coordinates).
	///
	/// Returns `None` when the template is unknown, does not fit, or its best
	/// score stays below the matcher's acceptance threshold.
	fn find(&self, image: Image, roi: Rect, templ: &str) -> Option<MatchRect>;
}

/// One icon split into color planes.
struct Template {
	channels: [GrayImage; 3],
	/// Sum of squared intensities over all channels.
	energy: f64,
}

impl Template {
	fn new(image: Image) -> Self {
		let channels = image.to_channel_images();
		let energy = channels
			.iter()
			.flat_map(|c| c.pixels())
			.map(|p| (p.0[0] as f64).powi(2))
			.sum();
		Self { channels, energy }
	}

	fn dimensions(&self) -> (u32, u32) {
		self.channels[0].dimensions()
	}
}

/// Named color templates matched by normalized sum of squared errors, summed
/// over the R, G and B channels.
pub struct TemplateSet {
	templates: HashMap<String, Template>,
	threshold: f32,
}

impl TemplateSet {
	pub fn new(threshold: f32) -> Self {
		Self {
			templates: HashMap::new(),
			threshold,
		}
	}

	/// Load every `*.png` in `dir`; the file stem is the template name.
	pub fn load_dir(dir: impl AsRef<Path>, threshold: f32) -> Result<Self> {
		let dir = dir.as_ref();
		let mut set = Self::new(threshold);

		let entries = std::fs::read_dir(dir).with_context(|| format!("read template dir {}", dir.display()))?;
		for entry in entries {
			let path = entry.with_context(|| format!("list {}", dir.display()))?.path();
			if path.extension().and_then(|e| e.to_str()) != Some("png") {
				continue;
			}
			let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
				continue;
			};
			let img = OwnedImage::open(&path)?;
			set.insert(name, img.as_image());
		}

		tracing::info!(count = set.templates.len(), dir = %dir.display(), "loaded item templates");
		Ok(set)
	}

	pub fn insert(&mut self, name: impl Into<String>, image: Image) {
		self.templates.insert(name.into(), Template::new(image));
	}

	pub fn len(&self) -> usize {
		self.templates.len()
	}

	pub fn is_empty(&self) -> bool {
		self.templates.is_empty()
	}

	/// Catalog ids with no template; they can never be matched.
	pub fn missing<'c>(&self, catalog: &'c dyn ItemCatalog) -> Vec<&'c str> {
		(0..catalog.len())
			.filter_map(|i| catalog.id_at(i))
			.filter(|id| !self.templates.contains_key(*id))
			.collect()
	}
}

impl TemplateMatcher for TemplateSet {
	fn find(&self, image: Image, roi: Rect, templ: &str) -> Option<MatchRect> {
		let Some(template) = self.templates.get(templ) else {
			tracing::trace!(templ, "no template for item");
			return None;
		};

		let region = image.sub_rect(roi)?;
		let roi = roi.intersection(&image.bounds())?;
		let (tw, th) = template.dimensions();
		if region.width() < tw || region.height() < th {
			return None;
		}

		let (ow, oh) = (region.width() - tw + 1, region.height() - th + 1);
		let mut errors = vec![0f64; (ow * oh) as usize];
		let mut energy = vec![0f64; (ow * oh) as usize];
		for (channel, templ_channel) in region.to_channel_images().iter().zip(&template.channels) {
			let sse = match_template(channel, templ_channel, MatchTemplateMethod::SumOfSquaredErrors);
			let squares = integral_squared_image::<_, u64>(channel);
			for (x, y, p) in sse.enumerate_pixels() {
				let i = (y * ow + x) as usize;
				errors[i] += p.0[0] as f64;
				energy[i] += sum_image_pixels(&squares, x, y, x + tw - 1, y + th - 1)[0] as f64;
			}
		}

		let scores: ImageBuffer<Luma<f32>, Vec<f32>> = ImageBuffer::from_fn(ow, oh, |x, y| {
			let i = (y * ow + x) as usize;
			let norm = (energy[i] * template.energy).sqrt();
			Luma([if norm > 0.0 { (errors[i] / norm) as f32 } else { errors[i] as f32 }])
		});
		let extremes = find_extremes(&scores);
		let score = (1.0 - extremes.min_value).clamp(0.0, 1.0);
		tracing::trace!(templ, score, "template score");

		if score < self.threshold {
			return None;
		}

		let (x, y) = extremes.min_value_location;
		Some(MatchRect {
			rect: Rect::new(roi.x + x as i32, roi.y + y as i32, tw as i32, th as i32),
			score,
		})
	}
}
