//! Depot (inventory grid) screen analysis.
//!
//! One screenshot in, one `item id -> ItemInfo` map out:
//!
//! 1. the capture is shrunk to the working resolution the item templates were
//!    authored at,
//! 2. the grid pitch is inferred from an anchor item and its two neighbors,
//! 3. every slot is matched against the catalog (in catalog order),
//! 4. the quantity label under each match is isolated and read,
//! 5. rectangles are mapped back to capture coordinates.
//!
//! The grid layout is not known in advance; three template matches are enough
//! to reconstruct it, so no exhaustive search over the screen is needed.

use std::collections::BTreeMap;

use crate::{Diagnostics, Filter, Image, NoDiagnostics, OwnedImage, Rect, TemplateMatcher, TextRecognizer};

mod config;
pub mod grid;
pub mod quantity;
pub mod slot;

pub use config::*;

/// Ordered, stable list of matchable item ids with their display names.
pub trait ItemCatalog {
	fn len(&self) -> usize;

	fn is_empty(&self) -> bool {
		self.len() == 0
	}

	fn id_at(&self, index: usize) -> Option<&str>;

	fn item_name(&self, item_id: &str) -> Option<&str>;
}

/// `(item_id, item_name)` pairs in catalog order.
impl ItemCatalog for Vec<(String, String)> {
	fn len(&self) -> usize {
		self.as_slice().len()
	}

	fn id_at(&self, index: usize) -> Option<&str> {
		self.get(index).map(|(id, _)| id.as_str())
	}

	fn item_name(&self, item_id: &str) -> Option<&str> {
		self.iter().find(|(id, _)| id == item_id).map(|(_, name)| name.as_str())
	}
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ItemInfo {
	pub item_id: String,
	pub item_name: String,
	/// Slot location. Capture coordinates once returned from [`DepotAnalyzer::analyze`].
	pub rect: Rect,
	pub quantity: u64,
}

/// Recognized items keyed by id. A later slot with the same id replaces the earlier one.
pub type AnalysisResult = BTreeMap<String, ItemInfo>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepotAnalysis {
	pub items: AnalysisResult,
	/// Catalog index to resume from on the next page of the same depot.
	pub next_begin: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum AnalyzeError {
	#[error("no catalog item found in the anchor region")]
	AnchorNotFound,
	#[error("could not locate the neighbors needed to infer the grid pitch")]
	GridNotFound,
	#[error("grid produced no slot inside the working region")]
	NoSlots,
	/// Slots may still have matched; `next_begin` is where the cursor got to.
	#[error("no slot produced an item with a quantity (next begin {next_begin})")]
	NoItems { next_begin: usize },
	#[error(transparent)]
	Image(#[from] anyhow::Error),
}

/// Scale between working space and capture space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMap {
	kx: f64,
	ky: f64,
}

impl CoordinateMap {
	pub fn new(raw_width: u32, raw_height: u32, working: Rect) -> Self {
		Self {
			kx: raw_width as f64 / working.width as f64,
			ky: raw_height as f64 / working.height as f64,
		}
	}

	pub fn to_raw(&self, rect: Rect) -> Rect {
		Rect::new(
			(self.kx * rect.x as f64) as i32,
			(self.ky * rect.y as f64) as i32,
			(self.kx * rect.width as f64) as i32,
			(self.ky * rect.height as f64) as i32,
		)
	}

	pub fn to_working(&self, rect: Rect) -> Rect {
		Rect::new(
			(rect.x as f64 / self.kx).round() as i32,
			(rect.y as f64 / self.ky).round() as i32,
			(rect.width as f64 / self.kx).round() as i32,
			(rect.height as f64 / self.ky).round() as i32,
		)
	}
}

/// Runs the depot pipeline against injected collaborators.
///
/// One instance per screenshot stream; `analyze` takes `&mut self` because the
/// diagnostics sink accumulates state.
pub struct DepotAnalyzer<'a> {
	regions: &'a dyn RegionProvider,
	catalog: &'a dyn ItemCatalog,
	matcher: &'a dyn TemplateMatcher,
	ocr: &'a dyn TextRecognizer,
	diagnostics: Box<dyn Diagnostics + 'a>,
}

impl<'a> DepotAnalyzer<'a> {
	pub fn new(
		regions: &'a dyn RegionProvider,
		catalog: &'a dyn ItemCatalog,
		matcher: &'a dyn TemplateMatcher,
		ocr: &'a dyn TextRecognizer,
	) -> Self {
		Self {
			regions,
			catalog,
			matcher,
			ocr,
			diagnostics: Box::new(NoDiagnostics),
		}
	}

	pub fn with_diagnostics(mut self, diagnostics: impl Diagnostics + 'a) -> Self {
		self.diagnostics = Box::new(diagnostics);
		self
	}

	/// Analyze one capture, matching slots from catalog index `begin`.
	pub fn analyze(&mut self, raw: Image, begin: usize) -> Result<DepotAnalysis, AnalyzeError> {
		let working_region = self.regions.working_region();
		let working = rescale(raw, working_region)?;
		let map = CoordinateMap::new(raw.width(), raw.height(), working_region);

		let result = grid::infer(
			working.as_image(),
			self.matcher,
			self.catalog,
			self.regions.anchor_region(),
			working_region,
			self.diagnostics.as_mut(),
		)
		.and_then(|slots| self.analyze_all_items(working.as_image(), &slots, begin, &map));

		self.diagnostics.finish(working.as_image());
		result
	}

	/// Per-slot driver: match, read the quantity, keep valid items.
	fn analyze_all_items(
		&mut self,
		working: Image,
		slots: &[Rect],
		begin: usize,
		map: &CoordinateMap,
	) -> Result<DepotAnalysis, AnalyzeError> {
		let mut items = AnalysisResult::new();
		let mut cursor = begin;

		for &roi in slots {
			// Slots are ordered top to bottom within a column.
			if slot_is_empty(working, roi) {
				break;
			}

			let Some((index, mut info)) = slot::match_item(working, self.matcher, self.catalog, roi, cursor, true) else {
				tracing::debug!(?roi, cursor, "slot unmatched; assuming end of grid");
				break;
			};
			cursor = index + 1;

			info.quantity = quantity::extract(
				working,
				info.rect,
				self.regions.quantity(),
				self.ocr,
				self.diagnostics.as_mut(),
			);
			info.item_name = self.catalog.item_name(&info.item_id).unwrap_or_default().to_string();
			self.diagnostics.item(info.rect, &info.item_id, info.quantity);

			if info.item_id.is_empty() || info.quantity == 0 {
				tracing::warn!(item_id = %info.item_id, item_name = %info.item_name, "quantity is zero; skipping slot");
				continue;
			}

			tracing::info!(item_id = %info.item_id, item_name = %info.item_name, quantity = info.quantity, "depot item");
			info.rect = map.to_raw(info.rect);
			items.insert(info.item_id.clone(), info);
		}

		if items.is_empty() {
			return Err(AnalyzeError::NoItems { next_begin: cursor });
		}
		Ok(DepotAnalysis { items, next_begin: cursor })
	}
}

/// Shrink the capture to the working region's size.
fn rescale(raw: Image, working_region: Rect) -> Result<OwnedImage, AnalyzeError> {
	let owned = raw.to_owned_image();
	let working = owned.resized(working_region.width.max(1) as u32, working_region.height.max(1) as u32, Filter::Area)?;
	Ok(working)
}

/// Early end-of-grid probe. No reliable emptiness signal is known, so every
/// slot counts as occupied and the loop ends on the first unmatched slot instead.
fn slot_is_empty(_working: Image, _roi: Rect) -> bool {
	false
}
