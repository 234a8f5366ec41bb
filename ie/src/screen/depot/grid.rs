use crate::{Diagnostics, Image, Rect, TemplateMatcher};

use super::{slot, AnalyzeError, ItemCatalog};

/// Grid pitch derived from the anchor and its two neighbors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
	pub anchor: Rect,
	pub horizontal_spacing: i32,
	pub vertical_spacing: i32,
}

/// Locate the anchor and its neighbors below and to the right, then tile the
/// working region into candidate slots.
pub fn infer(
	image: Image,
	matcher: &dyn TemplateMatcher,
	catalog: &dyn ItemCatalog,
	anchor_region: Rect,
	working_region: Rect,
	diagnostics: &mut dyn Diagnostics,
) -> Result<Vec<Rect>, AnalyzeError> {
	let (anchor_index, anchor) =
		slot::match_item(image, matcher, catalog, anchor_region, 0, false).ok_or(AnalyzeError::AnchorNotFound)?;
	let Rect { x, y, width: w, height: h } = anchor.rect;
	diagnostics.anchor(anchor.rect);

	// Two cell heights always hold one full neighbor plus part of the next.
	let below_region = Rect::new(x, y + h, w, h * 2);
	let (below_index, below) = slot::match_item(image, matcher, catalog, below_region, anchor_index + 1, true)
		.ok_or(AnalyzeError::GridNotFound)?;
	diagnostics.neighbor(below.rect);

	let right_region = Rect::new(x + w, y, w * 2, h);
	let (_, right) = slot::match_item(image, matcher, catalog, right_region, below_index + 1, true)
		.ok_or(AnalyzeError::GridNotFound)?;
	diagnostics.neighbor(right.rect);

	let grid = Grid {
		anchor: anchor.rect,
		horizontal_spacing: right.rect.x - (x + w),
		vertical_spacing: below.rect.y - (y + h),
	};
	tracing::info!(
		anchor = %anchor.item_id,
		w,
		h,
		horizontal_spacing = grid.horizontal_spacing,
		vertical_spacing = grid.vertical_spacing,
		"inferred depot grid"
	);

	let slots = grid.tile(image.width(), image.height(), working_region)?;
	for slot in &slots {
		diagnostics.slot(*slot);
	}
	Ok(slots)
}

impl Grid {
	/// Slots stepping from the anchor by one pitch at a time, column by column.
	///
	/// Only slots fully inside `region` are kept.
	pub fn tile(&self, image_width: u32, image_height: u32, region: Rect) -> Result<Vec<Rect>, AnalyzeError> {
		let Rect { x, y, width: w, height: h } = self.anchor;
		let step_x = w + self.horizontal_spacing;
		let step_y = h + self.vertical_spacing;
		if step_x <= 0 || step_y <= 0 {
			return Err(AnalyzeError::GridNotFound);
		}

		let mut slots = Vec::new();
		let mut sx = x;
		while sx <= image_width as i32 {
			let mut sy = y;
			while sy <= image_height as i32 {
				let slot = Rect::new(sx, sy, w, h);
				if region.contains(&slot) {
					slots.push(slot);
				}
				sy += step_y;
			}
			sx += step_x;
		}

		if slots.is_empty() {
			return Err(AnalyzeError::NoSlots);
		}
		Ok(slots)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn grid(anchor: Rect, hs: i32, vs: i32) -> Grid {
		Grid {
			anchor,
			horizontal_spacing: hs,
			vertical_spacing: vs,
		}
	}

	#[test]
	fn tiles_column_major() {
		let slots = grid(Rect::new(8, 8, 32, 32), 12, 16)
			.tile(160, 160, Rect::of_size(160, 160))
			.unwrap();
		assert_eq!(slots.len(), 9);
		assert_eq!(slots[0], Rect::new(8, 8, 32, 32));
		assert_eq!(slots[1], Rect::new(8, 56, 32, 32));
		assert_eq!(slots[3], Rect::new(52, 8, 32, 32));
		assert_eq!(slots[8], Rect::new(96, 104, 32, 32));
	}

	#[test]
	fn tiles_never_leave_the_region() {
		let region = Rect::new(0, 0, 300, 200);
		for ax in [0, 3, 17, 150, 268] {
			for ay in [0, 5, 40, 168] {
				for hs in -10..=30 {
					for vs in -10..=30 {
						let Ok(slots) = grid(Rect::new(ax, ay, 32, 32), hs, vs).tile(300, 200, region) else {
							continue;
						};
						for s in slots {
							assert!(region.contains(&s), "{s:?} escapes with spacing ({hs}, {vs})");
						}
					}
				}
			}
		}
	}

	#[test]
	fn offset_region_filters_slots() {
		let region = Rect::new(50, 0, 110, 160);
		let slots = grid(Rect::new(8, 8, 32, 32), 12, 16).tile(160, 160, region).unwrap();
		assert!(slots.iter().all(|s| s.x >= 50));
		assert_eq!(slots.len(), 6);
	}

	#[test]
	fn degenerate_pitch_is_rejected() {
		let g = grid(Rect::new(8, 8, 32, 32), -32, 16);
		assert!(matches!(g.tile(160, 160, Rect::of_size(160, 160)), Err(AnalyzeError::GridNotFound)));
	}

	#[test]
	fn anchor_outside_region_gives_no_slots() {
		let g = grid(Rect::new(150, 150, 32, 32), 4, 4);
		assert!(matches!(g.tile(160, 160, Rect::of_size(160, 160)), Err(AnalyzeError::NoSlots)));
	}
}
