use crate::{Image, Rect, TemplateMatcher};

use super::{ItemCatalog, ItemInfo};

/// Catalog neighbors are often the same item family and look alike, so after
/// the first hit a few more entries are tried.
pub const EXTRA_MATCHES: usize = 8;

/// Margin absorbing ±1 px errors of the estimated grid pitch.
const ENLARGE_X: i32 = 20;
const ENLARGE_Y: i32 = 5;

/// Find the catalog entry that best matches inside `roi`, scanning from `begin`.
///
/// Returns the winning catalog index together with the match (`item_name` and
/// `quantity` are left empty). Equal scores go to the later entry.
pub fn match_item(
	image: Image,
	matcher: &dyn TemplateMatcher,
	catalog: &dyn ItemCatalog,
	roi: Rect,
	begin: usize,
	enlarge: bool,
) -> Option<(usize, ItemInfo)> {
	let roi = if enlarge { roi.enlarged(ENLARGE_X, ENLARGE_Y) } else { roi };
	let roi = roi.intersection(&image.bounds())?;

	let mut first_hit: Option<usize> = None;
	let mut best: Option<(usize, &str, crate::MatchRect)> = None;

	for index in begin..catalog.len() {
		if first_hit.is_some_and(|first| index > first + EXTRA_MATCHES) {
			break;
		}
		let Some(item_id) = catalog.id_at(index) else {
			continue;
		};
		let Some(matched) = matcher.find(image, roi, item_id) else {
			continue;
		};

		first_hit.get_or_insert(index);
		if best.is_none_or(|(_, _, b)| matched.score >= b.score) {
			best = Some((index, item_id, matched));
		}
	}

	let (index, item_id, matched) = best?;
	tracing::debug!(item_id, index, score = matched.score, "matched item");
	Some((
		index,
		ItemInfo {
			item_id: item_id.to_string(),
			item_name: String::new(),
			rect: matched.rect,
			quantity: 0,
		},
	))
}
