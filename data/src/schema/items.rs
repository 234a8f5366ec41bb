use std::collections::HashMap;

use serde::Deserialize;

/// `classifyType` of entries that live in the depot grid.
pub const MATERIAL: &str = "MATERIAL";

/// `item_index.json`: item id -> item.
pub type ItemIndex = HashMap<String, Item>;

#[derive(Deserialize)]
pub struct Item {
	pub name: String,
	/// Position in the in-game depot; the catalog is ordered by it.
	#[serde(rename = "sortId", default)]
	pub sort_id: i64,
	#[serde(rename = "classifyType", default)]
	pub classify_type: String,
	// pub icon: String,
}
