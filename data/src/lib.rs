use std::{fs::File, io::BufReader, path::Path};

use anyhow::{Context, Result};

mod catalog;
pub use catalog::*;
mod schema;

impl Catalog {
	/// Load `item_index.json`.
	pub fn load(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let file = File::open(path).with_context(|| format!("Open item index {}", path.display()))?;
		let index: schema::items::ItemIndex = serde_json::from_reader(BufReader::new(file))
			.with_context(|| format!("Parse item index {}", path.display()))?;
		let catalog = Self::from_index(index);
		tracing::info!(items = catalog.len(), path = %path.display(), "loaded item catalog");
		Ok(catalog)
	}

	pub fn from_json(json: &str) -> Result<Self> {
		let index: schema::items::ItemIndex = serde_json::from_str(json).context("Parse item index")?;
		Ok(Self::from_index(index))
	}

	/// Every item gets a name; only depot materials are matchable, ordered as
	/// the game sorts them (`sortId`, ties by id) so neighbors in the grid are
	/// neighbors in the catalog.
	fn from_index(index: schema::items::ItemIndex) -> Self {
		let mut materials = index
			.iter()
			.filter(|(_, item)| item.classify_type == schema::items::MATERIAL)
			.map(|(id, item)| (item.sort_id, id.as_str()))
			.collect::<Vec<_>>();
		materials.sort_unstable();

		let mut catalog = Self::new();
		for (id, item) in &index {
			catalog.add_name(id, &item.name);
		}
		for (_, id) in materials {
			catalog.push(id, &index[id].name);
		}
		catalog
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const INDEX: &str = r#"{
		"30012": { "name": "Orirock Cube", "sortId": 10012, "classifyType": "MATERIAL" },
		"30011": { "name": "Orirock", "sortId": 10011, "classifyType": "MATERIAL" },
		"4001": { "name": "LMD", "sortId": 1, "classifyType": "NONE" },
		"30013": { "name": "Orirock Cluster", "sortId": 10012, "classifyType": "MATERIAL" }
	}"#;

	#[test]
	fn materials_are_ordered_by_sort_id() {
		let catalog = Catalog::from_json(INDEX).unwrap();
		let ids = (0..catalog.len()).filter_map(|i| catalog.get_id_at(i)).collect::<Vec<_>>();
		assert_eq!(ids, vec!["30011", "30012", "30013"]);
	}

	#[test]
	fn non_materials_keep_their_names() {
		let catalog = Catalog::from_json(INDEX).unwrap();
		assert_eq!(catalog.get_name("4001"), Some("LMD"));
		assert_eq!(catalog.len(), 3);
		assert_eq!(catalog.get_name("9999"), None);
	}

	#[test]
	fn implements_item_catalog() {
		use ie::ItemCatalog;

		let catalog = Catalog::from_json(INDEX).unwrap();
		let catalog: &dyn ItemCatalog = &catalog;
		assert_eq!(catalog.len(), 3);
		assert_eq!(catalog.id_at(0), Some("30011"));
		assert_eq!(catalog.item_name("30012"), Some("Orirock Cube"));
		assert_eq!(catalog.id_at(3), None);
	}

	#[test]
	fn malformed_index_is_an_error() {
		assert!(Catalog::from_json(r#"{"1": {"sortId": 1}}"#).is_err());
	}
}
