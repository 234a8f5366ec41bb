use std::collections::HashMap;

// Interned item id or display name
pub type Id = lasso::Spur;

/// Depot item catalog: every item's display name, plus the ordered list of
/// ids the depot analyzer matches against.
pub struct Catalog {
	strings: lasso::Rodeo,

	ordered: Vec<Id>,
	names: HashMap<Id, Id>,
}

impl Default for Catalog {
	fn default() -> Self {
		Self::new()
	}
}

impl Catalog {
	pub fn new() -> Self {
		Self {
			strings: lasso::Rodeo::new(),

			ordered: Vec::new(),
			names: HashMap::new(),
		}
	}

	/// Register a display name without making the item matchable.
	pub fn add_name(&mut self, item_id: &str, name: &str) -> Id {
		let id = self.strings.get_or_intern(item_id);
		let name = self.strings.get_or_intern(name);
		self.names.insert(id, name);
		id
	}

	/// Register an item and append it to the match order.
	pub fn push(&mut self, item_id: &str, name: &str) {
		let id = self.add_name(item_id, name);
		self.ordered.push(id);
	}

	pub fn len(&self) -> usize {
		self.ordered.len()
	}

	pub fn is_empty(&self) -> bool {
		self.ordered.is_empty()
	}

	pub fn get_id_at(&self, index: usize) -> Option<&str> {
		self.ordered.get(index).map(|id| self.strings.resolve(id))
	}

	pub fn get_name(&self, item_id: &str) -> Option<&str> {
		let id = self.strings.get(item_id)?;
		self.strings.try_resolve(self.names.get(&id)?)
	}
}

impl ie::ItemCatalog for Catalog {
	fn len(&self) -> usize {
		self.ordered.len()
	}

	fn id_at(&self, index: usize) -> Option<&str> {
		self.get_id_at(index)
	}

	fn item_name(&self, item_id: &str) -> Option<&str> {
		self.get_name(item_id)
	}
}
