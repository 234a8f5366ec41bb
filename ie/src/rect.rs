/// Axis-aligned rectangle in image coordinates.
///
/// Signed so that intermediate geometry (enlarged search regions, spacing
/// derived from two matches) can go negative before being clamped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Deserialize, serde::Serialize)]
pub struct Rect {
	pub x: i32,
	pub y: i32,
	pub width: i32,
	pub height: i32,
}

impl Rect {
	#[inline]
	pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
		Self { x, y, width, height }
	}

	/// Rectangle covering a whole `width`×`height` image.
	pub fn of_size(width: u32, height: u32) -> Self {
		Self::new(0, 0, width as i32, height as i32)
	}

	#[inline]
	pub fn right(&self) -> i32 {
		self.x + self.width
	}

	#[inline]
	pub fn bottom(&self) -> i32 {
		self.y + self.height
	}

	#[inline]
	pub fn is_empty(&self) -> bool {
		self.width <= 0 || self.height <= 0
	}

	/// Whether `other` lies fully inside `self` (edges may touch).
	pub fn contains(&self, other: &Rect) -> bool {
		other.x >= self.x
			&& other.y >= self.y
			&& other.right() <= self.right()
			&& other.bottom() <= self.bottom()
	}

	/// Offset by `offset.x`/`offset.y` and take `offset`'s size.
	///
	/// Used for sub-regions configured relative to a matched rectangle.
	pub fn moved(&self, offset: Rect) -> Self {
		Self::new(self.x + offset.x, self.y + offset.y, offset.width, offset.height)
	}

	pub fn translated(&self, dx: i32, dy: i32) -> Self {
		Self::new(self.x + dx, self.y + dy, self.width, self.height)
	}

	/// Grow by `dx` on the left and right and by `dy` on the top and bottom.
	pub fn enlarged(&self, dx: i32, dy: i32) -> Self {
		Self::new(self.x - dx, self.y - dy, self.width + dx * 2, self.height + dy * 2)
	}

	pub fn intersection(&self, other: &Rect) -> Option<Self> {
		let x1 = self.x.max(other.x);
		let y1 = self.y.max(other.y);
		let x2 = self.right().min(other.right());
		let y2 = self.bottom().min(other.bottom());

		if x2 <= x1 || y2 <= y1 {
			return None;
		}
		Some(Self::new(x1, y1, x2 - x1, y2 - y1))
	}

	/// Smallest rectangle containing both.
	pub fn union(&self, other: &Rect) -> Self {
		let x1 = self.x.min(other.x);
		let y1 = self.y.min(other.y);
		let x2 = self.right().max(other.right());
		let y2 = self.bottom().max(other.bottom());
		Self::new(x1, y1, x2 - x1, y2 - y1)
	}
}

impl From<Rect> for imageproc::rect::Rect {
	fn from(r: Rect) -> Self {
		imageproc::rect::Rect::at(r.x, r.y).of_size(r.width.max(1) as u32, r.height.max(1) as u32)
	}
}
