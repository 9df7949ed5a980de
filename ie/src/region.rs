/// Axis-aligned rectangle in screen coordinates, `x2`/`y2` exclusive.
///
/// Coordinates refer to the 1280×720 reference layout the game is captured at
/// (see `OwnedImage::resized_h`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Deserialize, serde::Serialize)]
pub struct Region {
	pub x1: u32,
	pub y1: u32,
	pub x2: u32,
	pub y2: u32,
}

impl Region {
	#[inline]
	pub const fn new(x1: u32, y1: u32, x2: u32, y2: u32) -> Self {
		Self { x1, y1, x2, y2 }
	}

	#[inline]
	pub const fn width(&self) -> u32 {
		self.x2.saturating_sub(self.x1)
	}

	#[inline]
	pub const fn height(&self) -> u32 {
		self.y2.saturating_sub(self.y1)
	}

	pub const fn is_empty(&self) -> bool {
		self.width() == 0 || self.height() == 0
	}

	/// Translate by `(dx, dy)`, clamping at the top-left screen edge.
	pub fn offset(&self, dx: i32, dy: i32) -> Self {
		let shift = |v: u32, d: i32| (v as i64 + d as i64).clamp(0, u32::MAX as i64) as u32;
		Self {
			x1: shift(self.x1, dx),
			y1: shift(self.y1, dy),
			x2: shift(self.x2, dx),
			y2: shift(self.y2, dy),
		}
	}

	/// Clip to a `width`×`height` image.
	pub fn clamped(&self, width: u32, height: u32) -> Self {
		let x1 = self.x1.min(width);
		let y1 = self.y1.min(height);
		Self {
			x1,
			y1,
			x2: self.x2.clamp(x1, width),
			y2: self.y2.clamp(y1, height),
		}
	}
}

impl std::fmt::Display for Region {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "({}, {}, {}, {})", self.x1, self.y1, self.x2, self.y2)
	}
}
