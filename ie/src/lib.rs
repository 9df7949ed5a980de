mod image;
pub use self::image::*;
mod ocr;
pub use ocr::{Ocr, OcrOptions, OcrRow, Recognize};
mod palette;
pub use palette::*;
mod region;
pub use region::Region;
pub mod counter;
pub use counter::{Counter, CounterReading};

pub mod screen;
pub use screen::dungeon_event::{EventKind, Layout};

pub struct Ie {
	layout: Layout,
	ocr: Box<dyn Recognize>,
}

impl Ie {
	pub fn try_new(
		layout: Layout,
		ocr_detection: impl AsRef<std::path::Path>,
		ocr_recognition: impl AsRef<std::path::Path>,
		ocr_charsset: impl AsRef<std::path::Path>,
		ocr_options: OcrOptions,
	) -> anyhow::Result<Self> {
		let ocr = Ocr::try_new(ocr_detection, ocr_recognition, ocr_charsset, ocr_options)?;
		Ok(Self::with_recognizer(layout, ocr))
	}

	/// Use a custom text recognizer instead of the bundled PaddleOCR engine.
	pub fn with_recognizer(layout: Layout, ocr: impl Recognize + 'static) -> Self {
		Self {
			layout,
			ocr: Box::new(ocr),
		}
	}

	pub fn layout(&self) -> &Layout {
		&self.layout
	}

	pub fn dungeon_has_pinned_character(&self, image: Image) -> bool {
		screen::dungeon_event::has_pinned_character(image, &self.layout)
	}

	pub fn dungeon_has_event(&self, image: Image, kind: EventKind, pinned_active: bool) -> bool {
		screen::dungeon_event::has_event(image, &self.layout, kind, pinned_active)
	}

	/// Checks the pinned banner on the same image before testing the tag.
	pub fn dungeon_detect_event(&self, image: Image, kind: EventKind) -> bool {
		let pinned = kind.is_offset_sensitive() && self.dungeon_has_pinned_character(image);
		self.dungeon_has_event(image, kind, pinned)
	}

	pub fn dungeon_has_event_at_combat(&self, image: Image) -> bool {
		screen::dungeon_event::has_event_in_combat(image, &self.layout, self.layout.combat_remain)
	}

	pub fn dungeon_event_remain(&self, image: Image) -> anyhow::Result<u32> {
		screen::dungeon_event::event_remain(self.ocr.as_ref(), image, &self.layout)
	}

	pub fn dungeon_rogue_remain(&self, image: Image) -> anyhow::Result<u32> {
		screen::dungeon_event::rogue_remain(self.ocr.as_ref(), image, &self.layout)
	}

	pub fn dungeon_event_remain_at_combat(&self, image: Image) -> anyhow::Result<CounterReading> {
		screen::dungeon_event::remain_at_combat(self.ocr.as_ref(), image, &self.layout, self.layout.combat_remain)
	}
}
