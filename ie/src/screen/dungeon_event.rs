//! Double reward event detection on the Survival Index and combat prepare screens.
//!
//! Event tags in the Survival Index nav list are detected purely by color; the
//! remaining-uses counter is read with OCR once the caller has selected the
//! right nav item (or, at combat prepare, once the combat overlay is confirmed
//! to be on screen).
//!
//! All coordinates are for the 1280×720 reference layout.

use anyhow::Result;

use crate::{
	Color, ColorMatchSpec, CounterReading, Image, Palette, Recognize, Region, counter,
};

/// Double reward event categories shown in the Survival Index nav list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
	Calyx,
	Relic,
	Rogue,
}

impl EventKind {
	pub const ALL: [Self; 3] = [Self::Calyx, Self::Relic, Self::Rogue];

	/// Whether the pinned character banner pushes this tag down the nav list.
	///
	/// Relic is not: with a pinned character its tag scrolls out of the list and
	/// there is no known position to sample, so its base region is used as is.
	pub const fn is_offset_sensitive(self) -> bool {
		matches!(self, Self::Calyx | Self::Rogue)
	}

	pub const fn name(self) -> &'static str {
		match self {
			Self::Calyx => "Double calyx",
			Self::Relic => "Double relic",
			Self::Rogue => "Double rogue",
		}
	}
}

/// Screen regions and color signatures used by the detectors.
///
/// Defaults are measured on the reference layout; every field can be
/// overridden from the app config when the game shifts its UI.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct Layout {
	pub calyx_tag: Region,
	pub relic_tag: Region,
	pub rogue_tag: Region,
	/// Displacement of offset-sensitive tags while a character is pinned.
	pub pinned_offset: (i32, i32),
	pub pinned_character: Region,
	pub pinned_palette: Palette,
	/// Tag skins: two regular palettes and the anniversary override.
	pub event_palette: Palette,
	pub event_remain: Region,
	pub rogue_remain: Region,
	pub combat_remain: Region,
	/// The combat overlay renders larger glyphs, hence the larger pixel count.
	pub combat_palette: Palette,
}

const ANNIVERSARY_RED: Color = Color::new(229, 62, 44);

impl Default for Layout {
	fn default() -> Self {
		Self {
			calyx_tag: Region::new(203, 372, 235, 390),
			relic_tag: Region::new(203, 446, 235, 464),
			rogue_tag: Region::new(203, 300, 235, 318),
			pinned_offset: (0, 136),
			pinned_character: Region::new(96, 238, 300, 262),
			pinned_palette: Palette(vec![ColorMatchSpec::new(Color::new(255, 200, 112), 221, 200)]),
			event_palette: Palette(vec![
				ColorMatchSpec::new(Color::new(252, 209, 123), 221, 50),
				ColorMatchSpec::new(Color::new(252, 251, 140), 221, 50),
				ColorMatchSpec::new(ANNIVERSARY_RED, 221, 50),
			]),
			event_remain: Region::new(1052, 196, 1200, 226),
			rogue_remain: Region::new(1052, 252, 1200, 282),
			combat_remain: Region::new(1020, 560, 1240, 610),
			combat_palette: Palette(vec![
				ColorMatchSpec::new(Color::new(231, 188, 103), 240, 1000),
				ColorMatchSpec::new(ANNIVERSARY_RED, 221, 50),
			]),
		}
	}
}

impl Layout {
	pub fn tag_region(&self, kind: EventKind) -> Region {
		match kind {
			EventKind::Calyx => self.calyx_tag,
			EventKind::Relic => self.relic_tag,
			EventKind::Rogue => self.rogue_tag,
		}
	}
}

/// Region to sample for `kind`, accounting for the pinned character banner.
pub fn event_region(layout: &Layout, kind: EventKind, pinned_active: bool) -> Region {
	let base = layout.tag_region(kind);
	if pinned_active && kind.is_offset_sensitive() {
		let (dx, dy) = layout.pinned_offset;
		base.offset(dx, dy)
	} else {
		base
	}
}

pub fn has_pinned_character(image: Image, layout: &Layout) -> bool {
	let has = layout.pinned_palette.matches(image, layout.pinned_character);
	tracing::debug!(has, "pinned character");
	has
}

/// Pages: Survival Index with the nav list scrolled to the top.
pub fn has_event(image: Image, layout: &Layout, kind: EventKind, pinned_active: bool) -> bool {
	let region = event_region(layout, kind, pinned_active);
	let has = layout.event_palette.matches(image, region);
	tracing::info!(event = kind.name(), has, %region, "event presence");
	has
}

/// Pages: combat prepare.
pub fn has_event_in_combat(image: Image, layout: &Layout, region: Region) -> bool {
	let has = layout.combat_palette.matches(image, region);
	tracing::info!(has, %region, "double event at combat");
	has
}

/// Pages: Survival Index, the nav item with a calyx or relic event selected.
pub fn event_remain(ocr: &dyn Recognize, image: Image, layout: &Layout) -> Result<u32> {
	let remain = counter::read_remain(ocr, image, layout.event_remain)?;
	tracing::info!(remain, "double event remain");
	Ok(remain)
}

/// Pages: Survival Index, the nav item with a rogue event selected.
pub fn rogue_remain(ocr: &dyn Recognize, image: Image, layout: &Layout) -> Result<u32> {
	let remain = counter::read_remain(ocr, image, layout.rogue_remain)?;
	tracing::info!(remain, "double rogue remain");
	Ok(remain)
}

/// Pages: combat prepare.
///
/// OCR only runs when the overlay's colors are present; a missing overlay is
/// `Absent`, an overlay whose counter cannot be trusted is `Unknown`.
pub fn remain_at_combat(
	ocr: &dyn Recognize,
	image: Image,
	layout: &Layout,
	region: Region,
) -> Result<CounterReading> {
	if !has_event_in_combat(image, layout, region) {
		tracing::info!(remain = 0, "double event remain at combat");
		return Ok(CounterReading::Absent);
	}

	let rows = ocr.recognize(image, region)?;
	let reading = counter::resolve_rows(&rows);
	match reading.remain() {
		Some(remain) => tracing::info!(remain, "double event remain at combat"),
		None => {
			let texts = rows.iter().map(|r| r.text.as_str()).collect::<Vec<_>>();
			tracing::warn!(?texts, "double event appears but failed to get remain");
		}
	}
	Ok(reading)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{Counter, OwnedImage, counter::tests::ScriptedOcr};

	const BACKGROUND: Color = Color::new(38, 40, 52);
	const GOLD: Color = Color::new(252, 209, 123);
	const YELLOW: Color = Color::new(252, 251, 140);
	const COMBAT_GOLD: Color = Color::new(231, 188, 103);

	fn blank() -> OwnedImage {
		OwnedImage::new(1280, 720, BACKGROUND)
	}

	fn with_tag(region: Region, color: Color) -> OwnedImage {
		let mut img = blank();
		img.fill(region, color);
		img
	}

	#[test]
	fn region_offset_applies_only_to_sensitive_kinds() {
		let layout = Layout::default();
		for kind in EventKind::ALL {
			let base = layout.tag_region(kind);
			assert_eq!(event_region(&layout, kind, false), base);

			let pinned = event_region(&layout, kind, true);
			if kind.is_offset_sensitive() {
				assert_eq!(pinned, Region::new(base.x1, base.y1 + 136, base.x2, base.y2 + 136));
			} else {
				assert_eq!(pinned, base);
			}
		}
	}

	#[test]
	fn detects_each_palette_variant() {
		let layout = Layout::default();
		for color in [GOLD, YELLOW, ANNIVERSARY_RED] {
			let img = with_tag(layout.calyx_tag, color);
			assert!(has_event(img.as_image(), &layout, EventKind::Calyx, false), "{color:?}");
			assert!(!has_event(img.as_image(), &layout, EventKind::Rogue, false));
			assert!(!has_event(img.as_image(), &layout, EventKind::Relic, false));
		}
	}

	#[test]
	fn unknown_colors_are_not_events() {
		let layout = Layout::default();
		let img = with_tag(layout.calyx_tag, Color::new(90, 160, 230));
		assert!(!has_event(img.as_image(), &layout, EventKind::Calyx, false));
		assert!(!has_event(blank().as_image(), &layout, EventKind::Calyx, false));
	}

	#[test]
	fn pinned_banner_moves_where_the_tag_is_sampled() {
		let layout = Layout::default();
		let shifted = layout.rogue_tag.offset(0, 136);
		let img = with_tag(shifted, GOLD);

		assert!(has_event(img.as_image(), &layout, EventKind::Rogue, true));
		assert!(!has_event(img.as_image(), &layout, EventKind::Rogue, false));
	}

	#[test]
	fn relic_ignores_pinned_banner() {
		let layout = Layout::default();
		let img = with_tag(layout.relic_tag, GOLD);
		assert!(has_event(img.as_image(), &layout, EventKind::Relic, true));
		assert!(has_event(img.as_image(), &layout, EventKind::Relic, false));
	}

	#[test]
	fn pinned_character_detection() {
		let layout = Layout::default();
		let img = with_tag(layout.pinned_character, Color::new(255, 200, 112));
		assert!(has_pinned_character(img.as_image(), &layout));
		assert!(!has_pinned_character(blank().as_image(), &layout));
	}

	#[test]
	fn combat_gate_needs_large_glyph_count() {
		let layout = Layout::default();
		let region = layout.combat_remain;

		// 40x20 = 800 pixels, under the 1000 pixel minimum.
		let small = with_tag(Region::new(region.x1, region.y1, region.x1 + 40, region.y1 + 20), COMBAT_GOLD);
		assert!(!has_event_in_combat(small.as_image(), &layout, region));

		let large = with_tag(Region::new(region.x1, region.y1, region.x1 + 50, region.y1 + 20), COMBAT_GOLD);
		assert!(has_event_in_combat(large.as_image(), &layout, region));

		let anniversary = with_tag(Region::new(region.x1, region.y1, region.x1 + 10, region.y1 + 5), ANNIVERSARY_RED);
		assert!(has_event_in_combat(anniversary.as_image(), &layout, region));
	}

	#[test]
	fn combat_read_skips_ocr_when_overlay_is_absent() {
		let layout = Layout::default();
		let ocr = ScriptedOcr::new(&["3/3"]);
		let reading = remain_at_combat(&ocr, blank().as_image(), &layout, layout.combat_remain).unwrap();
		assert_eq!(reading, CounterReading::Absent);
		assert_eq!(reading.remain(), Some(0));
		assert_eq!(ocr.calls(), 0);
	}

	#[test]
	fn combat_read_takes_first_valid_row() {
		let layout = Layout::default();
		let img = with_tag(layout.combat_remain, COMBAT_GOLD);

		let ocr = ScriptedOcr::new(&["garbage", "3/3"]);
		let reading = remain_at_combat(&ocr, img.as_image(), &layout, layout.combat_remain).unwrap();
		assert_eq!(reading, CounterReading::Validated(Counter { remain: 3, total: 3 }));
		assert_eq!(ocr.calls(), 1);
	}

	#[test]
	fn combat_read_reports_unknown_when_nothing_validates() {
		let layout = Layout::default();
		let img = with_tag(layout.combat_remain, COMBAT_GOLD);

		let ocr = ScriptedOcr::new(&["7/9", "double", "5/13"]);
		let reading = remain_at_combat(&ocr, img.as_image(), &layout, layout.combat_remain).unwrap();
		assert_eq!(reading, CounterReading::Unknown);
		assert_eq!(reading.remain(), None);
	}

	#[test]
	fn nav_remain_reads_fall_back_to_zero() {
		let layout = Layout::default();
		let img = blank();

		assert_eq!(event_remain(&ScriptedOcr::new(&["812"]), img.as_image(), &layout).unwrap(), 8);
		assert_eq!(rogue_remain(&ScriptedOcr::new(&["2/4"]), img.as_image(), &layout).unwrap(), 2);
		assert_eq!(event_remain(&ScriptedOcr::new(&["8/13"]), img.as_image(), &layout).unwrap(), 0);
	}

	#[test]
	fn layout_round_trips_through_partial_json() {
		let layout: Layout = serde_json::from_str(r#"{"pinned_offset": [0, 120]}"#).unwrap();
		assert_eq!(layout.pinned_offset, (0, 120));
		assert_eq!(layout.calyx_tag, Layout::default().calyx_tag);
	}
}
