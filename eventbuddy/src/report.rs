//! One analysis pass over a captured frame.

use anyhow::Result;
use ie::{Color, CounterReading, EventKind, Ie, Image, Region};
use serde::Serialize;

/// Everything the detectors can tell from a single frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
	pub pinned_character: bool,
	pub calyx: bool,
	pub relic: bool,
	pub rogue: bool,
	pub combat: CounterReading,
	/// Counter of the selected nav item, only read when the caller names one.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub selected_remain: Option<u32>,
}

impl Report {
	pub fn has_event(&self, kind: EventKind) -> bool {
		match kind {
			EventKind::Calyx => self.calyx,
			EventKind::Relic => self.relic,
			EventKind::Rogue => self.rogue,
		}
	}
}

/// Run every detector on `image`.
///
/// `selected` tells which nav item the caller has open; its counter is then
/// read with the single-row reader. Calyx and relic share a counter position.
pub fn analyze(ie: &Ie, image: Image, selected: Option<EventKind>) -> Result<Report> {
	let pinned_character = ie.dungeon_has_pinned_character(image);
	let selected_remain = match selected {
		Some(EventKind::Rogue) => Some(ie.dungeon_rogue_remain(image)?),
		Some(EventKind::Calyx | EventKind::Relic) => Some(ie.dungeon_event_remain(image)?),
		None => None,
	};

	Ok(Report {
		pinned_character,
		calyx: ie.dungeon_has_event(image, EventKind::Calyx, pinned_character),
		relic: ie.dungeon_has_event(image, EventKind::Relic, pinned_character),
		rogue: ie.dungeon_has_event(image, EventKind::Rogue, pinned_character),
		combat: ie.dungeon_event_remain_at_combat(image)?,
		selected_remain,
	})
}

/// Regions sampled for `report`, colored by outcome (green hit, red miss).
pub fn sampled_regions(ie: &Ie, report: &Report) -> Vec<(Region, Color)> {
	const HIT: Color = Color::new(0, 255, 0);
	const MISS: Color = Color::new(255, 0, 0);
	const OCR: Color = Color::new(0, 160, 255);
	let outcome = |hit: bool| if hit { HIT } else { MISS };

	let layout = ie.layout();
	let mut regions = vec![(layout.pinned_character, outcome(report.pinned_character))];
	for kind in EventKind::ALL {
		let region = ie::screen::dungeon_event::event_region(layout, kind, report.pinned_character);
		regions.push((region, outcome(report.has_event(kind))));
	}
	regions.push((layout.combat_remain, outcome(report.combat != CounterReading::Absent)));
	regions.push((layout.event_remain, OCR));
	regions.push((layout.rogue_remain, OCR));
	regions
}
