use std::sync::{
	Arc,
	atomic::{AtomicUsize, Ordering},
};

use ie::{Color, Counter, CounterReading, EventKind, Ie, Image, Layout, OcrRow, OwnedImage, Recognize, Region};

struct Rows(Vec<&'static str>, Arc<AtomicUsize>);

impl Recognize for Rows {
	fn recognize(&self, _image: Image, region: Region) -> anyhow::Result<Vec<OcrRow>> {
		self.1.fetch_add(1, Ordering::SeqCst);
		Ok(self
			.0
			.iter()
			.map(|text| OcrRow {
				text: text.to_string(),
				confidence: 1.0,
				region,
			})
			.collect())
	}
}

/// 1280×720 RGBA screen with the given rectangles painted.
fn screen(patches: &[(Region, Color)]) -> OwnedImage {
	let (w, h) = (1280usize, 720usize);
	let mut bytes = vec![0u8; w * h * 4];
	for px in bytes.chunks_exact_mut(4) {
		px.copy_from_slice(&[24, 26, 33, 255]);
	}
	for (region, color) in patches {
		for y in region.y1..region.y2 {
			for x in region.x1..region.x2 {
				let i = (y as usize * w + x as usize) * 4;
				bytes[i..i + 3].copy_from_slice(&[color.r, color.g, color.b]);
			}
		}
	}
	OwnedImage::from_rgba(w, &bytes)
}

fn ie_with(rows: Vec<&'static str>) -> (Ie, Arc<AtomicUsize>) {
	let calls = Arc::new(AtomicUsize::new(0));
	(Ie::with_recognizer(Layout::default(), Rows(rows, calls.clone())), calls)
}

#[test]
fn detect_event_follows_pinned_banner() {
	let layout = Layout::default();
	let gold = Color::new(252, 209, 123);
	let banner = Color::new(255, 200, 112);
	let (ie, _) = ie_with(vec![]);

	let plain = screen(&[(layout.calyx_tag, gold)]);
	assert!(ie.dungeon_detect_event(plain.as_image(), EventKind::Calyx));

	// With a pinned character the tag has moved down; the old spot is empty.
	let pinned = screen(&[
		(layout.pinned_character, banner),
		(layout.calyx_tag.offset(0, 136), gold),
	]);
	assert!(ie.dungeon_has_pinned_character(pinned.as_image()));
	assert!(ie.dungeon_detect_event(pinned.as_image(), EventKind::Calyx));
	assert!(!ie.dungeon_has_event(pinned.as_image(), EventKind::Calyx, false));
}

#[test]
fn combat_remain_is_gated_by_overlay_colors() {
	let layout = Layout::default();

	let (ie, calls) = ie_with(vec!["noise", "2/3"]);
	let empty = screen(&[]);
	assert_eq!(ie.dungeon_event_remain_at_combat(empty.as_image()).unwrap(), CounterReading::Absent);
	assert_eq!(calls.load(Ordering::SeqCst), 0);

	let overlay = screen(&[(layout.combat_remain, Color::new(231, 188, 103))]);
	assert!(ie.dungeon_has_event_at_combat(overlay.as_image()));
	assert_eq!(
		ie.dungeon_event_remain_at_combat(overlay.as_image()).unwrap(),
		CounterReading::Validated(Counter { remain: 2, total: 3 })
	);
	assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn nav_remain_reads() {
	let (ie, _) = ie_with(vec!["5112"]);
	let img = screen(&[]);
	assert_eq!(ie.dungeon_event_remain(img.as_image()).unwrap(), 5);

	let (ie, _) = ie_with(vec!["3/5"]);
	assert_eq!(ie.dungeon_rogue_remain(img.as_image()).unwrap(), 0);
}
