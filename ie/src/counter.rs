//! `remain/total` counter recovery from noisy OCR text.
//!
//! The engine regularly drops the `/` between the two digit groups, and the
//! only totals that exist in the game are a handful of fixed values, so each
//! reading goes through glyph cleanup, two separator-repair rules, a
//! structural match and an allow-list check before it is trusted.

use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;

use crate::{Image, Recognize, Region, ocr::OcrRow};

/// Every total a double event counter can show.
///
/// - 3: double relic
/// - 4: double rogue on a homecoming account
/// - 6: double calyx on a beginner account
/// - 12: double calyx
/// - 42: double calyx on a homecoming account
pub const VALID_TOTALS: [u32; 5] = [3, 4, 6, 12, 42];

static COUNTER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)/(\d+)").expect("regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Counter {
	pub remain: u32,
	pub total: u32,
}

/// Outcome of a counter read that has to keep "none left" apart from "could not read".
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CounterReading {
	Validated(Counter),
	/// The marker is on screen but no row produced a trusted counter.
	Unknown,
	/// The marker is not on screen; nothing was read.
	Absent,
}

impl CounterReading {
	/// Remaining uses, `Some(0)` when absent and `None` when unreadable.
	pub fn remain(&self) -> Option<u32> {
		match self {
			Self::Validated(counter) => Some(counter.remain),
			Self::Absent => Some(0),
			Self::Unknown => None,
		}
	}
}

/// Drop whitespace and fold full-width digits and slash to ASCII.
pub fn clean_glyphs(text: &str) -> String {
	text.chars()
		.filter(|c| !c.is_whitespace())
		.map(|c| match c {
			'０'..='９' => char::from(b'0' + (c as u32 - '０' as u32) as u8),
			'／' => '/',
			_ => c,
		})
		.collect()
}

/// `x12 -> x/12`, where `x` is the whole digit run in front of the trailing
/// `12` and has no `1` after its first digit. `x112` is left to
/// [`rewrite_trailing_one_twelve`].
pub fn split_trailing_twelve(text: &str) -> String {
	let Some(head) = text.strip_suffix("12") else {
		return text.to_owned();
	};
	let run_start = head
		.char_indices()
		.rev()
		.find(|(_, c)| !c.is_ascii_digit())
		.map_or(0, |(i, c)| i + c.len_utf8());
	let run = &head[run_start..];

	if run.is_empty() || run[1..].contains('1') {
		return text.to_owned();
	}
	format!("{head}/12")
}

/// `x112 -> x/12` when no separator survived; the `1` is the misread slash.
pub fn rewrite_trailing_one_twelve(text: &str) -> String {
	if text.contains('/') {
		return text.to_owned();
	}
	match text.strip_suffix("112") {
		Some(head) => format!("{head}/12"),
		None => text.to_owned(),
	}
}

/// Glyph cleanup followed by both separator rules, in that order.
pub fn normalize(text: &str) -> String {
	let text = clean_glyphs(text);
	let text = split_trailing_twelve(&text);
	rewrite_trailing_one_twelve(&text)
}

/// First `<digits>/<digits>` in the text.
pub fn parse_counter(text: &str) -> Option<Counter> {
	let caps = COUNTER_RE.captures(text)?;
	let remain = caps[1].parse::<u32>().ok()?;
	let total = caps[2].parse::<u32>().ok()?;
	Some(Counter { remain, total })
}

#[inline]
pub fn is_valid_total(total: u32) -> bool {
	VALID_TOTALS.contains(&total)
}

/// Normalize, parse and validate one raw row.
///
/// A remain above its total can't be on screen and is treated as a misread.
pub fn read_counter(raw: &str) -> Option<Counter> {
	parse_counter(&normalize(raw)).filter(|c| is_valid_total(c.total) && c.remain <= c.total)
}

/// First row, in engine order, that yields a trusted counter.
pub fn first_valid_counter(rows: &[OcrRow]) -> Option<Counter> {
	rows.iter().find_map(|row| {
		let counter = read_counter(&row.text);
		if counter.is_none() {
			tracing::debug!(text = %row.text, "skipping counter row");
		}
		counter
	})
}

/// Single-row read for when the counter is known to be on screen.
///
/// Only the first row is considered. An untrusted reading degrades to 0 with a
/// warning instead of failing; engine errors still propagate.
pub fn read_remain(ocr: &dyn Recognize, image: Image, region: Region) -> Result<u32> {
	let rows = ocr.recognize(image, region)?;
	let raw = rows.first().map(|row| row.text.as_str()).unwrap_or_default();

	match read_counter(raw) {
		Some(counter) => Ok(counter.remain),
		None => {
			tracing::warn!(text = %raw, normalized = %normalize(raw), "invalid double event remain");
			Ok(0)
		}
	}
}

/// Multi-row read: the first trusted row wins, otherwise `Unknown`.
pub fn resolve_rows(rows: &[OcrRow]) -> CounterReading {
	match first_valid_counter(rows) {
		Some(counter) => CounterReading::Validated(counter),
		None => CounterReading::Unknown,
	}
}
