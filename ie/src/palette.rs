use crate::{Color, Image, Region};

/// One known color signature of an on-screen marker.
///
/// A region "has" the color when at least `count` pixels are at least
/// `threshold` similar to `color` (see [`Color::similarity`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct ColorMatchSpec {
    pub color: Color,
    pub threshold: u8,
    pub count: u32,
}

impl ColorMatchSpec {
    pub const fn new(color: Color, threshold: u8, count: u32) -> Self {
        Self {
            color,
            threshold,
            count,
        }
    }

    pub fn matches(&self, image: Image, region: Region) -> bool {
        image.crop(region).color_count(self.color, self.threshold) >= self.count
    }
}

/// Ordered set of color signatures for one marker.
///
/// Event banners change skin with the season, so a marker is present if any
/// of its palettes shows up. Specs are tried in order and evaluation stops at
/// the first match.
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Deserialize, serde::Serialize)]
#[serde(transparent)]
pub struct Palette(pub Vec<ColorMatchSpec>);

impl Palette {
    pub fn matches(&self, image: Image, region: Region) -> bool {
        self.0.iter().any(|spec| spec.matches(image, region))
    }
}
