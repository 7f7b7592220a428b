//! Hotspots: rectangles that fire events when the player enters them
//!
//! The table has a fixed number of slots; IDs are assigned by the game.

use crate::colour;
use crate::coords::{Coord, Scale};
use image::Rgb;
use serde::{Deserialize, Serialize};

/// Number of hotspot slots
pub const HOTSPOT_COUNT: usize = 56;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hotspot {
    /// Top-left corner in pixels, a multiple of the warp unit
    pub start: Coord,
    /// Bottom-right corner in pixels, a multiple of the warp unit
    pub end: Coord,
    /// Editor display colour
    pub colour: Rgb<u8>,
    pub comment: String,
}

impl Default for Hotspot {
    fn default() -> Self {
        Self {
            start: Coord::ZERO,
            end: Coord::ZERO,
            colour: Rgb([255, 255, 0]),
            comment: String::new(),
        }
    }
}

impl Hotspot {
    /// Whether `coord` lies inside the rectangle, edges included
    pub fn contains(&self, coord: Coord) -> bool {
        coord.all_ge(self.start) && coord.all_le(self.end)
    }

    /// Width and height in pixels
    pub fn size(&self) -> Coord {
        self.end - self.start
    }
}

/// Persisted hotspot. Corners are warp units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotspotRecord {
    #[serde(rename = "X1")]
    pub x1: i32,
    #[serde(rename = "Y1")]
    pub y1: i32,
    #[serde(rename = "X2")]
    pub x2: i32,
    #[serde(rename = "Y2")]
    pub y2: i32,
    #[serde(
        rename = "Colour",
        default,
        with = "colour::optional_hex",
        skip_serializing_if = "Option::is_none"
    )]
    pub colour: Option<Rgb<u8>>,
    #[serde(rename = "Comment", default, skip_serializing_if = "String::is_empty")]
    pub comment: String,
}

impl From<&HotspotRecord> for Hotspot {
    fn from(record: &HotspotRecord) -> Self {
        Hotspot {
            start: Coord::from_warp(record.x1, record.y1),
            end: Coord::from_warp(record.x2, record.y2),
            colour: record.colour.unwrap_or(Hotspot::default().colour),
            comment: record.comment.clone(),
        }
    }
}

impl From<&Hotspot> for HotspotRecord {
    fn from(hotspot: &Hotspot) -> Self {
        let start = hotspot.start.to_scale(Scale::Warp);
        let end = hotspot.end.to_scale(Scale::Warp);
        HotspotRecord {
            x1: start.x,
            y1: start.y,
            x2: end.x,
            y2: end.y,
            colour: Some(hotspot.colour),
            comment: hotspot.comment.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_uses_elementwise_order() {
        let hotspot = Hotspot {
            start: Coord::new(80, 80),
            end: Coord::new(160, 120),
            ..Default::default()
        };
        assert!(hotspot.contains(Coord::new(80, 120)));
        assert!(!hotspot.contains(Coord::new(200, 100)));
        assert!(!hotspot.contains(Coord::new(100, 60)));
        assert_eq!(hotspot.size(), Coord::new(80, 40));
    }

    #[test]
    fn test_record_yaml() {
        let yaml = "X1: 10\nY1: 20\nX2: 15\nY2: 22\n";
        let record: HotspotRecord = serde_yaml::from_str(yaml).unwrap();
        let hotspot = Hotspot::from(&record);
        assert_eq!(hotspot.start, Coord::new(80, 160));
        assert_eq!(hotspot.end, Coord::new(120, 176));
        assert_eq!(hotspot.colour, Hotspot::default().colour);

        let mut edited = hotspot.clone();
        edited.colour = Rgb([1, 2, 3]);
        edited.comment = "bridge".to_string();
        let text = serde_yaml::to_string(&HotspotRecord::from(&edited)).unwrap();
        assert!(text.contains("#010203"));
        let back: HotspotRecord = serde_yaml::from_str(&text).unwrap();
        assert_eq!(Hotspot::from(&back), edited);
    }
}
