//! Map coordinates and scale conversion
//!
//! All positions are stored in pixels. The map is addressed at six fixed
//! scales; converting *to* a scale truncates, converting *from* a scale
//! multiplies back out.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

/// Map width in pixels
pub const MAP_WIDTH: i32 = 8192;
/// Map height in pixels
pub const MAP_HEIGHT: i32 = 10240;

/// A coordinate scale with its x/y divisors in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scale {
    Pixel,
    /// 8 px, used by warps, hotspots and triggers
    Warp,
    /// 32 px map tiles
    Tile,
    /// 64 px enemy placement cells
    Enemy,
    /// 256 x 128 px sectors
    Sector,
    /// 256 x 256 px cells used by the sparse NPC/trigger resources
    Bisector,
}

impl Scale {
    /// Horizontal divisor in pixels
    pub const fn x_factor(self) -> i32 {
        match self {
            Scale::Pixel => 1,
            Scale::Warp => 8,
            Scale::Tile => 32,
            Scale::Enemy => 64,
            Scale::Sector => 256,
            Scale::Bisector => 256,
        }
    }

    /// Vertical divisor in pixels
    pub const fn y_factor(self) -> i32 {
        match self {
            Scale::Pixel => 1,
            Scale::Warp => 8,
            Scale::Tile => 32,
            Scale::Enemy => 64,
            Scale::Sector => 128,
            Scale::Bisector => 256,
        }
    }

    /// Number of cells at this scale across the whole map
    pub const fn grid_size(self) -> (i32, i32) {
        (MAP_WIDTH / self.x_factor(), MAP_HEIGHT / self.y_factor())
    }

    pub fn all() -> &'static [Scale] {
        &[
            Scale::Pixel,
            Scale::Warp,
            Scale::Tile,
            Scale::Enemy,
            Scale::Sector,
            Scale::Bisector,
        ]
    }
}

/// A pixel-space coordinate.
///
/// Ordering helpers (`all_gt`, `all_ge`, ...) compare both components and
/// AND the results. They are not a total order: `(5, 1)` is neither greater
/// nor less than `(3, 3)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const ZERO: Coord = Coord { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Build a pixel coordinate from a position expressed at `scale`
    pub const fn from_scale(scale: Scale, x: i32, y: i32) -> Self {
        Self {
            x: x * scale.x_factor(),
            y: y * scale.y_factor(),
        }
    }

    /// Express this coordinate at `scale` (truncating division)
    pub const fn to_scale(self, scale: Scale) -> Coord {
        Coord {
            x: self.x / scale.x_factor(),
            y: self.y / scale.y_factor(),
        }
    }

    /// Drop the remainder below `scale`
    pub const fn round_to(self, scale: Scale) -> Coord {
        let scaled = self.to_scale(scale);
        Coord::from_scale(scale, scaled.x, scaled.y)
    }

    pub const fn from_warp(x: i32, y: i32) -> Self {
        Self::from_scale(Scale::Warp, x, y)
    }

    pub const fn from_tile(x: i32, y: i32) -> Self {
        Self::from_scale(Scale::Tile, x, y)
    }

    pub const fn from_enemy(x: i32, y: i32) -> Self {
        Self::from_scale(Scale::Enemy, x, y)
    }

    pub const fn from_sector(x: i32, y: i32) -> Self {
        Self::from_scale(Scale::Sector, x, y)
    }

    pub const fn from_bisector(x: i32, y: i32) -> Self {
        Self::from_scale(Scale::Bisector, x, y)
    }

    pub const fn to_warp(self) -> Coord {
        self.to_scale(Scale::Warp)
    }

    pub const fn to_tile(self) -> Coord {
        self.to_scale(Scale::Tile)
    }

    pub const fn to_enemy(self) -> Coord {
        self.to_scale(Scale::Enemy)
    }

    pub const fn to_sector(self) -> Coord {
        self.to_scale(Scale::Sector)
    }

    pub const fn to_bisector(self) -> Coord {
        self.to_scale(Scale::Bisector)
    }

    /// Clamp both components into the map, `[0, width - 1] x [0, height - 1]`
    pub fn clamp_to_map(self) -> Coord {
        Coord {
            x: self.x.clamp(0, MAP_WIDTH - 1),
            y: self.y.clamp(0, MAP_HEIGHT - 1),
        }
    }

    /// Whether the coordinate lies inside the map
    pub fn in_map(self) -> bool {
        (0..MAP_WIDTH).contains(&self.x) && (0..MAP_HEIGHT).contains(&self.y)
    }

    /// `self.x > other.x && self.y > other.y`
    pub fn all_gt(self, other: Coord) -> bool {
        self.x > other.x && self.y > other.y
    }

    /// `self.x < other.x && self.y < other.y`
    pub fn all_lt(self, other: Coord) -> bool {
        self.x < other.x && self.y < other.y
    }

    /// `self.x >= other.x && self.y >= other.y`
    pub fn all_ge(self, other: Coord) -> bool {
        self.x >= other.x && self.y >= other.y
    }

    /// `self.x <= other.x && self.y <= other.y`
    pub fn all_le(self, other: Coord) -> bool {
        self.x <= other.x && self.y <= other.y
    }
}

impl Add for Coord {
    type Output = Coord;

    fn add(self, rhs: Coord) -> Coord {
        Coord::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Coord {
    type Output = Coord;

    fn sub(self, rhs: Coord) -> Coord {
        Coord::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul for Coord {
    type Output = Coord;

    fn mul(self, rhs: Coord) -> Coord {
        Coord::new(self.x * rhs.x, self.y * rhs.y)
    }
}

impl Mul<i32> for Coord {
    type Output = Coord;

    fn mul(self, rhs: i32) -> Coord {
        Coord::new(self.x * rhs, self.y * rhs)
    }
}

impl From<(i32, i32)> for Coord {
    fn from((x, y): (i32, i32)) -> Self {
        Coord::new(x, y)
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sector_scale_is_asymmetric() {
        let c = Coord::new(300, 300);
        assert_eq!(c.to_sector(), Coord::new(1, 2));
        assert_eq!(Coord::from_sector(1, 2), Coord::new(256, 256));
        assert_eq!(c.round_to(Scale::Sector), Coord::new(256, 256));
    }

    #[test]
    fn test_grid_sizes() {
        assert_eq!(Scale::Tile.grid_size(), (256, 320));
        assert_eq!(Scale::Sector.grid_size(), (32, 80));
        assert_eq!(Scale::Enemy.grid_size(), (128, 160));
        assert_eq!(Scale::Bisector.grid_size(), (32, 40));
    }

    #[test]
    fn test_round_to_is_idempotent() {
        let samples = [
            Coord::new(0, 0),
            Coord::new(7, 9),
            Coord::new(255, 127),
            Coord::new(1000, 4097),
            Coord::new(8191, 10239),
        ];
        for &scale in Scale::all() {
            for &c in &samples {
                let rounded = c.round_to(scale);
                assert_eq!(rounded.round_to(scale), rounded);
                let scaled = rounded.to_scale(scale);
                assert_eq!(Coord::from_scale(scale, scaled.x, scaled.y), rounded);
            }
        }
    }

    #[test]
    fn test_clamp_to_map() {
        assert_eq!(Coord::new(-5, 20).clamp_to_map(), Coord::new(0, 20));
        assert_eq!(
            Coord::new(9000, 20000).clamp_to_map(),
            Coord::new(MAP_WIDTH - 1, MAP_HEIGHT - 1)
        );
        assert!(Coord::new(8191, 0).in_map());
        assert!(!Coord::new(8192, 0).in_map());
    }

    #[test]
    fn test_arithmetic() {
        let a = Coord::new(3, 4);
        let b = Coord::new(1, 2);
        assert_eq!(a + b, Coord::new(4, 6));
        assert_eq!(a - b, Coord::new(2, 2));
        assert_eq!(a * b, Coord::new(3, 8));
        assert_eq!(a * 2, Coord::new(6, 8));
    }

    #[test]
    fn test_ordering_is_elementwise_and() {
        let a = Coord::new(5, 1);
        let b = Coord::new(3, 3);
        // Neither dominates the other.
        assert!(!a.all_gt(b));
        assert!(!a.all_lt(b));
        assert!(!b.all_gt(a));
        assert!(!b.all_lt(a));

        assert!(Coord::new(5, 5).all_gt(b));
        assert!(Coord::new(3, 5).all_ge(b));
        assert!(!Coord::new(3, 5).all_gt(b));
        assert!(Coord::new(3, 3).all_le(b));
    }

    #[test]
    fn test_bounding_box_root_by_le_depends_on_visit_order() {
        // Picking a "top-left-most" point with all_le only replaces the
        // candidate when the new point dominates it on both axes.
        let points = [Coord::new(5, 1), Coord::new(3, 3)];
        let mut root = points[0];
        for &p in &points[1..] {
            if p.all_le(root) {
                root = p;
            }
        }
        assert_eq!(root, Coord::new(5, 1));
    }
}
