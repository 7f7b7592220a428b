//! Enemy placement
//!
//! The map is divided into 64x64 pixel cells, each naming an enemy map
//! group. A map group chooses between two weighted sub-group tables of
//! battle groups. Battle groups themselves are read-only here.

use crate::colour;
use crate::coords::{Coord, Scale};
use crate::error::{CoreError, FormatError};
use image::Rgb;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Enemy cells per map row
pub const ENEMY_TILES_WIDE: usize = 128;
/// Enemy cell rows
pub const ENEMY_TILES_HIGH: usize = 160;

/// Conventional total of the probabilities in one sub-group
pub const SUB_GROUP_WEIGHT: u32 = 8;

/// Dense grid of enemy map group IDs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnemyTileGrid {
    cells: Vec<u16>,
}

impl Default for EnemyTileGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl EnemyTileGrid {
    pub fn new() -> Self {
        Self {
            cells: vec![0; ENEMY_TILES_WIDE * ENEMY_TILES_HIGH],
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn index(x: usize, y: usize) -> usize {
        assert!(
            x < ENEMY_TILES_WIDE && y < ENEMY_TILES_HIGH,
            "enemy tile ({}, {}) outside the map",
            x,
            y
        );
        y * ENEMY_TILES_WIDE + x
    }

    /// Enemy cell containing a pixel coordinate
    pub fn cell_at(coord: Coord) -> (usize, usize) {
        let cell = coord.to_scale(Scale::Enemy);
        assert!(
            cell.x >= 0 && cell.y >= 0,
            "coordinate {} is outside the map",
            coord
        );
        (cell.x as usize, cell.y as usize)
    }

    pub fn at(&self, x: usize, y: usize) -> u16 {
        self.cells[Self::index(x, y)]
    }

    /// Set a cell, returning the previous group
    pub fn set(&mut self, x: usize, y: usize, group: u16) -> u16 {
        std::mem::replace(&mut self.cells[Self::index(x, y)], group)
    }

    pub fn at_coord(&self, coord: Coord) -> u16 {
        let (x, y) = Self::cell_at(coord);
        self.at(x, y)
    }

    pub fn iter(&self) -> impl Iterator<Item = u16> + '_ {
        self.cells.iter().copied()
    }

    pub fn to_records(&self) -> BTreeMap<usize, EnemyPlacementRecord> {
        self.cells
            .iter()
            .map(|&group| EnemyPlacementRecord { group })
            .enumerate()
            .collect()
    }

    pub fn from_records(
        records: &BTreeMap<usize, EnemyPlacementRecord>,
        group_count: usize,
    ) -> Result<Self, CoreError> {
        let mut grid = EnemyTileGrid::new();
        for (index, cell) in grid.cells.iter_mut().enumerate() {
            let record = records
                .get(&index)
                .ok_or_else(|| FormatError::MissingKey(format!("enemy tile {}", index)))?;
            if record.group as usize >= group_count.max(1) {
                return Err(CoreError::out_of_range(
                    "enemy map group",
                    record.group,
                    group_count as i64 - 1,
                ));
            }
            *cell = record.group;
        }
        Ok(grid)
    }
}

/// Persisted enemy cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemyPlacementRecord {
    #[serde(rename = "Enemy Map Group")]
    pub group: u16,
}

/// One weighted entry of a sub-group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubGroupEntry {
    #[serde(rename = "Enemy Group")]
    pub enemy_group: u16,
    #[serde(rename = "Probability")]
    pub probability: u8,
}

/// A weighted choice of battle groups, spawned at `rate` percent
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubGroup {
    pub rate: u8,
    pub entries: Vec<SubGroupEntry>,
}

impl SubGroup {
    pub fn total_weight(&self) -> u32 {
        self.entries.iter().map(|e| e.probability as u32).sum()
    }

    /// Whether the weights add up to the conventional total. Not enforced.
    pub fn is_balanced(&self) -> bool {
        self.entries.is_empty() || self.total_weight() == SUB_GROUP_WEIGHT
    }
}

/// An enemy map group
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EnemyMapGroup {
    pub flag: u16,
    /// Explicit display colour; `None` uses [`derived_colour`]
    pub colour: Option<Rgb<u8>>,
    pub sub_groups: [SubGroup; 2],
}

impl EnemyMapGroup {
    /// Colour the editor draws this group with
    pub fn display_colour(&self, id: usize) -> Rgb<u8> {
        self.colour.unwrap_or_else(|| derived_colour(id))
    }
}

/// Deterministic colour for a group without an explicit one:
/// `(e * 2^20 * id) & 0x9F9F9F` as RGB
pub fn derived_colour(id: usize) -> Rgb<u8> {
    let value = (std::f64::consts::E * (1u64 << 20) as f64 * id as f64) as u64 & 0x9F_9F9F;
    Rgb([(value >> 16) as u8, (value >> 8) as u8, value as u8])
}

/// Persisted enemy map group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemyMapGroupRecord {
    #[serde(rename = "Event Flag")]
    pub flag: u16,
    #[serde(rename = "Sub-Group 1", default)]
    pub sub_group_1: BTreeMap<usize, SubGroupEntry>,
    #[serde(rename = "Sub-Group 1 Rate")]
    pub sub_group_1_rate: u8,
    #[serde(rename = "Sub-Group 2", default)]
    pub sub_group_2: BTreeMap<usize, SubGroupEntry>,
    #[serde(rename = "Sub-Group 2 Rate")]
    pub sub_group_2_rate: u8,
    #[serde(
        rename = "Colour",
        default,
        with = "colour::optional_hex",
        skip_serializing_if = "Option::is_none"
    )]
    pub colour: Option<Rgb<u8>>,
}

impl From<&EnemyMapGroupRecord> for EnemyMapGroup {
    fn from(record: &EnemyMapGroupRecord) -> Self {
        EnemyMapGroup {
            flag: record.flag,
            colour: record.colour,
            sub_groups: [
                SubGroup {
                    rate: record.sub_group_1_rate,
                    entries: record.sub_group_1.values().copied().collect(),
                },
                SubGroup {
                    rate: record.sub_group_2_rate,
                    entries: record.sub_group_2.values().copied().collect(),
                },
            ],
        }
    }
}

impl From<&EnemyMapGroup> for EnemyMapGroupRecord {
    fn from(group: &EnemyMapGroup) -> Self {
        let entries = |sub: &SubGroup| sub.entries.iter().copied().enumerate().collect();
        EnemyMapGroupRecord {
            flag: group.flag,
            sub_group_1: entries(&group.sub_groups[0]),
            sub_group_1_rate: group.sub_groups[0].rate,
            sub_group_2: entries(&group.sub_groups[1]),
            sub_group_2_rate: group.sub_groups[1].rate,
            colour: group.colour,
        }
    }
}

/// One enemy type in a battle group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleEnemy {
    #[serde(rename = "Amount")]
    pub amount: u8,
    #[serde(rename = "Enemy")]
    pub enemy: u16,
}

/// A battle composition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemyGroup {
    #[serde(rename = "Background 1")]
    pub background_1: u16,
    #[serde(rename = "Background 2")]
    pub background_2: u16,
    #[serde(rename = "Enemies", default)]
    pub enemies: Vec<BattleEnemy>,
    #[serde(rename = "Fear event flag")]
    pub fear_flag: u16,
    #[serde(rename = "Fear mode")]
    pub fear_mode: u8,
    #[serde(rename = "Letterbox Size", default)]
    pub letterbox: String,
}

impl EnemyGroup {
    pub fn enemy_count(&self) -> u32 {
        self.enemies.iter().map(|e| e.amount as u32).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_colour_is_masked() {
        assert_eq!(derived_colour(0), Rgb([0, 0, 0]));
        for id in 1..200 {
            let Rgb([r, g, b]) = derived_colour(id);
            assert_eq!(r & !0x9F, 0);
            assert_eq!(g & !0x9F, 0);
            assert_eq!(b & !0x9F, 0);
        }
        // e * 2^20 = 2850325.86..., truncated 0x2B7E15
        assert_eq!(derived_colour(1), Rgb([0x0B, 0x1E, 0x15]));
    }

    #[test]
    fn test_explicit_colour_wins() {
        let mut group = EnemyMapGroup::default();
        assert_eq!(group.display_colour(3), derived_colour(3));
        group.colour = Some(Rgb([9, 9, 9]));
        assert_eq!(group.display_colour(3), Rgb([9, 9, 9]));
    }

    #[test]
    fn test_map_group_yaml() {
        let yaml = "\
Event Flag: 0
Sub-Group 1:
  0:
    Enemy Group: 12
    Probability: 5
  1:
    Enemy Group: 13
    Probability: 3
Sub-Group 1 Rate: 40
Sub-Group 2: {}
Sub-Group 2 Rate: 0
";
        let record: EnemyMapGroupRecord = serde_yaml::from_str(yaml).unwrap();
        let group = EnemyMapGroup::from(&record);
        assert_eq!(group.sub_groups[0].entries.len(), 2);
        assert!(group.sub_groups[0].is_balanced());
        assert!(group.sub_groups[1].is_balanced());
        assert_eq!(EnemyMapGroupRecord::from(&group), record);
    }

    #[test]
    fn test_grid_lookup_and_records() {
        let mut grid = EnemyTileGrid::new();
        assert_eq!(grid.set(5, 6, 7), 0);
        assert_eq!(grid.at_coord(Coord::new(5 * 64 + 63, 6 * 64)), 7);

        let records = grid.to_records();
        assert_eq!(records.len(), ENEMY_TILES_WIDE * ENEMY_TILES_HIGH);
        assert_eq!(EnemyTileGrid::from_records(&records, 8).unwrap(), grid);
        assert!(EnemyTileGrid::from_records(&records, 7).is_err());
    }

    #[test]
    #[should_panic]
    fn test_out_of_range_cell_panics() {
        EnemyTileGrid::new().at(ENEMY_TILES_WIDE, 0);
    }
}
