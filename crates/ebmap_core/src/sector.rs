//! Map sectors
//!
//! A sector is a 256x128 pixel region carrying the graphics, music and
//! gameplay attributes shared by every tile inside it. Sectors form a dense
//! 32x80 grid addressed by `id = row * 32 + col`.

use crate::coords::{Coord, Scale};
use crate::error::{CoreError, FormatError};
use ebmap_schema::{UserDataType, UserDataValue};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

/// Sectors per map row
pub const SECTORS_WIDE: usize = 32;
/// Sector rows
pub const SECTORS_HIGH: usize = 80;

/// Map tiles covered by one sector, horizontally and vertically
pub const SECTOR_TILES_WIDE: usize = 8;
pub const SECTOR_TILES_HIGH: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SectorSetting {
    #[default]
    #[serde(rename = "none")]
    None,
    #[serde(rename = "indoors")]
    Indoors,
    #[serde(rename = "exit mouse usable")]
    ExitMouseUsable,
    #[serde(rename = "lost underworld sprites")]
    LostUnderworldSprites,
    #[serde(rename = "magicant sprites")]
    MagicantSprites,
    #[serde(rename = "robot sprites")]
    RobotSprites,
    #[serde(rename = "butterflies")]
    Butterflies,
    #[serde(rename = "indoors and butterflies")]
    IndoorsAndButterflies,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeleportSetting {
    #[default]
    Enabled,
    Disabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TownMap {
    #[default]
    #[serde(rename = "none")]
    None,
    #[serde(rename = "onett")]
    Onett,
    #[serde(rename = "twoson")]
    Twoson,
    #[serde(rename = "threed")]
    Threed,
    #[serde(rename = "fourside")]
    Fourside,
    #[serde(rename = "scaraba")]
    Scaraba,
    #[serde(rename = "summers")]
    Summers,
    #[serde(rename = "none 2")]
    None2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TownMapArrow {
    #[default]
    None,
    Up,
    Down,
    Right,
    Left,
}

/// Every editable attribute of a sector except its user data.
///
/// Commands swap whole snapshots so one edit can touch several fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SectorAttributes {
    pub item: u8,
    pub music: u8,
    pub palette: u8,
    pub palette_group: u8,
    pub tileset: u8,
    pub setting: SectorSetting,
    pub teleport: TeleportSetting,
    pub town_map: TownMap,
    pub town_map_arrow: TownMapArrow,
    pub town_map_image: TownMap,
    pub town_map_x: u8,
    pub town_map_y: u8,
}

impl SectorAttributes {
    /// The fields copied into every map tile of the sector
    pub fn graphics(&self) -> GraphicsKey {
        GraphicsKey {
            tileset: self.tileset,
            palette_group: self.palette_group,
            palette: self.palette,
        }
    }
}

/// (tileset, palette group, palette) used to draw a region of the map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct GraphicsKey {
    pub tileset: u8,
    pub palette_group: u8,
    pub palette: u8,
}

/// One map sector
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Sector {
    pub id: usize,
    pub attributes: SectorAttributes,
    /// Values of admin-defined fields. Absent keys read as the field default.
    pub user_data: BTreeMap<String, UserDataValue>,
}

impl Sector {
    pub fn new(id: usize) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    pub fn graphics(&self) -> GraphicsKey {
        self.attributes.graphics()
    }

    /// Stored value of a user-data field, or the field type's default
    pub fn user_value_or_default(&self, name: &str, field_type: UserDataType) -> UserDataValue {
        self.user_data
            .get(name)
            .cloned()
            .unwrap_or_else(|| field_type.default_value())
    }

    pub fn to_record(&self) -> SectorRecord {
        let a = &self.attributes;
        SectorRecord {
            item: a.item,
            music: a.music,
            palette: a.palette,
            setting: a.setting,
            teleport: a.teleport,
            palette_group: a.palette_group,
            town_map: a.town_map,
            town_map_arrow: a.town_map_arrow,
            town_map_image: a.town_map_image,
            town_map_x: a.town_map_x,
            town_map_y: a.town_map_y,
            user_data: self.user_data.clone(),
        }
    }

    /// Build from a persisted record. The graphics tileset is not stored per
    /// sector; it is derived from the palette group once tilesets are loaded.
    pub fn from_record(id: usize, record: &SectorRecord) -> Self {
        Self {
            id,
            attributes: SectorAttributes {
                item: record.item,
                music: record.music,
                palette: record.palette,
                palette_group: record.palette_group,
                tileset: 0,
                setting: record.setting,
                teleport: record.teleport,
                town_map: record.town_map,
                town_map_arrow: record.town_map_arrow,
                town_map_image: record.town_map_image,
                town_map_x: record.town_map_x,
                town_map_y: record.town_map_y,
            },
            user_data: record.user_data.clone(),
        }
    }
}

/// Persisted shape of a sector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectorRecord {
    #[serde(rename = "Item")]
    pub item: u8,
    #[serde(rename = "Music")]
    pub music: u8,
    #[serde(rename = "Palette")]
    pub palette: u8,
    #[serde(rename = "Setting")]
    pub setting: SectorSetting,
    #[serde(rename = "Teleport")]
    pub teleport: TeleportSetting,
    /// Map tileset, which is the palette group ID
    #[serde(rename = "Tileset")]
    pub palette_group: u8,
    #[serde(rename = "Town Map")]
    pub town_map: TownMap,
    #[serde(rename = "Town Map Arrow")]
    pub town_map_arrow: TownMapArrow,
    #[serde(rename = "Town Map Image")]
    pub town_map_image: TownMap,
    #[serde(rename = "Town Map X")]
    pub town_map_x: u8,
    #[serde(rename = "Town Map Y")]
    pub town_map_y: u8,
    #[serde(rename = "User Data", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub user_data: BTreeMap<String, UserDataValue>,
}

/// Upper bound on sectors visited by one flood fill
pub const FLOOD_FILL_LIMIT: usize = SECTORS_WIDE * SECTORS_HIGH;

/// Dense grid of sectors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectorGrid {
    width: usize,
    height: usize,
    sectors: Vec<Sector>,
}

impl Default for SectorGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl SectorGrid {
    /// Full-size map grid
    pub fn new() -> Self {
        Self::with_size(SECTORS_WIDE, SECTORS_HIGH)
    }

    /// Grid of arbitrary size, used by tooling and tests
    pub fn with_size(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            sectors: (0..width * height).map(Sector::new).collect(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.sectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sectors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sector> {
        self.sectors.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Sector> {
        self.sectors.iter_mut()
    }

    pub fn get(&self, id: usize) -> Option<&Sector> {
        self.sectors.get(id)
    }

    pub fn get_mut(&mut self, id: usize) -> Option<&mut Sector> {
        self.sectors.get_mut(id)
    }

    /// Linear ID of the sector at (col, row)
    pub fn id_of(&self, col: usize, row: usize) -> usize {
        assert!(
            col < self.width && row < self.height,
            "sector ({}, {}) outside {}x{} grid",
            col,
            row,
            self.width,
            self.height
        );
        row * self.width + col
    }

    /// (col, row) of a sector ID
    pub fn position(&self, id: usize) -> (usize, usize) {
        assert!(id < self.sectors.len(), "sector {} out of range", id);
        (id % self.width, id / self.width)
    }

    /// Sector ID containing a pixel coordinate
    pub fn id_at(&self, coord: Coord) -> usize {
        let cell = coord.to_scale(Scale::Sector);
        assert!(
            cell.x >= 0 && cell.y >= 0,
            "coordinate {} is outside the map",
            coord
        );
        self.id_of(cell.x as usize, cell.y as usize)
    }

    pub fn at(&self, col: usize, row: usize) -> &Sector {
        let id = self.id_of(col, row);
        &self.sectors[id]
    }

    pub fn at_mut(&mut self, col: usize, row: usize) -> &mut Sector {
        let id = self.id_of(col, row);
        &mut self.sectors[id]
    }

    /// Sectors reachable from `seed` through edge-adjacent sectors sharing
    /// its tileset, palette group and palette. Returned IDs are sorted.
    pub fn adjacent_matching(&self, seed: usize) -> Result<Vec<usize>, CoreError> {
        self.adjacent_matching_capped(seed, FLOOD_FILL_LIMIT)
    }

    /// As [`SectorGrid::adjacent_matching`], failing once more than `limit`
    /// sectors have been collected.
    pub fn adjacent_matching_capped(
        &self,
        seed: usize,
        limit: usize,
    ) -> Result<Vec<usize>, CoreError> {
        let Some(seed_sector) = self.sectors.get(seed) else {
            return Err(CoreError::out_of_range(
                "sector",
                seed as i64,
                self.sectors.len() as i64 - 1,
            ));
        };
        let key = seed_sector.graphics();

        let mut visited = vec![false; self.sectors.len()];
        let mut found = Vec::new();
        let mut worklist = VecDeque::from([seed]);
        visited[seed] = true;

        while let Some(id) = worklist.pop_front() {
            found.push(id);
            if found.len() > limit {
                return Err(CoreError::FloodFillLimit(limit));
            }
            let (col, row) = (id % self.width, id / self.width);
            let mut neighbours = Vec::with_capacity(4);
            if col > 0 {
                neighbours.push(id - 1);
            }
            if col + 1 < self.width {
                neighbours.push(id + 1);
            }
            if row > 0 {
                neighbours.push(id - self.width);
            }
            if row + 1 < self.height {
                neighbours.push(id + self.width);
            }
            for next in neighbours {
                if !visited[next] && self.sectors[next].graphics() == key {
                    visited[next] = true;
                    worklist.push_back(next);
                }
            }
        }

        found.sort_unstable();
        Ok(found)
    }

    /// Remove a user-data key from every sector, returning the removed values
    pub fn strip_user_data(&mut self, name: &str) -> Vec<(usize, UserDataValue)> {
        self.sectors
            .iter_mut()
            .filter_map(|sector| sector.user_data.remove(name).map(|v| (sector.id, v)))
            .collect()
    }

    pub fn to_records(&self) -> BTreeMap<usize, SectorRecord> {
        self.sectors
            .iter()
            .map(|sector| (sector.id, sector.to_record()))
            .collect()
    }

    /// Build a full-size grid. Every sector must be present.
    pub fn from_records(records: &BTreeMap<usize, SectorRecord>) -> Result<Self, FormatError> {
        let mut grid = SectorGrid::new();
        if let Some((&id, _)) = records.range(grid.len()..).next() {
            return Err(FormatError::Invalid(format!(
                "sector {} is outside the {}-sector map",
                id,
                grid.len()
            )));
        }
        for sector in grid.sectors.iter_mut() {
            let record = records
                .get(&sector.id)
                .ok_or_else(|| FormatError::MissingKey(format!("sector {}", sector.id)))?;
            *sector = Sector::from_record(sector.id, record);
        }
        Ok(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_graphics(grid: &mut SectorGrid, col: usize, row: usize, ts: u8, pg: u8, p: u8) {
        let a = &mut grid.at_mut(col, row).attributes;
        a.tileset = ts;
        a.palette_group = pg;
        a.palette = p;
    }

    #[test]
    fn test_flood_fill_two_by_two() {
        let mut grid = SectorGrid::with_size(2, 2);
        set_graphics(&mut grid, 0, 0, 1, 2, 0);
        set_graphics(&mut grid, 0, 1, 1, 2, 0);
        set_graphics(&mut grid, 1, 0, 3, 2, 0);
        set_graphics(&mut grid, 1, 1, 3, 2, 0);

        let found = grid.adjacent_matching(grid.id_of(0, 0)).unwrap();
        assert_eq!(found, vec![grid.id_of(0, 0), grid.id_of(0, 1)]);
    }

    #[test]
    fn test_flood_fill_does_not_wrap() {
        let mut grid = SectorGrid::with_size(3, 2);
        for sector in grid.iter_mut() {
            sector.attributes.tileset = 9;
        }
        // Column 1 splits the map; column 2 must not be reached through the edge.
        set_graphics(&mut grid, 1, 0, 0, 0, 0);
        set_graphics(&mut grid, 1, 1, 0, 0, 0);

        let found = grid.adjacent_matching(0).unwrap();
        assert_eq!(found, vec![0, 3]);
    }

    #[test]
    fn test_flood_fill_uniform_map() {
        let grid = SectorGrid::new();
        let found = grid.adjacent_matching(0).unwrap();
        assert_eq!(found.len(), SECTORS_WIDE * SECTORS_HIGH);

        assert_eq!(
            grid.adjacent_matching_capped(0, 10),
            Err(CoreError::FloodFillLimit(10))
        );
    }

    #[test]
    fn test_flood_fill_rejects_unknown_seed() {
        let grid = SectorGrid::with_size(2, 2);
        assert!(grid.adjacent_matching(4).is_err());
    }

    #[test]
    fn test_id_at_uses_asymmetric_scale() {
        let grid = SectorGrid::new();
        assert_eq!(grid.id_at(Coord::new(255, 127)), 0);
        assert_eq!(grid.id_at(Coord::new(256, 0)), 1);
        assert_eq!(grid.id_at(Coord::new(0, 128)), SECTORS_WIDE);
        assert_eq!(grid.position(SECTORS_WIDE + 3), (3, 1));
    }

    #[test]
    #[should_panic]
    fn test_id_of_out_of_range_panics() {
        let grid = SectorGrid::new();
        grid.id_of(SECTORS_WIDE, 0);
    }

    #[test]
    fn test_user_value_defaults() {
        let mut sector = Sector::new(0);
        assert_eq!(
            sector.user_value_or_default("Weather", UserDataType::Int),
            UserDataValue::Int(0)
        );
        sector
            .user_data
            .insert("Weather".to_string(), UserDataValue::Int(3));
        assert_eq!(
            sector.user_value_or_default("Weather", UserDataType::Int),
            UserDataValue::Int(3)
        );
    }

    #[test]
    fn test_records_round_trip_through_yaml() {
        let mut grid = SectorGrid::new();
        {
            let sector = grid.at_mut(4, 7);
            sector.attributes.music = 12;
            sector.attributes.palette_group = 5;
            sector.attributes.setting = SectorSetting::IndoorsAndButterflies;
            sector.attributes.town_map = TownMap::Fourside;
            sector
                .user_data
                .insert("Notes".to_string(), UserDataValue::String("hi".into()));
        }
        let yaml = serde_yaml::to_string(&grid.to_records()).unwrap();
        assert!(yaml.contains("indoors and butterflies"));

        let records: BTreeMap<usize, SectorRecord> = serde_yaml::from_str(&yaml).unwrap();
        let reloaded = SectorGrid::from_records(&records).unwrap();
        assert_eq!(reloaded, grid);
    }

    #[test]
    fn test_missing_sector_record_is_error() {
        let mut records = SectorGrid::new().to_records();
        records.remove(&17);
        assert_eq!(
            SectorGrid::from_records(&records),
            Err(FormatError::MissingKey("sector 17".to_string()))
        );
    }
}
