//! The map tile grid
//!
//! Each 32x32 cell of the map names a tile arrangement (0-959) and caches
//! the graphics key of the sector it lies in. The sector is the source of
//! truth; callers that change a sector's graphics must call
//! [`MapTileGrid::refresh_sector`].

use crate::coords::{Coord, Scale};
use crate::error::{CoreError, DigitBase, FormatError};
use crate::sector::{GraphicsKey, SectorGrid, SECTOR_TILES_HIGH, SECTOR_TILES_WIDE};
use crate::tileset::digits::{combine, parse_line, push_number};
use crate::tileset::MAX_TILES;

/// Map width in tiles
pub const MAP_TILES_WIDE: usize = 256;
/// Map height in tiles
pub const MAP_TILES_HIGH: usize = 320;

/// Hex digits per tile token in the grid resource
const TOKEN_CHARS: usize = 3;

/// One 32x32 map cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MapTile {
    pub tile: u16,
    /// Cached from the owning sector
    pub graphics: GraphicsKey,
}

/// Dense 256x320 grid of map tiles
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapTileGrid {
    tiles: Vec<MapTile>,
}

impl Default for MapTileGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl MapTileGrid {
    pub fn new() -> Self {
        Self {
            tiles: vec![MapTile::default(); MAP_TILES_WIDE * MAP_TILES_HIGH],
        }
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    fn index(x: usize, y: usize) -> usize {
        assert!(
            x < MAP_TILES_WIDE && y < MAP_TILES_HIGH,
            "tile ({}, {}) outside the map",
            x,
            y
        );
        y * MAP_TILES_WIDE + x
    }

    pub fn at(&self, x: usize, y: usize) -> &MapTile {
        &self.tiles[Self::index(x, y)]
    }

    pub fn at_mut(&mut self, x: usize, y: usize) -> &mut MapTile {
        &mut self.tiles[Self::index(x, y)]
    }

    /// Tile cell containing a pixel coordinate
    pub fn cell_at(coord: Coord) -> (usize, usize) {
        let cell = coord.to_scale(Scale::Tile);
        assert!(
            cell.x >= 0 && cell.y >= 0,
            "coordinate {} is outside the map",
            coord
        );
        (cell.x as usize, cell.y as usize)
    }

    pub fn at_coord(&self, coord: Coord) -> &MapTile {
        let (x, y) = Self::cell_at(coord);
        self.at(x, y)
    }

    /// Place a tile arrangement, rejecting IDs past the last tile
    pub fn set_tile(&mut self, x: usize, y: usize, tile: u16) -> Result<u16, CoreError> {
        if tile as usize >= MAX_TILES {
            return Err(CoreError::out_of_range("tile", tile, MAX_TILES as i64 - 1));
        }
        let cell = self.at_mut(x, y);
        Ok(std::mem::replace(&mut cell.tile, tile))
    }

    /// Copy a sector's graphics key into the tiles it covers
    pub fn refresh_sector(&mut self, col: usize, row: usize, graphics: GraphicsKey) {
        let (x0, y0) = (col * SECTOR_TILES_WIDE, row * SECTOR_TILES_HIGH);
        for y in y0..y0 + SECTOR_TILES_HIGH {
            for x in x0..x0 + SECTOR_TILES_WIDE {
                self.at_mut(x, y).graphics = graphics;
            }
        }
    }

    /// Refresh every cached key from a full sector grid
    pub fn refresh_all(&mut self, sectors: &SectorGrid) {
        for sector in sectors.iter() {
            let (col, row) = sectors.position(sector.id);
            self.refresh_sector(col, row, sector.graphics());
        }
    }

    /// Tile IDs of the whole grid, row-major
    pub fn tile_ids(&self) -> impl Iterator<Item = u16> + '_ {
        self.tiles.iter().map(|t| t.tile)
    }

    /// Parse the grid resource: one row per line, space-separated 3-digit
    /// hex tokens. Graphics keys are left at their defaults.
    pub fn decode(text: &str) -> Result<Self, CoreError> {
        let mut rows: Vec<&str> = text.split('\n').collect();
        if rows.last().is_some_and(|r| r.is_empty()) {
            rows.pop();
        }
        if rows.len() != MAP_TILES_HIGH {
            return Err(FormatError::Invalid(format!(
                "map tile grid has {} rows, expected {}",
                rows.len(),
                MAP_TILES_HIGH
            ))
            .into());
        }

        let mut grid = MapTileGrid::new();
        for (y, row) in rows.iter().enumerate() {
            let row = row.strip_suffix('\r').unwrap_or(row);
            let mut count = 0;
            let mut column = 0;
            for token in row.split(' ') {
                if count == MAP_TILES_WIDE {
                    return Err(FormatError::Invalid(format!(
                        "line {}: more than {} tiles",
                        y, MAP_TILES_WIDE
                    ))
                    .into());
                }
                let digits = parse_line(token, y, DigitBase::Hex, TOKEN_CHARS).map_err(|e| {
                    match e {
                        FormatError::InvalidDigit {
                            line,
                            column: c,
                            ch,
                            base,
                        } => FormatError::InvalidDigit {
                            line,
                            column: column + c,
                            ch,
                            base,
                        },
                        other => other,
                    }
                })?;
                let tile = combine(&digits, DigitBase::Hex) as u16;
                grid.set_tile(count, y, tile)?;
                count += 1;
                column += token.len() + 1;
            }
            if count != MAP_TILES_WIDE {
                return Err(FormatError::Invalid(format!(
                    "line {}: {} tiles, expected {}",
                    y, count, MAP_TILES_WIDE
                ))
                .into());
            }
        }
        Ok(grid)
    }

    /// Write the grid resource, newline-terminated with no trailing empty row
    pub fn encode(&self) -> String {
        let mut out = String::with_capacity(MAP_TILES_HIGH * MAP_TILES_WIDE * (TOKEN_CHARS + 1));
        for row in self.tiles.chunks(MAP_TILES_WIDE) {
            for (x, cell) in row.iter().enumerate() {
                if x > 0 {
                    out.push(' ');
                }
                push_number(&mut out, cell.tile as u32, TOKEN_CHARS, DigitBase::Hex);
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_text(tile: &str) -> String {
        let row = vec![tile; MAP_TILES_WIDE].join(" ");
        let mut text = vec![row; MAP_TILES_HIGH].join("\n");
        text.push('\n');
        text
    }

    #[test]
    fn test_decode_tolerates_final_newline() {
        let text = grid_text("3bf");
        let grid = MapTileGrid::decode(&text).unwrap();
        assert_eq!(grid.at(0, 0).tile, 0x3bf);
        assert_eq!(grid.at(255, 319).tile, 0x3bf);

        let without_newline = text.trim_end_matches('\n');
        assert_eq!(MapTileGrid::decode(without_newline).unwrap(), grid);
    }

    #[test]
    fn test_encode_has_no_extra_row() {
        let mut grid = MapTileGrid::new();
        grid.set_tile(1, 0, 0x12).unwrap();
        let text = grid.encode();
        assert!(text.starts_with("000 012 000"));
        assert_eq!(text.split('\n').count(), MAP_TILES_HIGH + 1);
        assert_eq!(text.lines().count(), MAP_TILES_HIGH);
        assert_eq!(MapTileGrid::decode(&text).unwrap(), grid);
    }

    #[test]
    fn test_tile_past_maximum_is_rejected() {
        let text = grid_text("3c0");
        assert_eq!(
            MapTileGrid::decode(&text),
            Err(CoreError::out_of_range("tile", 0x3c0, 959))
        );
        let mut grid = MapTileGrid::new();
        assert!(grid.set_tile(0, 0, 960).is_err());
        assert_eq!(grid.set_tile(0, 0, 959), Ok(0));
    }

    #[test]
    fn test_bad_digit_reports_column() {
        let mut text = grid_text("000");
        text.replace_range(5..6, "g");
        assert_eq!(
            MapTileGrid::decode(&text),
            Err(CoreError::Format(FormatError::InvalidDigit {
                line: 0,
                column: 5,
                ch: 'g',
                base: DigitBase::Hex
            }))
        );
    }

    #[test]
    fn test_short_grid_is_rejected() {
        let text: String = grid_text("000").lines().skip(1).collect::<Vec<_>>().join("\n");
        assert!(MapTileGrid::decode(&text).is_err());
    }

    #[test]
    fn test_refresh_sector_covers_eight_by_four() {
        let mut grid = MapTileGrid::new();
        let key = GraphicsKey {
            tileset: 4,
            palette_group: 9,
            palette: 2,
        };
        grid.refresh_sector(1, 2, key);
        assert_eq!(grid.at(8, 8).graphics, key);
        assert_eq!(grid.at(15, 11).graphics, key);
        assert_eq!(grid.at(7, 8).graphics, GraphicsKey::default());
        assert_eq!(grid.at(16, 11).graphics, GraphicsKey::default());
        assert_eq!(grid.at(8, 12).graphics, GraphicsKey::default());
        assert_eq!(grid.at_coord(Coord::new(8 * 32, 8 * 32)).graphics, key);
    }
}
