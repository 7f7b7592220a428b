//! Graphics tilesets: minitiles, palettes and tile arrangements
//!
//! A `FullTileset` is the in-memory form of one `.fts` file. See [`codec`]
//! for the text layout.

pub mod codec;
pub mod digits;
mod minitile;
mod palette;
mod tile;

pub use minitile::{Minitile, MinitileLayer, MINITILE_PIXELS, MINITILE_SIZE};
pub use palette::{
    channel_from_5bit, channel_to_5bit, palette_from_blocks, palette_to_blocks, partition_groups,
    Palette, PaletteGroup, Subpalette, MAX_PALETTE_KEY, PALETTE_COLOUR_CHARS, PALETTE_SUBPALETTES,
    SUBPALETTE_CHARS, SUBPALETTE_COLOURS,
};
pub use tile::{
    metadata_hflip, metadata_minitile, metadata_subpalette, metadata_vflip, pack_metadata, Tile,
    HFLIP_BIT, MINITILE_MASK, PRIORITY_BIT, SUBPALETTE_BIAS, SUBPALETTE_MASK, TILE_MINITILES_WIDE,
    TILE_PLACEMENTS, VFLIP_BIT,
};

use crate::error::CoreError;

/// Minitile slots per tileset
pub const MINITILE_COUNT: usize = 512;
/// Maximum tile arrangements per tileset
pub const MAX_TILES: usize = 960;
/// Tile lines written to a `.fts` file, including zero filler
pub const TILE_LINES: usize = 1024;
/// Number of graphics tilesets in a project
pub const TILESET_COUNT: usize = 20;

/// One graphics tileset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FullTileset {
    pub id: u8,
    pub minitiles: Vec<Minitile>,
    palettes: Vec<Palette>,
    groups: Vec<PaletteGroup>,
    pub tiles: Vec<Tile>,
    /// Line at which tile data began in the decoded text, if decoded
    pub tile_offset: Option<usize>,
}

impl FullTileset {
    /// Create an empty tileset with blank minitiles and no palettes
    pub fn new(id: u8) -> Self {
        Self {
            id,
            minitiles: vec![Minitile::default(); MINITILE_COUNT],
            palettes: Vec::new(),
            groups: Vec::new(),
            tiles: vec![Tile::default(); MAX_TILES],
            tile_offset: None,
        }
    }

    /// Build from parts, deriving the palette groups
    pub fn from_parts(
        id: u8,
        minitiles: Vec<Minitile>,
        palettes: Vec<Palette>,
        tiles: Vec<Tile>,
    ) -> Result<Self, CoreError> {
        if minitiles.len() != MINITILE_COUNT {
            return Err(CoreError::out_of_range(
                "minitile count",
                minitiles.len() as i64,
                MINITILE_COUNT as i64,
            ));
        }
        if tiles.len() > MAX_TILES {
            return Err(CoreError::out_of_range(
                "tile count",
                tiles.len() as i64,
                MAX_TILES as i64,
            ));
        }
        for palette in &palettes {
            palette.check_key()?;
        }
        let groups = partition_groups(&palettes);
        Ok(Self {
            id,
            minitiles,
            palettes,
            groups,
            tiles,
            tile_offset: None,
        })
    }

    pub fn palettes(&self) -> &[Palette] {
        &self.palettes
    }

    pub fn palette_groups(&self) -> &[PaletteGroup] {
        &self.groups
    }

    /// Replace the palette list and re-partition the groups
    pub fn set_palettes(&mut self, palettes: Vec<Palette>) {
        self.palettes = palettes;
        self.rebuild_palette_groups();
    }

    /// Add a palette at the end of the list
    pub fn push_palette(&mut self, palette: Palette) {
        self.palettes.push(palette);
        self.rebuild_palette_groups();
    }

    pub fn rebuild_palette_groups(&mut self) {
        self.groups = partition_groups(&self.palettes);
    }

    /// Palettes of the first run with group ID `group`
    pub fn palette_group(&self, group: u8) -> Option<&[Palette]> {
        self.groups
            .iter()
            .find(|g| g.id == group)
            .map(|g| &self.palettes[g.range.clone()])
    }

    pub fn has_palette_group(&self, group: u8) -> bool {
        self.groups.iter().any(|g| g.id == group)
    }

    pub fn palette(&self, group: u8, id: u8) -> Option<&Palette> {
        self.palettes.iter().find(|p| p.group == group && p.id == id)
    }

    pub fn palette_mut(&mut self, group: u8, id: u8) -> Option<&mut Palette> {
        self.palettes
            .iter_mut()
            .find(|p| p.group == group && p.id == id)
    }

    /// Mutable access to the whole palette list. Call
    /// [`FullTileset::rebuild_palette_groups`] after changing any group ID.
    pub fn palettes_mut(&mut self) -> &mut Vec<Palette> {
        &mut self.palettes
    }

    pub fn tile(&self, id: usize) -> Option<&Tile> {
        self.tiles.get(id)
    }

    pub fn tile_mut(&mut self, id: usize) -> Option<&mut Tile> {
        self.tiles.get_mut(id)
    }

    /// IDs of every tile that places `minitile` at least once
    pub fn tiles_using_minitile(&self, minitile: u16) -> Vec<usize> {
        self.tiles
            .iter()
            .enumerate()
            .filter(|(_, tile)| tile.uses_minitile(minitile))
            .map(|(id, _)| id)
            .collect()
    }

    /// Exchange two minitile slots and rewrite every tile that references
    /// either one so the visual arrangement is unchanged.
    pub fn swap_minitiles(&mut self, a: usize, b: usize) {
        assert!(
            a < MINITILE_COUNT && b < MINITILE_COUNT,
            "minitile index out of range"
        );
        if a == b {
            return;
        }
        self.minitiles.swap(a, b);

        let (a, b) = (a as u16, b as u16);
        for tile in &mut self.tiles {
            for word in tile.metadata.iter_mut() {
                let id = metadata_minitile(*word);
                if id == a {
                    *word = (*word & !MINITILE_MASK) | b;
                } else if id == b {
                    *word = (*word & !MINITILE_MASK) | a;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_tileset_shape() {
        let tileset = FullTileset::new(3);
        assert_eq!(tileset.minitiles.len(), MINITILE_COUNT);
        assert_eq!(tileset.tiles.len(), MAX_TILES);
        assert!(tileset.palettes().is_empty());
        assert!(tileset.palette_groups().is_empty());
    }

    #[test]
    fn test_palette_lookup() {
        let mut tileset = FullTileset::new(0);
        tileset.set_palettes(vec![
            Palette::new(5, 0),
            Palette::new(5, 1),
            Palette::new(6, 0),
        ]);

        assert_eq!(tileset.palette_groups().len(), 2);
        assert_eq!(tileset.palette_group(5).map(|p| p.len()), Some(2));
        assert!(tileset.has_palette_group(6));
        assert!(!tileset.has_palette_group(7));
        assert!(tileset.palette(6, 0).is_some());
        assert!(tileset.palette(6, 1).is_none());
    }

    #[test]
    fn test_from_parts_rejects_bad_sizes() {
        assert!(FullTileset::from_parts(0, vec![Minitile::default(); 3], vec![], vec![]).is_err());
        assert!(FullTileset::from_parts(
            0,
            vec![Minitile::default(); MINITILE_COUNT],
            vec![],
            vec![Tile::default(); MAX_TILES + 1]
        )
        .is_err());
        assert_eq!(
            FullTileset::from_parts(
                0,
                vec![Minitile::default(); MINITILE_COUNT],
                vec![Palette::new(0, 40)],
                vec![]
            )
            .map(|_| ()),
            Err(CoreError::out_of_range("palette", 40u8, MAX_PALETTE_KEY))
        );
    }

    #[test]
    fn test_swap_minitiles_rewrites_references() {
        let mut tileset = FullTileset::new(0);
        tileset.minitiles[1].background[0] = 1;
        tileset.minitiles[2].background[0] = 2;
        tileset.tiles[0].set_metadata(0, HFLIP_BIT | (4 << 10) | 1);
        tileset.tiles[0].set_metadata(1, 2);
        tileset.tiles[5].set_metadata(15, 7);

        tileset.swap_minitiles(1, 2);

        assert_eq!(tileset.minitiles[2].background[0], 1);
        assert_eq!(tileset.minitiles[1].background[0], 2);
        assert_eq!(tileset.tiles[0].metadata[0], HFLIP_BIT | (4 << 10) | 2);
        assert_eq!(tileset.tiles[0].metadata[1], 1);
        assert_eq!(tileset.tiles[5].metadata[15], 7);
    }
}
