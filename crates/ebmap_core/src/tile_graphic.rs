//! Rendered tile graphics and their cache
//!
//! [`render_tile`] composes one 32x32 tile arrangement from minitiles and a
//! palette. [`TileGraphicCache`] holds rendered images keyed by (tileset,
//! palette group, palette, tile). Entries are marked stale by the commands
//! that change their inputs and re-rendered lazily on the next access.

use crate::sector::GraphicsKey;
use crate::tileset::{
    metadata_hflip, metadata_minitile, metadata_subpalette, metadata_vflip, FullTileset, Palette,
    MAX_TILES, MINITILE_SIZE, TILE_MINITILES_WIDE,
};
use image::{Rgba, RgbaImage};
use std::collections::BTreeMap;

/// Rendered tile width and height in pixels
pub const TILE_PIXELS: u32 = (MINITILE_SIZE * TILE_MINITILES_WIDE) as u32;

const ERROR_LIGHT: Rgba<u8> = Rgba([255, 0, 255, 255]);
const ERROR_DARK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Render tile `tile_id` of `tileset` with `palette`.
///
/// Background pixels are drawn opaque, with the key colour as a backdrop;
/// foreground pixels overwrite them where non-zero. Placements with an
/// invalid subpalette or minitile draw a checkerboard instead.
pub fn render_tile(tileset: &FullTileset, palette: &Palette, tile_id: usize) -> RgbaImage {
    let mut image = RgbaImage::new(TILE_PIXELS, TILE_PIXELS);
    let Some(tile) = tileset.tile(tile_id) else {
        draw_error(&mut image, 0, 0, TILE_PIXELS);
        return image;
    };

    let size = MINITILE_SIZE as u32;
    for (index, &word) in tile.metadata.iter().enumerate() {
        let ox = (index % TILE_MINITILES_WIDE) as u32 * size;
        let oy = (index / TILE_MINITILES_WIDE) as u32 * size;

        let subpalette = metadata_subpalette(word);
        let minitile = tileset.minitiles.get(metadata_minitile(word) as usize);
        let (Some(subpalette), Some(minitile)) = (palette.subpalette(subpalette), minitile) else {
            draw_error(&mut image, ox, oy, size);
            continue;
        };

        let (hflip, vflip) = (metadata_hflip(word), metadata_vflip(word));
        for y in 0..MINITILE_SIZE {
            for x in 0..MINITILE_SIZE {
                let sx = if hflip { MINITILE_SIZE - 1 - x } else { x };
                let sy = if vflip { MINITILE_SIZE - 1 - y } else { y };
                let i = sy * MINITILE_SIZE + sx;
                let fg = minitile.foreground[i] as usize;
                let colour = if fg != 0 {
                    subpalette.colour(fg)
                } else {
                    subpalette.backdrop_colour(minitile.background[i] as usize)
                };
                image.put_pixel(ox + x as u32, oy + y as u32, colour);
            }
        }
    }
    image
}

fn draw_error(image: &mut RgbaImage, ox: u32, oy: u32, size: u32) {
    for y in 0..size {
        for x in 0..size {
            let colour = if (x / 4 + y / 4) % 2 == 0 {
                ERROR_LIGHT
            } else {
                ERROR_DARK
            };
            image.put_pixel(ox + x, oy + y, colour);
        }
    }
}

/// Cache entry for one tile under one palette
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapTileGraphic {
    pub has_rendered: bool,
    pub image: Option<RgbaImage>,
}

impl MapTileGraphic {
    pub fn invalidate(&mut self) {
        self.has_rendered = false;
    }
}

/// Fully resolved cache key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileGraphicKey {
    pub graphics: GraphicsKey,
    pub tile: usize,
}

type PaletteEntries = BTreeMap<u8, Vec<MapTileGraphic>>;
type GroupEntries = BTreeMap<u8, PaletteEntries>;

/// Render cache: tileset -> palette group -> palette -> tiles
#[derive(Debug, Clone, Default)]
pub struct TileGraphicCache {
    entries: BTreeMap<u8, GroupEntries>,
}

impl TileGraphicCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Create stale entries for every palette of a tileset
    pub fn populate(&mut self, tileset: &FullTileset) {
        let groups = self.entries.entry(tileset.id).or_default();
        for palette in tileset.palettes() {
            groups
                .entry(palette.group)
                .or_default()
                .entry(palette.id)
                .or_insert_with(|| vec![MapTileGraphic::default(); MAX_TILES]);
        }
    }

    /// Drop all entries for a tileset and rebuild them stale
    pub fn repopulate(&mut self, tileset: &FullTileset) {
        self.entries.remove(&tileset.id);
        self.populate(tileset);
    }

    /// Resolve a possibly-absent key. The tile is clamped into the table and
    /// each missing level falls back to its first available key.
    pub fn resolve(&self, graphics: GraphicsKey, tile: usize) -> Option<TileGraphicKey> {
        let (&tileset, groups) = self
            .entries
            .get_key_value(&graphics.tileset)
            .or_else(|| self.entries.iter().next())?;
        let (&palette_group, palettes) = groups
            .get_key_value(&graphics.palette_group)
            .or_else(|| groups.iter().next())?;
        let (&palette, _) = palettes
            .get_key_value(&graphics.palette)
            .or_else(|| palettes.iter().next())?;
        Some(TileGraphicKey {
            graphics: GraphicsKey {
                tileset,
                palette_group,
                palette,
            },
            tile: tile.min(MAX_TILES - 1),
        })
    }

    pub fn get(&self, key: TileGraphicKey) -> Option<&MapTileGraphic> {
        self.entries
            .get(&key.graphics.tileset)?
            .get(&key.graphics.palette_group)?
            .get(&key.graphics.palette)?
            .get(key.tile)
    }

    pub fn get_mut(&mut self, key: TileGraphicKey) -> Option<&mut MapTileGraphic> {
        self.entries
            .get_mut(&key.graphics.tileset)?
            .get_mut(&key.graphics.palette_group)?
            .get_mut(&key.graphics.palette)?
            .get_mut(key.tile)
    }

    /// Image for a resolved key, rendering it first if stale. `tileset`
    /// must be the tileset named by the key.
    pub fn rendered(&mut self, key: TileGraphicKey, tileset: &FullTileset) -> Option<&RgbaImage> {
        debug_assert_eq!(key.graphics.tileset, tileset.id);
        let palette = tileset.palette(key.graphics.palette_group, key.graphics.palette)?;
        let entry = self.get_mut(key)?;
        if !entry.has_rendered || entry.image.is_none() {
            entry.image = Some(render_tile(tileset, palette, key.tile));
            entry.has_rendered = true;
        }
        entry.image.as_ref()
    }

    fn for_each_in_tileset(&mut self, tileset: u8, mut f: impl FnMut(&mut Vec<MapTileGraphic>)) {
        if let Some(groups) = self.entries.get_mut(&tileset) {
            for palettes in groups.values_mut() {
                for tiles in palettes.values_mut() {
                    f(tiles);
                }
            }
        }
    }

    /// Mark every entry of a tileset stale
    pub fn invalidate_tileset(&mut self, tileset: u8) {
        self.for_each_in_tileset(tileset, |tiles| {
            tiles.iter_mut().for_each(MapTileGraphic::invalidate)
        });
    }

    /// Mark every tile drawn with one palette stale
    pub fn invalidate_palette(&mut self, tileset: u8, palette_group: u8, palette: u8) {
        if let Some(tiles) = self
            .entries
            .get_mut(&tileset)
            .and_then(|g| g.get_mut(&palette_group))
            .and_then(|p| p.get_mut(&palette))
        {
            tiles.iter_mut().for_each(MapTileGraphic::invalidate);
        }
    }

    /// Mark one tile stale under every palette of its tileset
    pub fn invalidate_tile(&mut self, tileset: u8, tile: usize) {
        self.for_each_in_tileset(tileset, |tiles| {
            if let Some(entry) = tiles.get_mut(tile) {
                entry.invalidate();
            }
        });
    }

    /// Mark stale every tile that places `minitile`
    pub fn invalidate_minitile(&mut self, tileset: &FullTileset, minitile: u16) {
        for tile in tileset.tiles_using_minitile(minitile) {
            self.invalidate_tile(tileset.id, tile);
        }
    }

    /// Number of entries that still need rendering
    pub fn stale_count(&self) -> usize {
        self.entries
            .values()
            .flat_map(|g| g.values())
            .flat_map(|p| p.values())
            .flat_map(|tiles| tiles.iter())
            .filter(|entry| !entry.has_rendered)
            .count()
    }
}
