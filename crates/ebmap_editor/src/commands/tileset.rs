//! Tileset graphics commands
//!
//! Each command marks stale exactly the cached tile graphics it can affect:
//! a minitile edit touches the tiles placing it, a tile edit that tile under
//! every palette, a colour edit every tile under one palette.

use super::{same_kind, Change, Command, CommandKind};
use crate::error::CommandError;
use crate::project::ProjectData;
use ebmap_core::tileset::{MINITILE_SIZE, PALETTE_SUBPALETTES, SUBPALETTE_COLOURS};
use ebmap_core::{CoreError, FullTileset, MinitileLayer, Tile, MAX_TILES, MINITILE_COUNT};
use std::any::Any;

fn tileset_mut(project: &mut ProjectData, id: u8) -> Result<&mut FullTileset, CommandError> {
    project
        .tileset_mut(id)
        .ok_or_else(|| CommandError::unknown("tileset", id))
}

fn check_minitile(minitile: usize) -> Result<(), CoreError> {
    if minitile >= MINITILE_COUNT {
        return Err(CoreError::out_of_range(
            "minitile",
            minitile as i64,
            MINITILE_COUNT as i64 - 1,
        ));
    }
    Ok(())
}

/// Paint pixels of one minitile layer, `((x, y), colour index)`
#[derive(Debug)]
pub struct DrawMinitile {
    tileset: u8,
    minitile: usize,
    layer: MinitileLayer,
    pixels: Vec<((usize, usize), u8)>,
    before: Option<Vec<u8>>,
    after: Option<Vec<u8>>,
}

impl DrawMinitile {
    pub fn new(
        tileset: u8,
        minitile: usize,
        layer: MinitileLayer,
        pixels: Vec<((usize, usize), u8)>,
    ) -> Self {
        Self {
            tileset,
            minitile,
            layer,
            pixels,
            before: None,
            after: None,
        }
    }

    fn validate(&self) -> Result<(), CoreError> {
        check_minitile(self.minitile)?;
        for &((x, y), value) in &self.pixels {
            if x >= MINITILE_SIZE || y >= MINITILE_SIZE {
                let index = (y * MINITILE_SIZE + x) as i64;
                let max = (MINITILE_SIZE * MINITILE_SIZE) as i64 - 1;
                return Err(CoreError::out_of_range("minitile pixel", index, max));
            }
            if value as usize >= SUBPALETTE_COLOURS {
                let max = SUBPALETTE_COLOURS as i64 - 1;
                return Err(CoreError::out_of_range("colour index", value, max));
            }
        }
        Ok(())
    }

    fn write_layer(&self, project: &mut ProjectData, pixels: &[u8]) -> Result<(), CommandError> {
        let tileset = tileset_mut(project, self.tileset)?;
        tileset.minitiles[self.minitile]
            .layer_mut(self.layer)
            .copy_from_slice(pixels);
        project.invalidate_minitile_graphics(self.tileset, self.minitile as u16);
        Ok(())
    }
}

impl Command for DrawMinitile {
    fn kind(&self) -> CommandKind {
        CommandKind::DrawMinitile
    }

    fn description(&self) -> String {
        format!("Draw minitile {}", self.minitile)
    }

    fn apply(&mut self, project: &mut ProjectData) -> Result<Vec<Change>, CommandError> {
        self.validate()?;
        let tileset = tileset_mut(project, self.tileset)?;
        let minitile = &mut tileset.minitiles[self.minitile];
        let before = minitile.layer(self.layer).to_vec();
        for &((x, y), value) in &self.pixels {
            minitile.set_pixel(self.layer, x, y, value);
        }
        self.after = Some(minitile.layer(self.layer).to_vec());
        self.before.get_or_insert(before);
        project.invalidate_minitile_graphics(self.tileset, self.minitile as u16);
        Ok(vec![Change::Tileset(self.tileset)])
    }

    fn revert(&mut self, project: &mut ProjectData) -> Result<Vec<Change>, CommandError> {
        let before = self
            .before
            .clone()
            .ok_or_else(|| CommandError::unknown("minitile", self.minitile))?;
        self.write_layer(project, &before)?;
        Ok(vec![Change::Tileset(self.tileset)])
    }

    /// Strokes on the same layer of the same minitile merge
    fn can_merge(&self, other: &dyn Command) -> bool {
        same_kind(self, other).is_some_and(|o| {
            o.tileset == self.tileset
                && o.minitile == self.minitile
                && o.layer == self.layer
                && self.after.is_some()
                && o.before == self.after
        })
    }

    fn merge(&mut self, other: &dyn Command) {
        if let Some(other) = same_kind(self, other) {
            self.pixels.extend(other.pixels.iter().copied());
            self.after = other.after.clone();
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Replace a tile arrangement: metadata words and collision bytes
#[derive(Debug)]
pub struct EditTile {
    tileset: u8,
    tile: usize,
    after: Tile,
    before: Option<Tile>,
}

impl EditTile {
    pub fn new(tileset: u8, tile: usize, after: Tile) -> Self {
        Self {
            tileset,
            tile,
            after,
            before: None,
        }
    }

    fn swap_in(&self, project: &mut ProjectData, tile: Tile) -> Result<Tile, CommandError> {
        if self.tile >= MAX_TILES {
            let max = MAX_TILES as i64 - 1;
            return Err(CoreError::out_of_range("tile", self.tile as i64, max).into());
        }
        let slot = tileset_mut(project, self.tileset)?
            .tile_mut(self.tile)
            .ok_or_else(|| CommandError::unknown("tile", self.tile))?;
        let mut tile = tile;
        // Stored words never carry the priority bit
        for (index, word) in tile.metadata.into_iter().enumerate() {
            tile.set_metadata(index, word);
        }
        let old = std::mem::replace(slot, tile);
        project.tile_graphics.invalidate_tile(self.tileset, self.tile);
        Ok(old)
    }
}

impl Command for EditTile {
    fn kind(&self) -> CommandKind {
        CommandKind::EditTile
    }

    fn description(&self) -> String {
        format!("Edit tile {}", self.tile)
    }

    fn apply(&mut self, project: &mut ProjectData) -> Result<Vec<Change>, CommandError> {
        let old = self.swap_in(project, self.after)?;
        self.before.get_or_insert(old);
        Ok(vec![Change::Tileset(self.tileset)])
    }

    fn revert(&mut self, project: &mut ProjectData) -> Result<Vec<Change>, CommandError> {
        let before = self
            .before
            .ok_or_else(|| CommandError::unknown("tile", self.tile))?;
        self.swap_in(project, before)?;
        Ok(vec![Change::Tileset(self.tileset)])
    }

    fn can_merge(&self, other: &dyn Command) -> bool {
        same_kind(self, other).is_some_and(|o| {
            o.tileset == self.tileset && o.tile == self.tile && o.before == Some(self.after)
        })
    }

    fn merge(&mut self, other: &dyn Command) {
        if let Some(other) = same_kind(self, other) {
            self.after = other.after;
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Change one colour of one subpalette
#[derive(Debug)]
pub struct SetSubpaletteColour {
    tileset: u8,
    palette_group: u8,
    palette: u8,
    subpalette: usize,
    index: usize,
    rgb: [u8; 3],
    before: Option<[u8; 3]>,
}

impl SetSubpaletteColour {
    pub fn new(
        tileset: u8,
        (palette_group, palette): (u8, u8),
        subpalette: usize,
        index: usize,
        rgb: [u8; 3],
    ) -> Self {
        Self {
            tileset,
            palette_group,
            palette,
            subpalette,
            index,
            rgb,
            before: None,
        }
    }

    fn store(&self, project: &mut ProjectData, rgb: [u8; 3]) -> Result<[u8; 3], CommandError> {
        if self.subpalette >= PALETTE_SUBPALETTES {
            let max = PALETTE_SUBPALETTES as i64 - 1;
            return Err(CoreError::out_of_range("subpalette", self.subpalette as i64, max).into());
        }
        if self.index >= SUBPALETTE_COLOURS {
            let max = SUBPALETTE_COLOURS as i64 - 1;
            return Err(CoreError::out_of_range("colour index", self.index as i64, max).into());
        }
        let palette = tileset_mut(project, self.tileset)?
            .palette_mut(self.palette_group, self.palette)
            .ok_or_else(|| {
                CommandError::unknown(
                    "palette",
                    format!("{}/{}", self.palette_group, self.palette),
                )
            })?;
        let subpalette = &mut palette.subpalettes[self.subpalette];
        let [r, g, b, _] = subpalette.colour(self.index).0;
        subpalette.set_colour(self.index, rgb);
        project
            .tile_graphics
            .invalidate_palette(self.tileset, self.palette_group, self.palette);
        Ok([r, g, b])
    }
}

impl Command for SetSubpaletteColour {
    fn kind(&self) -> CommandKind {
        CommandKind::SubpaletteColour
    }

    fn description(&self) -> String {
        format!(
            "Change colour {} of palette {}/{}",
            self.index, self.palette_group, self.palette
        )
    }

    fn apply(&mut self, project: &mut ProjectData) -> Result<Vec<Change>, CommandError> {
        let old = self.store(project, self.rgb)?;
        self.before.get_or_insert(old);
        Ok(vec![Change::Tileset(self.tileset)])
    }

    fn revert(&mut self, project: &mut ProjectData) -> Result<Vec<Change>, CommandError> {
        let before = self
            .before
            .ok_or_else(|| CommandError::unknown("palette", self.palette))?;
        self.store(project, before)?;
        Ok(vec![Change::Tileset(self.tileset)])
    }

    /// Dragging a colour picker merges into one edit
    fn can_merge(&self, other: &dyn Command) -> bool {
        same_kind(self, other).is_some_and(|o| {
            (o.tileset, o.palette_group, o.palette, o.subpalette, o.index)
                == (
                    self.tileset,
                    self.palette_group,
                    self.palette,
                    self.subpalette,
                    self.index,
                )
                && o.before == Some(self.rgb)
        })
    }

    fn merge(&mut self, other: &dyn Command) {
        if let Some(other) = same_kind(self, other) {
            self.rgb = other.rgb;
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Exchange two minitile slots, rewriting tile references so the tiles look
/// the same. Applying it twice restores the original.
#[derive(Debug)]
pub struct SwapMinitiles {
    tileset: u8,
    a: usize,
    b: usize,
}

impl SwapMinitiles {
    pub fn new(tileset: u8, a: usize, b: usize) -> Self {
        Self { tileset, a, b }
    }

    fn swap(&self, project: &mut ProjectData) -> Result<Vec<Change>, CommandError> {
        check_minitile(self.a)?;
        check_minitile(self.b)?;
        tileset_mut(project, self.tileset)?.swap_minitiles(self.a, self.b);
        project.tile_graphics.invalidate_tileset(self.tileset);
        Ok(vec![Change::Tileset(self.tileset)])
    }
}

impl Command for SwapMinitiles {
    fn kind(&self) -> CommandKind {
        CommandKind::SwapMinitiles
    }

    fn description(&self) -> String {
        format!("Swap minitiles {} and {}", self.a, self.b)
    }

    fn apply(&mut self, project: &mut ProjectData) -> Result<Vec<Change>, CommandError> {
        self.swap(project)
    }

    fn revert(&mut self, project: &mut ProjectData) -> Result<Vec<Change>, CommandError> {
        self.swap(project)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Replace a tileset's graphics and arrangements with `.fts` text, keeping
/// its palettes
#[derive(Debug)]
pub struct ReplaceTileset {
    id: u8,
    contents: String,
    /// `Some(None)` when the tileset did not exist before
    previous: Option<Option<FullTileset>>,
}

impl ReplaceTileset {
    pub fn new(id: u8, contents: impl Into<String>) -> Self {
        Self {
            id,
            contents: contents.into(),
            previous: None,
        }
    }

    /// Sector tilesets follow palette groups, which may have changed owner
    fn resync(project: &mut ProjectData) {
        project.sync_sector_tilesets();
        project.refresh_all_tiles();
    }
}

impl Command for ReplaceTileset {
    fn kind(&self) -> CommandKind {
        CommandKind::ReplaceTileset
    }

    fn description(&self) -> String {
        format!("Replace tileset {}", self.id)
    }

    fn apply(&mut self, project: &mut ProjectData) -> Result<Vec<Change>, CommandError> {
        let previous = project.replace_tileset(&self.contents, self.id)?;
        self.previous = Some(previous);
        Self::resync(project);
        Ok(vec![Change::Tileset(self.id), Change::MapTiles])
    }

    fn revert(&mut self, project: &mut ProjectData) -> Result<Vec<Change>, CommandError> {
        match self.previous.take() {
            Some(Some(old)) => {
                project.set_tileset(old);
            }
            Some(None) => {
                project.remove_tileset(self.id);
            }
            None => return Err(CommandError::unknown("tileset", self.id)),
        }
        Self::resync(project);
        Ok(vec![Change::Tileset(self.id), Change::MapTiles])
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
