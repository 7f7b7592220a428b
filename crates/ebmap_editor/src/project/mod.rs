//! The project data aggregate
//!
//! `ProjectData` owns every table of an open project. It is changed only by
//! commands (see [`crate::commands`]); UI code holds IDs, UUIDs or
//! coordinates and resolves them again after each command.

mod file;

pub use file::*;

use crate::io::Manifest;
use ebmap_core::sparse::{BISECTOR_COLUMNS, BISECTOR_ROWS};
use ebmap_core::tileset::codec;
use ebmap_core::{
    Coord, CoreError, EnemyGroup, EnemyMapGroup, EnemyTileGrid, FullTileset, GraphicsKey, Hotspot,
    MapTile, MapTileGrid, NpcInstance, NpcTable, PaletteSettingsTable, Sector, SectorGrid,
    SpriteGroup, SpriteSheet, Teleport, TileGraphicCache, Trigger, Warp, TILESET_COUNT,
};
use ebmap_schema::UserDataFields;
use image::RgbaImage;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use uuid::Uuid;

/// A bisector cell, `(column, row)`
pub type CellKey = (usize, usize);

/// Every table of an open project
#[derive(Debug, Clone)]
#[cfg_attr(feature = "bevy", derive(bevy::prelude::Resource))]
pub struct ProjectData {
    pub manifest: Manifest,
    pub path: Option<PathBuf>,
    pub dirty: bool,

    pub map_tiles: MapTileGrid,
    pub sectors: SectorGrid,
    pub user_data_fields: UserDataFields,
    pub palette_settings: PaletteSettingsTable,
    pub npcs: NpcTable,
    pub warps: Vec<Warp>,
    pub teleports: Vec<Teleport>,
    pub hotspots: Vec<Hotspot>,
    pub enemy_tiles: EnemyTileGrid,
    pub enemy_map_groups: Vec<EnemyMapGroup>,
    /// Battle groups, read-only
    pub enemy_groups: Vec<EnemyGroup>,
    /// Sprite group sizes, read-only
    pub sprite_groups: Vec<SpriteGroup>,
    pub sprite_sheets: BTreeMap<usize, SpriteSheet>,
    pub tile_graphics: TileGraphicCache,

    tilesets: Vec<FullTileset>,
    npc_instances: Vec<NpcInstance>,
    triggers: Vec<Trigger>,

    // Lookup indices, rebuilt on structural change
    tileset_index: HashMap<u8, usize>,
    npc_index: HashMap<Uuid, usize>,
    trigger_index: HashMap<Uuid, usize>,
    npc_cells: HashMap<CellKey, Vec<Uuid>>,
    trigger_cells: HashMap<CellKey, Vec<Uuid>>,
}

impl Default for ProjectData {
    fn default() -> Self {
        Self::new()
    }
}

/// Bisector cell containing `coord`, if it is on the map
pub fn bisector_cell(coord: Coord) -> Option<CellKey> {
    let cell = coord.to_bisector();
    if coord.x < 0 || coord.y < 0 {
        return None;
    }
    let (x, y) = (cell.x as usize, cell.y as usize);
    (x < BISECTOR_COLUMNS && y < BISECTOR_ROWS).then_some((x, y))
}

impl ProjectData {
    /// An empty project with full-size grids and no tilesets
    pub fn new() -> Self {
        Self {
            manifest: Manifest::default(),
            path: None,
            dirty: false,
            map_tiles: MapTileGrid::new(),
            sectors: SectorGrid::new(),
            user_data_fields: UserDataFields::new(),
            palette_settings: PaletteSettingsTable::new(),
            npcs: NpcTable::new(),
            warps: Vec::new(),
            teleports: Vec::new(),
            hotspots: Vec::new(),
            enemy_tiles: EnemyTileGrid::new(),
            enemy_map_groups: Vec::new(),
            enemy_groups: Vec::new(),
            sprite_groups: Vec::new(),
            sprite_sheets: BTreeMap::new(),
            tile_graphics: TileGraphicCache::new(),
            tilesets: Vec::new(),
            npc_instances: Vec::new(),
            triggers: Vec::new(),
            tileset_index: HashMap::new(),
            npc_index: HashMap::new(),
            trigger_index: HashMap::new(),
            npc_cells: HashMap::new(),
            trigger_cells: HashMap::new(),
        }
    }

    /// Rebuild all lookup indices. Call after loading or bulk modifications.
    pub fn rebuild_indices(&mut self) {
        self.tileset_index.clear();
        for (idx, tileset) in self.tilesets.iter().enumerate() {
            self.tileset_index.insert(tileset.id, idx);
        }
        self.rebuild_npc_index();
        self.rebuild_trigger_index();
    }

    fn rebuild_npc_index(&mut self) {
        self.npc_index.clear();
        self.npc_cells.clear();
        for (idx, instance) in self.npc_instances.iter().enumerate() {
            self.npc_index.insert(instance.uuid, idx);
            if let Some(cell) = bisector_cell(instance.coords) {
                self.npc_cells.entry(cell).or_default().push(instance.uuid);
            }
        }
    }

    fn rebuild_trigger_index(&mut self) {
        self.trigger_index.clear();
        self.trigger_cells.clear();
        for (idx, trigger) in self.triggers.iter().enumerate() {
            self.trigger_index.insert(trigger.uuid, idx);
            if let Some(cell) = bisector_cell(trigger.coords) {
                self.trigger_cells.entry(cell).or_default().push(trigger.uuid);
            }
        }
    }

    /// Mark project as modified
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Check if project has unsaved changes
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Project name from its directory
    pub fn name(&self) -> String {
        self.path
            .as_ref()
            .and_then(|p| p.file_name())
            .and_then(|s| s.to_str())
            .map(|s| s.to_string())
            .unwrap_or_else(|| "Untitled".to_string())
    }

    // ---- grids ----------------------------------------------------------

    /// Sector containing a pixel coordinate. Panics off the map.
    pub fn sector_at(&self, coord: Coord) -> &Sector {
        let id = self.sectors.id_at(coord);
        let (col, row) = self.sectors.position(id);
        self.sectors.at(col, row)
    }

    /// Map tile containing a pixel coordinate. Panics off the map.
    pub fn map_tile_at(&self, coord: Coord) -> &MapTile {
        self.map_tiles.at_coord(coord)
    }

    /// Enemy map group at a pixel coordinate. Panics off the map.
    pub fn enemy_tile_at(&self, coord: Coord) -> u16 {
        self.enemy_tiles.at_coord(coord)
    }

    /// Copy a sector's graphics into the map tiles it covers
    pub fn refresh_sector_tiles(&mut self, sector: usize) {
        let Some(graphics) = self.sectors.get(sector).map(Sector::graphics) else {
            return;
        };
        let (col, row) = self.sectors.position(sector);
        self.map_tiles.refresh_sector(col, row, graphics);
    }

    pub fn refresh_all_tiles(&mut self) {
        self.map_tiles.refresh_all(&self.sectors);
    }

    /// Derive each sector's graphics tileset from its palette group.
    /// Sectors whose group no tileset carries fall back to tileset 0.
    pub fn sync_sector_tilesets(&mut self) {
        let lookup: HashMap<u8, u8> = self
            .tilesets
            .iter()
            .rev()
            .flat_map(|t| t.palette_groups().iter().map(move |g| (g.id, t.id)))
            .collect();
        for sector in self.sectors.iter_mut() {
            let group = sector.attributes.palette_group;
            sector.attributes.tileset = lookup.get(&group).copied().unwrap_or(0);
        }
    }

    // ---- NPC instances --------------------------------------------------

    pub fn npc_instances(&self) -> &[NpcInstance] {
        &self.npc_instances
    }

    /// Get NPC instance by UUID
    pub fn npc_instance(&self, uuid: Uuid) -> Option<&NpcInstance> {
        self.npc_index
            .get(&uuid)
            .and_then(|&idx| self.npc_instances.get(idx))
    }

    pub fn npc_instance_index(&self, uuid: Uuid) -> Option<usize> {
        self.npc_index.get(&uuid).copied()
    }

    /// NPC instances placed in one bisector cell
    pub fn npc_instances_in_cell(&self, cell: CellKey) -> Vec<&NpcInstance> {
        self.npc_cells
            .get(&cell)
            .into_iter()
            .flatten()
            .filter_map(|&uuid| self.npc_instance(uuid))
            .collect()
    }

    /// Insert at `index` (clamped to the end). Returns false if the UUID is
    /// already present.
    pub fn insert_npc_instance(&mut self, index: usize, instance: NpcInstance) -> bool {
        if self.npc_index.contains_key(&instance.uuid) {
            return false;
        }
        let index = index.min(self.npc_instances.len());
        self.npc_instances.insert(index, instance);
        self.rebuild_npc_index();
        self.dirty = true;
        true
    }

    /// Remove an instance, returning it with the index it occupied
    pub fn remove_npc_instance(&mut self, uuid: Uuid) -> Option<(usize, NpcInstance)> {
        let idx = self.npc_index.get(&uuid).copied()?;
        let instance = self.npc_instances.remove(idx);
        self.rebuild_npc_index();
        self.dirty = true;
        Some((idx, instance))
    }

    /// Move an instance, returning its previous position
    pub fn set_npc_instance_coords(&mut self, uuid: Uuid, coords: Coord) -> Option<Coord> {
        let idx = self.npc_index.get(&uuid).copied()?;
        let instance = &mut self.npc_instances[idx];
        let old = std::mem::replace(&mut instance.coords, coords);
        if bisector_cell(old) != bisector_cell(coords) {
            self.rebuild_npc_index();
        }
        self.dirty = true;
        Some(old)
    }

    /// Point an instance at another NPC template, returning the previous ID
    pub fn set_npc_instance_npc(&mut self, uuid: Uuid, npc_id: u16) -> Option<u16> {
        let idx = self.npc_index.get(&uuid).copied()?;
        self.dirty = true;
        Some(std::mem::replace(
            &mut self.npc_instances[idx].npc_id,
            npc_id,
        ))
    }

    /// Number of placed instances that use an NPC template
    pub fn npc_instance_count(&self, npc_id: u16) -> usize {
        self.npc_instances
            .iter()
            .filter(|i| i.npc_id == npc_id)
            .count()
    }

    /// Standing sprite frame for a placed NPC, if its sheet is loaded
    pub fn npc_sprite(&self, instance: &NpcInstance) -> Option<RgbaImage> {
        let npc = self.npcs.get(instance.npc_id as usize)?;
        self.sprite_sheets
            .get(&(npc.sprite as usize))?
            .facing(npc.direction)
    }

    // ---- triggers -------------------------------------------------------

    pub fn triggers(&self) -> &[Trigger] {
        &self.triggers
    }

    /// Get trigger by UUID
    pub fn trigger(&self, uuid: Uuid) -> Option<&Trigger> {
        self.trigger_index
            .get(&uuid)
            .and_then(|&idx| self.triggers.get(idx))
    }

    pub fn trigger_index(&self, uuid: Uuid) -> Option<usize> {
        self.trigger_index.get(&uuid).copied()
    }

    /// Triggers placed in one bisector cell
    pub fn triggers_in_cell(&self, cell: CellKey) -> Vec<&Trigger> {
        self.trigger_cells
            .get(&cell)
            .into_iter()
            .flatten()
            .filter_map(|&uuid| self.trigger(uuid))
            .collect()
    }

    /// Insert at `index` (clamped to the end). Returns false if the UUID is
    /// already present.
    pub fn insert_trigger(&mut self, index: usize, trigger: Trigger) -> bool {
        if self.trigger_index.contains_key(&trigger.uuid) {
            return false;
        }
        let index = index.min(self.triggers.len());
        self.triggers.insert(index, trigger);
        self.rebuild_trigger_index();
        self.dirty = true;
        true
    }

    pub fn remove_trigger(&mut self, uuid: Uuid) -> Option<(usize, Trigger)> {
        let idx = self.trigger_index.get(&uuid).copied()?;
        let trigger = self.triggers.remove(idx);
        self.rebuild_trigger_index();
        self.dirty = true;
        Some((idx, trigger))
    }

    /// Mutable access to a trigger's payload. Use
    /// [`ProjectData::set_trigger_coords`] to move it.
    pub fn trigger_kind_mut(&mut self, uuid: Uuid) -> Option<&mut ebmap_core::TriggerKind> {
        let idx = self.trigger_index.get(&uuid).copied()?;
        self.dirty = true;
        Some(&mut self.triggers[idx].kind)
    }

    pub fn set_trigger_coords(&mut self, uuid: Uuid, coords: Coord) -> Option<Coord> {
        let idx = self.trigger_index.get(&uuid).copied()?;
        let trigger = &mut self.triggers[idx];
        let old = std::mem::replace(&mut trigger.coords, coords);
        if bisector_cell(old) != bisector_cell(coords) {
            self.rebuild_trigger_index();
        }
        self.dirty = true;
        Some(old)
    }

    // ---- dense tables ---------------------------------------------------

    pub fn warp(&self, id: usize) -> Option<&Warp> {
        self.warps.get(id)
    }

    pub fn teleport(&self, id: usize) -> Option<&Teleport> {
        self.teleports.get(id)
    }

    pub fn hotspot(&self, id: usize) -> Option<&Hotspot> {
        self.hotspots.get(id)
    }

    pub fn enemy_map_group(&self, id: usize) -> Option<&EnemyMapGroup> {
        self.enemy_map_groups.get(id)
    }

    /// Hotspots whose rectangle contains `coord`
    pub fn hotspots_at(&self, coord: Coord) -> Vec<usize> {
        self.hotspots
            .iter()
            .enumerate()
            .filter(|(_, h)| h.contains(coord))
            .map(|(id, _)| id)
            .collect()
    }

    // ---- tilesets -------------------------------------------------------

    pub fn tilesets(&self) -> &[FullTileset] {
        &self.tilesets
    }

    /// Get tileset by ID
    pub fn tileset(&self, id: u8) -> Option<&FullTileset> {
        self.tileset_index
            .get(&id)
            .and_then(|&idx| self.tilesets.get(idx))
    }

    /// Mutable tileset access. Callers invalidate the tile graphics they
    /// affect.
    pub fn tileset_mut(&mut self, id: u8) -> Option<&mut FullTileset> {
        let idx = self.tileset_index.get(&id).copied()?;
        self.dirty = true;
        self.tilesets.get_mut(idx)
    }

    /// First tileset (by ID) carrying a palette group
    pub fn tileset_for_palette_group(&self, group: u8) -> Option<u8> {
        self.tilesets
            .iter()
            .find(|t| t.has_palette_group(group))
            .map(|t| t.id)
    }

    /// Add or replace a tileset, returning the one it replaced. Its tile
    /// graphics are rebuilt stale.
    pub fn set_tileset(&mut self, tileset: FullTileset) -> Option<FullTileset> {
        self.tile_graphics.repopulate(&tileset);
        self.dirty = true;
        let old = match self.tileset_index.get(&tileset.id) {
            Some(&idx) => Some(std::mem::replace(&mut self.tilesets[idx], tileset)),
            None => {
                self.tilesets.push(tileset);
                self.tilesets.sort_by_key(|t| t.id);
                None
            }
        };
        self.rebuild_indices();
        old
    }

    pub fn remove_tileset(&mut self, id: u8) -> Option<FullTileset> {
        let idx = self.tileset_index.get(&id).copied()?;
        let removed = self.tilesets.remove(idx);
        self.tile_graphics.invalidate_tileset(id);
        self.rebuild_indices();
        self.dirty = true;
        Some(removed)
    }

    /// Replace tileset `id` with `.fts` text.
    ///
    /// Only the graphics, arrangements and first palette come from the new
    /// text. The first palette takes the group ID of the old first palette,
    /// and every other palette of the old tileset is kept. Returns the
    /// tileset that was replaced.
    pub fn replace_tileset(
        &mut self,
        contents: &str,
        id: u8,
    ) -> Result<Option<FullTileset>, CoreError> {
        if id as usize >= TILESET_COUNT {
            return Err(CoreError::out_of_range(
                "tileset",
                id,
                TILESET_COUNT as i64 - 1,
            ));
        }
        let mut replacement = codec::decode(contents, id)?;
        if let Some(old) = self.tileset(id) {
            if let (Some(first), Some(old_first)) =
                (replacement.palettes().first(), old.palettes().first())
            {
                let mut first = first.clone();
                first.group = old_first.group;
                let mut palettes = vec![first];
                palettes.extend(old.palettes()[1..].iter().cloned());
                replacement.set_palettes(palettes);
            } else if replacement.palettes().is_empty() {
                replacement.set_palettes(old.palettes().to_vec());
            }
        }
        Ok(self.set_tileset(replacement))
    }

    /// Rendered image of a tile under a graphics key, drawn on first use.
    /// Missing keys fall back as [`TileGraphicCache::resolve`] describes.
    pub fn tile_graphic(&mut self, graphics: GraphicsKey, tile: usize) -> Option<&RgbaImage> {
        let key = self.tile_graphics.resolve(graphics, tile)?;
        let idx = self.tileset_index.get(&key.graphics.tileset).copied()?;
        self.tile_graphics.rendered(key, &self.tilesets[idx])
    }

    /// Mark stale every cached tile of `tileset` that places `minitile`
    pub fn invalidate_minitile_graphics(&mut self, tileset: u8, minitile: u16) {
        if let Some(&idx) = self.tileset_index.get(&tileset) {
            self.tile_graphics
                .invalidate_minitile(&self.tilesets[idx], minitile);
        }
    }

    /// Rendered image of the map tile at `(x, y)`
    pub fn map_tile_graphic(&mut self, x: usize, y: usize) -> Option<&RgbaImage> {
        let tile = *self.map_tiles.at(x, y);
        self.tile_graphic(tile.graphics, tile.tile as usize)
    }

    // ---- diagnostics ----------------------------------------------------

    /// Non-fatal problems worth showing the user
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = self.palette_settings.warnings();
        for (id, group) in self.enemy_map_groups.iter().enumerate() {
            for (n, sub) in group.sub_groups.iter().enumerate() {
                if !sub.is_balanced() {
                    warnings.push(format!(
                        "enemy map group {}: sub-group {} weights add up to {}",
                        id,
                        n + 1,
                        sub.total_weight()
                    ));
                }
            }
        }
        for (id, hotspot) in self.hotspots.iter().enumerate() {
            if !hotspot.end.all_ge(hotspot.start) {
                warnings.push(format!("hotspot {}: corners are reversed", id));
            }
        }
        warnings
    }

    /// Replace all NPC instances and triggers at once, as loading does
    pub(crate) fn set_placements(
        &mut self,
        npc_instances: Vec<NpcInstance>,
        triggers: Vec<Trigger>,
    ) {
        self.npc_instances = npc_instances;
        self.triggers = triggers;
        self.rebuild_indices();
    }

    pub(crate) fn set_tilesets(&mut self, mut tilesets: Vec<FullTileset>) {
        tilesets.sort_by_key(|t| t.id);
        self.tile_graphics.clear();
        for tileset in &tilesets {
            self.tile_graphics.populate(tileset);
        }
        self.tilesets = tilesets;
        self.rebuild_indices();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ebmap_core::tileset::Palette;
    use ebmap_core::TriggerKind;

    fn tileset_with_groups(id: u8, groups: &[(u8, u8)]) -> FullTileset {
        let mut tileset = FullTileset::new(id);
        tileset.set_palettes(groups.iter().map(|&(g, p)| Palette::new(g, p)).collect());
        tileset
    }

    #[test]
    fn test_lookups_by_coordinate() {
        let mut project = ProjectData::new();
        project.sectors.at_mut(1, 2).attributes.music = 9;
        project.enemy_tiles.set(4, 4, 3);

        // Sector (1, 2) spans x 256..512, y 256..384
        assert_eq!(project.sector_at(Coord::new(300, 300)).attributes.music, 9);
        assert_eq!(project.enemy_tile_at(Coord::new(4 * 64, 4 * 64 + 10)), 3);
        assert_eq!(project.map_tile_at(Coord::new(0, 0)).tile, 0);
    }

    #[test]
    #[should_panic]
    fn test_sector_at_off_map_panics() {
        ProjectData::new().sector_at(Coord::new(0, 80 * 128));
    }

    #[test]
    fn test_npc_index_follows_moves() {
        let mut project = ProjectData::new();
        let a = NpcInstance::new(1, Coord::new(10, 10));
        let b = NpcInstance::new(2, Coord::new(300, 10));
        let (ua, ub) = (a.uuid, b.uuid);
        assert!(project.insert_npc_instance(0, a.clone()));
        assert!(project.insert_npc_instance(5, b));
        assert!(!project.insert_npc_instance(0, a));

        assert_eq!(project.npc_instance_index(ub), Some(1));
        assert_eq!(project.npc_instances_in_cell((0, 0)).len(), 1);
        assert_eq!(project.npc_instances_in_cell((1, 0)).len(), 1);

        assert_eq!(
            project.set_npc_instance_coords(ua, Coord::new(260, 20)),
            Some(Coord::new(10, 10))
        );
        assert!(project.npc_instances_in_cell((0, 0)).is_empty());
        assert_eq!(project.npc_instances_in_cell((1, 0)).len(), 2);

        let (idx, removed) = project.remove_npc_instance(ua).unwrap();
        assert_eq!((idx, removed.npc_id), (0, 1));
        assert_eq!(project.npc_instance_index(ub), Some(0));
        assert!(project.npc_instance(ua).is_none());
    }

    #[test]
    fn test_trigger_index() {
        let mut project = ProjectData::new();
        let trigger = Trigger::new(Coord::new(520, 1040), TriggerKind::Ladder);
        let uuid = trigger.uuid;
        project.insert_trigger(0, trigger);
        assert_eq!(project.triggers_in_cell((2, 4)).len(), 1);
        assert_eq!(project.trigger(uuid).unwrap().kind, TriggerKind::Ladder);
        assert!(project.remove_trigger(uuid).is_some());
        assert!(project.triggers_in_cell((2, 4)).is_empty());
    }

    #[test]
    fn test_tileset_for_palette_group() {
        let mut project = ProjectData::new();
        project.set_tilesets(vec![
            tileset_with_groups(1, &[(5, 0), (6, 0)]),
            tileset_with_groups(0, &[(2, 0)]),
        ]);
        assert_eq!(project.tileset_for_palette_group(6), Some(1));
        assert_eq!(project.tileset_for_palette_group(2), Some(0));
        assert_eq!(project.tileset_for_palette_group(9), None);

        project.sectors.at_mut(0, 0).attributes.palette_group = 6;
        project.sync_sector_tilesets();
        assert_eq!(project.sectors.at(0, 0).attributes.tileset, 1);
        assert_eq!(project.sectors.at(1, 0).attributes.tileset, 0);
    }

    #[test]
    fn test_replace_tileset_keeps_old_palettes() {
        let mut project = ProjectData::new();
        let mut old = tileset_with_groups(3, &[(10, 0), (10, 1), (11, 0)]);
        old.palettes_mut()[1].subpalettes[0].set_colour(1, [8, 8, 8]);
        old.rebuild_palette_groups();
        project.set_tilesets(vec![old]);

        let mut incoming = tileset_with_groups(3, &[(20, 0), (20, 1)]);
        incoming.palettes_mut()[0].subpalettes[0].set_colour(1, [248, 0, 0]);
        incoming.rebuild_palette_groups();
        incoming.minitiles[5].set_pixel(ebmap_core::MinitileLayer::Background, 0, 0, 7);
        let text = codec::encode(&incoming).unwrap();

        let replaced = project.replace_tileset(&text, 3).unwrap().unwrap();
        assert_eq!(replaced.palettes().len(), 3);

        let now = project.tileset(3).unwrap();
        let keys: Vec<(u8, u8)> = now.palettes().iter().map(|p| p.key()).collect();
        assert_eq!(keys, vec![(10, 0), (10, 1), (11, 0)]);
        assert_eq!(now.palettes()[0].subpalettes[0].colour(1).0[0], 248);
        assert_eq!(now.palettes()[1].subpalettes[0].colour(1).0[0], 8);
        assert_eq!(now.minitiles[5].pixel(ebmap_core::MinitileLayer::Background, 0, 0), 7);
        assert_eq!(project.tile_graphics.stale_count(), 3 * ebmap_core::MAX_TILES);
    }

    #[test]
    fn test_replace_tileset_rejects_bad_id() {
        let mut project = ProjectData::new();
        assert!(matches!(
            project.replace_tileset("", 200),
            Err(CoreError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_tile_graphic_is_lazy() {
        let mut project = ProjectData::new();
        project.set_tilesets(vec![tileset_with_groups(0, &[(0, 0)])]);
        let stale = project.tile_graphics.stale_count();
        let image = project.tile_graphic(GraphicsKey::default(), 5000).unwrap();
        assert_eq!(image.dimensions(), (32, 32));
        assert_eq!(project.tile_graphics.stale_count(), stale - 1);
    }

    #[test]
    fn test_warnings_include_unbalanced_groups() {
        let mut project = ProjectData::new();
        let mut group = EnemyMapGroup::default();
        group.sub_groups[0].entries.push(ebmap_core::SubGroupEntry {
            enemy_group: 1,
            probability: 3,
        });
        project.enemy_map_groups.push(group);
        let warnings = project.warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("add up to 3"));
    }
}
