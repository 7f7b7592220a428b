//! Project load/save through the resource I/O layer
//!
//! Loading builds a complete `ProjectData` or fails; nothing partial is
//! returned. Saving encodes tables in a fixed order and writes them one by
//! one. A failure stops the save, leaving the tables before it written.

use super::ProjectData;
use crate::io::{self, tables, FsStore, Manifest, ResourceStore, TableSpec, MANIFEST_FILE};
use ebmap_core::enemy::{EnemyMapGroupRecord, EnemyPlacementRecord};
use ebmap_core::hotspot::HotspotRecord;
use ebmap_core::npc::{self, NpcPlacementRecord};
use ebmap_core::palette_settings::PaletteSettingsRecords;
use ebmap_core::records::{dense_from_records, dense_to_records};
use ebmap_core::sector::SectorRecord;
use ebmap_core::sparse::SparseGrid;
use ebmap_core::sprite::SpriteGroupRecord;
use ebmap_core::tileset::codec;
use ebmap_core::trigger::{self, TriggerRecord};
use ebmap_core::warp::{TeleportRecord, WarpRecord};
use ebmap_core::{
    CoreError, EnemyGroup, EnemyTileGrid, MapTileGrid, Npc, NpcTable,
    PaletteSettingsTable, SectorGrid, SpriteGroup, SpriteSheet, TILESET_COUNT,
};
use ebmap_schema::UserDataFields;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("{path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("{path}: {source}")]
    Yaml {
        path: String,
        source: serde_yaml::Error,
    },
    #[error("{path}: {source}")]
    Format { path: String, source: CoreError },
    #[error("no resource found for {table} (tried {tried})")]
    MissingResource { table: String, tried: String },
    #[error("no project path set")]
    NoPath,
}

impl ProjectError {
    fn format(path: &str, source: impl Into<CoreError>) -> Self {
        ProjectError::Format {
            path: path.to_string(),
            source: source.into(),
        }
    }
}

/// Encoded tables ready to be written, in save order.
///
/// Built on the thread that owns the project so a worker can write it.
#[derive(Debug)]
pub struct SaveSnapshot {
    pub files: Vec<(String, Vec<u8>)>,
    /// Manifest after registering any table it did not list
    pub manifest: Manifest,
    /// Set when a table failed to encode; `files` holds the tables before it
    pub error: Option<ProjectError>,
}

impl SaveSnapshot {
    /// Write every file in order, then report the encode failure if any
    pub fn write(self, store: &mut dyn ResourceStore) -> Result<Manifest, ProjectError> {
        for (path, bytes) in &self.files {
            store.write(path, bytes).map_err(|source| ProjectError::Io {
                path: path.clone(),
                source,
            })?;
            debug!("wrote {} ({} bytes)", path, bytes.len());
        }
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.manifest),
        }
    }
}

fn required<T>(value: Option<(String, T)>, spec: &TableSpec) -> Result<(String, T), ProjectError> {
    value.ok_or_else(|| ProjectError::MissingResource {
        table: spec.table.to_string(),
        tried: spec.modules.join(", "),
    })
}

fn read_yaml<T: DeserializeOwned>(
    store: &dyn ResourceStore,
    manifest: &Manifest,
    spec: &TableSpec,
) -> Result<(String, T), ProjectError> {
    required(io::read_yaml(store, manifest, spec)?, spec)
}

impl ProjectData {
    /// Load every table named by the store's manifest
    pub fn load(store: &dyn ResourceStore) -> Result<Self, ProjectError> {
        let manifest_text = store
            .read_text(MANIFEST_FILE)
            .map_err(|source| ProjectError::Io {
                path: MANIFEST_FILE.to_string(),
                source,
            })?
            .ok_or_else(|| ProjectError::MissingResource {
                table: "manifest".to_string(),
                tried: MANIFEST_FILE.to_string(),
            })?;
        let manifest =
            Manifest::from_yaml(&manifest_text).map_err(|source| ProjectError::Yaml {
                path: MANIFEST_FILE.to_string(),
                source,
            })?;

        let mut project = ProjectData::new();

        project.user_data_fields =
            match io::read_yaml::<UserDataFields>(store, &manifest, &tables::USER_DATA_FIELDS)? {
                Some((_, fields)) => fields,
                None => UserDataFields::new(),
            };

        let mut tilesets = Vec::new();
        for id in 0..TILESET_COUNT as u8 {
            let spec = tables::tileset(id);
            if let Some((path, text)) = io::read_text(store, &manifest, &spec)? {
                tilesets.push(codec::decode(&text, id).map_err(|e| ProjectError::format(&path, e))?);
            }
        }
        if tilesets.is_empty() {
            warn!("project has no tilesets");
        }

        let (path, records) =
            read_yaml::<PaletteSettingsRecords>(store, &manifest, &tables::PALETTE_SETTINGS)?;
        project.palette_settings =
            PaletteSettingsTable::from_records(&records).map_err(|e| ProjectError::format(&path, e))?;

        let (path, text) = required(
            io::read_text(store, &manifest, &tables::MAP_TILES)?,
            &tables::MAP_TILES,
        )?;
        project.map_tiles = MapTileGrid::decode(&text).map_err(|e| ProjectError::format(&path, e))?;

        let (path, records) =
            read_yaml::<BTreeMap<usize, SectorRecord>>(store, &manifest, &tables::MAP_SECTORS)?;
        project.sectors =
            SectorGrid::from_records(&records).map_err(|e| ProjectError::format(&path, e))?;

        let (path, records) =
            read_yaml::<BTreeMap<usize, Npc>>(store, &manifest, &tables::NPC_CONFIG)?;
        project.npcs = NpcTable::from_records(records).map_err(|e| ProjectError::format(&path, e))?;

        let (path, grid) =
            read_yaml::<SparseGrid<NpcPlacementRecord>>(store, &manifest, &tables::MAP_SPRITES)?;
        let instances = npc::decode_instances(&grid).map_err(|e| ProjectError::format(&path, e))?;
        if let Some(bad) = instances
            .iter()
            .find(|i| i.npc_id as usize >= project.npcs.len())
        {
            return Err(ProjectError::format(
                &path,
                CoreError::out_of_range("NPC", bad.npc_id, project.npcs.len() as i64 - 1),
            ));
        }

        let (path, grid) =
            read_yaml::<SparseGrid<TriggerRecord>>(store, &manifest, &tables::MAP_DOORS)?;
        let triggers = trigger::decode_triggers(&grid).map_err(|e| ProjectError::format(&path, e))?;

        let (path, records) =
            read_yaml::<BTreeMap<usize, WarpRecord>>(store, &manifest, &tables::WARPS)?;
        project.warps =
            dense_from_records(&records, "warp").map_err(|e| ProjectError::format(&path, e))?;

        let (path, records) =
            read_yaml::<BTreeMap<usize, TeleportRecord>>(store, &manifest, &tables::TELEPORTS)?;
        project.teleports =
            dense_from_records(&records, "teleport").map_err(|e| ProjectError::format(&path, e))?;

        let (path, records) =
            read_yaml::<BTreeMap<usize, HotspotRecord>>(store, &manifest, &tables::HOTSPOTS)?;
        project.hotspots =
            dense_from_records(&records, "hotspot").map_err(|e| ProjectError::format(&path, e))?;

        let (path, records) = read_yaml::<BTreeMap<usize, EnemyMapGroupRecord>>(
            store,
            &manifest,
            &tables::ENEMY_MAP_GROUPS,
        )?;
        project.enemy_map_groups = dense_from_records(&records, "enemy map group")
            .map_err(|e| ProjectError::format(&path, e))?;

        let (path, records) = read_yaml::<BTreeMap<usize, EnemyPlacementRecord>>(
            store,
            &manifest,
            &tables::ENEMY_PLACEMENT,
        )?;
        project.enemy_tiles = EnemyTileGrid::from_records(&records, project.enemy_map_groups.len())
            .map_err(|e| ProjectError::format(&path, e))?;

        if let Some((_, groups)) =
            io::read_yaml::<BTreeMap<usize, EnemyGroup>>(store, &manifest, &tables::ENEMY_GROUPS)?
        {
            project.enemy_groups = groups.into_values().collect();
        }

        if let Some((path, records)) = io::read_yaml::<BTreeMap<usize, SpriteGroupRecord>>(
            store,
            &manifest,
            &tables::SPRITE_GROUPS,
        )? {
            for (id, record) in &records {
                let group =
                    SpriteGroup::try_from(record).map_err(|e| ProjectError::format(&path, e))?;
                if let Some(image) = io::locate(store, &manifest, &tables::sprite_sheet(*id))? {
                    let sheet = SpriteSheet::from_png(group, &image.bytes)
                        .map_err(|e| ProjectError::format(&image.path, e))?;
                    project.sprite_sheets.insert(*id, sheet);
                }
                project.sprite_groups.push(group);
            }
        }

        project.manifest = manifest;
        project.set_tilesets(tilesets);
        project.set_placements(instances, triggers);
        project.sync_sector_tilesets();
        project.refresh_all_tiles();
        project.dirty = false;

        for warning in project.warnings() {
            warn!("{}", warning);
        }
        info!(
            "loaded project: {} tilesets, {} NPCs, {} NPC placements, {} triggers",
            project.tilesets().len(),
            project.npcs.len(),
            project.npc_instances().len(),
            project.triggers().len()
        );
        Ok(project)
    }

    /// Encode every writable table, stopping at the first that fails
    pub fn snapshot(&self) -> SaveSnapshot {
        let mut manifest = self.manifest.clone();
        let mut files = Vec::new();
        let error = self.encode_tables(&mut manifest, &mut files).err();
        if error.is_none() {
            match manifest.to_yaml() {
                Ok(text) => files.push((MANIFEST_FILE.to_string(), text.into_bytes())),
                Err(source) => {
                    return SaveSnapshot {
                        files,
                        manifest,
                        error: Some(ProjectError::Yaml {
                            path: MANIFEST_FILE.to_string(),
                            source,
                        }),
                    }
                }
            }
        }
        SaveSnapshot {
            files,
            manifest,
            error,
        }
    }

    fn encode_tables(
        &self,
        manifest: &mut Manifest,
        files: &mut Vec<(String, Vec<u8>)>,
    ) -> Result<(), ProjectError> {
        let path = io::output_path(manifest, &tables::MAP_TILES);
        files.push((path, self.map_tiles.encode().into_bytes()));

        let path = io::output_path(manifest, &tables::MAP_SECTORS);
        let bytes = io::to_yaml(&path, &self.sectors.to_records())?;
        files.push((path, bytes));

        if !self.user_data_fields.is_empty()
            || io::locate_path(manifest, &tables::USER_DATA_FIELDS).is_some()
        {
            let path = io::output_path(manifest, &tables::USER_DATA_FIELDS);
            let bytes = io::to_yaml(&path, &self.user_data_fields)?;
            files.push((path, bytes));
        }

        for tileset in self.tilesets() {
            let path = io::output_path(manifest, &tables::tileset(tileset.id));
            let text = codec::encode(tileset).map_err(|e| ProjectError::format(&path, e))?;
            files.push((path, text.into_bytes()));
        }

        let path = io::output_path(manifest, &tables::PALETTE_SETTINGS);
        let bytes = io::to_yaml(&path, &self.palette_settings.to_records())?;
        files.push((path, bytes));

        let path = io::output_path(manifest, &tables::NPC_CONFIG);
        let bytes = io::to_yaml(&path, &self.npcs.to_records())?;
        files.push((path, bytes));

        let path = io::output_path(manifest, &tables::MAP_SPRITES);
        let grid = npc::encode_instances(self.npc_instances())
            .map_err(|e| ProjectError::format(&path, e))?;
        let bytes = io::to_yaml(&path, &grid)?;
        files.push((path, bytes));

        let path = io::output_path(manifest, &tables::MAP_DOORS);
        let grid =
            trigger::encode_triggers(self.triggers()).map_err(|e| ProjectError::format(&path, e))?;
        let bytes = io::to_yaml(&path, &grid)?;
        files.push((path, bytes));

        let path = io::output_path(manifest, &tables::WARPS);
        let records: BTreeMap<usize, WarpRecord> = dense_to_records(&self.warps);
        let bytes = io::to_yaml(&path, &records)?;
        files.push((path, bytes));

        let path = io::output_path(manifest, &tables::TELEPORTS);
        let records: BTreeMap<usize, TeleportRecord> = dense_to_records(&self.teleports);
        let bytes = io::to_yaml(&path, &records)?;
        files.push((path, bytes));

        let path = io::output_path(manifest, &tables::HOTSPOTS);
        let records: BTreeMap<usize, HotspotRecord> = dense_to_records(&self.hotspots);
        let bytes = io::to_yaml(&path, &records)?;
        files.push((path, bytes));

        let path = io::output_path(manifest, &tables::ENEMY_PLACEMENT);
        let bytes = io::to_yaml(&path, &self.enemy_tiles.to_records())?;
        files.push((path, bytes));

        let path = io::output_path(manifest, &tables::ENEMY_MAP_GROUPS);
        let records: BTreeMap<usize, EnemyMapGroupRecord> =
            dense_to_records(&self.enemy_map_groups);
        let bytes = io::to_yaml(&path, &records)?;
        files.push((path, bytes));

        Ok(())
    }

    /// Save every writable table to a store
    pub fn save(&mut self, store: &mut dyn ResourceStore) -> Result<(), ProjectError> {
        let manifest = self.snapshot().write(store)?;
        self.manifest = manifest;
        self.dirty = false;
        Ok(())
    }

    /// Load project from a directory
    pub fn load_dir(path: &Path) -> Result<Self, ProjectError> {
        let mut project = Self::load(&FsStore::new(path))?;
        project.path = Some(path.to_path_buf());
        Ok(project)
    }

    /// Save project to a directory
    pub fn save_dir(&mut self, path: &Path) -> Result<(), ProjectError> {
        self.save(&mut FsStore::new(path))?;
        self.path = Some(path.to_path_buf());
        info!("saved project to {:?}", path);
        Ok(())
    }

    /// Save to current path if set
    pub fn save_current(&mut self) -> Result<(), ProjectError> {
        if let Some(path) = self.path.clone() {
            self.save_dir(&path)
        } else {
            Err(ProjectError::NoPath)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::MemoryStore;
    use ebmap_core::sparse::empty_grid;
    use ebmap_core::{Coord, FullTileset, NpcInstance, Palette, Trigger, TriggerKind};

    /// A small but complete project in memory
    fn fixture_store() -> MemoryStore {
        let mut project = ProjectData::new();
        let mut tileset = FullTileset::new(0);
        tileset.set_palettes(vec![Palette::new(0, 0), Palette::new(0, 1)]);
        project.set_tilesets(vec![tileset]);
        project.npcs.push(Npc::default());
        project.npcs.push(Npc::default());
        project.warps.push(Default::default());
        project.teleports.push(Default::default());
        project.hotspots.push(Default::default());
        project.enemy_map_groups.push(Default::default());
        let instance = NpcInstance::new(1, Coord::new(300, 40));
        let trigger = Trigger::new(Coord::new(16, 24), TriggerKind::Rope);
        project.set_placements(vec![instance], vec![trigger]);

        let mut store = MemoryStore::new();
        project.save(&mut store).unwrap();
        store
    }

    #[test]
    fn test_save_then_load() {
        let store = fixture_store();
        assert!(store.contains(MANIFEST_FILE));
        assert!(store.contains("Tilesets/00.fts"));
        assert!(!store.contains("ebmap/sector_fields.yml"));

        let project = ProjectData::load(&store).unwrap();
        assert!(!project.is_dirty());
        assert_eq!(project.tilesets().len(), 1);
        assert_eq!(project.npcs.len(), 2);
        assert_eq!(project.npc_instances().len(), 1);
        assert_eq!(project.npc_instances()[0].coords, Coord::new(300, 40));
        assert_eq!(project.triggers()[0].coords, Coord::new(16, 24));
        assert_eq!(project.warps.len(), 1);
        assert_eq!(
            project.manifest.resource_path("eb.MapModule", "map_tiles"),
            Some("map_tiles.map")
        );
    }

    #[test]
    fn test_sparse_grids_are_fully_enumerated() {
        let store = fixture_store();
        let text = store.read_text("map_doors.yml").unwrap().unwrap();
        let grid: SparseGrid<serde_yaml::Value> = serde_yaml::from_str(&text).unwrap();
        assert_eq!(grid.len(), 40);
        assert!(grid.values().all(|row| row.len() == 32));
        assert_eq!(grid[&0][&0].as_ref().map(Vec::len), Some(1));
        assert!(grid[&39][&31].is_none());
        let empty: SparseGrid<TriggerRecord> = empty_grid();
        assert_eq!(empty.len(), grid.len());
    }

    #[test]
    fn test_load_is_atomic_on_bad_table() {
        let mut store = fixture_store();
        store.insert("map_tiles.map", "000 0g0\n");
        match ProjectData::load(&store) {
            Err(ProjectError::Format { path, .. }) => assert_eq!(path, "map_tiles.map"),
            other => panic!("expected a format error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_missing_required_table() {
        let mut store = fixture_store();
        store.remove("map_hotspots.yml");
        assert!(matches!(
            ProjectData::load(&store),
            Err(ProjectError::MissingResource { .. })
        ));
    }

    #[test]
    fn test_placement_with_unknown_npc_is_rejected() {
        let mut store = fixture_store();
        let text = store.read_text("map_sprites.yml").unwrap().unwrap();
        store.insert("map_sprites.yml", text.replace("NPC ID: 1", "NPC ID: 9"));
        assert!(matches!(
            ProjectData::load(&store),
            Err(ProjectError::Format {
                source: CoreError::OutOfRange { .. },
                ..
            })
        ));
    }

    #[test]
    fn test_save_stops_at_unencodable_table() {
        let store = fixture_store();
        let mut project = ProjectData::load(&store).unwrap();
        let uuid = project.npc_instances()[0].uuid;
        project.set_npc_instance_coords(uuid, Coord::new(-5, 0));

        let mut out = MemoryStore::new();
        let err = project.save(&mut out).unwrap_err();
        assert!(matches!(err, ProjectError::Format { .. }));
        // Tables before the NPC placements were written, later ones were not
        assert!(out.contains("map_sectors.yml"));
        assert!(out.contains("npc_config_table.yml"));
        assert!(!out.contains("map_sprites.yml"));
        assert!(!out.contains(MANIFEST_FILE));
        assert!(project.is_dirty());
    }

    #[test]
    fn test_directory_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut project = ProjectData::load(&fixture_store()).unwrap();
        project.hotspots[0].comment = "pier".to_string();
        project.save_dir(dir.path()).unwrap();
        assert!(dir.path().join("Tilesets/00.fts").is_file());

        let loaded = ProjectData::load_dir(dir.path()).unwrap();
        assert_eq!(loaded.hotspots[0].comment, "pier");
        assert_eq!(loaded.path.as_deref(), Some(dir.path()));
    }

    #[test]
    fn test_save_current_without_path() {
        let mut project = ProjectData::new();
        assert!(matches!(project.save_current(), Err(ProjectError::NoPath)));
    }
}
