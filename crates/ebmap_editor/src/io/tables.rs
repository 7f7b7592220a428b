//! Where each table lives in the manifest
//!
//! A table lists candidate modules in preference order. Older project
//! layouts filed some tables under a different module; the loader tries each
//! candidate and only gives up once all of them are missing.

use std::borrow::Cow;

/// Resource declaration for one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSpec {
    /// Human-readable table name for errors and logs
    pub table: Cow<'static, str>,
    /// Manifest modules to try, in order
    pub modules: &'static [&'static str],
    /// Resource name inside each module
    pub name: Cow<'static, str>,
    /// Path registered when saving a table the manifest does not list yet
    pub default_path: Cow<'static, str>,
    /// Whether a missing resource fails the load
    pub required: bool,
}

const fn table(
    table: &'static str,
    modules: &'static [&'static str],
    name: &'static str,
    default_path: &'static str,
    required: bool,
) -> TableSpec {
    TableSpec {
        table: Cow::Borrowed(table),
        modules,
        name: Cow::Borrowed(name),
        default_path: Cow::Borrowed(default_path),
        required,
    }
}

pub const MAP_TILES: TableSpec = table(
    "map tiles",
    &["eb.MapModule"],
    "map_tiles",
    "map_tiles.map",
    true,
);

pub const MAP_SECTORS: TableSpec = table(
    "map sectors",
    &["eb.MapModule"],
    "map_sectors",
    "map_sectors.yml",
    true,
);

pub const NPC_CONFIG: TableSpec = table(
    "NPC table",
    &["eb.MapSpriteModule", "eb.NpcModule"],
    "npc_config_table",
    "npc_config_table.yml",
    true,
);

pub const MAP_SPRITES: TableSpec = table(
    "NPC placements",
    &["eb.MapSpriteModule"],
    "map_sprites",
    "map_sprites.yml",
    true,
);

pub const MAP_DOORS: TableSpec = table(
    "triggers",
    &["eb.DoorModule"],
    "map_doors",
    "map_doors.yml",
    true,
);

pub const WARPS: TableSpec = table(
    "warps",
    &["eb.MiscTablesModule", "eb.DoorModule"],
    "teleport_destination_table",
    "teleport_destination_table.yml",
    true,
);

pub const TELEPORTS: TableSpec = table(
    "teleports",
    &["eb.MiscTablesModule", "eb.TeleportModule"],
    "psi_teleport_dest_table",
    "psi_teleport_dest_table.yml",
    true,
);

pub const HOTSPOTS: TableSpec = table(
    "hotspots",
    &["eb.MapEventModule", "eb.MiscTablesModule"],
    "map_hotspots",
    "map_hotspots.yml",
    true,
);

pub const ENEMY_PLACEMENT: TableSpec = table(
    "enemy placement",
    &["eb.MapEnemyModule"],
    "map_enemy_placement",
    "map_enemy_placement.yml",
    true,
);

pub const ENEMY_MAP_GROUPS: TableSpec = table(
    "enemy map groups",
    &["eb.MapEnemyModule"],
    "map_enemy_groups",
    "map_enemy_groups.yml",
    true,
);

pub const ENEMY_GROUPS: TableSpec = table(
    "enemy groups",
    &["eb.EnemyModule"],
    "enemy_groups",
    "enemy_groups.yml",
    false,
);

pub const SPRITE_GROUPS: TableSpec = table(
    "sprite groups",
    &["eb.SpriteGroupModule"],
    "sprite_groups",
    "sprite_groups.yml",
    false,
);

pub const PALETTE_SETTINGS: TableSpec = table(
    "palette settings",
    &["eb.TilesetModule"],
    "map_palette_settings",
    "map_palette_settings.yml",
    true,
);

pub const USER_DATA_FIELDS: TableSpec = table(
    "sector user data fields",
    &["ebmap.UserData"],
    "sector_fields",
    "ebmap/sector_fields.yml",
    false,
);

/// Tileset `id` in the `.fts` format. Projects may carry fewer than the
/// full set.
pub fn tileset(id: u8) -> TableSpec {
    TableSpec {
        table: Cow::Owned(format!("tileset {}", id)),
        modules: &["eb.TilesetModule"],
        name: Cow::Owned(format!("Tilesets/{:02}", id)),
        default_path: Cow::Owned(format!("Tilesets/{:02}.fts", id)),
        required: false,
    }
}

/// Sheet image of sprite group `id`
pub fn sprite_sheet(id: usize) -> TableSpec {
    TableSpec {
        table: Cow::Owned(format!("sprite group {} image", id)),
        modules: &["eb.SpriteGroupModule"],
        name: Cow::Owned(format!("SpriteGroups/{:03}", id)),
        default_path: Cow::Owned(format!("SpriteGroups/{:03}.png", id)),
        required: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tileset_names() {
        let spec = tileset(7);
        assert_eq!(spec.name, "Tilesets/07");
        assert_eq!(spec.default_path, "Tilesets/07.fts");
        assert!(!spec.required);
        assert_eq!(sprite_sheet(12).name, "SpriteGroups/012");
    }

    #[test]
    fn test_every_table_has_a_module() {
        for spec in [
            MAP_TILES,
            MAP_SECTORS,
            NPC_CONFIG,
            MAP_SPRITES,
            MAP_DOORS,
            WARPS,
            TELEPORTS,
            HOTSPOTS,
            ENEMY_PLACEMENT,
            ENEMY_MAP_GROUPS,
            ENEMY_GROUPS,
            SPRITE_GROUPS,
            PALETTE_SETTINGS,
            USER_DATA_FIELDS,
        ] {
            assert!(!spec.modules.is_empty(), "{}", spec.table);
        }
    }
}
