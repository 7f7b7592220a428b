//! Core data structures and codecs for ebmap
//!
//! This crate provides the map data model of an EarthBound-style project:
//! - `Coord` / `Scale` - Pixel coordinates and the six map scales
//! - `FullTileset` - Minitiles, palettes and tile arrangements, with the `.fts` codec
//! - `PaletteSettings` - Flag-conditional event palette chains
//! - `SectorGrid`, `MapTileGrid`, `EnemyTileGrid` - Dense map grids
//! - `TileGraphicCache` - Lazily rendered tile images
//! - `NpcInstance`, `Trigger`, `Warp`, `Teleport`, `Hotspot` - Map entities
//! - `sparse` - The per-bisector placement grid used on disk

pub mod colour;
pub mod coords;
pub mod enemy;
pub mod error;
pub mod hotspot;
pub mod map_tile;
pub mod npc;
pub mod palette_settings;
pub mod records;
pub mod sector;
pub mod sparse;
pub mod sprite;
pub mod tile_graphic;
pub mod tileset;
pub mod trigger;
pub mod warp;

pub use coords::{Coord, Scale, MAP_HEIGHT, MAP_WIDTH};
pub use enemy::{EnemyGroup, EnemyMapGroup, EnemyTileGrid, SubGroup, SubGroupEntry};
pub use error::{CoreError, DigitBase, FormatError};
pub use hotspot::{Hotspot, HOTSPOT_COUNT};
pub use map_tile::{MapTile, MapTileGrid, MAP_TILES_HIGH, MAP_TILES_WIDE};
pub use npc::{Npc, NpcInstance, NpcTable, NPC_TABLE_CAPACITY};
pub use palette_settings::{PaletteSettings, PaletteSettingsTable};
pub use sector::{GraphicsKey, Sector, SectorAttributes, SectorGrid};
pub use sprite::{SpriteGroup, SpriteSheet};
pub use tile_graphic::{render_tile, MapTileGraphic, TileGraphicCache, TileGraphicKey};
pub use tileset::{
    FullTileset, Minitile, MinitileLayer, Palette, PaletteGroup, Subpalette, Tile, MAX_TILES,
    MINITILE_COUNT, TILESET_COUNT,
};
pub use trigger::{Trigger, TriggerKind, TriggerType};
pub use warp::{Teleport, Warp};
