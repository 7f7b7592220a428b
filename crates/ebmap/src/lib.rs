//! # ebmap
//!
//! Data model, resource codecs and undo/redo engine for EarthBound map
//! projects.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ebmap::prelude::*;
//!
//! let mut session = ProjectSession::default();
//! session.open("my_project")?;
//! session.wait();
//!
//! let uuid = session.project().npc_instances()[0].uuid;
//! session.execute(Box::new(MoveNpcInstance::new(uuid, Coord::new(512, 768))))?;
//! session.save()?;
//! ```
//!
//! ## Features
//!
//! - `bevy` - Registers the session and preferences as Bevy resources and
//!   adds `EbMapEditorPlugin`
//!
//! ## Crate Structure
//!
//! This umbrella crate re-exports the ebmap_* sub-crates:
//!
//! - [`core`] - Coordinates, tilesets, sectors, entities and their codecs
//! - [`schema`] - Admin-defined sector user-data fields
//! - [`editor`] - Project loading and saving, commands and history

// =============================================================================
// Core module - map data model
// =============================================================================

/// Map data types and on-disk codecs.
///
/// This module provides:
/// - [`Coord`] - Pixel coordinates with scale conversions
/// - [`FullTileset`] - Minitiles, palettes and tile arrangements
/// - [`SectorGrid`] - Per-sector attributes and user data
/// - [`NpcInstance`], [`Trigger`] - Placed map entities
pub mod core {
    pub use ebmap_core::*;
}

pub use ebmap_core::{
    Coord, EnemyMapGroup, FullTileset, Hotspot, MapTile, Npc, NpcInstance, PaletteSettings,
    Scale, Sector, SectorAttributes, SectorGrid, Teleport, Tile, Trigger, TriggerKind, Warp,
};

// =============================================================================
// Schema module - sector user data
// =============================================================================

/// Sector user-data field definitions.
pub mod schema {
    pub use ebmap_schema::*;
}

pub use ebmap_schema::{UserDataFields, UserDataType, UserDataValue};

// =============================================================================
// Editor module - project, commands and history
// =============================================================================

/// Project I/O and the command engine.
pub mod editor {
    pub use ebmap_editor::*;
}

pub use ebmap_editor::{
    Command, CommandError, CommandHistory, EditorPreferences, HistoryError, HistoryEvent,
    JobOutcome, ProjectData, ProjectError, ProjectSession, SessionError,
};

#[cfg(feature = "bevy")]
pub use ebmap_editor::EbMapEditorPlugin;

// =============================================================================
// Prelude - import everything commonly needed
// =============================================================================

/// Commonly used types and commands.
///
/// Import with:
/// ```rust,ignore
/// use ebmap::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use crate::{
        Coord, FullTileset, NpcInstance, Scale, SectorAttributes, Trigger, TriggerKind,
        UserDataType, UserDataValue,
    };

    // Project and history
    pub use crate::{
        Command, CommandHistory, EditorPreferences, ProjectData, ProjectSession, SessionError,
    };

    // Commands
    pub use ebmap_editor::commands::{
        AddNpcInstance, AddTrigger, AddUserDataField, DrawMinitile, EditTile, MoveNpcInstance,
        MoveTrigger, PlaceMapTiles, RemoveNpcInstance, RemoveTrigger, RemoveUserDataField,
        ReplaceTileset, SetEnemyTiles, SetPaletteSettings, SetSectorAttributes,
        SetSectorUserData,
    };

    #[cfg(feature = "bevy")]
    pub use crate::EbMapEditorPlugin;
}
