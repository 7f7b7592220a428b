//! ebmap_editor - Project model and undo/redo engine for EarthBound map projects
//!
//! This crate provides:
//! - Loading and saving a project directory of YAML and binary tables
//! - The in-memory project with its placement and tile graphic indices
//! - Reversible edit commands with merging, macros and a save point
//! - A session that loads and saves on a worker thread
//! - Editor preferences stored in the user config directory
//!
//! # Usage
//!
//! ```rust,ignore
//! use ebmap_editor::commands::{CommandHistory, PlaceMapTiles};
//! use ebmap_editor::project::ProjectData;
//!
//! let mut project = ProjectData::load_dir("my_project".as_ref())?;
//! let mut history = CommandHistory::default();
//! history.push(&mut project, Box::new(PlaceMapTiles::new(vec![((3, 4), 12)])))?;
//! history.undo(&mut project)?;
//! project.save_current()?;
//! ```

pub mod commands;
pub mod error;
pub mod io;
pub mod preferences;
pub mod project;
pub mod session;

#[cfg(feature = "bevy")]
pub mod plugin;

pub use ebmap_core;
pub use ebmap_schema;

pub use commands::{Command, CommandHistory, HistoryEvent};
pub use error::{CommandError, HistoryError};
pub use preferences::EditorPreferences;
pub use project::{ProjectData, ProjectError};
pub use session::{JobOutcome, ProjectSession, SessionError};

#[cfg(feature = "bevy")]
pub use plugin::EbMapEditorPlugin;
