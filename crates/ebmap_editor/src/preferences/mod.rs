//! Editor preferences
//!
//! Settings that outlive a project: command history behaviour and the
//! recently opened project list.

mod file;

pub use file::PreferencesError;

use crate::commands::{CommandHistory, MAX_HISTORY};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Entries kept in the recent projects list
pub const MAX_RECENT_PROJECTS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentProject {
    pub path: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "bevy", derive(bevy::prelude::Resource))]
#[serde(default)]
pub struct EditorPreferences {
    /// Fold consecutive edits of the same thing into one undo step
    pub merge_commands: bool,
    /// Undo steps kept; 0 keeps everything
    pub undo_limit: usize,
    pub auto_open_last_project: bool,
    /// Most recent first
    pub recent_projects: Vec<RecentProject>,
}

impl Default for EditorPreferences {
    fn default() -> Self {
        Self {
            merge_commands: true,
            undo_limit: MAX_HISTORY,
            auto_open_last_project: false,
            recent_projects: Vec::new(),
        }
    }
}

impl EditorPreferences {
    /// Move a project to the front of the recent list
    pub fn add_recent_project(&mut self, path: &Path, name: impl Into<String>) {
        let path = path.to_string_lossy().to_string();
        self.recent_projects.retain(|p| p.path != path);
        self.recent_projects.insert(
            0,
            RecentProject {
                path,
                name: name.into(),
            },
        );
        self.recent_projects.truncate(MAX_RECENT_PROJECTS);
    }

    pub fn remove_recent_project(&mut self, path: &str) {
        self.recent_projects.retain(|p| p.path != path);
    }

    pub fn clear_recent_projects(&mut self) {
        self.recent_projects.clear();
    }

    /// Project to reopen at startup, if enabled
    pub fn last_project(&self) -> Option<&RecentProject> {
        if self.auto_open_last_project {
            self.recent_projects.first()
        } else {
            None
        }
    }

    /// A command history configured by these preferences
    pub fn history(&self) -> CommandHistory {
        CommandHistory::new(self.merge_commands, self.undo_limit)
    }

    /// Bring an existing history in line after the preferences changed
    pub fn apply_to(&self, history: &mut CommandHistory) {
        history.set_merge_enabled(self.merge_commands);
        history.set_undo_limit(self.undo_limit);
    }
}
