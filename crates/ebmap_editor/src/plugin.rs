//! Bevy integration
//!
//! Registers the project session and editor preferences as resources and
//! polls background loads and saves every frame.

use crate::preferences::EditorPreferences;
use crate::project::ProjectData;
use crate::session::{JobOutcome, ProjectSession};
use bevy::prelude::*;
use std::path::Path;
use tracing::{error, info};

pub struct EbMapEditorPlugin;

impl Plugin for EbMapEditorPlugin {
    fn build(&self, app: &mut App) {
        let preferences = EditorPreferences::load();
        info!("Loaded editor preferences");

        let mut session = ProjectSession::new(ProjectData::new(), preferences.history());
        if let Some(recent) = preferences.last_project() {
            if let Err(e) = session.open(&recent.path) {
                error!("Failed to reopen {}: {}", recent.path, e);
            }
        }

        app.insert_resource(preferences)
            .insert_resource(session)
            .add_systems(Update, poll_session);
    }
}

fn project_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

/// Finish background jobs and remember opened projects
fn poll_session(
    mut session: ResMut<ProjectSession>,
    mut preferences: ResMut<EditorPreferences>,
) {
    let Some(outcome) = session.poll() else {
        return;
    };
    match outcome {
        Ok(JobOutcome::Loaded(path)) | Ok(JobOutcome::Saved(path)) => {
            preferences.add_recent_project(&path, project_name(&path));
            if let Err(e) = preferences.save() {
                error!("Failed to save preferences: {}", e);
            }
        }
        Err(e) => error!("Project job failed: {}", e),
    }
}
