//! Open project session
//!
//! Owns the project and its undo history, and runs loads and saves on a
//! worker thread so the editor stays responsive. The project is encoded on
//! the calling thread before a save starts; the worker only writes bytes.
//! While a job is running the project cannot be edited, and a reload asked
//! for during a save starts once the save has finished.

use crate::commands::{Command, CommandHistory, HistoryEvent};
use crate::error::{CommandError, HistoryError};
use crate::io::{FsStore, Manifest};
use crate::project::{ProjectData, ProjectError};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Mutex;
use std::thread;
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("a load or save is already running")]
    Busy,
    #[error("the background worker stopped without a result")]
    WorkerPanicked,
    #[error(transparent)]
    Project(#[from] ProjectError),
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error(transparent)]
    History(#[from] HistoryError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    Load,
    Save,
}

/// A finished background job
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Loaded(PathBuf),
    Saved(PathBuf),
}

enum JobResult {
    Loaded(Box<Result<ProjectData, ProjectError>>),
    Saved(Result<Manifest, ProjectError>),
}

struct Job {
    kind: JobKind,
    path: PathBuf,
    receiver: Mutex<Receiver<JobResult>>,
}

#[cfg_attr(feature = "bevy", derive(bevy::prelude::Resource))]
pub struct ProjectSession {
    project: ProjectData,
    history: CommandHistory,
    job: Option<Job>,
    pending_reload: Option<PathBuf>,
}

impl Default for ProjectSession {
    fn default() -> Self {
        Self::new(ProjectData::new(), CommandHistory::default())
    }
}

impl ProjectSession {
    pub fn new(project: ProjectData, history: CommandHistory) -> Self {
        Self {
            project,
            history,
            job: None,
            pending_reload: None,
        }
    }

    pub fn project(&self) -> &ProjectData {
        &self.project
    }

    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut CommandHistory {
        &mut self.history
    }

    /// Unsaved changes relative to the last save or load
    pub fn is_dirty(&self) -> bool {
        self.history.is_dirty()
    }

    pub fn is_busy(&self) -> bool {
        self.job.is_some()
    }

    /// The running job, if any
    pub fn job_kind(&self) -> Option<JobKind> {
        self.job.as_ref().map(|job| job.kind)
    }

    pub fn has_pending_reload(&self) -> bool {
        self.pending_reload.is_some()
    }

    /// Start loading a project directory. During a save the load is
    /// queued behind it.
    pub fn open(&mut self, path: impl Into<PathBuf>) -> Result<(), SessionError> {
        let path = path.into();
        match self.job_kind() {
            None => {
                self.start_load(path);
                Ok(())
            }
            Some(JobKind::Save) => {
                info!("reload of {:?} deferred until the save finishes", path);
                self.pending_reload = Some(path);
                Ok(())
            }
            Some(JobKind::Load) => Err(SessionError::Busy),
        }
    }

    /// Reload the project from where it was last loaded or saved
    pub fn reload(&mut self) -> Result<(), SessionError> {
        let path = self.project.path.clone().ok_or(ProjectError::NoPath)?;
        self.open(path)
    }

    /// Start saving to the project's current path
    pub fn save(&mut self) -> Result<(), SessionError> {
        let path = self.project.path.clone().ok_or(ProjectError::NoPath)?;
        self.save_as(path)
    }

    /// Start saving to a directory
    pub fn save_as(&mut self, path: impl Into<PathBuf>) -> Result<(), SessionError> {
        if self.is_busy() {
            return Err(SessionError::Busy);
        }
        let path = path.into();
        let snapshot = self.project.snapshot();
        let (sender, receiver) = mpsc::channel();
        let worker_path = path.clone();
        thread::spawn(move || {
            let mut store = FsStore::new(worker_path);
            let _ = sender.send(JobResult::Saved(snapshot.write(&mut store)));
        });
        info!("saving project to {:?}", path);
        self.job = Some(Job {
            kind: JobKind::Save,
            path,
            receiver: Mutex::new(receiver),
        });
        Ok(())
    }

    fn start_load(&mut self, path: PathBuf) {
        let (sender, receiver) = mpsc::channel();
        let worker_path = path.clone();
        thread::spawn(move || {
            let result = ProjectData::load_dir(&worker_path);
            let _ = sender.send(JobResult::Loaded(Box::new(result)));
        });
        info!("loading project from {:?}", path);
        self.job = Some(Job {
            kind: JobKind::Load,
            path,
            receiver: Mutex::new(receiver),
        });
    }

    /// Check the running job without blocking. Returns its outcome once it
    /// has finished.
    pub fn poll(&mut self) -> Option<Result<JobOutcome, SessionError>> {
        let received = match self.job.as_ref()?.receiver.lock() {
            Ok(receiver) => match receiver.try_recv() {
                Ok(result) => Some(result),
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Disconnected) => None,
            },
            Err(_) => None,
        };
        self.finish_current(received)
    }

    /// Block until the running job finishes
    pub fn wait(&mut self) -> Option<Result<JobOutcome, SessionError>> {
        let received = self
            .job
            .as_ref()?
            .receiver
            .lock()
            .ok()
            .and_then(|receiver| receiver.recv().ok());
        self.finish_current(received)
    }

    /// Block until no job is running, including a queued reload
    pub fn wait_idle(&mut self) -> Vec<Result<JobOutcome, SessionError>> {
        let mut outcomes = Vec::new();
        while let Some(outcome) = self.wait() {
            outcomes.push(outcome);
        }
        outcomes
    }

    fn finish_current(
        &mut self,
        received: Option<JobResult>,
    ) -> Option<Result<JobOutcome, SessionError>> {
        let job = self.job.take()?;
        let outcome = match received {
            None => {
                error!("{:?} worker for {:?} stopped without a result", job.kind, job.path);
                Err(SessionError::WorkerPanicked)
            }
            Some(JobResult::Loaded(result)) => match *result {
                Ok(project) => {
                    self.project = project;
                    self.history.clear();
                    Ok(JobOutcome::Loaded(job.path))
                }
                Err(e) => {
                    error!("failed to load {:?}: {}", job.path, e);
                    Err(e.into())
                }
            },
            Some(JobResult::Saved(result)) => match result {
                Ok(manifest) => {
                    self.project.manifest = manifest;
                    self.project.path = Some(job.path.clone());
                    self.project.dirty = false;
                    self.history.mark_clean();
                    info!("saved project to {:?}", job.path);
                    Ok(JobOutcome::Saved(job.path))
                }
                Err(e) => {
                    error!("failed to save {:?}: {}", job.path, e);
                    Err(e.into())
                }
            },
        };
        if let Some(path) = self.pending_reload.take() {
            info!("starting deferred reload of {:?}", path);
            self.start_load(path);
        }
        Some(outcome)
    }

    /// Apply a command and record it for undo
    pub fn execute(&mut self, command: Box<dyn Command>) -> Result<(), SessionError> {
        if self.is_busy() {
            return Err(SessionError::Busy);
        }
        self.history.push(&mut self.project, command)?;
        Ok(())
    }

    pub fn undo(&mut self) -> Result<(), SessionError> {
        if self.is_busy() {
            return Err(SessionError::Busy);
        }
        self.history.undo(&mut self.project)?;
        Ok(())
    }

    pub fn redo(&mut self) -> Result<(), SessionError> {
        if self.is_busy() {
            return Err(SessionError::Busy);
        }
        self.history.redo(&mut self.project)?;
        Ok(())
    }

    pub fn drain_events(&mut self) -> Vec<HistoryEvent> {
        self.history.drain_events()
    }

    /// Path of the open project
    pub fn path(&self) -> Option<&Path> {
        self.project.path.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{MoveNpcInstance, PlaceMapTiles};
    use ebmap_core::{Coord, FullTileset, NpcInstance};
    use tempfile::TempDir;

    fn saved_project(dir: &Path) {
        let mut project = ProjectData::new();
        project.set_tilesets(vec![FullTileset::new(0)]);
        project.npcs.push(Default::default());
        project.set_placements(vec![NpcInstance::new(0, Coord::new(64, 64))], Vec::new());
        project.save_dir(dir).unwrap();
    }

    fn opened(dir: &Path) -> ProjectSession {
        let mut session = ProjectSession::default();
        session.open(dir).unwrap();
        assert_eq!(
            session.wait().unwrap().unwrap(),
            JobOutcome::Loaded(dir.to_path_buf())
        );
        session
    }

    #[test]
    fn test_open_loads_in_background() {
        let dir = TempDir::new().unwrap();
        saved_project(dir.path());
        let session = opened(dir.path());
        assert!(!session.is_busy());
        assert!(!session.is_dirty());
        assert_eq!(session.path(), Some(dir.path()));
        assert_eq!(session.project().npc_instances().len(), 1);
    }

    #[test]
    fn test_edits_refused_while_saving() {
        let dir = TempDir::new().unwrap();
        saved_project(dir.path());
        let mut session = opened(dir.path());
        session
            .execute(Box::new(PlaceMapTiles::new(vec![((3, 4), 12)])))
            .unwrap();
        assert!(session.is_dirty());

        session.save().unwrap();
        assert_eq!(session.job_kind(), Some(JobKind::Save));
        assert!(matches!(
            session.execute(Box::new(PlaceMapTiles::new(vec![((3, 4), 13)]))),
            Err(SessionError::Busy)
        ));
        assert!(matches!(session.undo(), Err(SessionError::Busy)));
        assert!(matches!(session.save(), Err(SessionError::Busy)));

        assert_eq!(
            session.wait().unwrap().unwrap(),
            JobOutcome::Saved(dir.path().to_path_buf())
        );
        assert!(!session.is_dirty());
        assert!(!session.project().is_dirty());
        session.undo().unwrap();
        assert!(session.is_dirty());
    }

    #[test]
    fn test_reload_during_save_is_deferred() {
        let dir = TempDir::new().unwrap();
        saved_project(dir.path());
        let mut session = opened(dir.path());
        let uuid = session.project().npc_instances()[0].uuid;
        session
            .execute(Box::new(MoveNpcInstance::new(uuid, Coord::new(200, 96))))
            .unwrap();

        session.save().unwrap();
        session.reload().unwrap();
        assert!(session.has_pending_reload());

        let outcomes = session.wait_idle();
        assert_eq!(outcomes.len(), 2);
        assert!(matches!(outcomes[0], Ok(JobOutcome::Saved(_))));
        assert!(matches!(outcomes[1], Ok(JobOutcome::Loaded(_))));
        assert!(!session.has_pending_reload());
        assert!(!session.history().can_undo());
        assert_eq!(
            session.project().npc_instances()[0].coords,
            Coord::new(200, 96)
        );
    }

    #[test]
    fn test_second_load_is_busy() {
        let dir = TempDir::new().unwrap();
        saved_project(dir.path());
        let mut session = ProjectSession::default();
        session.open(dir.path()).unwrap();
        assert!(matches!(session.open(dir.path()), Err(SessionError::Busy)));
        session.wait_idle();
    }

    #[test]
    fn test_failed_load_keeps_project() {
        let dir = TempDir::new().unwrap();
        saved_project(dir.path());
        let mut session = opened(dir.path());
        session.open(dir.path().join("missing")).unwrap();
        assert!(matches!(
            session.wait(),
            Some(Err(SessionError::Project(_)))
        ));
        assert_eq!(session.path(), Some(dir.path()));
        assert_eq!(session.project().npc_instances().len(), 1);
    }

    #[test]
    fn test_save_without_path() {
        let mut session = ProjectSession::default();
        assert!(matches!(
            session.save(),
            Err(SessionError::Project(ProjectError::NoPath))
        ));
        assert!(session.poll().is_none());
    }
}
