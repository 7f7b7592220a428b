//! Undo/redo history

use super::{Change, Command, MacroCommand};
use crate::error::{CommandError, HistoryError};
use crate::project::ProjectData;
use tracing::{debug, warn};

/// Default number of entries kept on the undo stack
pub const MAX_HISTORY: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryAction {
    Push,
    /// Folded into the previous entry
    Merge,
    Undo,
    Redo,
}

/// Raised once per pushed entry, merge, undo or redo. A macro raises a
/// single event when its outermost level closes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEvent {
    pub action: HistoryAction,
    pub description: String,
    pub changes: Vec<Change>,
}

/// Stores undo and redo stacks of applied commands
#[derive(Debug)]
pub struct CommandHistory {
    undo_stack: Vec<Box<dyn Command>>,
    redo_stack: Vec<Box<dyn Command>>,
    open_macros: Vec<MacroCommand>,
    merge_enabled: bool,
    /// Zero keeps everything
    undo_limit: usize,
    /// Undo stack depth matching the saved state, if still reachable
    clean_depth: Option<usize>,
    events: Vec<HistoryEvent>,
}

impl Default for CommandHistory {
    fn default() -> Self {
        Self::new(true, MAX_HISTORY)
    }
}

impl CommandHistory {
    pub fn new(merge_enabled: bool, undo_limit: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            open_macros: Vec::new(),
            merge_enabled,
            undo_limit,
            clean_depth: Some(0),
            events: Vec::new(),
        }
    }

    pub fn set_merge_enabled(&mut self, enabled: bool) {
        self.merge_enabled = enabled;
    }

    pub fn merge_enabled(&self) -> bool {
        self.merge_enabled
    }

    /// Change the undo limit, dropping the oldest entries if needed
    pub fn set_undo_limit(&mut self, limit: usize) {
        self.undo_limit = limit;
        self.enforce_limit();
    }

    pub fn undo_limit(&self) -> usize {
        self.undo_limit
    }

    /// Apply a command and record it.
    ///
    /// Inside a macro the command joins the macro. Otherwise the redo stack
    /// is cleared and the command is merged into the top entry when allowed.
    /// A command that fails to apply is dropped and the error returned.
    pub fn push(
        &mut self,
        project: &mut ProjectData,
        mut command: Box<dyn Command>,
    ) -> Result<(), CommandError> {
        let changes = command.apply(project)?;
        let merge_enabled = self.merge_enabled;

        if let Some(open) = self.open_macros.last_mut() {
            open.changes.extend(changes);
            let merged = merge_enabled
                && open
                    .commands
                    .last_mut()
                    .is_some_and(|last| last.try_merge(command.as_ref()));
            if !merged {
                open.commands.push(command);
            }
            return Ok(());
        }

        if !self.redo_stack.is_empty() {
            self.redo_stack.clear();
            if self.clean_depth.is_some_and(|depth| depth > self.undo_stack.len()) {
                self.clean_depth = None;
            }
        }

        let description = command.description();
        let at_clean_point = self.clean_depth == Some(self.undo_stack.len());
        let merged = merge_enabled
            && !at_clean_point
            && self
                .undo_stack
                .last_mut()
                .is_some_and(|last| last.try_merge(command.as_ref()));

        let action = if merged {
            HistoryAction::Merge
        } else {
            self.undo_stack.push(command);
            self.enforce_limit();
            HistoryAction::Push
        };
        debug!("{:?}: {}", action, description);
        self.events.push(HistoryEvent {
            action,
            description,
            changes,
        });
        Ok(())
    }

    fn enforce_limit(&mut self) {
        if self.undo_limit == 0 {
            return;
        }
        while self.undo_stack.len() > self.undo_limit {
            self.undo_stack.remove(0);
            self.clean_depth = match self.clean_depth {
                Some(depth) if depth > 0 => Some(depth - 1),
                _ => None,
            };
        }
    }

    pub fn undo(&mut self, project: &mut ProjectData) -> Result<(), HistoryError> {
        if !self.open_macros.is_empty() {
            return Err(HistoryError::MacroOpen);
        }
        let mut command = self.undo_stack.pop().ok_or(HistoryError::NothingToUndo)?;
        match command.revert(project) {
            Ok(changes) => {
                let description = command.description();
                debug!("undo: {}", description);
                self.redo_stack.push(command);
                self.events.push(HistoryEvent {
                    action: HistoryAction::Undo,
                    description,
                    changes,
                });
                Ok(())
            }
            Err(e) => {
                warn!("undo of {} failed: {}", command.description(), e);
                self.undo_stack.push(command);
                Err(e.into())
            }
        }
    }

    pub fn redo(&mut self, project: &mut ProjectData) -> Result<(), HistoryError> {
        if !self.open_macros.is_empty() {
            return Err(HistoryError::MacroOpen);
        }
        let mut command = self.redo_stack.pop().ok_or(HistoryError::NothingToRedo)?;
        match command.apply(project) {
            Ok(changes) => {
                let description = command.description();
                debug!("redo: {}", description);
                self.undo_stack.push(command);
                self.events.push(HistoryEvent {
                    action: HistoryAction::Redo,
                    description,
                    changes,
                });
                Ok(())
            }
            Err(e) => {
                warn!("redo of {} failed: {}", command.description(), e);
                self.redo_stack.push(command);
                Err(e.into())
            }
        }
    }

    /// Start grouping pushed commands into one entry. Macros nest; only the
    /// outermost produces a history entry.
    pub fn begin_macro(&mut self, description: impl Into<String>) {
        self.open_macros.push(MacroCommand::new(description.into()));
    }

    /// Close the innermost macro. An empty outermost macro leaves no entry.
    pub fn end_macro(&mut self) -> Result<(), HistoryError> {
        let finished = self.open_macros.pop().ok_or(HistoryError::NoOpenMacro)?;
        if let Some(parent) = self.open_macros.last_mut() {
            if !finished.commands.is_empty() {
                parent.changes.extend(finished.changes.iter().cloned());
                parent.commands.push(Box::new(finished));
            }
            return Ok(());
        }
        if finished.commands.is_empty() {
            return Ok(());
        }

        if !self.redo_stack.is_empty() {
            self.redo_stack.clear();
            if self.clean_depth.is_some_and(|depth| depth > self.undo_stack.len()) {
                self.clean_depth = None;
            }
        }
        let event = HistoryEvent {
            action: HistoryAction::Push,
            description: finished.description.clone(),
            changes: finished.changes.clone(),
        };
        debug!("macro: {} ({} commands)", event.description, finished.commands.len());
        self.undo_stack.push(Box::new(finished));
        self.enforce_limit();
        self.events.push(event);
        Ok(())
    }

    /// Bracket a drag or other continuous edit so it undoes as one step
    pub fn begin_interactive_edit(&mut self, description: impl Into<String>) {
        self.begin_macro(description);
    }

    pub fn end_interactive_edit(&mut self) -> Result<(), HistoryError> {
        self.end_macro()
    }

    pub fn in_macro(&self) -> bool {
        !self.open_macros.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        self.open_macros.is_empty() && !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        self.open_macros.is_empty() && !self.redo_stack.is_empty()
    }

    pub fn undo_description(&self) -> Option<String> {
        self.undo_stack.last().map(|c| c.description())
    }

    pub fn redo_description(&self) -> Option<String> {
        self.redo_stack.last().map(|c| c.description())
    }

    /// Number of entries that can be undone
    pub fn len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.undo_stack.is_empty()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// Record the current state as saved
    pub fn mark_clean(&mut self) {
        self.clean_depth = Some(self.undo_stack.len());
    }

    /// Whether the project differs from its last saved state
    pub fn is_dirty(&self) -> bool {
        !self.open_macros.is_empty() || self.clean_depth != Some(self.undo_stack.len())
    }

    /// Take the events raised since the last call
    pub fn drain_events(&mut self) -> Vec<HistoryEvent> {
        std::mem::take(&mut self.events)
    }

    /// Forget everything, as after loading a project
    pub fn clear(&mut self) {
        if !self.open_macros.is_empty() {
            warn!("clearing history with {} open macros", self.open_macros.len());
        }
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.open_macros.clear();
        self.events.clear();
        self.clean_depth = Some(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support;
    use crate::commands::{MoveNpcInstance, PlaceMapTiles, SetSectorAttributes};
    use ebmap_core::{Coord, NpcInstance};

    fn with_npc() -> (ProjectData, uuid::Uuid) {
        let mut project = test_support::project();
        let instance = NpcInstance::new(0, Coord::new(100, 100));
        let uuid = instance.uuid;
        project.insert_npc_instance(0, instance);
        (project, uuid)
    }

    fn place(x: usize, tile: u16) -> Box<dyn Command> {
        Box::new(PlaceMapTiles::new(vec![((x, 0), tile)]))
    }

    #[test]
    fn test_push_undo_redo() {
        let mut project = test_support::project();
        let mut history = CommandHistory::default();
        history.push(&mut project, place(0, 5)).unwrap();
        assert_eq!(project.map_tiles.at(0, 0).tile, 5);
        assert!(history.can_undo());
        assert!(!history.can_redo());

        history.undo(&mut project).unwrap();
        assert_eq!(project.map_tiles.at(0, 0).tile, 0);
        assert!(history.can_redo());

        history.redo(&mut project).unwrap();
        assert_eq!(project.map_tiles.at(0, 0).tile, 5);
        history.undo(&mut project).unwrap();
        assert_eq!(history.undo(&mut project), Err(HistoryError::NothingToUndo));
    }

    #[test]
    fn test_push_clears_redo_stack() {
        let mut project = test_support::project();
        let mut history = CommandHistory::default();
        history.push(&mut project, place(0, 5)).unwrap();
        history.undo(&mut project).unwrap();
        assert_eq!(history.redo_len(), 1);

        history.push(&mut project, place(1, 6)).unwrap();
        assert_eq!(history.redo_len(), 0);
        assert_eq!(history.redo(&mut project), Err(HistoryError::NothingToRedo));
    }

    #[test]
    fn test_max_history_limit() {
        let mut project = test_support::project();
        let mut history = CommandHistory::new(false, 10);
        for x in 0..15 {
            history.push(&mut project, place(x, 1)).unwrap();
        }
        assert_eq!(history.len(), 10);
        for _ in 0..10 {
            history.undo(&mut project).unwrap();
        }
        // The first five placements fell off the stack and stay applied
        assert_eq!(project.map_tiles.at(4, 0).tile, 1);
        assert_eq!(project.map_tiles.at(5, 0).tile, 0);
    }

    #[test]
    fn test_failed_command_is_not_pushed() {
        let mut project = test_support::project();
        let mut history = CommandHistory::default();
        assert!(history.push(&mut project, place(0, 2000)).is_err());
        assert!(history.is_empty());
        assert!(history.drain_events().is_empty());
    }

    #[test]
    fn test_moves_merge_into_one_entry() {
        let (mut project, uuid) = with_npc();
        let mut history = CommandHistory::default();
        for step in 1..=5 {
            let to = Coord::new(100 + step * 8, 100);
            history
                .push(&mut project, Box::new(MoveNpcInstance::new(uuid, to)))
                .unwrap();
        }
        assert_eq!(history.len(), 1);
        let actions: Vec<HistoryAction> =
            history.drain_events().iter().map(|e| e.action).collect();
        assert_eq!(actions[0], HistoryAction::Push);
        assert!(actions[1..].iter().all(|&a| a == HistoryAction::Merge));

        history.undo(&mut project).unwrap();
        assert_eq!(project.npc_instance(uuid).unwrap().coords, Coord::new(100, 100));
    }

    #[test]
    fn test_merging_can_be_disabled() {
        let (mut project, uuid) = with_npc();
        let mut history = CommandHistory::new(false, 0);
        for step in 1..=3 {
            history
                .push(
                    &mut project,
                    Box::new(MoveNpcInstance::new(uuid, Coord::new(step, 0))),
                )
                .unwrap();
        }
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn test_no_merge_across_save_point() {
        let (mut project, uuid) = with_npc();
        let mut history = CommandHistory::default();
        history
            .push(&mut project, Box::new(MoveNpcInstance::new(uuid, Coord::new(1, 1))))
            .unwrap();
        history.mark_clean();
        assert!(!history.is_dirty());
        history
            .push(&mut project, Box::new(MoveNpcInstance::new(uuid, Coord::new(2, 2))))
            .unwrap();
        assert_eq!(history.len(), 2);
        assert!(history.is_dirty());
        history.undo(&mut project).unwrap();
        assert!(!history.is_dirty());
    }

    #[test]
    fn test_nested_macros_make_one_entry() {
        let mut project = test_support::project();
        let mut history = CommandHistory::default();
        history.begin_macro("Paint");
        history.push(&mut project, place(0, 1)).unwrap();
        history.begin_macro("Inner");
        history.push(&mut project, place(1, 2)).unwrap();
        history.end_macro().unwrap();
        assert!(history.drain_events().is_empty());
        assert_eq!(history.undo(&mut project), Err(HistoryError::MacroOpen));
        history.push(&mut project, place(2, 3)).unwrap();
        history.end_macro().unwrap();

        assert_eq!(history.len(), 1);
        let events = history.drain_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].description, "Paint");

        history.undo(&mut project).unwrap();
        for x in 0..3 {
            assert_eq!(project.map_tiles.at(x, 0).tile, 0);
        }
        history.redo(&mut project).unwrap();
        assert_eq!(project.map_tiles.at(2, 0).tile, 3);
        assert_eq!(history.end_macro(), Err(HistoryError::NoOpenMacro));
    }

    #[test]
    fn test_empty_macro_leaves_no_entry() {
        let mut project = test_support::project();
        let mut history = CommandHistory::default();
        history.begin_interactive_edit("Drag");
        history.end_interactive_edit().unwrap();
        assert!(history.is_empty());
        assert!(history.push(&mut project, place(0, 1)).is_ok());
    }

    #[test]
    fn test_interactive_edit_merges_inside() {
        let (mut project, uuid) = with_npc();
        let mut history = CommandHistory::default();
        history.begin_interactive_edit("Drag NPC");
        for step in 1..=4 {
            history
                .push(
                    &mut project,
                    Box::new(MoveNpcInstance::new(uuid, Coord::new(100, 100 + step))),
                )
                .unwrap();
        }
        history
            .push(
                &mut project,
                Box::new(SetSectorAttributes::new(0, Default::default())),
            )
            .unwrap();
        history.end_interactive_edit().unwrap();
        assert_eq!(history.len(), 1);
        history.undo(&mut project).unwrap();
        assert_eq!(project.npc_instance(uuid).unwrap().coords, Coord::new(100, 100));
    }
}
