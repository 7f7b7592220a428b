//! Undoable edits to a project
//!
//! Every change to a [`ProjectData`] goes through a [`Command`] pushed onto
//! a [`CommandHistory`]. A command records enough state on `apply` to put
//! the project back on `revert`, and keeps any caches it affects in step.
//!
//! Consecutive commands of the same kind on the same target can be merged
//! into one history entry, so dragging an NPC across the map undoes in one
//! step. A merge is only accepted when the second command starts from the
//! state the first one ended in.

mod enemy;
mod history;
mod map;
mod npc;
mod palette;
mod sector;
mod tables;
mod tileset;
mod trigger;
mod user_data;

pub use enemy::SetEnemyTiles;
pub use history::{CommandHistory, HistoryAction, HistoryEvent, MAX_HISTORY};
pub use map::PlaceMapTiles;
pub use npc::{AddNpc, AddNpcInstance, EditNpc, MoveNpcInstance, RemoveNpcInstance, RetargetNpcInstance};
pub use palette::SetPaletteSettings;
pub use sector::{SetSectorAttributes, SetSectorUserData};
pub use tables::{EditEnemyMapGroup, EditEntry, EditHotspot, EditTeleport, EditWarp, TableEntry};
pub use tileset::{DrawMinitile, EditTile, ReplaceTileset, SetSubpaletteColour, SwapMinitiles};
pub use trigger::{AddTrigger, EditTrigger, MoveTrigger, RemoveTrigger};
pub use user_data::{AddUserDataField, RemoveUserDataField};

use crate::error::CommandError;
use crate::project::ProjectData;
use std::any::Any;
use std::fmt;
use tracing::error;
use uuid::Uuid;

/// What a command is, for merging and display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    SectorAttributes,
    SectorUserData,
    MapTiles,
    EnemyTiles,
    AddNpcInstance,
    RemoveNpcInstance,
    MoveNpcInstance,
    RetargetNpcInstance,
    AddNpc,
    EditNpc,
    AddTrigger,
    RemoveTrigger,
    MoveTrigger,
    EditTrigger,
    EditWarp,
    EditTeleport,
    EditHotspot,
    EditEnemyMapGroup,
    DrawMinitile,
    EditTile,
    SubpaletteColour,
    SwapMinitiles,
    ReplaceTileset,
    PaletteSettings,
    AddUserDataField,
    RemoveUserDataField,
    Composite,
    Macro,
}

/// A part of the project a command touched, so views know what to redraw
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Change {
    Sector(usize),
    MapTiles,
    EnemyTiles,
    NpcInstance(Uuid),
    Npc(usize),
    Trigger(Uuid),
    Warp(usize),
    Teleport(usize),
    Hotspot(usize),
    EnemyMapGroup(usize),
    Tileset(u8),
    PaletteSettings { group: u8, palette: u8 },
    UserDataFields,
}

/// An undoable edit.
///
/// `apply` checks its preconditions before touching the project; on error
/// the project is unchanged and the command is not recorded.
pub trait Command: Any + Send + Sync + fmt::Debug {
    fn kind(&self) -> CommandKind;

    /// Text for undo/redo menu entries
    fn description(&self) -> String;

    fn apply(&mut self, project: &mut ProjectData) -> Result<Vec<Change>, CommandError>;

    fn revert(&mut self, project: &mut ProjectData) -> Result<Vec<Change>, CommandError>;

    /// Whether `other`, already applied after `self`, can be folded into it
    fn can_merge(&self, _other: &dyn Command) -> bool {
        false
    }

    /// Fold `other` into `self`. Only called after `can_merge` agreed.
    fn merge(&mut self, _other: &dyn Command) {}

    fn try_merge(&mut self, other: &dyn Command) -> bool {
        if self.kind() != other.kind() || !self.can_merge(other) {
            return false;
        }
        self.merge(other);
        true
    }

    fn as_any(&self) -> &dyn Any;
}

/// `other` as a `T`, when it is the same kind of command as `this`
pub fn same_kind<'a, T: Command>(this: &T, other: &'a dyn Command) -> Option<&'a T> {
    if this.kind() != other.kind() {
        return None;
    }
    other.as_any().downcast_ref::<T>()
}

fn apply_all(
    commands: &mut [Box<dyn Command>],
    project: &mut ProjectData,
) -> Result<Vec<Change>, CommandError> {
    let mut changes = Vec::new();
    for i in 0..commands.len() {
        match commands[i].apply(project) {
            Ok(c) => changes.extend(c),
            Err(e) => {
                // Roll back what already went in; the caller sees the
                // error that stopped the apply
                for done in commands[..i].iter_mut().rev() {
                    if let Err(rollback) = done.revert(project) {
                        error!(
                            "rollback of '{}' failed after '{}': {}",
                            done.description(),
                            e,
                            rollback
                        );
                        break;
                    }
                }
                return Err(e);
            }
        }
    }
    Ok(changes)
}

fn revert_all(
    commands: &mut [Box<dyn Command>],
    project: &mut ProjectData,
) -> Result<Vec<Change>, CommandError> {
    let mut changes = Vec::new();
    for command in commands.iter_mut().rev() {
        changes.extend(command.revert(project)?);
    }
    Ok(changes)
}

/// Several commands applied as one, all or nothing
#[derive(Debug)]
pub struct CompositeCommand {
    description: String,
    commands: Vec<Box<dyn Command>>,
}

impl CompositeCommand {
    pub fn new(description: impl Into<String>, commands: Vec<Box<dyn Command>>) -> Self {
        Self {
            description: description.into(),
            commands,
        }
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl Command for CompositeCommand {
    fn kind(&self) -> CommandKind {
        CommandKind::Composite
    }

    fn description(&self) -> String {
        self.description.clone()
    }

    fn apply(&mut self, project: &mut ProjectData) -> Result<Vec<Change>, CommandError> {
        apply_all(&mut self.commands, project)
    }

    fn revert(&mut self, project: &mut ProjectData) -> Result<Vec<Change>, CommandError> {
        revert_all(&mut self.commands, project)
    }

    /// Mergeable only when both have the same shape and every pair merges
    fn can_merge(&self, other: &dyn Command) -> bool {
        let Some(other) = same_kind(self, other) else {
            return false;
        };
        self.commands.len() == other.commands.len()
            && self
                .commands
                .iter()
                .zip(&other.commands)
                .all(|(a, b)| a.kind() == b.kind() && a.can_merge(b.as_ref()))
    }

    fn merge(&mut self, other: &dyn Command) {
        if let Some(other) = same_kind(self, other) {
            for (a, b) in self.commands.iter_mut().zip(&other.commands) {
                a.merge(b.as_ref());
            }
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Commands recorded between `begin_macro` and `end_macro`. Children are
/// applied as they are pushed, so the macro itself only replays them.
#[derive(Debug)]
pub(crate) struct MacroCommand {
    pub(crate) description: String,
    pub(crate) commands: Vec<Box<dyn Command>>,
    /// Changes reported by the children so far
    pub(crate) changes: Vec<Change>,
}

impl MacroCommand {
    pub(crate) fn new(description: String) -> Self {
        Self {
            description,
            commands: Vec::new(),
            changes: Vec::new(),
        }
    }
}

impl Command for MacroCommand {
    fn kind(&self) -> CommandKind {
        CommandKind::Macro
    }

    fn description(&self) -> String {
        self.description.clone()
    }

    fn apply(&mut self, project: &mut ProjectData) -> Result<Vec<Change>, CommandError> {
        apply_all(&mut self.commands, project)
    }

    fn revert(&mut self, project: &mut ProjectData) -> Result<Vec<Change>, CommandError> {
        revert_all(&mut self.commands, project)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use ebmap_core::Coord;

    #[test]
    fn test_composite_is_all_or_nothing() {
        let mut project = test_support::project();
        let instance = ebmap_core::NpcInstance::new(0, Coord::new(8, 8));
        let uuid = instance.uuid;
        let mut composite = CompositeCommand::new(
            "Place and move",
            vec![
                Box::new(AddNpcInstance::new(instance)),
                Box::new(MoveNpcInstance::new(uuid, Coord::new(64, 64))),
                // References an NPC template that does not exist
                Box::new(RetargetNpcInstance::new(uuid, 999)),
            ],
        );
        assert!(composite.apply(&mut project).is_err());
        assert!(project.npc_instances().is_empty());
    }

    /// Applies cleanly, then refuses to come back out
    #[derive(Debug)]
    struct StuckCommand;

    impl Command for StuckCommand {
        fn kind(&self) -> CommandKind {
            CommandKind::EditNpc
        }

        fn description(&self) -> String {
            "Stuck".to_string()
        }

        fn apply(&mut self, _project: &mut ProjectData) -> Result<Vec<Change>, CommandError> {
            Ok(vec![Change::Npc(0)])
        }

        fn revert(&mut self, _project: &mut ProjectData) -> Result<Vec<Change>, CommandError> {
            Err(CommandError::NpcTableFull(0))
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn test_failed_rollback_keeps_apply_error() {
        let mut project = test_support::project();
        let mut composite = CompositeCommand::new(
            "Stuck then broken",
            vec![
                Box::new(StuckCommand),
                Box::new(RetargetNpcInstance::new(Uuid::new_v4(), 0)),
            ],
        );
        let err = composite.apply(&mut project).unwrap_err();
        assert!(matches!(
            err,
            CommandError::UnknownEntity {
                what: "NPC instance",
                ..
            }
        ));
    }

    #[test]
    fn test_composite_merges_elementwise() {
        let mut project = test_support::project();
        let a = ebmap_core::NpcInstance::new(0, Coord::new(8, 8));
        let b = ebmap_core::NpcInstance::new(1, Coord::new(16, 16));
        let (ua, ub) = (a.uuid, b.uuid);
        project.insert_npc_instance(0, a);
        project.insert_npc_instance(1, b);

        let drag = |dx: i32| -> CompositeCommand {
            CompositeCommand::new(
                "Move NPCs",
                vec![
                    Box::new(MoveNpcInstance::new(ua, Coord::new(8 + dx, 8))),
                    Box::new(MoveNpcInstance::new(ub, Coord::new(16 + dx, 16))),
                ],
            )
        };
        let mut first = drag(10);
        first.apply(&mut project).unwrap();
        let mut second = drag(20);
        second.apply(&mut project).unwrap();
        assert!(first.try_merge(&second));

        first.revert(&mut project).unwrap();
        assert_eq!(project.npc_instance(ua).unwrap().coords, Coord::new(8, 8));
        assert_eq!(project.npc_instance(ub).unwrap().coords, Coord::new(16, 16));

        // Different shape: no merge
        let mut third = CompositeCommand::new(
            "Move one",
            vec![Box::new(MoveNpcInstance::new(ua, Coord::new(0, 0)))],
        );
        third.apply(&mut project).unwrap();
        assert!(!first.try_merge(&third));
    }
}
