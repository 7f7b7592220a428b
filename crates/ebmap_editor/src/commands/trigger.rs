//! Trigger commands

use super::{same_kind, Change, Command, CommandKind};
use crate::error::CommandError;
use crate::project::ProjectData;
use ebmap_core::{Coord, Scale, Trigger, TriggerKind};
use std::any::Any;
use uuid::Uuid;

#[derive(Debug)]
pub struct AddTrigger {
    trigger: Trigger,
    index: Option<usize>,
}

impl AddTrigger {
    pub fn new(trigger: Trigger) -> Self {
        Self {
            trigger,
            index: None,
        }
    }

    pub fn uuid(&self) -> Uuid {
        self.trigger.uuid
    }
}

impl Command for AddTrigger {
    fn kind(&self) -> CommandKind {
        CommandKind::AddTrigger
    }

    fn description(&self) -> String {
        format!("Place {}", self.trigger.trigger_type().display_name())
    }

    fn apply(&mut self, project: &mut ProjectData) -> Result<Vec<Change>, CommandError> {
        let index = self.index.unwrap_or(project.triggers().len());
        if !project.insert_trigger(index, self.trigger.clone()) {
            return Err(CommandError::duplicate("trigger", self.trigger.uuid));
        }
        Ok(vec![Change::Trigger(self.trigger.uuid)])
    }

    fn revert(&mut self, project: &mut ProjectData) -> Result<Vec<Change>, CommandError> {
        let uuid = self.trigger.uuid;
        let (index, _) = project
            .remove_trigger(uuid)
            .ok_or_else(|| CommandError::unknown("trigger", uuid))?;
        self.index = Some(index);
        Ok(vec![Change::Trigger(uuid)])
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug)]
pub struct RemoveTrigger {
    uuid: Uuid,
    removed: Option<(usize, Trigger)>,
}

impl RemoveTrigger {
    pub fn new(uuid: Uuid) -> Self {
        Self {
            uuid,
            removed: None,
        }
    }
}

impl Command for RemoveTrigger {
    fn kind(&self) -> CommandKind {
        CommandKind::RemoveTrigger
    }

    fn description(&self) -> String {
        "Delete trigger".to_string()
    }

    fn apply(&mut self, project: &mut ProjectData) -> Result<Vec<Change>, CommandError> {
        let removed = project
            .remove_trigger(self.uuid)
            .ok_or_else(|| CommandError::unknown("trigger", self.uuid))?;
        self.removed = Some(removed);
        Ok(vec![Change::Trigger(self.uuid)])
    }

    fn revert(&mut self, project: &mut ProjectData) -> Result<Vec<Change>, CommandError> {
        let (index, trigger) = self
            .removed
            .take()
            .ok_or_else(|| CommandError::unknown("trigger", self.uuid))?;
        if !project.insert_trigger(index, trigger) {
            return Err(CommandError::duplicate("trigger", self.uuid));
        }
        Ok(vec![Change::Trigger(self.uuid)])
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Move a trigger. The target snaps down to the warp grid.
#[derive(Debug)]
pub struct MoveTrigger {
    uuid: Uuid,
    to: Coord,
    from: Option<Coord>,
}

impl MoveTrigger {
    pub fn new(uuid: Uuid, to: Coord) -> Self {
        Self {
            uuid,
            to: to.clamp_to_map().round_to(Scale::Warp),
            from: None,
        }
    }
}

impl Command for MoveTrigger {
    fn kind(&self) -> CommandKind {
        CommandKind::MoveTrigger
    }

    fn description(&self) -> String {
        "Move trigger".to_string()
    }

    fn apply(&mut self, project: &mut ProjectData) -> Result<Vec<Change>, CommandError> {
        let old = project
            .set_trigger_coords(self.uuid, self.to)
            .ok_or_else(|| CommandError::unknown("trigger", self.uuid))?;
        self.from.get_or_insert(old);
        Ok(vec![Change::Trigger(self.uuid)])
    }

    fn revert(&mut self, project: &mut ProjectData) -> Result<Vec<Change>, CommandError> {
        let from = self
            .from
            .ok_or_else(|| CommandError::unknown("trigger", self.uuid))?;
        project
            .set_trigger_coords(self.uuid, from)
            .ok_or_else(|| CommandError::unknown("trigger", self.uuid))?;
        Ok(vec![Change::Trigger(self.uuid)])
    }

    fn can_merge(&self, other: &dyn Command) -> bool {
        same_kind(self, other).is_some_and(|o| o.uuid == self.uuid && o.from == Some(self.to))
    }

    fn merge(&mut self, other: &dyn Command) {
        if let Some(other) = same_kind(self, other) {
            self.to = other.to;
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Replace a trigger's payload, possibly changing its type
#[derive(Debug)]
pub struct EditTrigger {
    uuid: Uuid,
    after: TriggerKind,
    before: Option<TriggerKind>,
}

impl EditTrigger {
    pub fn new(uuid: Uuid, kind: TriggerKind) -> Self {
        Self {
            uuid,
            after: kind,
            before: None,
        }
    }

    fn swap_in(
        &self,
        project: &mut ProjectData,
        kind: TriggerKind,
    ) -> Result<TriggerKind, CommandError> {
        let slot = project
            .trigger_kind_mut(self.uuid)
            .ok_or_else(|| CommandError::unknown("trigger", self.uuid))?;
        Ok(std::mem::replace(slot, kind))
    }
}

impl Command for EditTrigger {
    fn kind(&self) -> CommandKind {
        CommandKind::EditTrigger
    }

    fn description(&self) -> String {
        format!("Edit {}", self.after.trigger_type().display_name())
    }

    fn apply(&mut self, project: &mut ProjectData) -> Result<Vec<Change>, CommandError> {
        let old = self.swap_in(project, self.after.clone())?;
        self.before.get_or_insert(old);
        Ok(vec![Change::Trigger(self.uuid)])
    }

    fn revert(&mut self, project: &mut ProjectData) -> Result<Vec<Change>, CommandError> {
        let before = self
            .before
            .clone()
            .ok_or_else(|| CommandError::unknown("trigger", self.uuid))?;
        self.swap_in(project, before)?;
        Ok(vec![Change::Trigger(self.uuid)])
    }

    fn can_merge(&self, other: &dyn Command) -> bool {
        same_kind(self, other)
            .is_some_and(|o| o.uuid == self.uuid && o.before.as_ref() == Some(&self.after))
    }

    fn merge(&mut self, other: &dyn Command) {
        if let Some(other) = same_kind(self, other) {
            self.after = other.after.clone();
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
