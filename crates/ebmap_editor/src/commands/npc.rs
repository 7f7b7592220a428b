//! NPC placement and NPC template commands

use super::{same_kind, Change, Command, CommandKind};
use crate::error::CommandError;
use crate::project::ProjectData;
use ebmap_core::{Coord, Npc, NpcInstance, NPC_TABLE_CAPACITY};
use std::any::Any;
use uuid::Uuid;

fn check_npc_id(project: &ProjectData, npc_id: u16) -> Result<(), CommandError> {
    if project.npcs.get(npc_id as usize).is_none() {
        return Err(CommandError::unknown("NPC", npc_id));
    }
    Ok(())
}

/// Place a new NPC instance
#[derive(Debug)]
pub struct AddNpcInstance {
    instance: NpcInstance,
    /// Position in the instance list; appended when `None`
    index: Option<usize>,
}

impl AddNpcInstance {
    pub fn new(instance: NpcInstance) -> Self {
        Self {
            instance,
            index: None,
        }
    }

    pub fn uuid(&self) -> Uuid {
        self.instance.uuid
    }
}

impl Command for AddNpcInstance {
    fn kind(&self) -> CommandKind {
        CommandKind::AddNpcInstance
    }

    fn description(&self) -> String {
        "Place NPC".to_string()
    }

    fn apply(&mut self, project: &mut ProjectData) -> Result<Vec<Change>, CommandError> {
        check_npc_id(project, self.instance.npc_id)?;
        let index = self.index.unwrap_or(project.npc_instances().len());
        if !project.insert_npc_instance(index, self.instance.clone()) {
            return Err(CommandError::duplicate("NPC instance", self.instance.uuid));
        }
        Ok(vec![Change::NpcInstance(self.instance.uuid)])
    }

    fn revert(&mut self, project: &mut ProjectData) -> Result<Vec<Change>, CommandError> {
        let uuid = self.instance.uuid;
        let (index, _) = project
            .remove_npc_instance(uuid)
            .ok_or_else(|| CommandError::unknown("NPC instance", uuid))?;
        self.index = Some(index);
        Ok(vec![Change::NpcInstance(uuid)])
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Delete a placed NPC instance
#[derive(Debug)]
pub struct RemoveNpcInstance {
    uuid: Uuid,
    removed: Option<(usize, NpcInstance)>,
}

impl RemoveNpcInstance {
    pub fn new(uuid: Uuid) -> Self {
        Self {
            uuid,
            removed: None,
        }
    }
}

impl Command for RemoveNpcInstance {
    fn kind(&self) -> CommandKind {
        CommandKind::RemoveNpcInstance
    }

    fn description(&self) -> String {
        "Delete NPC".to_string()
    }

    fn apply(&mut self, project: &mut ProjectData) -> Result<Vec<Change>, CommandError> {
        let removed = project
            .remove_npc_instance(self.uuid)
            .ok_or_else(|| CommandError::unknown("NPC instance", self.uuid))?;
        self.removed = Some(removed);
        Ok(vec![Change::NpcInstance(self.uuid)])
    }

    fn revert(&mut self, project: &mut ProjectData) -> Result<Vec<Change>, CommandError> {
        let (index, instance) = self
            .removed
            .take()
            .ok_or_else(|| CommandError::unknown("NPC instance", self.uuid))?;
        if !project.insert_npc_instance(index, instance) {
            return Err(CommandError::duplicate("NPC instance", self.uuid));
        }
        Ok(vec![Change::NpcInstance(self.uuid)])
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Move a placed NPC. Consecutive moves of the same NPC merge.
#[derive(Debug)]
pub struct MoveNpcInstance {
    uuid: Uuid,
    to: Coord,
    from: Option<Coord>,
}

impl MoveNpcInstance {
    /// `to` is clamped into the map
    pub fn new(uuid: Uuid, to: Coord) -> Self {
        Self {
            uuid,
            to: to.clamp_to_map(),
            from: None,
        }
    }
}

impl Command for MoveNpcInstance {
    fn kind(&self) -> CommandKind {
        CommandKind::MoveNpcInstance
    }

    fn description(&self) -> String {
        "Move NPC".to_string()
    }

    fn apply(&mut self, project: &mut ProjectData) -> Result<Vec<Change>, CommandError> {
        let old = project
            .set_npc_instance_coords(self.uuid, self.to)
            .ok_or_else(|| CommandError::unknown("NPC instance", self.uuid))?;
        // After a merge `from` already holds the start of the whole drag
        self.from.get_or_insert(old);
        Ok(vec![Change::NpcInstance(self.uuid)])
    }

    fn revert(&mut self, project: &mut ProjectData) -> Result<Vec<Change>, CommandError> {
        let from = self
            .from
            .ok_or_else(|| CommandError::unknown("NPC instance", self.uuid))?;
        project
            .set_npc_instance_coords(self.uuid, from)
            .ok_or_else(|| CommandError::unknown("NPC instance", self.uuid))?;
        Ok(vec![Change::NpcInstance(self.uuid)])
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

/// Point a placed NPC at another NPC template
#[derive(Debug)]
pub struct RetargetNpcInstance {
    uuid: Uuid,
    npc_id: u16,
    previous: Option<u16>,
}

impl RetargetNpcInstance {
    pub fn new(uuid: Uuid, npc_id: u16) -> Self {
        Self {
            uuid,
            npc_id,
            previous: None,
        }
    }
}

impl Command for RetargetNpcInstance {
    fn kind(&self) -> CommandKind {
        CommandKind::RetargetNpcInstance
    }

    fn description(&self) -> String {
        format!("Change NPC to {}", self.npc_id)
    }

    fn apply(&mut self, project: &mut ProjectData) -> Result<Vec<Change>, CommandError> {
        check_npc_id(project, self.npc_id)?;
        let old = project
            .set_npc_instance_npc(self.uuid, self.npc_id)
            .ok_or_else(|| CommandError::unknown("NPC instance", self.uuid))?;
        self.previous.get_or_insert(old);
        Ok(vec![Change::NpcInstance(self.uuid)])
    }

    fn revert(&mut self, project: &mut ProjectData) -> Result<Vec<Change>, CommandError> {
        let previous = self
            .previous
            .ok_or_else(|| CommandError::unknown("NPC instance", self.uuid))?;
        project
            .set_npc_instance_npc(self.uuid, previous)
            .ok_or_else(|| CommandError::unknown("NPC instance", self.uuid))?;
        Ok(vec![Change::NpcInstance(self.uuid)])
    }

    fn can_merge(&self, other: &dyn Command) -> bool {
        same_kind(self, other)
            .is_some_and(|o| o.uuid == self.uuid && o.previous == Some(self.npc_id))
    }

    fn merge(&mut self, other: &dyn Command) {
        if let Some(other) = same_kind(self, other) {
            self.npc_id = other.npc_id;
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Append a template to the NPC table
#[derive(Debug)]
pub struct AddNpc {
    npc: Npc,
    id: Option<usize>,
}

impl AddNpc {
    pub fn new(npc: Npc) -> Self {
        Self { npc, id: None }
    }

    /// ID the template was given, once applied
    pub fn id(&self) -> Option<usize> {
        self.id
    }
}

impl Command for AddNpc {
    fn kind(&self) -> CommandKind {
        CommandKind::AddNpc
    }

    fn description(&self) -> String {
        "Add NPC template".to_string()
    }

    fn apply(&mut self, project: &mut ProjectData) -> Result<Vec<Change>, CommandError> {
        let id = project
            .npcs
            .push(self.npc.clone())
            .ok_or(CommandError::NpcTableFull(NPC_TABLE_CAPACITY))?;
        project.mark_dirty();
        self.id = Some(id);
        Ok(vec![Change::Npc(id)])
    }

    fn revert(&mut self, project: &mut ProjectData) -> Result<Vec<Change>, CommandError> {
        let id = self.id.ok_or_else(|| CommandError::unknown("NPC", "template"))?;
        if project.npcs.len() != id + 1 {
            return Err(CommandError::unknown("NPC", id));
        }
        project.npcs.pop();
        project.mark_dirty();
        Ok(vec![Change::Npc(id)])
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Replace every field of an NPC template. Consecutive edits of the same
/// template merge.
#[derive(Debug)]
pub struct EditNpc {
    id: usize,
    after: Npc,
    before: Option<Npc>,
}

impl EditNpc {
    pub fn new(id: usize, npc: Npc) -> Self {
        Self {
            id,
            after: npc,
            before: None,
        }
    }
}

impl Command for EditNpc {
    fn kind(&self) -> CommandKind {
        CommandKind::EditNpc
    }

    fn description(&self) -> String {
        format!("Edit NPC {}", self.id)
    }

    fn apply(&mut self, project: &mut ProjectData) -> Result<Vec<Change>, CommandError> {
        let slot = project
            .npcs
            .get_mut(self.id)
            .ok_or_else(|| CommandError::unknown("NPC", self.id))?;
        let old = std::mem::replace(slot, self.after.clone());
        self.before.get_or_insert(old);
        project.mark_dirty();
        Ok(vec![Change::Npc(self.id)])
    }

    fn revert(&mut self, project: &mut ProjectData) -> Result<Vec<Change>, CommandError> {
        let before = self
            .before
            .clone()
            .ok_or_else(|| CommandError::unknown("NPC", self.id))?;
        let slot = project
            .npcs
            .get_mut(self.id)
            .ok_or_else(|| CommandError::unknown("NPC", self.id))?;
        *slot = before;
        project.mark_dirty();
        Ok(vec![Change::Npc(self.id)])
    }

    fn can_merge(&self, other: &dyn Command) -> bool {
        same_kind(self, other)
            .is_some_and(|o| o.id == self.id && o.before.as_ref() == Some(&self.after))
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
