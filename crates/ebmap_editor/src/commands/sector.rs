//! Sector commands
//!
//! The sector is the source of truth for the graphics key cached on its map
//! tiles, so attribute edits that change tileset, palette group or palette
//! refresh the covered tiles on apply and on revert.

use super::{same_kind, Change, Command, CommandKind, CompositeCommand};
use crate::error::CommandError;
use crate::project::ProjectData;
use ebmap_core::{CoreError, SectorAttributes};
use ebmap_schema::UserDataValue;
use std::any::Any;

/// Replace every attribute of one sector
#[derive(Debug)]
pub struct SetSectorAttributes {
    sector: usize,
    after: SectorAttributes,
    before: Option<SectorAttributes>,
}

impl SetSectorAttributes {
    pub fn new(sector: usize, after: SectorAttributes) -> Self {
        Self {
            sector,
            after,
            before: None,
        }
    }

    /// Give `after`'s attributes to the seed sector and every sector reachable
    /// from it through neighbours drawn with the same graphics
    pub fn fill(
        project: &ProjectData,
        seed: usize,
        after: SectorAttributes,
    ) -> Result<CompositeCommand, CoreError> {
        let commands = project
            .sectors
            .adjacent_matching(seed)?
            .into_iter()
            .map(|id| Box::new(SetSectorAttributes::new(id, after)) as Box<dyn Command>)
            .collect();
        Ok(CompositeCommand::new("Fill sectors", commands))
    }

    fn swap_in(
        &self,
        project: &mut ProjectData,
        mut attributes: SectorAttributes,
    ) -> Result<SectorAttributes, CommandError> {
        // The graphics tileset is not persisted; it always follows the
        // palette group, as on load
        attributes.tileset = project
            .tileset_for_palette_group(attributes.palette_group)
            .unwrap_or(0);
        let sector = project
            .sectors
            .get_mut(self.sector)
            .ok_or_else(|| CommandError::unknown("sector", self.sector))?;
        let old = std::mem::replace(&mut sector.attributes, attributes);
        if old.graphics() != attributes.graphics() {
            project.refresh_sector_tiles(self.sector);
        }
        project.mark_dirty();
        Ok(old)
    }
}

impl Command for SetSectorAttributes {
    fn kind(&self) -> CommandKind {
        CommandKind::SectorAttributes
    }

    fn description(&self) -> String {
        format!("Edit sector {}", self.sector)
    }

    fn apply(&mut self, project: &mut ProjectData) -> Result<Vec<Change>, CommandError> {
        let old = self.swap_in(project, self.after)?;
        if let Some(sector) = project.sectors.get(self.sector) {
            self.after = sector.attributes;
        }
        self.before.get_or_insert(old);
        Ok(vec![Change::Sector(self.sector)])
    }

    fn revert(&mut self, project: &mut ProjectData) -> Result<Vec<Change>, CommandError> {
        let before = self
            .before
            .ok_or_else(|| CommandError::unknown("sector", self.sector))?;
        self.swap_in(project, before)?;
        Ok(vec![Change::Sector(self.sector)])
    }

    fn can_merge(&self, other: &dyn Command) -> bool {
        same_kind(self, other)
            .is_some_and(|o| o.sector == self.sector && o.before == Some(self.after))
    }

    fn merge(&mut self, other: &dyn Command) {
        if let Some(other) = same_kind(self, other) {
            self.after = other.after;
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Set or clear one user-data value on a sector. A cleared value reads as
/// the field type's default.
#[derive(Debug)]
pub struct SetSectorUserData {
    sector: usize,
    field: String,
    after: Option<UserDataValue>,
    before: Option<Option<UserDataValue>>,
}

impl SetSectorUserData {
    pub fn new(sector: usize, field: impl Into<String>, value: Option<UserDataValue>) -> Self {
        Self {
            sector,
            field: field.into(),
            after: value,
            before: None,
        }
    }

    fn store(
        &self,
        project: &mut ProjectData,
        value: Option<UserDataValue>,
    ) -> Result<Option<UserDataValue>, CommandError> {
        let sector = project
            .sectors
            .get_mut(self.sector)
            .ok_or_else(|| CommandError::unknown("sector", self.sector))?;
        let old = match value {
            Some(value) => sector.user_data.insert(self.field.clone(), value),
            None => sector.user_data.remove(&self.field),
        };
        project.mark_dirty();
        Ok(old)
    }
}

impl Command for SetSectorUserData {
    fn kind(&self) -> CommandKind {
        CommandKind::SectorUserData
    }

    fn description(&self) -> String {
        format!("Set {} on sector {}", self.field, self.sector)
    }

    fn apply(&mut self, project: &mut ProjectData) -> Result<Vec<Change>, CommandError> {
        let ty = project
            .user_data_fields
            .get(&self.field)
            .ok_or_else(|| CommandError::unknown("user data field", &self.field))?;
        if let Some(value) = &self.after {
            if !value.matches(ty) {
                return Err(CommandError::TypeMismatch {
                    field: self.field.clone(),
                    expected: ty.display_name(),
                });
            }
        }
        let old = self.store(project, self.after.clone())?;
        self.before.get_or_insert(old);
        Ok(vec![Change::Sector(self.sector)])
    }

    fn revert(&mut self, project: &mut ProjectData) -> Result<Vec<Change>, CommandError> {
        let before = self
            .before
            .clone()
            .ok_or_else(|| CommandError::unknown("sector", self.sector))?;
        self.store(project, before)?;
        Ok(vec![Change::Sector(self.sector)])
    }

    fn can_merge(&self, other: &dyn Command) -> bool {
        same_kind(self, other).is_some_and(|o| {
            o.sector == self.sector
                && o.field == self.field
                && o.before.as_ref() == Some(&self.after)
        })
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
