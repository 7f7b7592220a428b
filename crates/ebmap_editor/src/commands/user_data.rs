//! Sector user-data field definitions
//!
//! Removing a field strips its value from every sector. Undoing the removal
//! puts the field back at its old position with every stripped value, while
//! adding a field of the same name afresh starts with no values.

use super::{Change, Command, CommandKind};
use crate::error::CommandError;
use crate::project::ProjectData;
use ebmap_schema::{UserDataType, UserDataValue};
use std::any::Any;

#[derive(Debug)]
pub struct AddUserDataField {
    name: String,
    field_type: UserDataType,
}

impl AddUserDataField {
    pub fn new(name: impl Into<String>, field_type: UserDataType) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }
}

impl Command for AddUserDataField {
    fn kind(&self) -> CommandKind {
        CommandKind::AddUserDataField
    }

    fn description(&self) -> String {
        format!("Add field {}", self.name)
    }

    fn apply(&mut self, project: &mut ProjectData) -> Result<Vec<Change>, CommandError> {
        project.user_data_fields.add(&self.name, self.field_type)?;
        project.mark_dirty();
        Ok(vec![Change::UserDataFields])
    }

    fn revert(&mut self, project: &mut ProjectData) -> Result<Vec<Change>, CommandError> {
        project.user_data_fields.remove(&self.name)?;
        project.sectors.strip_user_data(&self.name);
        project.mark_dirty();
        Ok(vec![Change::UserDataFields])
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug)]
pub struct RemoveUserDataField {
    name: String,
    removed: Option<RemovedField>,
}

#[derive(Debug)]
struct RemovedField {
    index: usize,
    field_type: UserDataType,
    values: Vec<(usize, UserDataValue)>,
}

impl RemoveUserDataField {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            removed: None,
        }
    }
}

impl Command for RemoveUserDataField {
    fn kind(&self) -> CommandKind {
        CommandKind::RemoveUserDataField
    }

    fn description(&self) -> String {
        format!("Remove field {}", self.name)
    }

    fn apply(&mut self, project: &mut ProjectData) -> Result<Vec<Change>, CommandError> {
        let (index, field_type) = project.user_data_fields.remove(&self.name)?;
        let values = project.sectors.strip_user_data(&self.name);
        self.removed = Some(RemovedField {
            index,
            field_type,
            values,
        });
        project.mark_dirty();
        Ok(vec![Change::UserDataFields])
    }

    fn revert(&mut self, project: &mut ProjectData) -> Result<Vec<Change>, CommandError> {
        let removed = self
            .removed
            .take()
            .ok_or_else(|| CommandError::unknown("user data field", &self.name))?;
        project
            .user_data_fields
            .insert_at(removed.index, &self.name, removed.field_type)?;
        for (id, value) in removed.values {
            if let Some(sector) = project.sectors.get_mut(id) {
                sector.user_data.insert(self.name.clone(), value);
            }
        }
        project.mark_dirty();
        Ok(vec![Change::UserDataFields])
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support;
    use ebmap_schema::FieldError;

    fn project_with_fields() -> ProjectData {
        let mut project = test_support::project();
        for (name, ty) in [
            ("area", UserDataType::String),
            ("danger", UserDataType::Int),
            ("indoors", UserDataType::Bool),
        ] {
            project.user_data_fields.add(name, ty).unwrap();
        }
        project
    }

    #[test]
    fn test_add_then_revert() {
        let mut project = test_support::project();
        let mut add = AddUserDataField::new("secret", UserDataType::Bool);
        add.apply(&mut project).unwrap();
        assert_eq!(project.user_data_fields.get("secret"), Some(UserDataType::Bool));
        assert_eq!(
            AddUserDataField::new("secret", UserDataType::Int).apply(&mut project),
            Err(CommandError::Field(FieldError::Duplicate("secret".into())))
        );
        add.revert(&mut project).unwrap();
        assert!(project.user_data_fields.is_empty());
    }

    #[test]
    fn test_remove_restores_position_and_values() {
        let mut project = project_with_fields();
        for id in [0, 40, 2559] {
            project
                .sectors
                .get_mut(id)
                .unwrap()
                .user_data
                .insert("danger".into(), UserDataValue::Int(id as i64));
        }

        let mut remove = RemoveUserDataField::new("danger");
        remove.apply(&mut project).unwrap();
        assert_eq!(project.user_data_fields.names(), vec!["area", "indoors"]);
        assert!(project.sectors.iter().all(|s| s.user_data.is_empty()));

        remove.revert(&mut project).unwrap();
        assert_eq!(project.user_data_fields.names(), vec!["area", "danger", "indoors"]);
        assert_eq!(
            project.sectors.get(40).unwrap().user_data.get("danger"),
            Some(&UserDataValue::Int(40))
        );
        assert_eq!(
            project.sectors.iter().filter(|s| !s.user_data.is_empty()).count(),
            3
        );
    }

    #[test]
    fn test_readd_starts_empty() {
        let mut project = project_with_fields();
        project
            .sectors
            .get_mut(7)
            .unwrap()
            .user_data
            .insert("area".into(), UserDataValue::String("town".into()));

        RemoveUserDataField::new("area").apply(&mut project).unwrap();
        AddUserDataField::new("area", UserDataType::String)
            .apply(&mut project)
            .unwrap();
        let sector = project.sectors.get(7).unwrap();
        assert_eq!(
            sector.user_value_or_default("area", UserDataType::String),
            UserDataValue::String(String::new())
        );
        assert_eq!(project.user_data_fields.names(), vec!["danger", "indoors", "area"]);
    }

    #[test]
    fn test_remove_unknown_field() {
        let mut project = test_support::project();
        assert!(RemoveUserDataField::new("nope").apply(&mut project).is_err());
    }
}
