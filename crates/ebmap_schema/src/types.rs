//! User-data type definitions

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while editing the field list
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("user data field `{0}` already exists")]
    Duplicate(String),
    #[error("user data field `{0}` does not exist")]
    Unknown(String),
    #[error("user data field name must not be empty")]
    EmptyName,
}

/// Value types a user-data field can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserDataType {
    Int,
    Bool,
    String,
}

impl UserDataType {
    pub fn display_name(&self) -> &'static str {
        match self {
            UserDataType::Int => "Integer",
            UserDataType::Bool => "Boolean",
            UserDataType::String => "String",
        }
    }

    /// All field types for UI enumeration
    pub fn all() -> &'static [UserDataType] {
        &[UserDataType::Int, UserDataType::Bool, UserDataType::String]
    }

    /// The value implied for a sector that never set this field
    pub fn default_value(&self) -> UserDataValue {
        match self {
            UserDataType::Int => UserDataValue::Int(0),
            UserDataType::Bool => UserDataValue::Bool(false),
            UserDataType::String => UserDataValue::String(String::new()),
        }
    }
}

/// A single user-data value stored on a sector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserDataValue {
    Bool(bool),
    Int(i64),
    String(String),
}

impl Default for UserDataValue {
    fn default() -> Self {
        UserDataValue::Int(0)
    }
}

impl UserDataValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            UserDataValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            UserDataValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            UserDataValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// The type this value carries
    pub fn value_type(&self) -> UserDataType {
        match self {
            UserDataValue::Int(_) => UserDataType::Int,
            UserDataValue::Bool(_) => UserDataType::Bool,
            UserDataValue::String(_) => UserDataType::String,
        }
    }

    /// Check whether this value can be stored in a field of the given type
    pub fn matches(&self, ty: UserDataType) -> bool {
        self.value_type() == ty
    }
}

/// A named field definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDataField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: UserDataType,
}

/// Ordered list of user-data fields defined for sectors.
///
/// Iteration order is insertion order; removal followed by
/// [`UserDataFields::insert_at`] restores the original position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserDataFields {
    fields: Vec<UserDataField>,
}

impl UserDataFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &UserDataField> {
        self.fields.iter()
    }

    /// Field names in iteration order
    pub fn names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn get(&self, name: &str) -> Option<UserDataType> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.field_type)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Append a new field
    pub fn add(&mut self, name: &str, field_type: UserDataType) -> Result<(), FieldError> {
        let len = self.fields.len();
        self.insert_at(len, name, field_type)
    }

    /// Insert a field at a position (clamped to the end of the list)
    pub fn insert_at(
        &mut self,
        index: usize,
        name: &str,
        field_type: UserDataType,
    ) -> Result<(), FieldError> {
        if name.is_empty() {
            return Err(FieldError::EmptyName);
        }
        if self.contains(name) {
            return Err(FieldError::Duplicate(name.to_string()));
        }
        let index = index.min(self.fields.len());
        self.fields.insert(
            index,
            UserDataField {
                name: name.to_string(),
                field_type,
            },
        );
        Ok(())
    }

    /// Remove a field, returning its former position and type
    pub fn remove(&mut self, name: &str) -> Result<(usize, UserDataType), FieldError> {
        let index = self
            .position(name)
            .ok_or_else(|| FieldError::Unknown(name.to_string()))?;
        let field = self.fields.remove(index);
        Ok((index, field.field_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_lookup() {
        let mut fields = UserDataFields::new();
        fields.add("spawn_rate", UserDataType::Int).unwrap();
        fields.add("indoor", UserDataType::Bool).unwrap();

        assert_eq!(fields.len(), 2);
        assert_eq!(fields.get("indoor"), Some(UserDataType::Bool));
        assert_eq!(fields.names(), vec!["spawn_rate", "indoor"]);
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut fields = UserDataFields::new();
        fields.add("a", UserDataType::Int).unwrap();
        assert_eq!(
            fields.add("a", UserDataType::String),
            Err(FieldError::Duplicate("a".to_string()))
        );
        assert_eq!(fields.add("", UserDataType::Int), Err(FieldError::EmptyName));
    }

    #[test]
    fn test_remove_then_insert_restores_order() {
        let mut fields = UserDataFields::new();
        fields.add("a", UserDataType::Int).unwrap();
        fields.add("b", UserDataType::Bool).unwrap();
        fields.add("c", UserDataType::String).unwrap();

        let (index, ty) = fields.remove("b").unwrap();
        assert_eq!(index, 1);
        assert_eq!(fields.names(), vec!["a", "c"]);

        fields.insert_at(index, "b", ty).unwrap();
        assert_eq!(fields.names(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_default_values() {
        assert_eq!(UserDataType::Int.default_value(), UserDataValue::Int(0));
        assert_eq!(UserDataType::Bool.default_value(), UserDataValue::Bool(false));
        assert!(UserDataValue::String("x".into()).matches(UserDataType::String));
        assert!(!UserDataValue::Int(1).matches(UserDataType::Bool));
    }

    #[test]
    fn test_value_yaml_is_untagged() {
        let values: Vec<UserDataValue> = serde_yaml::from_str("[3, true, hello]").unwrap();
        assert_eq!(
            values,
            vec![
                UserDataValue::Int(3),
                UserDataValue::Bool(true),
                UserDataValue::String("hello".to_string()),
            ]
        );
    }
}
