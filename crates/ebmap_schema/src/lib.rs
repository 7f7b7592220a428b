//! Sector user-data schema for ebmap
//!
//! Projects may attach extra, admin-defined fields to every map sector. This
//! crate describes those fields:
//! - `UserDataType` - The value type of a field (integer, boolean, string)
//! - `UserDataValue` - A value stored on a sector
//! - `UserDataFields` - The ordered list of defined fields

mod types;

pub use types::{FieldError, UserDataField, UserDataFields, UserDataType, UserDataValue};
