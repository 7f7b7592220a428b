//! Error types for commands and the undo history

use ebmap_core::CoreError;
use ebmap_schema::FieldError;
use thiserror::Error;

/// A command whose preconditions do not hold. Recoverable: the command is
/// not pushed and the project is unchanged.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    #[error("the NPC table is full ({0} entries)")]
    NpcTableFull(usize),
    #[error("{what} {id} does not exist")]
    UnknownEntity { what: &'static str, id: String },
    #[error("{what} {id} already exists")]
    Duplicate { what: &'static str, id: String },
    #[error("{field}: expected a {expected} value")]
    TypeMismatch {
        field: String,
        expected: &'static str,
    },
    #[error(transparent)]
    Field(#[from] FieldError),
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl CommandError {
    pub fn unknown(what: &'static str, id: impl ToString) -> Self {
        CommandError::UnknownEntity {
            what,
            id: id.to_string(),
        }
    }

    pub fn duplicate(what: &'static str, id: impl ToString) -> Self {
        CommandError::Duplicate {
            what,
            id: id.to_string(),
        }
    }
}

/// Errors from [`crate::commands::CommandHistory`]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HistoryError {
    #[error("nothing to undo")]
    NothingToUndo,
    #[error("nothing to redo")]
    NothingToRedo,
    #[error("no macro is open")]
    NoOpenMacro,
    #[error("cannot undo or redo while a macro is open")]
    MacroOpen,
    #[error(transparent)]
    Command(#[from] CommandError),
}
