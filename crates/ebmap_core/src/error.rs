//! Error types shared by the codecs and tables

use thiserror::Error;

/// Numeric base of a fixed-width text field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigitBase {
    Hex,
    Base32,
}

impl std::fmt::Display for DigitBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DigitBase::Hex => write!(f, "hexadecimal"),
            DigitBase::Base32 => write!(f, "base-32"),
        }
    }
}

/// Malformed input found while decoding a resource.
///
/// Line and column numbers are zero-based.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("line {line}, column {column}: invalid {base} digit {ch:?}")]
    InvalidDigit {
        line: usize,
        column: usize,
        ch: char,
        base: DigitBase,
    },
    #[error("line {line}: expected {expected} characters, found {found}")]
    WrongLength {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("line {line}: expected a blank separator line")]
    ExpectedBlank { line: usize },
    #[error("unexpected end of input at line {line} while reading {what}")]
    UnexpectedEof { line: usize, what: &'static str },
    #[error("missing required key `{0}`")]
    MissingKey(String),
    #[error("{0}")]
    Invalid(String),
}

/// Errors from the core tables
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error(transparent)]
    Format(#[from] FormatError),
    /// A stored ID lies outside its table. Loaded data is corrupt.
    #[error("{what} {value} is out of range (maximum {max})")]
    OutOfRange {
        what: &'static str,
        value: i64,
        max: i64,
    },
    #[error("flood fill stopped after visiting {0} sectors")]
    FloodFillLimit(usize),
}

impl CoreError {
    pub fn out_of_range(what: &'static str, value: impl Into<i64>, max: impl Into<i64>) -> Self {
        CoreError::OutOfRange {
            what,
            value: value.into(),
            max: max.into(),
        }
    }
}
