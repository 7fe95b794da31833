use std::fmt;

use crate::schema::Schema;

#[derive(Debug, Clone, PartialEq)]
pub enum CoreError {
    /// A row or record carries the wrong number of values for its schema.
    ArityMismatch { schema: Schema, expected: usize, found: usize },
    /// Records handed to `Dataset::from_records` are not strictly ascending by key.
    UnsortedKeys { index: usize },
    /// A record's key is NaN or infinite.
    NonFiniteKey { index: usize },
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ArityMismatch { schema, expected, found } => {
                write!(f, "{schema} row needs {expected} values, found {found}")
            }
            Self::UnsortedKeys { index } => {
                write!(f, "record {index}: key is not strictly greater than its predecessor")
            }
            Self::NonFiniteKey { index } => write!(f, "record {index}: key is not finite"),
        }
    }
}

impl std::error::Error for CoreError {}
