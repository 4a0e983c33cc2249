//! Error types for the record tools.

use thiserror::Error;

/// The main error type for record operations.
#[derive(Debug, Error)]
pub enum RecordError {
    /// Bad, missing, duplicate, or conflicting arguments. Detected before
    /// any statement executes.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Failed to establish a database connection.
    #[error("Connection error: {0}")]
    Connection(String),

    /// A textual value could not be converted to the column's type.
    #[error("Parse error for column '{column}': cannot convert '{value}'")]
    Parse { column: String, value: String },

    /// A value parsed but falls outside the column type's range.
    #[error("Range error for column '{column}': '{value}' is out of range")]
    Range { column: String, value: String },

    /// Any failure reported by the database engine.
    #[error("Database error: {0}")]
    Database(String),

    /// IO error (terminal prompt, etc.).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RecordError {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a parse error naming the offending column and raw text.
    pub fn parse(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Parse {
            column: column.into(),
            value: value.into(),
        }
    }

    /// Create a range error naming the offending column and raw text.
    pub fn range(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Range {
            column: column.into(),
            value: value.into(),
        }
    }
}

impl From<sqlx::Error> for RecordError {
    fn from(e: sqlx::Error) -> Self {
        Self::Database(e.to_string())
    }
}

/// Result type alias for record operations.
pub type RecordResult<T> = Result<T, RecordError>;
