//! Error types shared by the storage and query layers.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DbError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DbError {
    #[error("Syntax error: {0}")]
    Syntax(String),

    #[error("Table '{0}' does not exist")]
    TableNotFound(String),

    #[error("Table '{0}' already exists")]
    TableExists(String),

    #[error("Column '{0}' does not exist")]
    ColumnNotFound(String),

    #[error("Unsupported column type: {0}")]
    UnknownType(String),

    #[error("Column count mismatch: expected {expected}, got {got}")]
    ArityMismatch { expected: usize, got: usize },

    #[error("Column '{0}' cannot be null")]
    NullViolation(String),

    #[error("Type mismatch for column '{column}': expected {expected}, got {found}")]
    TypeMismatch {
        column: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Cannot compare {0} with {1}")]
    Incomparable(&'static str, &'static str),

    #[error("Duplicate value for primary key column '{0}'")]
    DuplicateKey(String),

    #[error("Index on column '{0}' already exists")]
    IndexExists(String),

    #[error("No index on column '{0}'")]
    IndexNotFound(String),
}
