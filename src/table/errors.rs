//! Table operation errors

use thiserror::Error;

use crate::errors::ErrorKind;
use crate::predicate::PredicateError;
use crate::schema::SchemaError;

/// Failure of a single table operation. The table is unchanged when one of
/// these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("unknown column: {column}")]
    UnknownColumn { column: String },

    #[error("column {column} is required")]
    ColumnRequired { column: String },

    #[error("column {column} cannot be null")]
    NotNullable { column: String },

    #[error("unique constraint violation on [{}] in table {table}", .columns.join(", "))]
    UniqueViolation { table: String, columns: Vec<String> },

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Predicate(#[from] PredicateError),
}

impl TableError {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            TableError::UnknownColumn { .. } => "LEDGER_UNKNOWN_COLUMN",
            TableError::ColumnRequired { .. } => "LEDGER_COLUMN_REQUIRED",
            TableError::NotNullable { .. } => "LEDGER_NOT_NULLABLE",
            TableError::UniqueViolation { .. } => "LEDGER_UNIQUE_VIOLATION",
            TableError::Schema(e) => e.code().code(),
            TableError::Predicate(e) => e.code().code(),
        }
    }

    /// Returns the taxonomy kind
    pub fn kind(&self) -> ErrorKind {
        match self {
            TableError::UnknownColumn { .. } => ErrorKind::Validation,
            TableError::ColumnRequired { .. }
            | TableError::NotNullable { .. }
            | TableError::UniqueViolation { .. } => ErrorKind::ConstraintViolation,
            TableError::Schema(e) => e.kind(),
            TableError::Predicate(e) => e.kind(),
        }
    }
}

/// Result type for table operations
pub type TableResult<T> = Result<T, TableError>;
