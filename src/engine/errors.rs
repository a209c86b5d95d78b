//! Engine errors

use thiserror::Error;

use crate::errors::ErrorKind;
use crate::recovery::RecoveryError;
use crate::schema::SchemaError;
use crate::table::TableError;
use crate::wal::WalError;

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Engine errors
#[derive(Debug, Error)]
pub enum EngineError {
    // ==================
    // Caller errors
    // ==================
    /// Referenced table does not exist
    #[error("table not found: {0}")]
    TableNotFound(String),

    /// `create_table` for a name already in use
    #[error("table already exists: {0}")]
    TableExists(String),

    /// Join column not declared by its table
    #[error("unknown column {column} in table {table}")]
    UnknownColumn { table: String, column: String },

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Table(#[from] TableError),

    // ==================
    // Persistence errors
    // ==================
    #[error(transparent)]
    Wal(#[from] WalError),

    #[error(transparent)]
    Recovery(#[from] RecoveryError),

    /// A thread panicked while holding an engine lock
    #[error("engine lock poisoned: {0}")]
    Poisoned(&'static str),

    /// Broken engine invariant
    #[error("internal engine error: {0}")]
    Internal(String),
}

impl EngineError {
    /// Returns the taxonomy kind
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::TableNotFound(_) => ErrorKind::NotFound,
            EngineError::TableExists(_) | EngineError::UnknownColumn { .. } => ErrorKind::Validation,
            EngineError::Schema(e) => e.kind(),
            EngineError::Table(e) => e.kind(),
            EngineError::Wal(e) => e.kind(),
            EngineError::Recovery(e) => e.kind(),
            EngineError::Poisoned(_) | EngineError::Internal(_) => ErrorKind::Persistence,
        }
    }

    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::TableNotFound(_) => "LEDGER_TABLE_NOT_FOUND",
            EngineError::TableExists(_) => "LEDGER_TABLE_EXISTS",
            EngineError::UnknownColumn { .. } => "LEDGER_UNKNOWN_COLUMN",
            EngineError::Schema(e) => e.code().code(),
            EngineError::Table(e) => e.code(),
            EngineError::Wal(e) => e.code().code(),
            EngineError::Recovery(e) => e.code().code(),
            EngineError::Poisoned(_) => "LEDGER_ENGINE_POISONED",
            EngineError::Internal(_) => "LEDGER_ENGINE_INTERNAL",
        }
    }

    /// True when the engine must not continue
    pub fn is_fatal(&self) -> bool {
        self.kind().is_fatal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(EngineError::TableNotFound("t".into()).kind(), ErrorKind::NotFound);
        assert_eq!(EngineError::TableExists("t".into()).kind(), ErrorKind::Validation);
        assert!(EngineError::Poisoned("catalog").is_fatal());

        let err: EngineError = TableError::NotNullable { column: "c".into() }.into();
        assert_eq!(err.kind(), ErrorKind::ConstraintViolation);
        assert_eq!(err.code(), "LEDGER_NOT_NULLABLE");
        assert_eq!(err.to_string(), "column c cannot be null");
    }

    #[test]
    fn test_internal_error_is_fatal() {
        let err = EngineError::Internal("insert produced no row id".into());
        assert!(err.is_fatal());
        assert_eq!(err.code(), "LEDGER_ENGINE_INTERNAL");
    }

    #[test]
    fn test_wal_errors_are_fatal_kind() {
        let err: EngineError = WalError::corruption("bad").into();
        assert_eq!(err.kind(), ErrorKind::Persistence);
        assert!(err.to_string().contains("LEDGER_WAL_CORRUPTION"));
    }
}
