//! CLI error types

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::engine::EngineError;
use crate::errors::ErrorKind;
use crate::schema::SchemaError;
use crate::wal::WalError;

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

/// Errors raised by the command line and the shell
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration file unreadable or invalid
    #[error("config error: {0}")]
    Config(String),

    /// `init` would overwrite an existing configuration file
    #[error("config file already exists: {}", .0.display())]
    AlreadyInitialized(PathBuf),

    /// Malformed shell command
    #[error("{0}")]
    Usage(String),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Wal(#[from] WalError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl CliError {
    pub fn config(msg: impl Into<String>) -> Self {
        CliError::Config(msg.into())
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        CliError::Usage(msg.into())
    }

    /// Returns the taxonomy kind
    pub fn kind(&self) -> ErrorKind {
        match self {
            CliError::Config(_)
            | CliError::AlreadyInitialized(_)
            | CliError::Usage(_)
            | CliError::Json(_) => ErrorKind::Validation,
            CliError::Io(_) => ErrorKind::Persistence,
            CliError::Schema(e) => e.kind(),
            CliError::Wal(e) => e.kind(),
            CliError::Engine(e) => e.kind(),
        }
    }

    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            CliError::Config(_) => "LEDGER_CLI_CONFIG_ERROR",
            CliError::AlreadyInitialized(_) => "LEDGER_CLI_ALREADY_INITIALIZED",
            CliError::Usage(_) => "LEDGER_CLI_USAGE",
            CliError::Json(_) => "LEDGER_CLI_INVALID_JSON",
            CliError::Io(_) => "LEDGER_CLI_IO_ERROR",
            CliError::Schema(e) => e.code().code(),
            CliError::Wal(e) => e.code().code(),
            CliError::Engine(e) => e.code(),
        }
    }

    /// Errors after which the shell must stop
    pub fn is_fatal(&self) -> bool {
        self.kind().is_fatal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_is_not_fatal() {
        let err = CliError::usage("Usage: describe <table>");
        assert_eq!(err.to_string(), "Usage: describe <table>");
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_engine_errors_keep_their_kind() {
        let err: CliError = EngineError::TableNotFound("t".into()).into();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.code(), "LEDGER_TABLE_NOT_FOUND");
        assert_eq!(err.to_string(), "table not found: t");
    }

    #[test]
    fn test_already_initialized_message() {
        let err = CliError::AlreadyInitialized(PathBuf::from("/tmp/x.json"));
        assert_eq!(err.to_string(), "config file already exists: /tmp/x.json");
    }
}
