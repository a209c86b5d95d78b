//! Recovery error types
//!
//! Error codes (all FATAL):
//! - LEDGER_RECOVERY_DUPLICATE_TABLE
//! - LEDGER_RECOVERY_TABLE_MISSING
//! - LEDGER_RECOVERY_EVENT_REJECTED
//! - LEDGER_RECOVERY_FAILED

use std::fmt;

use crate::errors::ErrorKind;

/// Recovery-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryErrorCode {
    /// A CREATE_TABLE event names a table that already exists
    LedgerRecoveryDuplicateTable,
    /// An event targets a table no earlier event created
    LedgerRecoveryTableMissing,
    /// A logged event failed when re-applied
    LedgerRecoveryEventRejected,
    /// The log could not be loaded
    LedgerRecoveryFailed,
}

impl RecoveryErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            RecoveryErrorCode::LedgerRecoveryDuplicateTable => "LEDGER_RECOVERY_DUPLICATE_TABLE",
            RecoveryErrorCode::LedgerRecoveryTableMissing => "LEDGER_RECOVERY_TABLE_MISSING",
            RecoveryErrorCode::LedgerRecoveryEventRejected => "LEDGER_RECOVERY_EVENT_REJECTED",
            RecoveryErrorCode::LedgerRecoveryFailed => "LEDGER_RECOVERY_FAILED",
        }
    }
}

impl fmt::Display for RecoveryErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Recovery error type with full context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryError {
    /// Error code
    code: RecoveryErrorCode,
    /// Human-readable message
    message: String,
    /// 1-based position of the offending event, if applicable
    sequence: Option<u64>,
}

impl RecoveryError {
    /// Create a duplicate table error
    pub fn duplicate_table(sequence: u64, table: &str) -> Self {
        Self {
            code: RecoveryErrorCode::LedgerRecoveryDuplicateTable,
            message: format!("table {} created twice in WAL", table),
            sequence: Some(sequence),
        }
    }

    /// Create a missing table error
    pub fn table_missing(sequence: u64, table: &str) -> Self {
        Self {
            code: RecoveryErrorCode::LedgerRecoveryTableMissing,
            message: format!("WAL references unknown table {}", table),
            sequence: Some(sequence),
        }
    }

    /// Create an error for an event that failed on re-application
    pub fn event_rejected(sequence: u64, reason: impl Into<String>) -> Self {
        Self {
            code: RecoveryErrorCode::LedgerRecoveryEventRejected,
            message: reason.into(),
            sequence: Some(sequence),
        }
    }

    /// Create a general recovery failed error
    pub fn recovery_failed(reason: impl Into<String>) -> Self {
        Self {
            code: RecoveryErrorCode::LedgerRecoveryFailed,
            message: reason.into(),
            sequence: None,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> RecoveryErrorCode {
        self.code
    }

    /// Always `ErrorKind::Persistence`
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Persistence
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the sequence number, if applicable
    pub fn sequence(&self) -> Option<u64> {
        self.sequence
    }
}

impl fmt::Display for RecoveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[FATAL] {}: {}", self.code.code(), self.message)?;
        if let Some(seq) = self.sequence {
            write!(f, " (sequence: {})", seq)?;
        }
        Ok(())
    }
}

impl std::error::Error for RecoveryError {}

/// Result type for recovery operations
pub type RecoveryResult<T> = Result<T, RecoveryError>;
