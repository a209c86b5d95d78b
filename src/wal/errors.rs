//! WAL error types
//!
//! Error codes:
//! - LEDGER_WAL_APPEND_FAILED (ERROR severity)
//! - LEDGER_WAL_FSYNC_FAILED (FATAL severity)
//! - LEDGER_WAL_READ_FAILED (FATAL severity)
//! - LEDGER_WAL_CORRUPTION (FATAL severity)
//! - LEDGER_WAL_UNAVAILABLE (ERROR severity)

use std::fmt;
use std::io;

use crate::errors::ErrorKind;

/// Severity levels for WAL errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Operation fails, engine continues
    Error,
    /// Engine must not start or continue
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// WAL-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalErrorCode {
    /// Write to the log failed
    LedgerWalAppendFailed,
    /// Flush to stable storage failed
    LedgerWalFsyncFailed,
    /// The log exists but could not be read
    LedgerWalReadFailed,
    /// A line could not be decoded as an event
    LedgerWalCorruption,
    /// The log handle can no longer be used
    LedgerWalUnavailable,
}

impl WalErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            WalErrorCode::LedgerWalAppendFailed => "LEDGER_WAL_APPEND_FAILED",
            WalErrorCode::LedgerWalFsyncFailed => "LEDGER_WAL_FSYNC_FAILED",
            WalErrorCode::LedgerWalReadFailed => "LEDGER_WAL_READ_FAILED",
            WalErrorCode::LedgerWalCorruption => "LEDGER_WAL_CORRUPTION",
            WalErrorCode::LedgerWalUnavailable => "LEDGER_WAL_UNAVAILABLE",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            WalErrorCode::LedgerWalAppendFailed => Severity::Error,
            WalErrorCode::LedgerWalFsyncFailed => Severity::Fatal,
            WalErrorCode::LedgerWalReadFailed => Severity::Fatal,
            WalErrorCode::LedgerWalCorruption => Severity::Fatal,
            WalErrorCode::LedgerWalUnavailable => Severity::Error,
        }
    }
}

impl fmt::Display for WalErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// WAL error type with full context
#[derive(Debug)]
pub struct WalError {
    /// Error code
    code: WalErrorCode,
    /// Human-readable message
    message: String,
    /// Optional details about the error context
    details: Option<String>,
    /// Underlying IO error if applicable
    source: Option<io::Error>,
}

impl WalError {
    /// Create a new WAL append failed error
    pub fn append_failed(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            code: WalErrorCode::LedgerWalAppendFailed,
            message: message.into(),
            details: None,
            source: Some(source),
        }
    }

    /// Create a new WAL fsync failed error
    pub fn fsync_failed(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            code: WalErrorCode::LedgerWalFsyncFailed,
            message: message.into(),
            details: None,
            source: Some(source),
        }
    }

    /// Create a new WAL read failed error
    pub fn read_failed(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            code: WalErrorCode::LedgerWalReadFailed,
            message: message.into(),
            details: None,
            source: Some(source),
        }
    }

    /// Create a new WAL corruption error
    pub fn corruption(message: impl Into<String>) -> Self {
        Self {
            code: WalErrorCode::LedgerWalCorruption,
            message: message.into(),
            details: None,
            source: None,
        }
    }

    /// Create a WAL corruption error with line number context (1-based)
    pub fn corruption_at_line(line: u64, reason: impl Into<String>) -> Self {
        Self {
            code: WalErrorCode::LedgerWalCorruption,
            message: reason.into(),
            details: Some(format!("line: {}", line)),
            source: None,
        }
    }

    /// Create an error for a log handle that can no longer be used
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            code: WalErrorCode::LedgerWalUnavailable,
            message: message.into(),
            details: None,
            source: None,
        }
    }

    /// Attaches context to an existing error
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Returns the error code
    pub fn code(&self) -> WalErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Always `ErrorKind::Persistence`
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Persistence
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns additional error details
    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    /// Returns whether this error is fatal
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for WalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for WalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for WAL operations
pub type WalResult<T> = Result<T, WalError>;
