//! Observable events
//!
//! Every log line names one of these.

use std::fmt;

/// Observable events in ledgerdb
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Lifecycle
    /// Engine open begins
    EngineOpenBegin,
    /// Engine open complete, ready to serve
    EngineOpenComplete,
    /// Configuration loaded
    ConfigLoaded,
    /// Sample tables seeded
    SeedComplete,
    /// Shell started
    ShellStart,
    /// Shell exited
    ShellExit,

    // WAL
    /// Event appended
    WalAppend,
    /// Append failed; the write was rolled back
    WalAppendFailed,
    /// Undecodable WAL line (FATAL)
    WalCorruption,

    // Recovery
    /// WAL replay begins
    WalReplayBegin,
    /// WAL replay complete
    WalReplayComplete,
    /// Replay failed (FATAL)
    ReplayFailed,

    // Writes and reads
    /// Table created
    TableCreated,
    /// Write applied and logged
    WriteCommit,
    /// Write rejected; nothing changed
    WriteRejected,
    /// Read rejected
    QueryRejected,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::EngineOpenBegin => "ENGINE_OPEN_BEGIN",
            Event::EngineOpenComplete => "ENGINE_OPEN_COMPLETE",
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::SeedComplete => "SEED_COMPLETE",
            Event::ShellStart => "SHELL_START",
            Event::ShellExit => "SHELL_EXIT",

            Event::WalAppend => "WAL_APPEND",
            Event::WalAppendFailed => "WAL_APPEND_FAILED",
            Event::WalCorruption => "WAL_CORRUPTION",

            Event::WalReplayBegin => "WAL_REPLAY_BEGIN",
            Event::WalReplayComplete => "WAL_REPLAY_COMPLETE",
            Event::ReplayFailed => "REPLAY_FAILED",

            Event::TableCreated => "TABLE_CREATED",
            Event::WriteCommit => "WRITE_COMMIT",
            Event::WriteRejected => "WRITE_REJECTED",
            Event::QueryRejected => "QUERY_REJECTED",
        }
    }

    /// Returns true if this event indicates a fatal condition
    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::WalCorruption | Event::ReplayFailed)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
