//! Write-Ahead Log (WAL) subsystem for ledgerdb
//!
//! The WAL is the only durable state. No acknowledged write exists unless
//! its event is in the log, and startup rebuilds every table by replaying
//! the log from the first line.
//!
//! # Format
//!
//! Newline-delimited JSON, one `PersistenceEvent` per line, UTF-8,
//! append-only. Blank lines are ignored; any other undecodable line is
//! corruption and loading halts.
//!
//! # Invariants Enforced
//!
//! - Append order equals the order in which mutations became visible
//! - Append completes (and syncs, in fsync mode) before acknowledgment
//! - Halt on corruption; no partial load

mod errors;
mod event;
mod persistence;
mod reader;
mod writer;

pub use errors::{Severity, WalError, WalErrorCode, WalResult};
pub use event::PersistenceEvent;
pub use persistence::{FileWal, MemoryWal, Persistence, DEFAULT_WAL_FILE};
pub use reader::WalReader;
pub use writer::{WalSyncMode, WalWriter};
