//! Recovery subsystem for ledgerdb
//!
//! Rebuilds engine state by replaying every WAL event in order. There are
//! no checkpoints: replay always starts at the first event.
//!
//! Any failure (a table created twice, an event for a table that was never
//! created, an event the table rejects) means the log does not describe a
//! reachable state. Recovery halts and the engine must not start.

mod errors;
mod replay;

pub use errors::{RecoveryError, RecoveryErrorCode, RecoveryResult};
pub use replay::{ApplyEvent, ReplayStats, Replayer};
