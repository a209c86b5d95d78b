//! WAL writer
//!
//! - Append-only, one JSON event per line
//! - The file is created on first append
//! - With `WalSyncMode::Fsync` every append is followed by `sync_data`
//! - A failed append truncates the file back to its last complete line and
//!   the writer refuses every later append
//!
//! Acknowledgment before the append (and sync, when enabled) completes is
//! forbidden.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::errors::{WalError, WalResult};
use super::event::PersistenceEvent;
use super::reader::WalReader;

/// Durability of each append
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalSyncMode {
    /// `sync_data` after every append
    #[default]
    Fsync,
    /// Flush to the OS only
    None,
}

/// Appends events to a JSON-lines log
pub struct WalWriter {
    /// Path to the WAL file
    wal_path: PathBuf,
    /// Opened on first append
    file: Option<File>,
    sync_mode: WalSyncMode,
    /// Next sequence number to assign (starts at 1, never reused)
    next_sequence: u64,
    /// File length after the last complete line
    committed_len: u64,
    /// Set once an append fails; cleared only by reopening
    failed: bool,
}

impl WalWriter {
    /// Prepares a writer for `wal_path`, creating parent directories.
    ///
    /// An existing log is scanned to continue its sequence numbering, so
    /// a corrupt log is reported here.
    pub fn open(wal_path: &Path, sync_mode: WalSyncMode) -> WalResult<Self> {
        if let Some(dir) = wal_path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir).map_err(|e| {
                    WalError::append_failed(
                        format!("Failed to create WAL directory: {}", dir.display()),
                        e,
                    )
                })?;
            }
        }

        let next_sequence = Self::determine_next_sequence(wal_path)?;
        let committed_len = match fs::metadata(wal_path) {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => 0,
            Err(e) => {
                return Err(WalError::read_failed(
                    format!("Failed to stat WAL file: {}", wal_path.display()),
                    e,
                ))
            }
        };

        Ok(Self {
            wal_path: wal_path.to_path_buf(),
            file: None,
            sync_mode,
            next_sequence,
            committed_len,
            failed: false,
        })
    }

    /// Returns 1 if the WAL is missing or empty.
    fn determine_next_sequence(wal_path: &Path) -> WalResult<u64> {
        let Some(mut reader) = WalReader::open_if_exists(wal_path)? else {
            return Ok(1);
        };
        let mut count = 0u64;
        while reader.read_next()?.is_some() {
            count += 1;
        }
        Ok(count + 1)
    }

    /// Appends one event as a line and returns its sequence number.
    ///
    /// # Errors
    ///
    /// - `LEDGER_WAL_APPEND_FAILED` if the file cannot be opened or written
    /// - `LEDGER_WAL_FSYNC_FAILED` if sync fails (FATAL)
    /// - `LEDGER_WAL_UNAVAILABLE` after any earlier failure
    ///
    /// On a write, flush or sync failure the file is cut back to the last
    /// complete line, so the failed event is never replayed.
    pub fn append(&mut self, event: &PersistenceEvent) -> WalResult<u64> {
        if self.failed {
            return Err(WalError::unavailable(format!(
                "WAL writer stopped after a failed append; reopen {} to continue",
                self.wal_path.display()
            )));
        }

        let sequence_number = self.next_sequence;
        let mut line = serde_json::to_string(event).map_err(|e| {
            WalError::append_failed(
                format!("Failed to encode WAL event at sequence {}", sequence_number),
                io::Error::new(io::ErrorKind::InvalidData, e),
            )
        })?;
        line.push('\n');

        if let Err(err) = self.write_line(sequence_number, line.as_bytes()) {
            self.failed = true;
            self.file = None;
            let details = match self.truncate_to_committed() {
                Ok(()) => format!("log truncated to {} bytes", self.committed_len),
                Err(e) => format!("truncate to {} bytes failed: {}", self.committed_len, e),
            };
            return Err(err.with_details(details));
        }

        // Only advance after the event is on disk
        self.committed_len += line.len() as u64;
        self.next_sequence += 1;

        Ok(sequence_number)
    }

    fn write_line(&mut self, sequence_number: u64, bytes: &[u8]) -> WalResult<()> {
        let sync_mode = self.sync_mode;
        let file = self.file_handle()?;

        file.write_all(bytes).map_err(|e| {
            WalError::append_failed(
                format!("Failed to write WAL event at sequence {}", sequence_number),
                e,
            )
        })?;
        file.flush().map_err(|e| {
            WalError::append_failed(
                format!("Failed to flush WAL event at sequence {}", sequence_number),
                e,
            )
        })?;

        if sync_mode == WalSyncMode::Fsync {
            file.sync_data().map_err(|e| {
                WalError::fsync_failed(
                    format!("fsync failed after WAL append at sequence {}", sequence_number),
                    e,
                )
            })?;
        }
        Ok(())
    }

    /// Drops any bytes past the last complete line.
    fn truncate_to_committed(&self) -> io::Result<()> {
        let file = match OpenOptions::new().write(true).open(&self.wal_path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e),
        };
        file.set_len(self.committed_len)?;
        file.sync_all()
    }

    fn file_handle(&mut self) -> WalResult<&mut File> {
        if self.file.is_none() {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.wal_path)
                .map_err(|e| {
                    WalError::append_failed(
                        format!("Failed to open WAL file: {}", self.wal_path.display()),
                        e,
                    )
                })?;
            self.file = Some(file);
        }
        match self.file.as_mut() {
            Some(file) => Ok(file),
            None => Err(WalError::unavailable("WAL file handle missing")),
        }
    }
}
