//! WAL reader with strict corruption detection
//!
//! Zero tolerance:
//! - Blank lines are skipped
//! - Any line that does not decode as an event halts loading
//! - No partial replay, no skipping, no repair attempts

use std::fs::File;
use std::io::{self, BufRead, BufReader, Lines};
use std::path::Path;

use super::errors::{WalError, WalResult};
use super::event::PersistenceEvent;

/// Sequential reader over a JSON-lines log
pub struct WalReader {
    lines: Lines<BufReader<File>>,
    /// 1-based number of the last line consumed
    line_number: u64,
}

impl WalReader {
    /// Opens a WAL file for reading.
    ///
    /// # Errors
    ///
    /// `LEDGER_WAL_READ_FAILED` if the file cannot be opened.
    pub fn open(wal_path: &Path) -> WalResult<Self> {
        let file = File::open(wal_path).map_err(|e| {
            WalError::read_failed(
                format!("Failed to open WAL file: {}", wal_path.display()),
                e,
            )
        })?;
        Ok(Self::from_file(file))
    }

    /// Opens the WAL if it exists; a missing file is an empty log.
    pub fn open_if_exists(wal_path: &Path) -> WalResult<Option<Self>> {
        match File::open(wal_path) {
            Ok(file) => Ok(Some(Self::from_file(file))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(WalError::read_failed(
                format!("Failed to open WAL file: {}", wal_path.display()),
                e,
            )),
        }
    }

    fn from_file(file: File) -> Self {
        Self {
            lines: BufReader::new(file).lines(),
            line_number: 0,
        }
    }

    /// Reads every event in file order.
    pub fn read_all(wal_path: &Path) -> WalResult<Vec<PersistenceEvent>> {
        let Some(mut reader) = Self::open_if_exists(wal_path)? else {
            return Ok(Vec::new());
        };
        let mut events = Vec::new();
        while let Some(event) = reader.read_next()? {
            events.push(event);
        }
        Ok(events)
    }

    /// Reads the next event.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(event))` if an event was read
    /// - `Ok(None)` at end of file
    ///
    /// # Errors
    ///
    /// - `LEDGER_WAL_READ_FAILED` on IO failure or invalid UTF-8
    /// - `LEDGER_WAL_CORRUPTION` if a non-blank line does not decode
    pub fn read_next(&mut self) -> WalResult<Option<PersistenceEvent>> {
        loop {
            let line = match self.lines.next() {
                None => return Ok(None),
                Some(Ok(line)) => line,
                Some(Err(e)) => {
                    return Err(WalError::read_failed(
                        format!("Failed to read WAL line {}", self.line_number + 1),
                        e,
                    ))
                }
            };
            self.line_number += 1;

            if line.trim().is_empty() {
                continue;
            }

            let event = serde_json::from_str::<PersistenceEvent>(&line).map_err(|e| {
                WalError::corruption_at_line(
                    self.line_number,
                    format!("Undecodable WAL event: {}", e),
                )
            })?;
            return Ok(Some(event));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wal::errors::WalErrorCode;
    use std::fs;
    use tempfile::TempDir;

    const INSERT_1: &str = r#"{"type":"INSERT","tableName":"t","values":{"id":1}}"#;
    const INSERT_2: &str = r#"{"type":"INSERT","tableName":"t","values":{"id":2}}"#;

    #[test]
    fn test_missing_file_is_empty_log() {
        let temp_dir = TempDir::new().unwrap();
        let events = WalReader::read_all(&temp_dir.path().join("absent.jsonl")).unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("wal.jsonl");
        fs::write(&path, format!("\n{}\n   \n{}\n\n", INSERT_1, INSERT_2)).unwrap();

        let mut reader = WalReader::open(&path).unwrap();
        assert!(reader.read_next().unwrap().is_some());
        assert!(reader.read_next().unwrap().is_some());
        assert!(reader.read_next().unwrap().is_none());
    }

    #[test]
    fn test_corrupt_line_halts_with_line_number() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("wal.jsonl");
        fs::write(&path, format!("{}\n{{\"type\":\"INSERT\"\n{}\n", INSERT_1, INSERT_2)).unwrap();

        let err = WalReader::read_all(&path).unwrap_err();
        assert_eq!(err.code(), WalErrorCode::LedgerWalCorruption);
        assert_eq!(err.details(), Some("line: 2"));
    }

    #[test]
    fn test_invalid_value_is_corruption() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("wal.jsonl");
        fs::write(&path, r#"{"type":"INSERT","tableName":"t","values":{"id":1.5}}"#).unwrap();

        let err = WalReader::read_all(&path).unwrap_err();
        assert_eq!(err.code(), WalErrorCode::LedgerWalCorruption);
    }

    #[test]
    fn test_final_line_without_newline() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("wal.jsonl");
        fs::write(&path, format!("{}\n{}", INSERT_1, INSERT_2)).unwrap();
        assert_eq!(WalReader::read_all(&path).unwrap().len(), 2);
    }
}
