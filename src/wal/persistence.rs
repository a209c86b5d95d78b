//! Persistence backends
//!
//! `Persistence` is the seam between the engine and its durability log.
//! `FileWal` is the production backend; `MemoryWal` keeps events in a
//! shared vector so a test can "restart" an engine over the same log.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use super::errors::{WalError, WalResult};
use super::event::PersistenceEvent;
use super::reader::WalReader;
use super::writer::{WalSyncMode, WalWriter};

/// Default WAL file name inside the data directory
pub const DEFAULT_WAL_FILE: &str = "ledgerdb-wal.jsonl";

/// Append-only event log
pub trait Persistence: Send {
    /// Every persisted event in append order
    fn load_events(&mut self) -> WalResult<Vec<PersistenceEvent>>;

    /// Durably appends one event and returns its sequence number
    fn append_event(&mut self, event: &PersistenceEvent) -> WalResult<u64>;

    /// Human-readable location, for logs
    fn describe(&self) -> String;
}

/// JSON-lines log on disk
pub struct FileWal {
    wal_path: PathBuf,
    writer: WalWriter,
}

impl FileWal {
    /// Opens `<data_dir>/<file_name>`, creating `data_dir` if needed.
    pub fn open(data_dir: &Path, file_name: &str, sync_mode: WalSyncMode) -> WalResult<Self> {
        let wal_path = data_dir.join(file_name);
        let writer = WalWriter::open(&wal_path, sync_mode)?;
        Ok(Self { wal_path, writer })
    }

    /// Opens the default file name with fsync on every append
    pub fn open_default(data_dir: &Path) -> WalResult<Self> {
        Self::open(data_dir, DEFAULT_WAL_FILE, WalSyncMode::Fsync)
    }

    pub fn path(&self) -> &Path {
        &self.wal_path
    }
}

impl Persistence for FileWal {
    fn load_events(&mut self) -> WalResult<Vec<PersistenceEvent>> {
        WalReader::read_all(&self.wal_path)
    }

    fn append_event(&mut self, event: &PersistenceEvent) -> WalResult<u64> {
        self.writer.append(event)
    }

    fn describe(&self) -> String {
        self.wal_path.display().to_string()
    }
}

/// In-memory log. Clones share the same events.
#[derive(Debug, Clone, Default)]
pub struct MemoryWal {
    events: Arc<Mutex<Vec<PersistenceEvent>>>,
    fail_appends: Arc<AtomicBool>,
}

impl MemoryWal {
    pub fn new() -> Self {
        Self::default()
    }

    /// A log that already holds `events`
    pub fn from_events(events: Vec<PersistenceEvent>) -> Self {
        Self {
            events: Arc::new(Mutex::new(events)),
            fail_appends: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Copy of the logged events
    pub fn events(&self) -> WalResult<Vec<PersistenceEvent>> {
        self.events
            .lock()
            .map(|events| events.clone())
            .map_err(|_| WalError::unavailable("memory WAL lock poisoned"))
    }

    /// Number of logged events.
    ///
    /// Readable even after a panic poisoned the lock: a push either
    /// completed or never happened, so the count is exact.
    pub fn len(&self) -> usize {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Makes every following append fail, simulating a full disk
    pub fn set_fail_appends(&self, fail: bool) {
        self.fail_appends.store(fail, Ordering::SeqCst);
    }
}

impl Persistence for MemoryWal {
    fn load_events(&mut self) -> WalResult<Vec<PersistenceEvent>> {
        self.events()
    }

    fn append_event(&mut self, event: &PersistenceEvent) -> WalResult<u64> {
        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(WalError::append_failed(
                "memory WAL rejected append",
                std::io::Error::new(std::io::ErrorKind::Other, "appends disabled"),
            ));
        }
        let mut events = self
            .events
            .lock()
            .map_err(|_| WalError::unavailable("memory WAL lock poisoned"))?;
        events.push(event.clone());
        Ok(events.len() as u64)
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Values;
    use tempfile::TempDir;

    #[test]
    fn test_file_wal_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let data_dir = temp_dir.path().join("data");

        {
            let mut wal = FileWal::open_default(&data_dir).unwrap();
            assert!(wal.load_events().unwrap().is_empty());
            assert!(!wal.path().exists());
            wal.append_event(&PersistenceEvent::insert("t", Values::new())).unwrap();
            wal.append_event(&PersistenceEvent::delete("t", None)).unwrap();
        }

        let mut wal = FileWal::open_default(&data_dir).unwrap();
        let events = wal.load_events().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1], PersistenceEvent::delete("t", None));
        assert!(wal.describe().ends_with(DEFAULT_WAL_FILE));
    }

    #[test]
    fn test_memory_wal_clones_share_events() {
        let wal = MemoryWal::new();
        let mut handle = wal.clone();
        assert_eq!(handle.append_event(&PersistenceEvent::insert("t", Values::new())).unwrap(), 1);
        assert_eq!(wal.len(), 1);
    }

    #[test]
    fn test_memory_wal_len_survives_poisoned_lock() {
        let wal = MemoryWal::new();
        let mut handle = wal.clone();
        handle.append_event(&PersistenceEvent::insert("t", Values::new())).unwrap();

        let poisoner = wal.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.events.lock().unwrap();
            panic!("poison the log");
        })
        .join();

        assert_eq!(wal.len(), 1);
        assert!(wal.events().is_err());
    }

    #[test]
    fn test_memory_wal_failure_injection() {
        let mut wal = MemoryWal::new();
        wal.set_fail_appends(true);
        let err = wal
            .append_event(&PersistenceEvent::insert("t", Values::new()))
            .unwrap_err();
        assert!(!err.is_fatal());
        assert!(wal.is_empty());
    }
}
