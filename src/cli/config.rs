//! Configuration file
//!
//! ```json
//! {"data_dir": "data", "wal_file": "ledgerdb-wal.jsonl", "wal_sync_mode": "fsync",
//!  "log_level": "info", "seed_sample_data": false}
//! ```
//!
//! Only `data_dir` is required.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::observability::Severity;
use crate::wal::{WalSyncMode, DEFAULT_WAL_FILE};

use super::errors::{CliError, CliResult};

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the WAL (required)
    pub data_dir: String,

    /// WAL file name inside `data_dir`
    #[serde(default = "default_wal_file")]
    pub wal_file: String,

    /// `fsync` or `none`
    #[serde(default)]
    pub wal_sync_mode: WalSyncMode,

    /// Minimum log severity
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Seed sample tables when the WAL does not exist yet
    #[serde(default)]
    pub seed_sample_data: bool,
}

fn default_wal_file() -> String {
    DEFAULT_WAL_FILE.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Default configuration for `data_dir`
    pub fn new(data_dir: impl Into<String>) -> Self {
        Self {
            data_dir: data_dir.into(),
            wal_file: default_wal_file(),
            wal_sync_mode: WalSyncMode::default(),
            log_level: default_log_level(),
            seed_sample_data: false,
        }
    }

    /// Load and validate configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config(format!("failed to read {}: {}", path.display(), e)))?;
        Self::from_json(&content)
    }

    /// Parse and validate configuration JSON
    pub fn from_json(content: &str) -> CliResult<Self> {
        let config: Config = serde_json::from_str(content)
            .map_err(|e| CliError::config(format!("invalid config JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Writes the configuration as pretty JSON
    pub fn save(&self, path: &Path) -> CliResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn validate(&self) -> CliResult<()> {
        if self.data_dir.trim().is_empty() {
            return Err(CliError::config("data_dir must not be empty"));
        }

        let bare = Path::new(&self.wal_file)
            .file_name()
            .map(|name| name == self.wal_file.as_str())
            .unwrap_or(false);
        if !bare {
            return Err(CliError::config(format!(
                "wal_file must be a bare file name: '{}'",
                self.wal_file
            )));
        }

        self.severity()?;
        Ok(())
    }

    /// Parsed `log_level`
    pub fn severity(&self) -> CliResult<Severity> {
        self.log_level.parse().map_err(CliError::config)
    }

    pub fn data_path(&self) -> &Path {
        Path::new(&self.data_dir)
    }

    pub fn wal_path(&self) -> PathBuf {
        self.data_path().join(&self.wal_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::from_json(r#"{"data_dir": "data"}"#).unwrap();
        assert_eq!(config, Config::new("data"));
        assert_eq!(config.wal_sync_mode, WalSyncMode::Fsync);
        assert_eq!(config.severity().unwrap(), Severity::Info);
        assert_eq!(config.wal_path(), PathBuf::from("data").join(DEFAULT_WAL_FILE));
    }

    #[test]
    fn test_full_config() {
        let config = Config::from_json(
            r#"{"data_dir": "/var/lib/ledgerdb", "wal_file": "log.jsonl",
                "wal_sync_mode": "none", "log_level": "WARN", "seed_sample_data": true}"#,
        )
        .unwrap();
        assert_eq!(config.wal_sync_mode, WalSyncMode::None);
        assert_eq!(config.severity().unwrap(), Severity::Warn);
        assert!(config.seed_sample_data);
    }

    #[test]
    fn test_missing_data_dir_is_rejected() {
        let err = Config::from_json(r#"{"wal_file": "x.jsonl"}"#).unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(Config::from_json(r#"{"data_dir": ""}"#).is_err());
        assert!(Config::from_json(r#"{"data_dir": "d", "wal_file": "sub/wal.jsonl"}"#).is_err());
        assert!(Config::from_json(r#"{"data_dir": "d", "wal_file": ".."}"#).is_err());
        assert!(Config::from_json(r#"{"data_dir": "d", "wal_sync_mode": "sometimes"}"#).is_err());
        assert!(Config::from_json(r#"{"data_dir": "d", "log_level": "debug"}"#).is_err());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("conf").join("ledgerdb.json");
        let mut config = Config::new(dir.path().join("data").display().to_string());
        config.seed_sample_data = true;
        config.save(&path).unwrap();
        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(&dir.path().join("absent.json")).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }
}
