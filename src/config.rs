//! Picker configuration
//!
//! Settings are read from an optional JSON file; every field has a default
//! so a partial file is fine. `RANDPICKER_DATA_DIR` overrides `data_dir`.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PickerError, PickerResult};
use crate::transfer::ExportFormat;
use crate::utils::TEMP_SUFFIX;

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "RANDPICKER_DATA_DIR";

/// Retention cap for the pick history
pub const DEFAULT_HISTORY_CAPACITY: usize = 1000;

/// Export preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExportSettings {
    pub export_dir: PathBuf,
    pub format: ExportFormat,
    pub include_header: bool,
    pub include_timestamp: bool,
    pub file_name_prefix: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            export_dir: PathBuf::from("exports"),
            format: ExportFormat::Excel,
            include_header: true,
            include_timestamp: true,
            file_name_prefix: "picks".to_string(),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PickerConfig {
    /// Directory holding the roster and history documents
    pub data_dir: PathBuf,
    /// Roster document file name
    pub roster_file: String,
    /// History document file name
    pub history_file: String,
    /// Whether picks are appended to the history log
    pub record_history: bool,
    /// Maximum number of retained history items
    pub history_capacity: usize,
    /// Default to weighted individual picks
    pub use_weight: bool,
    /// How many items `recent` views show by default
    pub recent_history_count: usize,
    /// Default tracing filter (trace, debug, info, warn, error)
    pub log_level: String,
    pub export: ExportSettings,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            roster_file: "students.json".to_string(),
            history_file: "history.json".to_string(),
            record_history: true,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            use_weight: false,
            recent_history_count: 20,
            log_level: "info".to_string(),
            export: ExportSettings::default(),
        }
    }
}

impl PickerConfig {
    /// Create config with a custom data directory
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            ..Default::default()
        }
    }

    /// Load from `path` if given and present, then apply env overrides and validate
    pub fn load(path: Option<&Path>) -> PickerResult<Self> {
        let mut config = match path {
            Some(path) if path.exists() => {
                let content = fs::read_to_string(path)?;
                serde_json::from_str::<PickerConfig>(&content)?
            }
            _ => PickerConfig::default(),
        };

        if let Ok(dir) = env::var(DATA_DIR_ENV) {
            config.data_dir = PathBuf::from(dir);
        }

        if config.data_dir.is_relative() {
            let current_dir = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            config.data_dir = current_dir.join(&config.data_dir);
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject values the store cannot work with
    pub fn validate(&self) -> PickerResult<()> {
        if self.roster_file.trim().is_empty() {
            return Err(PickerError::Config("rosterFile must not be empty".into()));
        }
        if self.history_file.trim().is_empty() {
            return Err(PickerError::Config("historyFile must not be empty".into()));
        }
        for name in [&self.roster_file, &self.history_file] {
            if name.ends_with(TEMP_SUFFIX) || name.ends_with(".corrupt") {
                return Err(PickerError::Config(format!(
                    "'{}' uses a suffix reserved for temp and backup files",
                    name
                )));
            }
        }
        if self.roster_file == self.history_file {
            return Err(PickerError::Config(
                "rosterFile and historyFile must differ".into(),
            ));
        }
        if self.history_capacity == 0 {
            return Err(PickerError::Config("historyCapacity must be at least 1".into()));
        }
        if self.recent_history_count == 0 {
            return Err(PickerError::Config(
                "recentHistoryCount must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Get path to the roster document
    pub fn roster_path(&self) -> PathBuf {
        self.data_dir.join(&self.roster_file)
    }

    /// Get path to the history document
    pub fn history_path(&self) -> PathBuf {
        self.data_dir.join(&self.history_file)
    }
}
