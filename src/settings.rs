//! Ingestion settings.
//!
//! Stored as JSON in the platform config directory. Missing fields fall back
//! to their defaults, so older settings files keep loading.

use crate::constants::{DEFAULT_DELIMITER, DEFAULT_WORKER_THREADS, MAX_FILE_SIZE_MB};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Background worker threads used for file loading
    pub worker_threads: usize,
    /// Files above this size are refused
    pub max_file_size_mb: usize,
    /// Delimiter for `.txt` imports
    pub default_delimiter: char,
    /// Whether `.csv`/`.tsv`/`.txt` imports start with a header record
    pub default_has_header: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            worker_threads: DEFAULT_WORKER_THREADS,
            max_file_size_mb: MAX_FILE_SIZE_MB,
            default_delimiter: DEFAULT_DELIMITER,
            default_has_header: true,
        }
    }
}

/// `<config dir>/tabledit/settings.json`
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("tabledit").join("settings.json"))
}

impl Settings {
    /// Load from the default location, falling back to defaults.
    pub fn load() -> Self {
        let Some(path) = default_settings_path() else {
            return Self::default();
        };
        if !path.exists() {
            debug!("No settings file at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Failed to load settings: {:#}", e);
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let settings: Settings = serde_json::from_str(&content)
            .with_context(|| format!("Invalid settings in {}", path.display()))?;
        Ok(settings.normalized())
    }

    /// Write as pretty JSON through a temp file in the same directory.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;

        let mut file = tempfile::NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut file, self)?;
        file.flush()?;
        file.persist(path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    /// Clamp values that would make the pipeline unusable.
    fn normalized(mut self) -> Self {
        if self.worker_threads == 0 {
            warn!("worker_threads must be at least 1");
            self.worker_threads = 1;
        }
        self
    }
}
