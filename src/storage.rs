use crate::error::PersistenceError;
use crate::watchlist::WatchlistState;
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

const WATCHLIST_FILE: &str = "watchlist.json";

/// Where the watchlist blob lives. Synchronous on purpose: the store writes
/// between event-loop turns and owns the blob exclusively.
pub trait WatchlistStorage: Send + Sync {
    fn load(&self) -> Result<Option<WatchlistState>, PersistenceError>;
    fn save(&self, state: &WatchlistState) -> Result<(), PersistenceError>;
}

/// One JSON file under the platform data directory. Every save rewrites the
/// whole file; the newest write wins.
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn in_data_dir() -> Result<Self, PersistenceError> {
        let dirs =
            ProjectDirs::from("", "", "cinefeed").ok_or(PersistenceError::DataDirUnavailable)?;
        Ok(Self {
            path: dirs.data_dir().join(WATCHLIST_FILE),
        })
    }

    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl WatchlistStorage for JsonFileStorage {
    fn load(&self) -> Result<Option<WatchlistState>, PersistenceError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path).map_err(|e| PersistenceError::ReadFailed {
            path: self.path.clone(),
            source: e,
        })?;
        let state =
            serde_json::from_str(&content).map_err(|e| PersistenceError::MalformedFile {
                path: self.path.clone(),
                source: e,
            })?;
        Ok(Some(state))
    }

    fn save(&self, state: &WatchlistState) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| PersistenceError::DirectoryCreationFailed {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        let content = serde_json::to_string_pretty(state)?;
        fs::write(&self.path, content).map_err(|e| PersistenceError::WriteFailed {
            path: self.path.clone(),
            source: e,
        })?;
        Ok(())
    }
}
