//! Storage layer for the gott time tracker.
//!
//! The whole [`Store`] lives in a single JSON file. Each command loads it,
//! mutates it in memory and saves it back in full; there is no incremental
//! writing and no locking between concurrent invocations.
//!
//! # File format
//!
//! ```json
//! {
//!   "current": "5f0c...",
//!   "intervals": [
//!     { "id": "5f0c...", "begin": "2026-01-05T09:00:00Z", "duration": 0,
//!       "tags": ["urgent"], "annotation": "fix bug", "raw": "fix bug +urgent",
//!       "status": "started" }
//!   ]
//! }
//! ```
//!
//! Timestamps are RFC 3339 in UTC. `duration` is in seconds: an integer
//! when whole, otherwise a fraction with millisecond precision.

use std::io;
use std::path::{Path, PathBuf};

use gott_core::Store;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Reading or writing the file failed.
    #[error("failed to access {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The file exists but does not hold a valid store.
    #[error("invalid database file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// The store could not be serialized.
    #[error("failed to serialize database")]
    Serialize(#[source] serde_json::Error),
}

/// A store persisted as one JSON document.
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the saved store.
    ///
    /// Returns `None` if the file does not exist yet.
    pub fn load(&self) -> Result<Option<Store>, DbError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no database file yet");
                return Ok(None);
            }
            Err(source) => {
                return Err(DbError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        // An empty file is what a fresh `touch` leaves behind.
        if content.trim().is_empty() {
            return Ok(Some(Store::default()));
        }

        let store: Store = serde_json::from_str(&content).map_err(|source| DbError::Parse {
            path: self.path.clone(),
            source,
        })?;
        tracing::debug!(path = %self.path.display(), intervals = store.len(), "loaded database");
        Ok(Some(store))
    }

    /// Loads the saved store, or an empty one if there is none.
    pub fn load_or_default(&self) -> Result<Store, DbError> {
        Ok(self.load()?.unwrap_or_default())
    }

    /// Writes the whole store, creating the parent directory if needed.
    pub fn save(&self, store: &Store) -> Result<(), DbError> {
        let io_err = |source| DbError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(store).map_err(DbError::Serialize)?;
        std::fs::write(&self.path, json).map_err(io_err)?;
        tracing::debug!(path = %self.path.display(), intervals = store.len(), "saved database");
        Ok(())
    }
}
