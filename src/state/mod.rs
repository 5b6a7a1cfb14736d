//! Durable per-ticker alert state
//!
//! The corridor state machine reads and writes through the [`StateStore`]
//! trait, keeping the storage medium swappable. The JSON implementation
//! persists atomically so a crash mid-write never corrupts the previous
//! state.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::error::WatchError;
use crate::models::AlertState;

pub type StateMap = HashMap<String, AlertState>;

pub trait StateStore: Send + Sync {
    /// Load the full state map. A missing file is an empty map, not an error.
    fn load(&self) -> Result<StateMap, WatchError>;

    /// Persist the full state map durably.
    fn persist(&self, state: &StateMap) -> Result<(), WatchError>;
}

/// Stores the state map as a single JSON file, swapped in atomically via a
/// temp file in the same directory.
pub struct JsonStateStore {
    path: PathBuf,
}

impl JsonStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "state".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl StateStore for JsonStateStore {
    fn load(&self) -> Result<StateMap, WatchError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(StateMap::new()),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "cannot read state file, starting fresh");
                return Ok(StateMap::new());
            }
        };
        match serde_json::from_str::<StateMap>(&raw) {
            Ok(state) => {
                debug!(path = %self.path.display(), entries = state.len(), "state loaded");
                Ok(state)
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "state file corrupt, starting fresh");
                Ok(StateMap::new())
            }
        }
    }

    fn persist(&self, state: &StateMap) -> Result<(), WatchError> {
        let json = serde_json::to_string_pretty(state)
            .map_err(|e| WatchError::persistence(format!("cannot serialize state: {}", e)))?;
        let tmp = self.temp_path();
        fs::write(&tmp, json)
            .map_err(|e| WatchError::persistence(format!("cannot write {}: {}", tmp.display(), e)))?;
        // Rename within the same directory keeps the swap atomic.
        fs::rename(&tmp, &self.path).map_err(|e| {
            WatchError::persistence(format!("cannot replace {}: {}", self.path.display(), e))
        })?;
        debug!(path = %self.path.display(), entries = state.len(), "state persisted");
        Ok(())
    }
}
