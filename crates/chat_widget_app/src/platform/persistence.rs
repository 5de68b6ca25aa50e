use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Mutex;

use chat_widget_engine::{KeyValueStore, StateFile, StoreError};
use serde::{Deserialize, Serialize};
use widget_logging::{widget_debug, widget_warn};

const STATE_FILENAME: &str = ".chat_widget_state.ron";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PersistedState {
    entries: BTreeMap<String, String>,
}

/// Key-value store backed by one RON file in the state directory.
pub(crate) struct RonFileStore {
    file: StateFile,
    // Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl RonFileStore {
    pub(crate) fn new(dir: PathBuf) -> Self {
        Self {
            file: StateFile::new(dir, STATE_FILENAME),
            lock: Mutex::new(()),
        }
    }

    fn read_state(&self) -> Result<PersistedState, StoreError> {
        let Some(content) = self.file.read()? else {
            return Ok(PersistedState::default());
        };
        match ron::from_str(&content) {
            Ok(state) => Ok(state),
            Err(err) => {
                // A corrupt file behaves like empty storage; the next write replaces it.
                widget_warn!(
                    "Failed to parse persisted state from {:?}: {}",
                    self.file.path(),
                    err
                );
                Ok(PersistedState::default())
            }
        }
    }

    fn write_state(&self, state: &PersistedState) -> Result<(), StoreError> {
        let content = ron::ser::to_string_pretty(state, ron::ser::PrettyConfig::new())
            .map_err(|err| StoreError::Parse(err.to_string()))?;
        self.file.replace(&content)?;
        widget_debug!(
            "Persisted {} key(s) to {:?}",
            state.entries.len(),
            self.file.path()
        );
        Ok(())
    }
}

impl KeyValueStore for RonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let _guard = self
            .lock
            .lock()
            .map_err(|err| StoreError::Read(err.to_string()))?;
        Ok(self.read_state()?.entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let _guard = self
            .lock
            .lock()
            .map_err(|err| StoreError::Read(err.to_string()))?;
        let mut state = self.read_state()?;
        state.entries.insert(key.to_string(), value.to_string());
        self.write_state(&state)
    }
}
