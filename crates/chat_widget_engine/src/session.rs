//! Session identity: generation and the single persisted key.
use std::collections::HashMap;
use std::sync::Mutex;

use rand::Rng;
use thiserror::Error;
use widget_logging::widget_info;

use crate::PersistError;

/// Storage key holding the session identifier.
pub const SESSION_KEY: &str = "chatWidgetSessionId";

const SUFFIX_LEN: usize = 9;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unreadable: {0}")]
    Read(String),
    #[error("store corrupt: {0}")]
    Parse(String),
    #[error(transparent)]
    Persist(#[from] PersistError),
}

/// Client-local string storage, shaped like a browser's local storage.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// In-process store; its lifetime is the storage context.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self
            .entries
            .lock()
            .map_err(|err| StoreError::Read(err.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|err| StoreError::Read(err.to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// `session_<epoch-ms>_<9 base-36 chars>`.
pub fn generate_session_id(now_ms: u64) -> String {
    generate_session_id_with(now_ms, &mut rand::thread_rng())
}

pub fn generate_session_id_with<R: Rng + ?Sized>(now_ms: u64, rng: &mut R) -> String {
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("session_{now_ms}_{suffix}")
}

/// Returns the stored session id, generating and storing one when absent.
pub fn load_or_create_session(
    store: &dyn KeyValueStore,
    now_ms: u64,
) -> Result<String, StoreError> {
    if let Some(existing) = store.get(SESSION_KEY)?.filter(|id| !id.is_empty()) {
        return Ok(existing);
    }
    let id = generate_session_id(now_ms);
    store.set(SESSION_KEY, &id)?;
    widget_info!("created session {}", id);
    Ok(id)
}
