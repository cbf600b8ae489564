//! Session user record, persistent slot, and the combined session store.
//!
//! DESIGN
//! ======
//! The slot mirrors the browser-local key-value storage the web client used:
//! string keys, JSON string values, synchronous access. `SessionStore` pairs
//! the slot with an in-memory copy and is the only writer of either; it
//! writes the slot first so a failed persist never leaves the two copies out
//! of sync.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// Fixed slot key under which the session user is persisted.
pub const LOGIN_USER_KEY: &str = "loginUser";

/// The current authenticated user, adapted from a backend envelope payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: u64,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub admin: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
}

// =============================================================================
// SLOT
// =============================================================================

/// Errors reading or writing the persistent slot.
#[derive(Debug, thiserror::Error)]
pub enum SlotError {
    #[error("slot io failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("slot serialization failed: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Persistent key-value slot with localStorage-shaped semantics.
pub trait SessionSlot: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, SlotError>;
    fn set(&self, key: &str, value: &str) -> Result<(), SlotError>;
    fn clear(&self, key: &str) -> Result<(), SlotError>;
}

/// File-backed slot: one JSON document per key inside a state directory.
pub struct FileSlot {
    dir: PathBuf,
}

impl FileSlot {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl SessionSlot for FileSlot {
    fn get(&self, key: &str) -> Result<Option<String>, SlotError> {
        match std::fs::read_to_string(self.entry_path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SlotError> {
        std::fs::create_dir_all(&self.dir)?;
        // Write-then-rename so readers never observe a half-written record.
        let tmp = self.dir.join(format!("{key}.json.tmp"));
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, self.entry_path(key))?;
        Ok(())
    }

    fn clear(&self, key: &str) -> Result<(), SlotError> {
        match std::fs::remove_file(self.entry_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory slot for tests and embedders without a state directory.
#[derive(Default)]
pub struct MemorySlot {
    entries: Mutex<HashMap<String, String>>,
}

impl MemorySlot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionSlot for MemorySlot {
    fn get(&self, key: &str) -> Result<Option<String>, SlotError> {
        let entries = self.entries.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SlotError> {
        let mut entries = self.entries.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn clear(&self, key: &str) -> Result<(), SlotError> {
        let mut entries = self.entries.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

// =============================================================================
// STORE
// =============================================================================

/// In-memory session state plus its persistent slot, written together.
///
/// At most one session user is active at a time; every successful
/// login/activation/fetch/update replaces the record wholesale.
#[derive(Clone)]
pub struct SessionStore {
    current: Arc<RwLock<Option<SessionUser>>>,
    slot: Arc<dyn SessionSlot>,
}

impl SessionStore {
    #[must_use]
    pub fn new(slot: Arc<dyn SessionSlot>) -> Self {
        Self { current: Arc::new(RwLock::new(None)), slot }
    }

    /// The in-memory copy of the current session user.
    pub async fn current(&self) -> Option<SessionUser> {
        self.current.read().await.clone()
    }

    /// Overwrite the session user, slot first, then memory.
    pub async fn replace(&self, user: SessionUser) -> Result<(), SlotError> {
        let json = serde_json::to_string(&user)?;
        self.slot.set(LOGIN_USER_KEY, &json)?;
        *self.current.write().await = Some(user);
        Ok(())
    }

    /// Drop the session user from both copies. Invoked by external logout
    /// logic, never by this crate's handlers.
    pub async fn clear(&self) -> Result<(), SlotError> {
        self.slot.clear(LOGIN_USER_KEY)?;
        *self.current.write().await = None;
        Ok(())
    }

    /// Read the persisted copy back from the slot.
    pub fn load(&self) -> Result<Option<SessionUser>, SlotError> {
        match self.slot.get(LOGIN_USER_KEY)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
