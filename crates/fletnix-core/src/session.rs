//! Session context
//!
//! The signed-in user lives in a single string slot of a key-value store.
//! [`Session`] wraps that slot and is handed to every controller at
//! construction; controllers only ever see read-only [`User`] snapshots.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::warn;

use crate::error::{FletnixError, Result};
use crate::types::User;

/// Storage for the serialized session record
pub trait SessionStore: Send + Sync {
    /// Current record, `None` when nothing is stored
    fn load(&self) -> Result<Option<String>>;

    /// Replace the record
    fn save(&self, record: &str) -> Result<()>;

    /// Remove the record
    fn clear(&self) -> Result<()>;
}

/// Store kept in process memory
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    slot: Mutex<Option<String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-filled with `record`
    pub fn with_record(record: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(record.into())),
        }
    }

    fn slot(&self) -> Result<std::sync::MutexGuard<'_, Option<String>>> {
        self.slot
            .lock()
            .map_err(|_| FletnixError::Session("session slot poisoned".to_string()))
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.slot()?.clone())
    }

    fn save(&self, record: &str) -> Result<()> {
        *self.slot()? = Some(record.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.slot()? = None;
        Ok(())
    }
}

/// Store backed by a single JSON file
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(record) => Ok(Some(record)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(FletnixError::Session(format!("{}: {}", self.path.display(), e))),
        }
    }

    fn save(&self, record: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| FletnixError::Session(format!("{}: {}", parent.display(), e)))?;
        }
        fs::write(&self.path, record)
            .map_err(|e| FletnixError::Session(format!("{}: {}", self.path.display(), e)))
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(FletnixError::Session(format!("{}: {}", self.path.display(), e))),
        }
    }
}

/// Shared handle on the session record
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn SessionStore>,
}

impl Session {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Session over a fresh in-memory store
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemorySessionStore::new()))
    }

    /// Whether any record is stored, readable or not
    ///
    /// This is what the route guard checks.
    pub fn is_present(&self) -> bool {
        match self.store.load() {
            Ok(record) => record.is_some_and(|r| !r.trim().is_empty()),
            Err(e) => {
                warn!(error = %e, "failed to read session store");
                false
            }
        }
    }

    /// Snapshot of the stored user
    ///
    /// Missing, unreadable and malformed records all yield `None`; the
    /// failure is logged.
    pub fn user(&self) -> Option<User> {
        let record = match self.store.load() {
            Ok(Some(record)) => record,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "failed to read session store");
                return None;
            }
        };

        match serde_json::from_str::<User>(&record) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(error = %e, "error parsing user data");
                None
            }
        }
    }

    /// Replace the record with the login payload, verbatim
    pub fn store_payload(&self, payload: &serde_json::Value) -> Result<()> {
        let record = serde_json::to_string(payload)
            .map_err(|e| FletnixError::Session(e.to_string()))?;
        self.store.save(&record)
    }

    /// Drop the record
    pub fn clear(&self) -> Result<()> {
        self.store.clear()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("present", &self.is_present())
            .finish()
    }
}
