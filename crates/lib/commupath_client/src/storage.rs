//! Durable client storage and the bearer-token slot.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};

use tracing::warn;

/// Storage key holding the bearer token.
pub const TOKEN_KEY: &str = "commupath_token";

/// Key-value storage that survives restarts.
///
/// Mirrors the browser `localStorage` contract: reads return `None` on any
/// failure and writes report success as a `bool`.
pub trait CredentialStore: Send + Sync + fmt::Debug {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> bool;
    fn delete(&self, key: &str) -> bool;
}

/// In-memory storage, for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.items.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> bool {
        self.items
            .lock()
            .map(|mut items| items.insert(key.to_string(), value.to_string()))
            .is_ok()
    }

    fn delete(&self, key: &str) -> bool {
        self.items
            .lock()
            .map(|mut items| items.remove(key))
            .is_ok()
    }
}

/// JSON object on disk, one file per profile.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<data dir>/commupath/credentials.json`.
    pub fn default_location() -> Option<Self> {
        Some(Self::new(
            dirs::data_dir()?.join("commupath").join("credentials.json"),
        ))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> HashMap<String, String> {
        std::fs::read_to_string(&self.path)
            .ok()
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default()
    }

    fn write(&self, items: &HashMap<String, String>) -> bool {
        if let Some(parent) = self.path.parent()
            && std::fs::create_dir_all(parent).is_err()
        {
            return false;
        }
        let Ok(body) = serde_json::to_string_pretty(items) else {
            return false;
        };
        match std::fs::write(&self.path, body) {
            Ok(()) => true,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to write credentials");
                false
            }
        }
    }
}

impl CredentialStore for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.read().remove(key)
    }

    fn set(&self, key: &str, value: &str) -> bool {
        let mut items = self.read();
        items.insert(key.to_string(), value.to_string());
        self.write(&items)
    }

    fn delete(&self, key: &str) -> bool {
        let mut items = self.read();
        if items.remove(key).is_none() {
            return true;
        }
        self.write(&items)
    }
}

/// The single bearer-token slot: an in-memory copy backed by durable storage.
#[derive(Debug, Clone)]
pub struct TokenSlot {
    store: Arc<dyn CredentialStore>,
    cached: Arc<RwLock<Option<String>>>,
}

impl TokenSlot {
    /// Load whatever token the store already holds.
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        let cached = store.get(TOKEN_KEY).filter(|t| !t.is_empty());
        Self {
            store,
            cached: Arc::new(RwLock::new(cached)),
        }
    }

    pub fn get(&self) -> Option<String> {
        self.cached.read().ok()?.clone()
    }

    pub fn is_present(&self) -> bool {
        self.get().is_some()
    }

    pub fn set(&self, token: &str) {
        if let Ok(mut cached) = self.cached.write() {
            *cached = Some(token.to_string());
        }
        if !self.store.set(TOKEN_KEY, token) {
            warn!("bearer token could not be persisted");
        }
    }

    /// Forget the token in memory and in storage.
    ///
    /// Returns `false` when the stored copy could not be removed.
    pub fn clear(&self) -> bool {
        if let Ok(mut cached) = self.cached.write() {
            *cached = None;
        }
        let removed = self.store.delete(TOKEN_KEY);
        if !removed {
            warn!("bearer token could not be removed from storage");
        }
        removed
    }
}
