//! Durable key/value backends for the session.
//!
//! SYSTEM CONTEXT
//! ==============
//! The session keeps two string entries (`user`, `authToken`). Where they
//! live depends on the host: a JSON file for the CLI, `localStorage` in the
//! browser (`hydrate` feature), or plain memory for tests.
//!
//! TRADE-OFFS
//! ==========
//! Writes are fire-and-forget. A failed write is logged and the in-memory
//! session stays authoritative until the process exits.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

// =============================================================================
// MEMORY
// =============================================================================

#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_owned(), value.to_owned());
    }

    fn remove(&self, key: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }
}

// =============================================================================
// FILE
// =============================================================================

/// All entries in one JSON object on disk. A missing or unreadable file
/// reads as empty.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), write_lock: Mutex::new(()) }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> BTreeMap<String, String> {
        let Ok(raw) = std::fs::read_to_string(&self.path) else {
            return BTreeMap::new();
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!(path = %self.path.display(), error = %e, "ignoring unreadable session file");
            BTreeMap::new()
        })
    }

    fn save(&self, entries: &BTreeMap<String, String>) {
        let result = serde_json::to_string_pretty(entries)
            .map_err(std::io::Error::other)
            .and_then(|raw| {
                if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
                    std::fs::create_dir_all(dir)?;
                }
                std::fs::write(&self.path, raw)
            });
        if let Err(e) = result {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to write session file");
        }
    }

    fn update(&self, apply: impl FnOnce(&mut BTreeMap<String, String>)) {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.load();
        apply(&mut entries);
        self.save(&entries);
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.load().remove(key)
    }

    fn set(&self, key: &str, value: &str) {
        self.update(|entries| {
            entries.insert(key.to_owned(), value.to_owned());
        });
    }

    fn remove(&self, key: &str) {
        self.update(|entries| {
            entries.remove(key);
        });
    }
}

// =============================================================================
// BROWSER
// =============================================================================

/// `window.localStorage`. Every call looks the handle up again, so the type
/// holds no JS values and stays `Send + Sync`.
#[cfg(feature = "hydrate")]
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStorage;

#[cfg(feature = "hydrate")]
impl LocalStorage {
    fn handle() -> Option<web_sys::Storage> {
        web_sys::window().and_then(|w| w.local_storage().ok().flatten())
    }
}

#[cfg(feature = "hydrate")]
impl Storage for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        Self::handle()?.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) {
        let Some(storage) = Self::handle() else {
            return;
        };
        if storage.set_item(key, value).is_err() {
            tracing::warn!(key, "localStorage write failed");
        }
    }

    fn remove(&self, key: &str) {
        if let Some(storage) = Self::handle() {
            let _ = storage.remove_item(key);
        }
    }
}

#[cfg(test)]
#[path = "storage_test.rs"]
mod tests;
