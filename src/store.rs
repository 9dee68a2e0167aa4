//! Key-value persistence for the three records.
//!
//! Each record is stored as one JSON blob under its own key, so a crash can
//! lose at most the latest write but never leaves a half-written record.

use log::{debug, warn};
use serde::{de::DeserializeOwned, Serialize};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use crate::error::{CounterError, Result};

/// String key-value backend (browser `localStorage` or an in-memory map).
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> Result<()>;
    fn remove_item(&self, key: &str) -> Result<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for std::rc::Rc<S> {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        (**self).remove_item(key)
    }
}

/// Read and decode a record. Absent, unreadable or corrupt data yields `None`.
pub fn load_record<T: DeserializeOwned>(store: &impl KeyValueStore, key: &str) -> Option<T> {
    let raw = match store.get_item(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!("No stored value for '{}'", key);
            return None;
        }
        Err(e) => {
            warn!("Failed to read '{}': {}", key, e);
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Discarding corrupt record '{}': {}", key, e);
            None
        }
    }
}

pub fn encode_record<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

/// Encode a record and write it in one `set_item` call.
pub fn save_record<T: Serialize + ?Sized>(
    store: &impl KeyValueStore,
    key: &str,
    value: &T,
) -> Result<()> {
    store.set_item(key, &encode_record(value)?)
}

/// Write several encoded records as one unit. When a write fails, the keys
/// already written get their previous blobs back (or are removed if they had
/// none) and the original error is returned.
pub fn save_all(store: &impl KeyValueStore, records: &[(&str, String)]) -> Result<()> {
    let previous = records
        .iter()
        .map(|(key, _)| store.get_item(key))
        .collect::<Result<Vec<_>>>()?;

    let mut written: Vec<(&str, Option<String>)> = Vec::with_capacity(records.len());
    for ((key, raw), previous) in records.iter().zip(previous) {
        if let Err(e) = store.set_item(key, raw) {
            roll_back(store, written);
            return Err(e);
        }
        written.push((*key, previous));
    }
    Ok(())
}

fn roll_back(store: &impl KeyValueStore, written: Vec<(&str, Option<String>)>) {
    for (key, previous) in written.into_iter().rev() {
        let restored = match previous {
            Some(raw) => store.set_item(key, &raw),
            None => store.remove_item(key),
        };
        match restored {
            Ok(()) => debug!("Rolled back '{}'", key),
            Err(e) => warn!("Failed to roll back '{}': {}", key, e),
        }
    }
}

/// `window.localStorage`.
pub struct BrowserStorage {
    storage: web_sys::Storage,
}

impl BrowserStorage {
    /// `None` when storage is disabled (private mode, sandboxed iframe, ...).
    pub fn open() -> Option<Self> {
        let window = web_sys::window()?;
        match window.local_storage() {
            Ok(Some(storage)) => Some(Self { storage }),
            Ok(None) => None,
            Err(e) => {
                warn!("localStorage unavailable: {:?}", e);
                None
            }
        }
    }
}

impl KeyValueStore for BrowserStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        self.storage
            .get_item(key)
            .map_err(|e| CounterError::Storage(format!("{:?}", e)))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.storage
            .set_item(key, value)
            .map_err(|e| CounterError::Storage(format!("{:?}", e)))
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.storage
            .remove_item(key)
            .map_err(|e| CounterError::Storage(format!("{:?}", e)))
    }
}

/// In-memory store. Counts writes so callers can verify persistence behavior.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RefCell<HashMap<String, String>>,
    writes: Cell<usize>,
    read_only: Cell<bool>,
    failing_key: RefCell<Option<String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items<'a>(items: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let store = Self::new();
        store.items.borrow_mut().extend(
            items
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string())),
        );
        store
    }

    /// Total successful `set_item` calls so far.
    pub fn writes(&self) -> usize {
        self.writes.get()
    }

    /// Make every subsequent write fail, as a full quota would.
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.set(read_only);
    }

    /// Make writes to `key` alone fail, leaving other keys writable.
    pub fn fail_writes_to(&self, key: Option<&str>) {
        *self.failing_key.borrow_mut() = key.map(str::to_string);
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }
}

impl KeyValueStore for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let blocked = self.failing_key.borrow().as_deref() == Some(key);
        if self.read_only.get() || blocked {
            return Err(CounterError::Storage("quota exceeded".to_string()));
        }
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.items.borrow_mut().remove(key);
        Ok(())
    }
}

/// Either backend, picked once at startup.
pub enum AppStorage {
    Browser(BrowserStorage),
    Memory(MemoryStorage),
}

impl AppStorage {
    /// `localStorage` when available, otherwise a non-persistent map.
    pub fn detect() -> Self {
        match BrowserStorage::open() {
            Some(storage) => AppStorage::Browser(storage),
            None => {
                warn!("Falling back to in-memory storage; data will not survive a reload");
                AppStorage::Memory(MemoryStorage::new())
            }
        }
    }
}

impl KeyValueStore for AppStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        match self {
            AppStorage::Browser(s) => s.get_item(key),
            AppStorage::Memory(s) => s.get_item(key),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        match self {
            AppStorage::Browser(s) => s.set_item(key, value),
            AppStorage::Memory(s) => s.set_item(key, value),
        }
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        match self {
            AppStorage::Browser(s) => s.remove_item(key),
            AppStorage::Memory(s) => s.remove_item(key),
        }
    }
}
