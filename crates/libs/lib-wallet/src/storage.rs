//! # Persisted Selection
//!
//! A value holder that mirrors one named value to a durable string-keyed store and fans
//! every change out to subscribers.
//!
//! ## Stores
//!
//! - [`MemoryStore`]: process-local map, for tests and ephemeral sessions
//! - [`FileStore`]: a JSON object on disk, the native stand-in for browser local storage
//!
//! ## Semantics
//!
//! - Values are stored as JSON text, so the wallet name `Phantom` is persisted as
//!   `"Phantom"` (quotes included).
//! - A value that fails to deserialize is logged and treated as absent.
//! - Writing `None` removes the key instead of persisting a null.
//! - Store failures are logged and never reach the caller.
//! - Subscribers receive the latest value immediately, then every write in write order.

use futures::channel::mpsc;
use lib_core::StorageError;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Synchronous string key/value persistence.
pub trait KeyValueStore: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

/// In-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with one raw entry.
    pub fn with_item(key: &str, value: &str) -> Self {
        let store = Self::new();
        store.items.lock().insert(key.to_string(), value.to_string());
        store
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.lock().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.items.lock().remove(key);
        Ok(())
    }
}

/// Store backed by a JSON object file.
///
/// Every write rewrites the whole file through a temporary sibling and a rename, so a
/// crash mid-write leaves the previous contents intact.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, items: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(items)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock();
        Ok(self.load()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock();
        let mut items = self.load()?;
        items.insert(key.to_string(), value.to_string());
        self.save(&items)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock();
        let mut items = self.load()?;
        if items.remove(key).is_some() {
            self.save(&items)?;
        }
        Ok(())
    }
}

/// Handle returned by [`PersistedCell::subscribe`].
pub type SubscriptionId = u64;

type Callback<T> = Arc<dyn Fn(Option<&T>) + Send + Sync>;

enum Subscriber<T> {
    Callback(Callback<T>),
    Channel(mpsc::UnboundedSender<Option<T>>),
}

struct CellInner<T> {
    value: Option<T>,
    next_id: SubscriptionId,
    subscribers: Vec<(SubscriptionId, Subscriber<T>)>,
}

/// A single value mirrored to a [`KeyValueStore`] under a fixed key.
pub struct PersistedCell<T> {
    key: String,
    store: Arc<dyn KeyValueStore>,
    inner: Mutex<CellInner<T>>,
}

impl<T> PersistedCell<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + 'static,
{
    /// Open the cell, reading its initial value from `store`.
    pub fn new(key: impl Into<String>, store: Arc<dyn KeyValueStore>) -> Self {
        let key = key.into();
        let value = read_value(store.as_ref(), &key);
        Self {
            key,
            store,
            inner: Mutex::new(CellInner {
                value,
                next_id: 0,
                subscribers: Vec::new(),
            }),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Latest written (or initially read) value.
    pub fn get(&self) -> Option<T> {
        self.inner.lock().value.clone()
    }

    /// Persist `value` (or remove the key for `None`) and notify subscribers.
    ///
    /// The store write and the in-memory update happen under one lock, so concurrent writers
    /// leave the store and [`get`](Self::get) agreeing on the last value.
    pub fn set(&self, value: Option<T>) {
        let callbacks: Vec<Callback<T>> = {
            let mut inner = self.inner.lock();
            self.persist(value.as_ref());
            inner.value = value.clone();
            inner.subscribers.retain(|(_, subscriber)| match subscriber {
                Subscriber::Channel(tx) => tx.unbounded_send(value.clone()).is_ok(),
                Subscriber::Callback(_) => true,
            });
            inner
                .subscribers
                .iter()
                .filter_map(|(_, subscriber)| match subscriber {
                    Subscriber::Callback(cb) => Some(Arc::clone(cb)),
                    Subscriber::Channel(_) => None,
                })
                .collect()
        };

        // callbacks run unlocked so they may read or write the cell again
        for callback in callbacks {
            callback(value.as_ref());
        }
    }

    /// Register a callback. It is invoked with the current value before this returns.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(Option<&T>) + Send + Sync + 'static,
    {
        let callback: Callback<T> = Arc::new(callback);
        let (id, current) = {
            let mut inner = self.inner.lock();
            let id = inner.next_id;
            inner.next_id += 1;
            inner
                .subscribers
                .push((id, Subscriber::Callback(Arc::clone(&callback))));
            (id, inner.value.clone())
        };
        callback(current.as_ref());
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.inner.lock().subscribers.retain(|(sub, _)| *sub != id);
    }

    /// Stream of values: the current one first, then every write.
    pub fn watch(&self) -> mpsc::UnboundedReceiver<Option<T>> {
        let (tx, rx) = mpsc::unbounded();
        let mut inner = self.inner.lock();
        if tx.unbounded_send(inner.value.clone()).is_ok() {
            let id = inner.next_id;
            inner.next_id += 1;
            inner.subscribers.push((id, Subscriber::Channel(tx)));
        }
        rx
    }

    fn persist(&self, value: Option<&T>) {
        let result = match value {
            None => self.store.remove_item(&self.key),
            Some(value) => match serde_json::to_string(value) {
                Ok(raw) => self.store.set_item(&self.key, &raw),
                Err(e) => Err(StorageError::Json(e)),
            },
        };

        match result {
            Ok(()) => debug!(key = %self.key, present = value.is_some(), "Persisted selection"),
            Err(e) => warn!(key = %self.key, error = %e, "Failed to persist selection"),
        }
    }
}

fn read_value<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = match store.get_item(key) {
        Ok(raw) => raw?,
        Err(e) => {
            warn!(key, error = %e, "Failed to read persisted selection");
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key, error = %e, "Discarding unreadable persisted selection");
            None
        }
    }
}
