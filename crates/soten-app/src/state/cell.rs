//! Observable state cells
//!
//! A `StateCell` holds one value and notifies subscribers on every change.
//! A `PersistedCell` additionally writes each change through to the
//! key-value store.

use log::error;
use serde::de::DeserializeOwned;
use serde::Serialize;
use soten_config::{load_record, save_record, KeyValueStore};
use std::sync::Arc;
use tokio::sync::watch;

/// Independently subscribable value
#[derive(Debug)]
pub struct StateCell<T> {
    tx: watch::Sender<T>,
}

impl<T: Clone> StateCell<T> {
    pub fn new(value: T) -> Self {
        let (tx, _rx) = watch::channel(value);
        Self { tx }
    }

    /// Current value
    pub fn get(&self) -> T {
        self.tx.borrow().clone()
    }

    /// Inspect the current value without cloning it
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.tx.borrow())
    }

    /// Receiver notified on every change
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.tx.subscribe()
    }

    pub(crate) fn set(&self, value: T) {
        self.tx.send_replace(value);
    }
}

impl<T: Clone + Default> Default for StateCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// Optional value mirrored to the key-value store under a fixed key
pub struct PersistedCell<T> {
    cell: StateCell<Option<T>>,
    key: &'static str,
    kv: Arc<dyn KeyValueStore>,
}

impl<T> PersistedCell<T>
where
    T: Clone + Serialize + DeserializeOwned,
{
    /// Cell starting out empty, whatever the store holds
    pub fn empty(kv: Arc<dyn KeyValueStore>, key: &'static str) -> Self {
        Self {
            cell: StateCell::new(None),
            key,
            kv,
        }
    }

    /// Cell starting out with the value the store holds
    pub fn restore(kv: Arc<dyn KeyValueStore>, key: &'static str) -> Self {
        let cell = Self::empty(kv, key);
        cell.cell.set(cell.load());
        cell
    }

    /// Value currently held by the store
    pub fn load(&self) -> Option<T> {
        load_record(self.kv.as_ref(), self.key)
    }

    pub fn get(&self) -> Option<T> {
        self.cell.get()
    }

    pub fn with<R>(&self, f: impl FnOnce(&Option<T>) -> R) -> R {
        self.cell.with(f)
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<T>> {
        self.cell.subscribe()
    }

    pub(crate) fn set(&self, value: Option<T>) {
        if let Err(e) = save_record(self.kv.as_ref(), self.key, value.as_ref()) {
            error!("Failed to persist '{}': {}", self.key, e);
        }
        self.cell.set(value);
    }
}
