//! Change notification between contexts sharing one store.
//!
//! Every successful mutation publishes the complete new collection. Receivers
//! replace their own state with it wholesale; nothing is merged, so when two
//! contexts write concurrently the last writer wins.

use std::fmt;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::StorageError;
use crate::storage::{KeyValueStore, STORAGE_KEY};

/// Identifies one context (a "tab") working on the timesheets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextId(Uuid);

impl ContextId {
    pub fn new() -> ContextId {
        ContextId(Uuid::new_v4())
    }

    /// Origin used for changes noticed on disk rather than announced.
    pub const EXTERNAL: ContextId = ContextId(Uuid::nil());
}

impl Default for ContextId {
    fn default() -> Self {
        ContextId::new()
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// "The value under `key` changed; here it is."
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub key: String,
    pub origin: ContextId,
    pub new_value: String,
}

impl ChangeEvent {
    pub fn timesheets(origin: ContextId, new_value: String) -> ChangeEvent {
        ChangeEvent {
            key: STORAGE_KEY.to_string(),
            origin,
            new_value,
        }
    }
}

/// Publish/subscribe seam for change events.
pub trait ChangeNotifier: Send + Sync {
    /// Delivers `event` to every current subscriber.
    fn publish(&self, event: &ChangeEvent);

    /// Registers a new subscriber that receives every event published from now on.
    fn subscribe(&self) -> Receiver<ChangeEvent>;
}

/// In-process fan-out over channels. Cloning shares the subscriber list.
#[derive(Debug, Clone, Default)]
pub struct ChangeBus {
    subscribers: Arc<Mutex<Vec<Sender<ChangeEvent>>>>,
}

impl ChangeBus {
    pub fn new() -> ChangeBus {
        ChangeBus::default()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl ChangeNotifier for ChangeBus {
    fn publish(&self, event: &ChangeEvent) {
        let mut subscribers = self.subscribers.lock().unwrap_or_else(PoisonError::into_inner);
        let before = subscribers.len();
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
        if subscribers.len() < before {
            warn!(dropped = before - subscribers.len(), "dropped closed change subscribers");
        }
        debug!(key = %event.key, origin = %event.origin, delivered = subscribers.len(), "published change");
    }

    fn subscribe(&self) -> Receiver<ChangeEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.lock().unwrap_or_else(PoisonError::into_inner).push(tx);
        rx
    }
}

/// Notices changes made to a store by other processes by polling it.
pub struct StoreWatcher {
    store: Arc<dyn KeyValueStore>,
    key: String,
    last_seen: Option<String>,
}

impl StoreWatcher {
    /// Starts watching [`STORAGE_KEY`], treating the current value as already seen.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Result<StoreWatcher, StorageError> {
        let last_seen = store.get(STORAGE_KEY)?;
        Ok(StoreWatcher {
            store,
            key: STORAGE_KEY.to_string(),
            last_seen,
        })
    }

    /// Checks the store once. Returns an event if the value differs from the
    /// last one seen. A removed key is remembered but not reported.
    pub fn poll(&mut self) -> Result<Option<ChangeEvent>, StorageError> {
        let current = self.store.get(&self.key)?;
        if current == self.last_seen {
            return Ok(None);
        }
        self.last_seen = current.clone();
        Ok(current.map(|new_value| ChangeEvent {
            key: self.key.clone(),
            origin: ContextId::EXTERNAL,
            new_value,
        }))
    }
}
