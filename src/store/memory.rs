use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use serde_json::Value;

use crate::store::keys::StoreKey;
use crate::store::reactive::{shallow_merge, KeyValueStore, SubscriberFn, SubscriptionId};

struct Subscriber {
    id: u64,
    key: StoreKey,
    callback: SubscriberFn,
}

/// An in-memory reactive key-value store.
///
/// Writers snapshot the new value under the data lock, then notify matching
/// subscribers in registration order under a dedicated notification lock.
#[derive(Default)]
pub struct MemoryStore {
    data: RwLock<HashMap<StoreKey, Value>>,
    subscribers: Mutex<Vec<Arc<Subscriber>>>,
    next_id: AtomicU64,
    notify_lock: Mutex<()>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn write(&self, key: StoreKey, value: Option<Value>) {
        {
            let mut data = self.data.write().unwrap();
            match value.clone() {
                Some(value) => {
                    data.insert(key, value);
                }
                None => {
                    data.remove(&key);
                }
            }
        }
        self.notify(&[(key, value)]);
    }

    fn notify(&self, changes: &[(StoreKey, Option<Value>)]) {
        let _serialized = self.notify_lock.lock().unwrap();
        for (key, value) in changes {
            let matching: Vec<Arc<Subscriber>> = self
                .subscribers
                .lock()
                .unwrap()
                .iter()
                .filter(|subscriber| subscriber.key == *key)
                .cloned()
                .collect();
            for subscriber in matching {
                (subscriber.callback)(value.as_ref());
            }
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: StoreKey) -> Option<Value> {
        self.data.read().unwrap().get(&key).cloned()
    }

    fn set(&self, key: StoreKey, value: Value) {
        let value = if value.is_null() { None } else { Some(value) };
        self.write(key, value);
    }

    fn merge(&self, key: StoreKey, partial: Value) {
        let merged = {
            let data = self.data.read().unwrap();
            shallow_merge(data.get(&key).cloned(), partial)
        };
        self.write(key, merged);
    }

    fn multi_set(&self, entries: Vec<(StoreKey, Value)>) {
        let mut changes = Vec::with_capacity(entries.len());
        {
            let mut data = self.data.write().unwrap();
            for (key, value) in entries {
                let value = if value.is_null() { None } else { Some(value) };
                match value.clone() {
                    Some(value) => {
                        data.insert(key, value);
                    }
                    None => {
                        data.remove(&key);
                    }
                }
                changes.push((key, value));
            }
        }
        self.notify(&changes);
    }

    fn connect(&self, key: StoreKey, callback: SubscriberFn) -> SubscriptionId {
        let current = self.get(key);
        callback(current.as_ref());

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.subscribers.lock().unwrap().push(Arc::new(Subscriber {
            id,
            key,
            callback,
        }));
        SubscriptionId(id)
    }

    fn disconnect(&self, id: SubscriptionId) {
        self.subscribers
            .lock()
            .unwrap()
            .retain(|subscriber| subscriber.id != id.0);
    }
}
