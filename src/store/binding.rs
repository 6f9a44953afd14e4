use super::kv::KvStore;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::{Arc, RwLock};
use tracing::{debug, warn};

/// A live value bound to one store key
///
/// On construction the value is initialized from the store; a missing key or
/// unparsable stored content falls back to the default without surfacing an
/// error. Every change through `set` or `update` replaces the in-memory value
/// and writes it back to the same key. A failed write-back is logged and the
/// in-memory value stays correct for the rest of the session.
pub struct Persisted<T> {
    store: Arc<dyn KvStore>,
    key: String,
    value: RwLock<T>,
}

impl<T> Persisted<T>
where
    T: Serialize + DeserializeOwned + Clone,
{
    /// Bind `key` in `store` to a value, initializing from the stored content
    /// or `default`
    pub fn bind(store: Arc<dyn KvStore>, key: &str, default: T) -> Self {
        let value = match store.get(key) {
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(parsed) => parsed,
                Err(e) => {
                    debug!("Discarding corrupted value for key {:?}: {}", key, e);
                    default
                }
            },
            None => default,
        };

        Self {
            store,
            key: key.to_string(),
            value: RwLock::new(value),
        }
    }

    /// Current value
    pub fn get(&self) -> T {
        self.value.read().unwrap().clone()
    }

    /// Replace the value and write it back to the store
    pub fn set(&self, new: T) {
        {
            let mut value = self.value.write().unwrap();
            *value = new.clone();
        }
        self.write_back(&new);
    }

    /// Modify the value in place, write the result back, and return it
    pub fn update(&self, f: impl FnOnce(&mut T)) -> T {
        let snapshot = {
            let mut value = self.value.write().unwrap();
            f(&mut value);
            value.clone()
        };
        self.write_back(&snapshot);
        snapshot
    }

    fn write_back(&self, value: &T) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Failed to serialize value for key {:?}: {}", self.key, e);
                return;
            }
        };

        if let Err(e) = self.store.set(&self.key, &raw) {
            warn!(
                "Failed to persist key {:?} to {} store: {:#}",
                self.key,
                self.store.name(),
                e
            );
        }
    }
}
