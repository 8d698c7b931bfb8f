//! Quota-aware persistence
//!
//! Saving a collection walks a ladder of strategies and stops at the first
//! that succeeds: the full JSON, then a slim copy without large inline
//! images, then removal of the key so no stale copy survives. Failures are
//! logged and never returned.

use colletkit_core::{LocalStorage, StorageError};
use serde::Serialize;
use serde_json::Value;

/// Inline images longer than this are dropped by the slim strategy
pub const LARGE_IMAGE_THRESHOLD: usize = 1000;

const IMAGE_FIELD: &str = "imageUrl";

/// One step of the save ladder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStrategy {
    /// Full JSON of the collection
    Full,
    /// Same, minus `imageUrl` values over the threshold
    Slim,
    /// Remove the key
    Evict,
}

/// Outcome of [`save`]: the strategy that succeeded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Full,
    Slim,
    Evicted,
}

impl SaveStrategy {
    pub const LADDER: [SaveStrategy; 3] =
        [SaveStrategy::Full, SaveStrategy::Slim, SaveStrategy::Evict];

    /// Apply this strategy to an already serialized collection
    pub fn attempt(
        &self,
        storage: &dyn LocalStorage,
        key: &str,
        items: &Value,
    ) -> Result<SaveOutcome, StorageError> {
        match self {
            SaveStrategy::Full => {
                storage.set(key, &items.to_string())?;
                Ok(SaveOutcome::Full)
            }
            SaveStrategy::Slim => {
                storage.set(key, &slim(items).to_string())?;
                Ok(SaveOutcome::Slim)
            }
            SaveStrategy::Evict => {
                storage.remove(key);
                Ok(SaveOutcome::Evicted)
            }
        }
    }
}

/// Copy of a collection without large inline images
pub fn slim(items: &Value) -> Value {
    match items {
        Value::Array(list) => Value::Array(
            list.iter()
                .map(|item| match item {
                    Value::Object(map) => {
                        let mut map = map.clone();
                        let large = map
                            .get(IMAGE_FIELD)
                            .and_then(Value::as_str)
                            .is_some_and(|url| url.chars().count() > LARGE_IMAGE_THRESHOLD);
                        if large {
                            map.remove(IMAGE_FIELD);
                        }
                        Value::Object(map)
                    }
                    other => other.clone(),
                })
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Persist a collection under `key`, degrading as needed
pub fn save<T: Serialize>(storage: &dyn LocalStorage, key: &str, items: &[T]) -> SaveOutcome {
    let value = match serde_json::to_value(items) {
        Ok(value) => value,
        Err(e) => {
            tracing::error!("[Cache] Failed to serialize {}: {}", key, e);
            storage.remove(key);
            return SaveOutcome::Evicted;
        }
    };

    for strategy in SaveStrategy::LADDER {
        match strategy.attempt(storage, key, &value) {
            Ok(SaveOutcome::Full) => return SaveOutcome::Full,
            Ok(SaveOutcome::Slim) => {
                tracing::info!("[Cache] {} saved in slim mode", key);
                return SaveOutcome::Slim;
            }
            Ok(SaveOutcome::Evicted) => {
                tracing::error!("[Cache] Storage full, unable to save {}", key);
                return SaveOutcome::Evicted;
            }
            Err(e) => {
                tracing::warn!("[Cache] {:?} save of {} failed: {}", strategy, key, e);
            }
        }
    }

    SaveOutcome::Evicted
}

/// Read a cached collection; absent or unreadable gives an empty list
pub fn load<T: serde::de::DeserializeOwned>(storage: &dyn LocalStorage, key: &str) -> Vec<T> {
    match storage.get(key) {
        Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!("[Cache] Ignoring unreadable {}: {}", key, e);
            Vec::new()
        }),
        None => Vec::new(),
    }
}
