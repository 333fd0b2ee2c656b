//! Typed persistence of the joke collection and lock set
//!
//! Reads never fail: a missing key, a backend error or a malformed payload
//! all fall back to the caller's default. Writes serialize and hit the
//! backend before returning.

use super::traits::{KeyValueStore, StorageResult};
use crate::joke::{JokeItem, LockSet};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

/// Key holding the serialized collection
pub const JOKES_KEY: &str = "jokes";

/// Key holding the serialized lock set
pub const LOCKED_IDS_KEY: &str = "lockedJokeIds";

/// Everything a session persists
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistedState {
    /// `None` when no collection has ever been saved (or it was unreadable)
    pub jokes: Option<Vec<JokeItem>>,
    pub locks: LockSet,
}

/// JSON adapter over a `KeyValueStore`
#[derive(Clone)]
pub struct StateStore {
    backend: Arc<dyn KeyValueStore>,
}

impl StateStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// Deserialize the value under `key`, or return `default`.
    pub fn read<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.try_read(key).unwrap_or(default)
    }

    /// Like `read`, but distinguishes "nothing usable stored" as `None`.
    fn try_read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.backend.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(key, error = %e, "failed to read persisted value, using default");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "persisted value is malformed, using default");
                None
            }
        }
    }

    /// Serialize `value` and store it under `key`
    pub fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> StorageResult<()> {
        let raw = serde_json::to_string(value)?;
        self.backend.put(key, &raw)
    }

    pub fn load_jokes(&self) -> Option<Vec<JokeItem>> {
        self.try_read(JOKES_KEY)
    }

    pub fn load_locks(&self) -> LockSet {
        self.read(LOCKED_IDS_KEY, LockSet::new())
    }

    pub fn load(&self) -> PersistedState {
        PersistedState {
            jokes: self.load_jokes(),
            locks: self.load_locks(),
        }
    }

    pub fn save_jokes(&self, jokes: &[JokeItem]) -> StorageResult<()> {
        self.write(JOKES_KEY, jokes)
    }

    pub fn save_locks(&self, locks: &LockSet) -> StorageResult<()> {
        self.write(LOCKED_IDS_KEY, locks)
    }

    /// Remove both persisted keys. Returns whether anything was stored.
    pub fn clear(&self) -> StorageResult<bool> {
        let had_jokes = self.backend.remove(JOKES_KEY)?;
        let had_locks = self.backend.remove(LOCKED_IDS_KEY)?;
        Ok(had_jokes || had_locks)
    }
}

impl std::fmt::Debug for StateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::joke::JokeId;
    use crate::storage::MemoryStore;

    fn state_with_backend() -> (StateStore, Arc<MemoryStore>) {
        let backend = Arc::new(MemoryStore::new());
        (StateStore::new(backend.clone()), backend)
    }

    #[test]
    fn missing_keys_use_defaults() {
        let (state, _) = state_with_backend();
        assert_eq!(state.load(), PersistedState::default());
        assert_eq!(state.read::<i64>("nope", 7), 7);
    }

    #[test]
    fn malformed_payload_uses_default() {
        let (state, backend) = state_with_backend();
        backend.put(JOKES_KEY, "{not json").unwrap();
        backend.put(LOCKED_IDS_KEY, r#"{"a": 1}"#).unwrap();

        assert_eq!(state.load_jokes(), None);
        assert!(state.load_locks().is_empty());
    }

    #[test]
    fn writes_are_human_readable_json() {
        let (state, backend) = state_with_backend();
        state
            .save_jokes(&[JokeItem::new("a", "pun").with_votes(2)])
            .unwrap();
        state
            .save_locks(&[JokeId::from("a")].into_iter().collect())
            .unwrap();

        assert_eq!(
            backend.get(JOKES_KEY).unwrap().as_deref(),
            Some(r#"[{"id":"a","text":"pun","votes":2}]"#)
        );
        assert_eq!(backend.get(LOCKED_IDS_KEY).unwrap().as_deref(), Some(r#"["a"]"#));
    }

    #[test]
    fn empty_collection_is_distinct_from_missing() {
        let (state, _) = state_with_backend();
        state.save_jokes(&[]).unwrap();
        assert_eq!(state.load_jokes(), Some(Vec::new()));
    }

    #[test]
    fn clear_removes_both_keys() {
        let (state, backend) = state_with_backend();
        state.save_jokes(&[]).unwrap();
        state.save_locks(&LockSet::new()).unwrap();

        assert!(state.clear().unwrap());
        assert!(backend.keys().unwrap().is_empty());
        assert!(!state.clear().unwrap());
    }

    #[test]
    fn write_error_propagates() {
        let (state, backend) = state_with_backend();
        backend.set_fail_writes(true);
        assert!(state.save_jokes(&[]).is_err());
    }
}
