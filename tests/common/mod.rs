//! Shared helpers for jokelist integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use jokelist::{
    FetchError, JokeItem, JokeSource, KeyValueStore, MemoryStore, Session, StateStore,
    StorageResult,
};
use std::sync::{Arc, Condvar, Mutex};
use tokio::sync::Notify;

/// A session over a fresh in-memory store, plus a handle on the store
pub fn memory_session(target: usize) -> (Session, StateStore, Arc<MemoryStore>) {
    let backend = Arc::new(MemoryStore::new());
    let store = StateStore::new(backend.clone());
    (Session::open(store.clone(), target), store, backend)
}

pub fn ids(jokes: &[JokeItem]) -> Vec<String> {
    jokes.iter().map(|j| j.id.to_string()).collect()
}

pub fn votes(jokes: &[JokeItem]) -> Vec<(String, i64)> {
    jokes.iter().map(|j| (j.id.to_string(), j.votes)).collect()
}

/// A source that parks every fetch until released.
///
/// `started` fires when the first fetch is waiting; `release` lets all
/// parked and future fetches through. Each fetch returns `<prefix><n>`.
pub struct GatedSource {
    prefix: String,
    counter: std::sync::atomic::AtomicUsize,
    pub started: Notify,
    pub release: Notify,
    released: std::sync::atomic::AtomicBool,
}

impl GatedSource {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            counter: Default::default(),
            started: Notify::new(),
            release: Notify::new(),
            released: Default::default(),
        }
    }

    pub fn open_gate(&self) {
        self.released.store(true, std::sync::atomic::Ordering::SeqCst);
        self.release.notify_waiters();
    }
}

#[async_trait]
impl JokeSource for GatedSource {
    async fn fetch_one(&self) -> Result<JokeItem, FetchError> {
        use std::sync::atomic::Ordering;

        let released = self.release.notified();
        if !self.released.load(Ordering::SeqCst) {
            self.started.notify_one();
            released.await;
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let id = format!("{}{}", self.prefix, n);
        Ok(JokeItem::new(id.clone(), format!("joke {}", id)))
    }
}

#[derive(Default)]
struct Gate {
    key: Option<String>,
    parked: bool,
    released: bool,
}

/// An in-memory backend that can hold one `put` until released.
///
/// `park_next_put(key)` arms it; the next `put` to that key blocks its
/// thread until `release` is called, then writes as usual.
#[derive(Default)]
pub struct ParkingStore {
    inner: MemoryStore,
    gate: Mutex<Gate>,
    cv: Condvar,
}

impl ParkingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn park_next_put(&self, key: &str) {
        let mut gate = self.gate.lock().unwrap();
        *gate = Gate {
            key: Some(key.to_string()),
            ..Gate::default()
        };
    }

    /// Block until a `put` is parked
    pub fn wait_parked(&self) {
        let mut gate = self.gate.lock().unwrap();
        while !gate.parked {
            gate = self.cv.wait(gate).unwrap();
        }
    }

    pub fn release(&self) {
        self.gate.lock().unwrap().released = true;
        self.cv.notify_all();
    }
}

impl KeyValueStore for ParkingStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        self.inner.get(key)
    }

    fn put(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut gate = self.gate.lock().unwrap();
        if gate.key.as_deref() == Some(key) {
            gate.key = None;
            gate.parked = true;
            self.cv.notify_all();
            while !gate.released {
                gate = self.cv.wait(gate).unwrap();
            }
        }
        drop(gate);
        self.inner.put(key, value)
    }

    fn remove(&self, key: &str) -> StorageResult<bool> {
        self.inner.remove(key)
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        self.inner.keys()
    }
}
