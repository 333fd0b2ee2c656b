//! Session: the caller-owned state container
//!
//! Holds the current collection and lock set, applies the pure mutators,
//! and writes every change through the `StateStore`.
//!
//! Refills are guarded by a generation counter. Starting a refill cancels the
//! previous one, and a refill only installs its result if no newer refill has
//! started since. The newest refill wins.

use crate::joke::{self, JokeId, JokeItem, LockSet, Vote};
use crate::refill::{CancellationToken, Refill, RefillError, RefillPolicy};
use crate::source::JokeSource;
use crate::storage::{StateStore, StorageError, StorageResult};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;
use tracing::{info, warn};

/// Errors from `Session::request_refill`
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Refill(#[from] RefillError),
    #[error("refilled jokes could not be saved: {0}")]
    Storage(#[from] StorageError),
}

/// How a refill request ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefillOutcome {
    /// The new collection is installed and persisted
    Applied(Vec<JokeItem>),
    /// A newer refill started; this one's result was discarded
    Superseded,
}

#[derive(Debug, Default)]
struct SessionState {
    jokes: Vec<JokeItem>,
    locks: LockSet,
    /// False until a collection has been loaded or refilled
    has_collection: bool,
    /// Cancellation handle of the running refill, if any
    in_flight: Option<CancellationToken>,
}

/// A joke-list session backed by persistent storage.
#[derive(Debug)]
pub struct Session {
    store: StateStore,
    target: usize,
    policy: RefillPolicy,
    state: Mutex<SessionState>,
    generation: AtomicU64,
}

impl Session {
    /// Open a session, restoring whatever the store holds.
    pub fn open(store: StateStore, target: usize) -> Self {
        let persisted = store.load();
        let state = SessionState {
            has_collection: persisted.jokes.is_some(),
            jokes: persisted.jokes.unwrap_or_default(),
            locks: persisted.locks,
            in_flight: None,
        };
        Self {
            store,
            target,
            policy: RefillPolicy::default(),
            state: Mutex::new(state),
            generation: AtomicU64::new(0),
        }
    }

    pub fn with_policy(mut self, policy: RefillPolicy) -> Self {
        self.policy = policy;
        self
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        // State is replaced wholesale under the lock, so a poisoned guard
        // still holds a consistent value.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    // --- Read ---

    pub fn target(&self) -> usize {
        self.target
    }

    /// The collection in insertion order
    pub fn jokes(&self) -> Vec<JokeItem> {
        self.state().jokes.clone()
    }

    pub fn locks(&self) -> LockSet {
        self.state().locks.clone()
    }

    /// The collection sorted for display
    pub fn view(&self) -> Vec<JokeItem> {
        joke::view_order(&self.state().jokes)
    }

    pub fn is_locked(&self, id: &JokeId) -> bool {
        self.state().locks.contains(id)
    }

    /// True while a refill is running
    pub fn is_loading(&self) -> bool {
        self.state().in_flight.is_some()
    }

    /// True when nothing was persisted, so the first view should refill
    pub fn needs_initial_refill(&self) -> bool {
        !self.state().has_collection
    }

    // --- Write ---

    /// Add `vote`'s delta to the joke `id`.
    ///
    /// The in-memory state is updated even if persisting fails; the error is
    /// returned so the caller can surface it. The write happens under the
    /// state lock, so the store never lags behind a later mutation.
    pub fn vote(&self, id: &JokeId, vote: Vote) -> StorageResult<()> {
        let mut state = self.state();
        state.jokes = joke::vote(&state.jokes, id, vote.delta());
        self.persist_jokes(&state.jokes)
    }

    pub fn reset_votes(&self) -> StorageResult<()> {
        let mut state = self.state();
        state.jokes = joke::reset_votes(&state.jokes);
        self.persist_jokes(&state.jokes)
    }

    pub fn lock(&self, id: &JokeId) -> StorageResult<()> {
        let mut state = self.state();
        state.locks = joke::lock(&state.locks, id);
        self.persist_locks(&state.locks)
    }

    pub fn unlock(&self, id: &JokeId) -> StorageResult<()> {
        let mut state = self.state();
        state.locks = joke::unlock(&state.locks, id);
        self.persist_locks(&state.locks)
    }

    /// Drop all jokes and locks, in memory and in the store
    pub fn clear(&self) -> StorageResult<bool> {
        let mut state = self.state();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(prev) = state.in_flight.take() {
            prev.supersede(generation);
        }
        state.jokes.clear();
        state.locks = LockSet::new();
        state.has_collection = false;
        self.store.clear()
    }

    /// Refill to the session's target size
    pub async fn request_refill(
        &self,
        source: &dyn JokeSource,
    ) -> Result<RefillOutcome, SessionError> {
        self.request_refill_to(self.target, source).await
    }

    /// Refill to `target` jokes.
    ///
    /// On a refill error the collection, lock set and store are left as they
    /// were. A zero target is rejected before any running refill is touched.
    pub async fn request_refill_to(
        &self,
        target: usize,
        source: &dyn JokeSource,
    ) -> Result<RefillOutcome, SessionError> {
        if target == 0 {
            return Err(RefillError::InvalidTarget.into());
        }

        let token = CancellationToken::new();
        let (generation, prior, locks) = {
            let mut state = self.state();
            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some(prev) = state.in_flight.replace(token.clone()) {
                prev.supersede(generation);
            }
            (generation, state.jokes.clone(), state.locks.clone())
        };

        let result = Refill::new(target)
            .with_policy(self.policy)
            .with_cancellation(token)
            .run(&prior, &locks, source)
            .await;

        // Check, install and persist under one lock: once a newer refill can
        // observe this state, the store already holds it.
        let mut state = self.state();
        let current = self.generation.load(Ordering::SeqCst) == generation;
        if current {
            state.in_flight = None;
        }
        let mut jokes = match result {
            Err(RefillError::Cancelled) => return Ok(RefillOutcome::Superseded),
            Err(e) => {
                if current {
                    warn!(error = %e, "refill failed, keeping previous jokes");
                }
                return Err(e.into());
            }
            Ok(_) if !current => return Ok(RefillOutcome::Superseded),
            Ok(jokes) => jokes,
        };

        // Votes cast on carried-over jokes while we were fetching
        for item in jokes.iter_mut().filter(|j| locks.contains(&j.id)) {
            if let Some(live) = state.jokes.iter().find(|j| j.id == item.id) {
                item.votes = live.votes;
            }
        }
        state.jokes = jokes.clone();
        state.has_collection = true;

        info!(generation, count = jokes.len(), "refill applied");
        self.persist_jokes(&state.jokes)?;
        Ok(RefillOutcome::Applied(jokes))
    }

    fn persist_jokes(&self, jokes: &[JokeItem]) -> StorageResult<()> {
        self.store.save_jokes(jokes).inspect_err(|e| {
            warn!(error = %e, "failed to persist jokes");
        })
    }

    fn persist_locks(&self, locks: &LockSet) -> StorageResult<()> {
        self.store.save_locks(locks).inspect_err(|e| {
            warn!(error = %e, "failed to persist locked joke ids");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::ScriptedSource;
    use crate::storage::{KeyValueStore, MemoryStore};
    use std::sync::Arc;

    fn session() -> (Session, Arc<MemoryStore>) {
        let backend = Arc::new(MemoryStore::new());
        let session = Session::open(StateStore::new(backend.clone()), 3);
        (session, backend)
    }

    #[tokio::test]
    async fn fresh_session_needs_refill() {
        let (session, _) = session();
        assert!(session.needs_initial_refill());
        assert!(!session.is_loading());

        let source = ScriptedSource::from_ids(["a", "b", "c"]);
        let outcome = session.request_refill(&source).await.unwrap();

        assert!(matches!(outcome, RefillOutcome::Applied(ref j) if j.len() == 3));
        assert!(!session.needs_initial_refill());
        assert!(!session.is_loading());
    }

    #[tokio::test]
    async fn failed_refill_clears_loading_and_keeps_jokes() {
        let (session, _) = session();
        session
            .request_refill(&ScriptedSource::from_ids(["a", "b", "c"]))
            .await
            .unwrap();

        let failing = ScriptedSource::from_ids(["x"]).with_failure("offline");
        assert!(session.request_refill(&failing).await.is_err());

        assert!(!session.is_loading());
        let ids: Vec<_> = session.jokes().into_iter().map(|j| j.id.to_string()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn vote_persists_even_for_unlisted_locks() {
        let (session, _) = session();
        session
            .request_refill(&ScriptedSource::from_ids(["a", "b", "c"]))
            .await
            .unwrap();

        session.vote(&JokeId::from("b"), Vote::Up).unwrap();
        session.lock(&JokeId::from("nowhere")).unwrap();

        let reopened = Session::open(session.store.clone(), 3);
        assert_eq!(reopened.jokes()[1].votes, 1);
        assert!(reopened.is_locked(&JokeId::from("nowhere")));
    }

    #[tokio::test]
    async fn write_failure_still_updates_memory() {
        let (session, backend) = session();
        session
            .request_refill(&ScriptedSource::from_ids(["a", "b", "c"]))
            .await
            .unwrap();

        backend.set_fail_writes(true);
        assert!(session.vote(&JokeId::from("a"), Vote::Down).is_err());
        assert_eq!(session.jokes()[0].votes, -1);
    }

    #[tokio::test]
    async fn zero_target_leaves_running_refill_alone() {
        let (session, _) = session();
        let running = CancellationToken::new();
        session.state().in_flight = Some(running.clone());
        let before = session.generation.load(Ordering::SeqCst);

        let err = session
            .request_refill_to(0, &ScriptedSource::from_ids(["a"]))
            .await
            .unwrap_err();

        assert!(matches!(err, SessionError::Refill(RefillError::InvalidTarget)));
        assert_eq!(session.generation.load(Ordering::SeqCst), before);
        assert!(!running.is_cancelled());
        assert!(session.is_loading());
    }

    #[tokio::test]
    async fn refill_write_failure_keeps_new_jokes_in_memory_only() {
        let (session, backend) = session();
        session
            .request_refill(&ScriptedSource::from_ids(["a", "b", "c"]))
            .await
            .unwrap();
        let saved = session.store.load_jokes();

        backend.set_fail_writes(true);
        let err = session
            .request_refill(&ScriptedSource::from_ids(["x", "y", "z"]))
            .await
            .unwrap_err();

        assert!(matches!(err, SessionError::Storage(_)));
        let ids: Vec<_> = session.jokes().into_iter().map(|j| j.id.to_string()).collect();
        assert_eq!(ids, vec!["x", "y", "z"]);
        assert_eq!(session.store.load_jokes(), saved);
        assert!(!session.is_loading());
    }

    #[tokio::test]
    async fn clear_forgets_everything() {
        let (session, backend) = session();
        session
            .request_refill(&ScriptedSource::from_ids(["a", "b", "c"]))
            .await
            .unwrap();
        session.lock(&JokeId::from("a")).unwrap();

        assert!(session.clear().unwrap());
        assert!(session.jokes().is_empty());
        assert!(session.locks().is_empty());
        assert!(session.needs_initial_refill());
        assert!(backend.keys().unwrap().is_empty());
    }
}
