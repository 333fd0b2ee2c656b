//! jokelist: a persisted, votable list of jokes
//!
//! Jokes come from a remote source one at a time. A refill replaces the
//! list while keeping locked jokes (and their votes) in place, never
//! admitting two jokes with the same id.
//!
//! # Core Concepts
//!
//! - **Collection**: the ordered jokes of a session, ids pairwise distinct
//! - **LockSet**: ids a refill must carry over, persisted on its own
//! - **Refill**: locked jokes first, then fresh unique jokes up to a target
//! - **Session**: owns both, persists every change, lets the newest refill win
//!
//! # Example
//!
//! ```
//! use jokelist::{MemoryStore, ScriptedSource, Session, StateStore, Vote};
//! use std::sync::Arc;
//!
//! # tokio_test::block_on(async {
//! let session = Session::open(StateStore::new(Arc::new(MemoryStore::new())), 2);
//! let source = ScriptedSource::from_ids(["a", "b"]);
//! session.request_refill(&source).await.unwrap();
//! session.vote(&"b".into(), Vote::Up).unwrap();
//! assert_eq!(session.view()[0].id.as_str(), "b");
//! # });
//! ```

pub mod config;
pub mod joke;
pub mod refill;
pub mod session;
pub mod source;
pub mod storage;

pub use config::{Config, ConfigError};
pub use joke::{JokeId, JokeItem, LockSet, Vote};
pub use refill::{refill, CancellationToken, Refill, RefillError, RefillPolicy};
pub use session::{RefillOutcome, Session, SessionError};
pub use source::{FetchError, HttpJokeSource, JokeSource, ScriptedSource};
pub use storage::{
    KeyValueStore, MemoryStore, OpenStore, PersistedState, SqliteStore, StateStore, StorageError,
    StorageResult,
};
