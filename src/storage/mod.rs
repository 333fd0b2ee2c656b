//! Storage backends for jokelist
//!
//! Backends implement the raw string `KeyValueStore` trait. `StateStore`
//! layers typed JSON values on top and owns the two persisted keys.
//! The primary backend is `SqliteStore`.

mod memory;
mod sqlite;
mod state;
mod traits;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use state::{PersistedState, StateStore, JOKES_KEY, LOCKED_IDS_KEY};
pub use traits::{KeyValueStore, OpenStore, StorageError, StorageResult};
