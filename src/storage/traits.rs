//! Storage trait definitions

use std::path::Path;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for key-value storage backends
///
/// Values are opaque strings. Implementations must be thread-safe
/// (Send + Sync) and must have made a `put` durable by the time it returns.
pub trait KeyValueStore: Send + Sync {
    /// Load the value stored under `key`
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Insert or replace the value under `key`
    fn put(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove `key`. Returns whether it existed.
    fn remove(&self, key: &str) -> StorageResult<bool>;

    /// List stored keys in ascending order
    fn keys(&self) -> StorageResult<Vec<String>>;
}

/// Extension trait for opening stores from paths
pub trait OpenStore: KeyValueStore + Sized {
    /// Open or create a store at the given path
    fn open(path: impl AsRef<Path>) -> StorageResult<Self>;

    /// Create an in-memory store (useful for testing)
    fn open_in_memory() -> StorageResult<Self>;
}
