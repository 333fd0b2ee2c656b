//! Joke sources: where refills get candidate jokes from
//!
//! Two implementations:
//! - `HttpJokeSource`: one GET per call against a JSON joke endpoint (production)
//! - `ScriptedSource`: replays a fixed sequence of jokes and failures (testing)
//!
//! A source neither retries nor deduplicates. The refill engine owns both.

mod http;
mod scripted;

pub use http::{HttpJokeSource, RemoteJoke, DEFAULT_ENDPOINT};
pub use scripted::ScriptedSource;

use crate::joke::JokeItem;
use async_trait::async_trait;
use thiserror::Error;

/// Errors from a single fetch attempt
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("joke source returned HTTP {0}")]
    Status(u16),
    #[error("malformed joke payload: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("joke source unavailable: {0}")]
    Unavailable(String),
}

/// Something that can hand out one joke at a time.
///
/// Consecutive calls usually return new ids, but repeats are legal.
#[async_trait]
pub trait JokeSource: Send + Sync {
    /// Fetch one candidate joke with zero votes.
    async fn fetch_one(&self) -> Result<JokeItem, FetchError>;
}
