//! Superseding a running refill
//!
//! Each refill carries a token. When the session starts a newer refill (or
//! clears its state) it marks the old token with the generation that
//! replaced it. The engine only looks at the token between fetches, so a
//! request already on the wire still completes and its joke is dropped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Generation 0 is never handed out, so it marks a live token
const LIVE: u64 = 0;

/// Shared flag telling a refill that a newer one replaced it.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    superseded_by: Arc<AtomicU64>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once `supersede` was called on any clone
    pub fn is_cancelled(&self) -> bool {
        self.superseded_by().is_some()
    }

    /// The generation that replaced this refill, if any
    pub fn superseded_by(&self) -> Option<u64> {
        match self.superseded_by.load(Ordering::Acquire) {
            LIVE => None,
            generation => Some(generation),
        }
    }

    /// Mark the refill as replaced by `generation`. The first call wins.
    pub fn supersede(&self, generation: u64) {
        let generation = generation.max(1);
        let _ = self.superseded_by.compare_exchange(
            LIVE,
            generation,
            Ordering::Release,
            Ordering::Relaxed,
        );
    }
}
