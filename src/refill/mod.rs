//! Collection refill
//!
//! Replaces the unlocked part of a collection with freshly fetched,
//! deduplicated jokes up to a target size.

mod cancel;
mod engine;

pub use cancel::CancellationToken;
pub use engine::{refill, Refill, RefillError, RefillPolicy};
