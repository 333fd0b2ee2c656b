//! Joke data model
//!
//! A collection is an ordered `Vec<JokeItem>` with distinct ids. The lock set
//! names the ids a refill must carry over.

mod item;
mod lockset;
pub mod mutate;

pub use item::{JokeId, JokeItem, Vote};
pub use lockset::LockSet;
pub use mutate::{lock, reset_votes, unlock, view_order, vote};
