//! Pure transforms over a collection or lock set
//!
//! None of these perform I/O. The caller installs the returned value and
//! persists it.

use super::item::{JokeId, JokeItem};
use super::lockset::LockSet;

/// Add `delta` to the votes of the joke matching `id`.
///
/// Other jokes are untouched. Unknown ids leave the collection unchanged.
pub fn vote(collection: &[JokeItem], id: &JokeId, delta: i64) -> Vec<JokeItem> {
    collection
        .iter()
        .map(|joke| {
            if &joke.id == id {
                JokeItem {
                    votes: joke.votes.saturating_add(delta),
                    ..joke.clone()
                }
            } else {
                joke.clone()
            }
        })
        .collect()
}

/// Zero every joke's votes
pub fn reset_votes(collection: &[JokeItem]) -> Vec<JokeItem> {
    collection
        .iter()
        .map(|joke| JokeItem {
            votes: 0,
            ..joke.clone()
        })
        .collect()
}

/// Add `id` to the lock set. Idempotent.
pub fn lock(locks: &LockSet, id: &JokeId) -> LockSet {
    let mut next = locks.clone();
    next.insert(id.clone());
    next
}

/// Remove `id` from the lock set. Idempotent.
pub fn unlock(locks: &LockSet, id: &JokeId) -> LockSet {
    let mut next = locks.clone();
    next.remove(id);
    next
}

/// The display order: votes descending, ties in insertion order.
pub fn view_order(collection: &[JokeItem]) -> Vec<JokeItem> {
    let mut sorted = collection.to_vec();
    // sort_by is stable
    sorted.sort_by(|a, b| b.votes.cmp(&a.votes));
    sorted
}
