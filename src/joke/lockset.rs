//! The set of locked joke ids

use super::item::JokeId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Ids excluded from replacement during a refill.
///
/// Membership is independent of the collection: dropping a joke from the
/// collection does not unlock it. Serializes as a sorted JSON array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LockSet(BTreeSet<JokeId>);

impl LockSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &JokeId) -> bool {
        self.0.contains(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &JokeId> {
        self.0.iter()
    }

    pub(crate) fn insert(&mut self, id: JokeId) -> bool {
        self.0.insert(id)
    }

    pub(crate) fn remove(&mut self, id: &JokeId) -> bool {
        self.0.remove(id)
    }
}

impl FromIterator<JokeId> for LockSet {
    fn from_iter<I: IntoIterator<Item = JokeId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a LockSet {
    type Item = &'a JokeId;
    type IntoIter = std::collections::btree_set::Iter<'a, JokeId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
