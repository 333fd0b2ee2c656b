//! The refill loop
//!
//! Locked jokes from the prior collection are carried over first, in their
//! original order and with their votes. Fetches then run one at a time until
//! the target size is reached; repeated ids are discarded and fetched again.
//!
//! Locked jokes are never dropped: when they already meet or exceed the
//! target, nothing is fetched and the result may be longer than the target.

use super::cancel::CancellationToken;
use crate::joke::{JokeId, JokeItem, LockSet};
use crate::source::{FetchError, JokeSource};
use std::collections::HashSet;
use thiserror::Error;
use tracing::debug;

/// Errors that abort a refill. No partial collection is returned.
#[derive(Debug, Error)]
pub enum RefillError {
    #[error("target size must be at least 1")]
    InvalidTarget,
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("refill cancelled")]
    Cancelled,
    #[error("gave up after {duplicates} consecutive duplicate jokes ({have} of {target} collected)")]
    Exhausted {
        duplicates: usize,
        have: usize,
        target: usize,
    },
}

/// Limits on the duplicate-discard loop
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefillPolicy {
    /// Abort after this many duplicates in a row. `None` retries forever.
    pub max_duplicate_streak: Option<usize>,
}

impl RefillPolicy {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn with_max_duplicate_streak(mut self, streak: usize) -> Self {
        self.max_duplicate_streak = Some(streak);
        self
    }
}

/// A configured refill.
#[derive(Debug, Clone)]
pub struct Refill {
    target: usize,
    policy: RefillPolicy,
    cancel: Option<CancellationToken>,
}

impl Refill {
    pub fn new(target: usize) -> Self {
        Self {
            target,
            policy: RefillPolicy::default(),
            cancel: None,
        }
    }

    pub fn with_policy(mut self, policy: RefillPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    fn check_cancelled(&self) -> Result<(), RefillError> {
        match self.cancel.as_ref().and_then(|t| t.superseded_by()) {
            Some(by) => {
                debug!(superseded_by = by, "refill stopped");
                Err(RefillError::Cancelled)
            }
            None => Ok(()),
        }
    }

    /// Build the next collection from `prior`, keeping jokes in `locks`.
    pub async fn run(
        &self,
        prior: &[JokeItem],
        locks: &LockSet,
        source: &dyn JokeSource,
    ) -> Result<Vec<JokeItem>, RefillError> {
        if self.target == 0 {
            return Err(RefillError::InvalidTarget);
        }

        let mut seen: HashSet<JokeId> = HashSet::new();
        let mut result: Vec<JokeItem> = prior
            .iter()
            .filter(|joke| locks.contains(&joke.id))
            .filter(|joke| seen.insert(joke.id.clone()))
            .cloned()
            .collect();

        let mut streak = 0usize;
        while result.len() < self.target {
            self.check_cancelled()?;
            let candidate = source.fetch_one().await?;
            self.check_cancelled()?;

            if seen.insert(candidate.id.clone()) {
                streak = 0;
                result.push(JokeItem {
                    votes: 0,
                    ..candidate
                });
                continue;
            }

            streak += 1;
            debug!(id = %candidate.id, streak, "duplicate joke discarded");
            if let Some(max) = self.policy.max_duplicate_streak {
                if streak >= max {
                    return Err(RefillError::Exhausted {
                        duplicates: streak,
                        have: result.len(),
                        target: self.target,
                    });
                }
            }
        }

        Ok(result)
    }
}

/// Refill with the default (unbounded) policy and no cancellation
pub async fn refill(
    target: usize,
    prior: &[JokeItem],
    locks: &LockSet,
    source: &dyn JokeSource,
) -> Result<Vec<JokeItem>, RefillError> {
    Refill::new(target).run(prior, locks, source).await
}
