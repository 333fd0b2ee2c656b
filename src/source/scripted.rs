//! Scripted joke source for tests and offline runs

use super::{FetchError, JokeSource};
use crate::joke::JokeItem;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug)]
enum Step {
    Joke(JokeItem),
    Fail(String),
}

/// Replays a fixed sequence of jokes and failures, one per call.
///
/// Once the script runs out every call fails with `FetchError::Unavailable`.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    steps: Mutex<VecDeque<Step>>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// A source yielding one joke per id, with text derived from the id
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        ids.into_iter().fold(Self::new(), |source, id| {
            let id = id.as_ref();
            source.with_joke(JokeItem::new(id, format!("joke {}", id)))
        })
    }

    /// Queue a joke
    pub fn with_joke(self, joke: JokeItem) -> Self {
        self.push(Step::Joke(joke));
        self
    }

    /// Queue a failure
    pub fn with_failure(self, message: impl Into<String>) -> Self {
        self.push(Step::Fail(message.into()));
        self
    }

    /// Number of `fetch_one` calls so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of steps not yet consumed
    pub fn remaining(&self) -> usize {
        self.steps().len()
    }

    fn push(&self, step: Step) {
        self.steps().push_back(step);
    }

    fn steps(&self) -> MutexGuard<'_, VecDeque<Step>> {
        // Only push_back/pop_front touch the queue, neither leaves it half-done
        self.steps.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl JokeSource for ScriptedSource {
    async fn fetch_one(&self) -> Result<JokeItem, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.steps().pop_front();
        match next {
            Some(Step::Joke(joke)) => Ok(joke),
            Some(Step::Fail(message)) => Err(FetchError::Unavailable(message)),
            None => Err(FetchError::Unavailable("script exhausted".to_string())),
        }
    }
}
