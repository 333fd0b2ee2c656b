//! A single joke and its vote count

use serde::{Deserialize, Serialize};

/// Opaque identifier assigned by the joke source
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JokeId(String);

impl JokeId {
    /// Create a JokeId from any string
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for JokeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for JokeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for JokeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A joke in the collection.
///
/// `votes` starts at zero and is never clamped, so it can go negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JokeItem {
    pub id: JokeId,
    pub text: String,
    #[serde(default)]
    pub votes: i64,
}

impl JokeItem {
    /// Create a freshly fetched joke with no votes
    pub fn new(id: impl Into<JokeId>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            votes: 0,
        }
    }

    pub fn with_votes(mut self, votes: i64) -> Self {
        self.votes = votes;
        self
    }
}

/// A user's vote on a joke
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vote {
    Up,
    Down,
}

impl Vote {
    pub fn delta(self) -> i64 {
        match self {
            Vote::Up => 1,
            Vote::Down => -1,
        }
    }
}

impl std::str::FromStr for Vote {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "up" | "+1" | "+" => Ok(Vote::Up),
            "down" | "-1" | "-" => Ok(Vote::Down),
            other => Err(format!("unknown vote '{}': expected 'up' or 'down'", other)),
        }
    }
}
