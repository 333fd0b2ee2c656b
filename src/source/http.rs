//! HTTP joke source (icanhazdadjoke-compatible)

use super::{FetchError, JokeSource};
use crate::joke::JokeItem;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, USER_AGENT};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Where jokes come from unless configured otherwise
pub const DEFAULT_ENDPOINT: &str = "https://icanhazdadjoke.com/";

/// The subset of the endpoint's JSON body we rely on.
///
/// Unknown fields (e.g. `status`) are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteJoke {
    pub id: String,
    pub joke: String,
}

impl RemoteJoke {
    /// Parse a response body
    pub fn parse(body: &str) -> Result<Self, FetchError> {
        Ok(serde_json::from_str(body)?)
    }
}

impl From<RemoteJoke> for JokeItem {
    fn from(remote: RemoteJoke) -> Self {
        JokeItem::new(remote.id, remote.joke)
    }
}

/// Fetches one joke per request from a JSON endpoint
#[derive(Debug, Clone)]
pub struct HttpJokeSource {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpJokeSource {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl JokeSource for HttpJokeSource {
    async fn fetch_one(&self) -> Result<JokeItem, FetchError> {
        debug!(endpoint = %self.endpoint, "fetching joke");
        let rsp = self
            .client
            .get(&self.endpoint)
            .header(ACCEPT, "application/json")
            .header(USER_AGENT, concat!("jokelist/", env!("CARGO_PKG_VERSION")))
            .send()
            .await?;

        let status = rsp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = rsp.text().await?;
        Ok(RemoteJoke::parse(&body)?.into())
    }
}
