//! Content filter gating comment submission.
//!
//! A filter either answers or fails. Failures are surfaced to the caller as
//! [`NewsError::Filter`]; content is never accepted without an answer.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::FilterConfig;
use crate::{NewsError, Result};

/// Decides whether a piece of user text may be published.
#[async_trait]
pub trait ContentFilter: Send + Sync {
    async fn is_allowed(&self, text: &str) -> Result<bool>;
}

/// Local filter refusing text that contains a forbidden word.
#[derive(Debug, Clone)]
pub struct WordListFilter {
    words: Vec<String>,
}

impl WordListFilter {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        Self { words }
    }

    /// First forbidden word found in `text`, ignoring case.
    pub fn find_forbidden(&self, text: &str) -> Option<&str> {
        let lowered = text.to_lowercase();
        self.words
            .iter()
            .find(|w| lowered.contains(w.as_str()))
            .map(String::as_str)
    }
}

#[async_trait]
impl ContentFilter for WordListFilter {
    async fn is_allowed(&self, text: &str) -> Result<bool> {
        Ok(self.find_forbidden(text).is_none())
    }
}

#[derive(Serialize)]
struct CheckRequest<'a> {
    comment: &'a str,
}

#[derive(Deserialize)]
struct CheckResponse {
    allowed: bool,
}

/// Remote filter: `POST {endpoint}` with `{"comment": text}`, answered by
/// `{"allowed": bool}`.
pub struct HttpContentFilter {
    client: Client,
    endpoint: String,
}

impl HttpContentFilter {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let endpoint = endpoint.into();
        url::Url::parse(&endpoint)
            .map_err(|e| NewsError::Config(format!("invalid filter endpoint: {}", e)))?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NewsError::Filter(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl ContentFilter for HttpContentFilter {
    async fn is_allowed(&self, text: &str) -> Result<bool> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&CheckRequest { comment: text })
            .send()
            .await
            .map_err(|e| NewsError::Filter(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(NewsError::Filter(format!("HTTP error: {}", response.status())));
        }

        let body: CheckResponse = response
            .json()
            .await
            .map_err(|e| NewsError::Filter(format!("invalid response: {}", e)))?;

        debug!("Filter verdict: allowed={}", body.allowed);
        Ok(body.allowed)
    }
}

/// Build the filter selected by configuration.
pub fn from_config(config: &FilterConfig) -> Result<Box<dyn ContentFilter>> {
    match &config.endpoint {
        Some(endpoint) => Ok(Box::new(HttpContentFilter::new(
            endpoint.as_str(),
            Duration::from_secs(config.timeout_secs),
        )?)),
        None => Ok(Box::new(WordListFilter::new(&config.forbidden_words))),
    }
}
