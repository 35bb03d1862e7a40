//! News item types.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{NewsError, Result};

/// Page size used by listing and search.
pub const PAGE_SIZE: i64 = 10;

/// Number of items returned by `recent` when the caller asks for none.
pub const DEFAULT_RECENT_COUNT: i64 = 10;

/// A stored news item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Store-assigned identifier.
    #[serde(rename = "ID")]
    pub id: i64,
    /// Item title.
    #[serde(rename = "Title")]
    pub title: String,
    /// Plain-text body.
    #[serde(rename = "Content")]
    pub content: String,
    /// Publication time in seconds since the Unix epoch.
    #[serde(rename = "PubTime")]
    pub pub_time: i64,
    /// Origin link. Not unique.
    #[serde(rename = "Link")]
    pub link: String,
}

/// A normalized item that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    pub title: String,
    pub content: String,
    pub pub_time: i64,
    pub link: String,
}

impl NewItem {
    /// Create a new item with empty content, published now.
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: String::new(),
            pub_time: Utc::now().timestamp(),
            link: link.into(),
        }
    }

    /// Set the content.
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Set the publication time in epoch seconds.
    pub fn with_pub_time(mut self, pub_time: i64) -> Self {
        self.pub_time = pub_time;
        self
    }

    /// Set the publication time from a timestamp.
    pub fn with_published_at(self, published_at: DateTime<Utc>) -> Self {
        self.with_pub_time(published_at.timestamp())
    }
}

/// A feed to poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    /// Feed URL.
    pub url: String,
    /// Delay between poll cycles.
    pub interval: Duration,
}

impl Source {
    /// Create a source polled every `interval_minutes` minutes.
    pub fn new(url: impl Into<String>, interval_minutes: u64) -> Self {
        Self::with_interval(url, Duration::from_secs(interval_minutes * 60))
    }

    /// Create a source with an arbitrary interval.
    pub fn with_interval(url: impl Into<String>, interval: Duration) -> Self {
        Self {
            url: url.into(),
            interval,
        }
    }
}

/// Pagination descriptor returned alongside a page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub total_pages: i64,
    pub current_page: i64,
    pub items_per_page: i64,
    pub total_items: i64,
}

impl Pagination {
    /// Build a descriptor for `total` matching rows viewed through
    /// `limit`/`offset`.
    ///
    /// `total_pages` is the ceiling of `total / limit`.
    pub fn compute(total: i64, limit: i64, offset: i64) -> Result<Self> {
        if limit <= 0 {
            return Err(NewsError::invalid(format!("limit must be positive, got {limit}")));
        }
        if offset < 0 {
            return Err(NewsError::invalid(format!(
                "offset must not be negative, got {offset}"
            )));
        }

        let total_pages = if total % limit == 0 {
            total / limit
        } else {
            total / limit + 1
        };

        Ok(Self {
            total_pages,
            current_page: offset / limit + 1,
            items_per_page: limit,
            total_items: total,
        })
    }
}

/// Items produced by one successful poll cycle.
#[derive(Debug, Clone)]
pub struct ItemBatch {
    /// URL of the source that produced the batch.
    pub source: String,
    pub items: Vec<NewItem>,
}

/// A failure reported on the error stream.
#[derive(Debug)]
pub struct IngestFailure {
    /// URL of the source, or `"sink"` for persistence failures.
    pub source: String,
    pub error: NewsError,
}

impl std::fmt::Display for IngestFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.source, self.error)
    }
}
