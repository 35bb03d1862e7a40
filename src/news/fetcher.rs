//! Feed fetcher.
//!
//! One fetch is one HTTP GET followed by parsing and normalization. Either
//! every entry is returned or the whole cycle fails; no retries happen here.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use feed_rs::parser;
use reqwest::Client;

use crate::config::FetcherConfig;
use crate::news::types::NewItem;
use crate::{NewsError, Result};

/// Source of normalized items for one feed address.
#[async_trait]
pub trait FeedFetcher: Send + Sync {
    /// Fetch and normalize the entries currently published at `url`.
    async fn fetch(&self, url: &str) -> Result<Vec<NewItem>>;
}

/// HTTP implementation of [`FeedFetcher`] with timeouts and size limits.
pub struct HttpFeedFetcher {
    client: Client,
    max_feed_size: u64,
    max_items: usize,
    max_content_length: usize,
}

impl HttpFeedFetcher {
    /// Create a new fetcher from configuration.
    pub fn new(config: &FetcherConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .read_timeout(Duration::from_secs(config.read_timeout_secs))
            .timeout(Duration::from_secs(config.total_timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| NewsError::Fetch(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            max_feed_size: config.max_feed_size_bytes,
            max_items: config.max_items_per_fetch,
            max_content_length: config.max_content_length,
        })
    }
}

#[async_trait]
impl FeedFetcher for HttpFeedFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<NewItem>> {
        validate_url(url)?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| NewsError::Fetch(format!("failed to fetch feed: {}", e)))?;

        if !response.status().is_success() {
            return Err(NewsError::Fetch(format!("HTTP error: {}", response.status())));
        }

        if let Some(content_length) = response.content_length() {
            if content_length > self.max_feed_size {
                return Err(NewsError::Fetch(format!(
                    "feed too large: {} bytes (max {} bytes)",
                    content_length, self.max_feed_size
                )));
            }
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| NewsError::Fetch(format!("failed to read response: {}", e)))?;

        // Chunked responses carry no length header
        if bytes.len() as u64 > self.max_feed_size {
            return Err(NewsError::Fetch(format!(
                "feed too large: {} bytes (max {} bytes)",
                bytes.len(),
                self.max_feed_size
            )));
        }

        parse_feed(
            &bytes,
            self.max_items,
            self.max_content_length,
            Utc::now().timestamp(),
        )
    }
}

/// Check that a feed URL is absolute http(s) with a host.
pub fn validate_url(url: &str) -> Result<()> {
    let parsed =
        url::Url::parse(url).map_err(|e| NewsError::Fetch(format!("invalid URL: {}", e)))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(NewsError::Fetch(format!(
                "unsupported URL scheme: {}",
                scheme
            )));
        }
    }

    if parsed.host().is_none() {
        return Err(NewsError::Fetch("URL has no host".to_string()));
    }

    Ok(())
}

/// Parse feed bytes into normalized items.
///
/// `now` is used as the publication time of entries that carry none.
pub fn parse_feed(
    bytes: &[u8],
    max_items: usize,
    max_content_length: usize,
    now: i64,
) -> Result<Vec<NewItem>> {
    let feed = parser::parse(bytes)
        .map_err(|e| NewsError::Fetch(format!("failed to parse feed: {}", e)))?;

    let items = feed
        .entries
        .into_iter()
        .take(max_items)
        .map(|entry| {
            let title = entry
                .title
                .map(|t| strip_html(&t.content))
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "Untitled".to_string());
            let content = entry
                .summary
                .map(|t| t.content)
                .or(entry.content.and_then(|c| c.body))
                .map(|body| truncate(&strip_html(&body), max_content_length))
                .unwrap_or_default();
            let link = entry
                .links
                .first()
                .map(|l| l.href.clone())
                .unwrap_or(entry.id);
            let pub_time = entry
                .published
                .or(entry.updated)
                .map(|t| t.timestamp())
                .unwrap_or(now);

            NewItem {
                title,
                content,
                pub_time,
                link,
            }
        })
        .collect();

    Ok(items)
}

/// Strip HTML tags from text and decode entities.
fn strip_html(html: &str) -> String {
    let mut result = String::with_capacity(html.len());
    let mut in_tag = false;
    let mut in_entity = false;
    let mut entity = String::new();

    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            '&' if !in_tag => {
                in_entity = true;
                entity.clear();
            }
            ';' if in_entity => {
                in_entity = false;
                match entity.as_str() {
                    "amp" => result.push('&'),
                    "lt" => result.push('<'),
                    "gt" => result.push('>'),
                    "quot" => result.push('"'),
                    "apos" => result.push('\''),
                    "nbsp" => result.push(' '),
                    _ if entity.starts_with('#') => {
                        if let Some(c) = parse_numeric_entity(&entity).and_then(char::from_u32) {
                            result.push(c);
                        }
                    }
                    _ => {
                        // Unknown entity, keep as-is
                        result.push('&');
                        result.push_str(&entity);
                        result.push(';');
                    }
                }
            }
            // A bare ampersand followed by whitespace is not an entity
            c if in_entity && c.is_whitespace() => {
                in_entity = false;
                result.push('&');
                result.push_str(&entity);
                result.push(c);
            }
            _ if in_entity => entity.push(ch),
            _ if !in_tag => result.push(ch),
            _ => {}
        }
    }

    if in_entity {
        result.push('&');
        result.push_str(&entity);
    }

    result.split_whitespace().collect::<Vec<&str>>().join(" ")
}

/// Parse a numeric HTML entity (e.g., "#123" or "#x7B").
fn parse_numeric_entity(entity: &str) -> Option<u32> {
    if let Some(hex) = entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X")) {
        u32::from_str_radix(hex, 16).ok()
    } else {
        entity.strip_prefix('#')?.parse().ok()
    }
}

/// Truncate text to at most `max` characters.
fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000;

    const RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Example</title>
    <link>https://example.com</link>
    <description>Example feed</description>
    <item>
      <title>First &amp; foremost</title>
      <link>https://example.com/1</link>
      <description>&lt;p&gt;Hello &lt;b&gt;world&lt;/b&gt;&lt;/p&gt;</description>
      <pubDate>Tue, 14 Nov 2023 22:13:20 GMT</pubDate>
      <guid>https://example.com/1</guid>
    </item>
    <item>
      <title>No date</title>
      <link>https://example.com/2</link>
    </item>
  </channel>
</rss>"#;

    const ATOM: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Atom example</title>
  <id>urn:uuid:feed</id>
  <updated>2023-11-14T22:13:20Z</updated>
  <entry>
    <title>Atom entry</title>
    <id>urn:uuid:entry-1</id>
    <updated>2023-11-14T22:13:20Z</updated>
    <content type="html">&lt;div&gt;Body text&lt;/div&gt;</content>
  </entry>
</feed>"#;

    #[test]
    fn test_parse_rss() {
        let items = parse_feed(RSS.as_bytes(), 100, 10000, NOW).unwrap();
        assert_eq!(items.len(), 2);

        assert_eq!(items[0].title, "First & foremost");
        assert_eq!(items[0].content, "Hello world");
        assert_eq!(items[0].link, "https://example.com/1");
        assert_eq!(items[0].pub_time, 1_700_000_000);

        assert_eq!(items[1].title, "No date");
        assert_eq!(items[1].content, "");
        assert_eq!(items[1].pub_time, NOW);
    }

    #[test]
    fn test_parse_atom_uses_updated_and_id() {
        let items = parse_feed(ATOM.as_bytes(), 100, 10000, NOW).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Atom entry");
        assert_eq!(items[0].content, "Body text");
        assert_eq!(items[0].link, "urn:uuid:entry-1");
        assert_eq!(items[0].pub_time, 1_700_000_000);
    }

    #[test]
    fn test_parse_limits() {
        let items = parse_feed(RSS.as_bytes(), 1, 5, NOW).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].content, "Hello");
    }

    #[test]
    fn test_parse_malformed_is_fetch_error() {
        let result = parse_feed(b"<html>not a feed", 100, 10000, NOW);
        assert!(matches!(result, Err(NewsError::Fetch(_))));
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("https://example.com/feed.xml").is_ok());
        assert!(validate_url("http://localhost:8080/rss").is_ok());

        assert!(validate_url("ftp://example.com/feed").is_err());
        assert!(validate_url("file:///etc/passwd").is_err());
        assert!(validate_url("not a url").is_err());
    }

    #[test]
    fn test_strip_html() {
        assert_eq!(strip_html("<p>Hello</p>"), "Hello");
        assert_eq!(strip_html("<b>Bold</b> and <i>italic</i>"), "Bold and italic");
        assert_eq!(strip_html("&lt;tag&gt;"), "<tag>");
        assert_eq!(strip_html("&#65;&#x42;"), "AB");
        assert_eq!(strip_html("Tom & Jerry"), "Tom & Jerry");
        assert_eq!(strip_html("  multiple   \n spaces  "), "multiple spaces");
        assert_eq!(strip_html("&unknown;"), "&unknown;");
    }

    #[test]
    fn test_truncate_is_char_based() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("привет мир", 6), "привет");
        assert_eq!(truncate("", 3), "");
    }

    #[tokio::test]
    async fn test_fetch_rejects_unsupported_scheme() {
        let fetcher = HttpFeedFetcher::new(&FetcherConfig::default()).unwrap();
        let result = fetcher.fetch("ftp://example.com/feed").await;
        assert!(matches!(result, Err(NewsError::Fetch(_))));
    }
}
