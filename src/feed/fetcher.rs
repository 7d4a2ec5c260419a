//! HTTP feed retrieval and RSS/Atom decoding.
//!
//! This is the external-collaborator boundary of the pipeline: given a feed
//! URL it returns loosely-typed entries plus a malformed indicator. Transport
//! and HTTP failures are errors; an unparseable body is *not* — it yields a
//! [`FetchedFeed`] with the complaint recorded, so the caller can warn and
//! move on. One bad feed never aborts a run.

use chrono::{DateTime, Utc};
use futures::StreamExt;
use std::time::Duration;
use thiserror::Error;

/// Per-request timeout. A slow feed blocks the run (fetches are sequential),
/// so it is kept tight.
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_FEED_SIZE: usize = 10 * 1024 * 1024; // 10MB

/// Errors that can occur while retrieving a feed.
///
/// All of these are contained per-feed: the pipeline logs a warning and
/// continues with the next subscription.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Request exceeded the 30-second timeout
    #[error("Request timed out")]
    Timeout,
    /// Response body exceeded the 10MB size limit
    #[error("Response too large")]
    ResponseTooLarge,
}

/// One feed entry as the wire gave it to us: every field optional, shapes
/// varying across RSS flavors. [`crate::feed::normalize`] turns this into the
/// canonical record or drops it.
#[derive(Debug, Clone, Default)]
pub struct RawEntry {
    pub title: Option<String>,
    pub link: Option<String>,
    pub summary: Option<String>,
    /// Publication instant, already parsed by the feed decoder.
    pub published: Option<DateTime<Utc>>,
    /// Last-updated instant, already parsed by the feed decoder.
    pub updated: Option<DateTime<Utc>>,
    /// Textual date for entries whose timestamp survived only as a string.
    /// `feed-rs` pre-parses dates so this stays empty on the HTTP path, but
    /// the normalizer accepts it from any collaborator that has only text.
    pub published_raw: Option<String>,
}

/// Result of fetching and decoding one feed.
#[derive(Debug, Default)]
pub struct FetchedFeed {
    /// Entries in the order the feed returned them.
    pub entries: Vec<RawEntry>,
    /// Parse complaint when the body was not a well-formed feed. Entries
    /// salvaged despite the complaint are still present in `entries`.
    pub malformed: Option<String>,
}

/// Fetches one feed URL and decodes its entries.
///
/// Blocks (awaits) until the round-trip completes; the pipeline calls this
/// once per subscription, strictly in order. No retries — a failed feed is
/// reported once and skipped for this run.
///
/// # Errors
///
/// - [`FetchError::Timeout`] - no response within 30 seconds
/// - [`FetchError::Network`] - connection, DNS, or TLS failure
/// - [`FetchError::HttpStatus`] - non-2xx response
/// - [`FetchError::ResponseTooLarge`] - body exceeded 10MB
///
/// A body that is not valid RSS/Atom is **not** an error: the returned
/// [`FetchedFeed`] carries the parser's complaint in `malformed`.
pub async fn fetch_feed(client: &reqwest::Client, url: &str) -> Result<FetchedFeed, FetchError> {
    let response = tokio::time::timeout(FETCH_TIMEOUT, client.get(url).send())
        .await
        .map_err(|_| FetchError::Timeout)?
        .map_err(FetchError::Network)?;

    if !response.status().is_success() {
        return Err(FetchError::HttpStatus(response.status().as_u16()));
    }

    let bytes = read_limited_bytes(response, MAX_FEED_SIZE).await?;

    match feed_rs::parser::parse(&bytes[..]) {
        Ok(feed) => Ok(FetchedFeed {
            entries: feed.entries.into_iter().map(raw_entry).collect(),
            malformed: None,
        }),
        Err(e) => Ok(FetchedFeed {
            entries: Vec::new(),
            malformed: Some(e.to_string()),
        }),
    }
}

/// Maps a decoded `feed-rs` entry into the loose [`RawEntry`] shape.
///
/// Summary falls back to the entry's content body when no explicit summary
/// or description element was present.
fn raw_entry(entry: feed_rs::model::Entry) -> RawEntry {
    let link = entry.links.first().map(|l| l.href.clone());
    let summary = entry
        .summary
        .map(|s| s.content)
        .or_else(|| entry.content.and_then(|c| c.body));
    RawEntry {
        title: entry.title.map(|t| t.content),
        link,
        summary,
        published: entry.published,
        updated: entry.updated,
        published_raw: None,
    }
}

/// Reads a response body with a hard size cap.
///
/// Checks `Content-Length` up front when present, then enforces the cap
/// while streaming so a lying or absent header cannot exhaust memory.
async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(FetchError::ResponseTooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(FetchError::Network)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}
