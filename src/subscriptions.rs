//! Subscription loader: OPML file → ordered, deduplicated feed list.
//!
//! A missing or malformed subscription file is a fatal configuration error —
//! the run aborts before any feed is fetched.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;

use crate::category::{classify, Category};

/// Maximum allowed nesting depth for OPML outline elements.
/// Prevents stack abuse from maliciously crafted deeply nested documents.
const MAX_OPML_DEPTH: usize = 50;

/// Errors that can occur while loading the subscription list.
#[derive(Debug, Error)]
pub enum OpmlError {
    /// OPML nesting depth exceeds safety limit.
    #[error("OPML nesting depth exceeds maximum of {0} levels")]
    MaxDepthExceeded(usize),

    /// XML parsing failed.
    #[error("XML parse error: {0}")]
    XmlParse(String),

    /// File I/O error.
    #[error("Failed to read OPML file: {0}")]
    Io(#[from] std::io::Error),
}

/// A feed subscription extracted from the OPML file.
///
/// Identity is the feed URL: when the same `xmlUrl` appears more than once in
/// the document, the first occurrence wins and later ones are dropped.
#[derive(Debug, Clone)]
pub struct FeedSubscription {
    /// Display title. Sourced from the `title` attribute, falling back to
    /// `text`, then to the feed URL itself.
    pub title: String,
    /// URL of the RSS/Atom feed XML (`xmlUrl` attribute).
    pub url: String,
    /// Category guessed from the title/text string at load time.
    pub category: Category,
}

/// Loads feed subscriptions from an OPML file on disk.
///
/// Walks every `<outline>` element carrying an `xmlUrl` attribute, at any
/// nesting depth, in document order. Category/folder outlines without a feed
/// URL are traversed but not emitted.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not well-formed XML.
/// Either condition aborts the whole run — no partial output is produced.
pub async fn load(path: &Path) -> Result<Vec<FeedSubscription>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read OPML file: {}", path.display()))?;
    parse_opml_content(&content)
}

/// Parses OPML content and extracts deduplicated feed subscriptions.
///
/// Internal implementation shared by [`load`]. Handles both nested and flat
/// OPML structures. Duplicate feed URLs keep the first occurrence; later
/// duplicates are dropped silently.
fn parse_opml_content(content: &str) -> Result<Vec<FeedSubscription>> {
    // XXE note: quick-xml (0.37) never parses <!ENTITY> declarations, so
    // custom entities fail with an UnrecognizedEntity error rather than
    // expanding. See the pinned version in Cargo.toml.
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut subscriptions = Vec::new();
    let mut seen_urls: HashSet<String> = HashSet::new();
    let mut buf = Vec::new();
    let mut depth: usize = 0;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.name().as_ref() == b"outline" => {
                depth += 1;
                if depth > MAX_OPML_DEPTH {
                    return Err(OpmlError::MaxDepthExceeded(MAX_OPML_DEPTH).into());
                }

                if let Some(sub) = parse_outline_attributes(&e, &reader)? {
                    if seen_urls.insert(sub.url.clone()) {
                        subscriptions.push(sub);
                    }
                }
            }
            Ok(Event::Empty(e)) if e.name().as_ref() == b"outline" => {
                // Self-closing outline doesn't affect depth
                if let Some(sub) = parse_outline_attributes(&e, &reader)? {
                    if seen_urls.insert(sub.url.clone()) {
                        subscriptions.push(sub);
                    }
                }
            }
            Ok(Event::End(e)) if e.name().as_ref() == b"outline" => {
                depth = depth.saturating_sub(1);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(OpmlError::XmlParse(e.to_string()).into()),
            _ => {}
        }
        buf.clear();
    }

    Ok(subscriptions)
}

/// Extracts a subscription from an outline element.
///
/// Returns `Some(FeedSubscription)` if the outline has an `xmlUrl` attribute,
/// `None` for category/folder outlines. The category is classified from the
/// title/text string only — when both are absent the classifier sees an empty
/// string and falls back to `general`, even though the display title falls
/// back to the URL.
fn parse_outline_attributes(
    e: &quick_xml::events::BytesStart<'_>,
    reader: &Reader<&[u8]>,
) -> Result<Option<FeedSubscription>> {
    let mut xml_url = None;
    let mut title = None;
    let mut text = None;

    for attr_result in e.attributes() {
        let attr = match attr_result {
            Ok(attr) => attr,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping malformed OPML attribute");
                continue;
            }
        };
        let decoder = reader.decoder();
        match attr.key.as_ref() {
            b"xmlUrl" => xml_url = Some(attr.decode_and_unescape_value(decoder)?.to_string()),
            b"title" => title = Some(attr.decode_and_unescape_value(decoder)?.to_string()),
            b"text" => text = Some(attr.decode_and_unescape_value(decoder)?.to_string()),
            _ => {}
        }
    }

    let Some(url) = xml_url else {
        return Ok(None);
    };

    let display = title.or(text);
    let category = classify(display.as_deref().unwrap_or(""));
    Ok(Some(FeedSubscription {
        title: display.unwrap_or_else(|| url.clone()),
        url,
        category,
    }))
}
