//! Entry normalization: loose [`RawEntry`] shapes → canonical [`NewsItem`].
//!
//! This is the adapter described by the pipeline's data model: every field is
//! resolved through an explicit priority list, and "no usable timestamp" is
//! an ordinary `None`, never an error.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::category::Category;
use crate::feed::fetcher::RawEntry;
use crate::model::NewsItem;

/// Converts one raw feed entry into the canonical record.
///
/// Returns `None` (entry discarded) when the entry lacks a non-empty title or
/// a non-empty link — routine feed noise, not worth a log line. Otherwise:
///
/// - `summary` defaults to the empty string
/// - `published` resolves in order: the decoder's parsed published time, the
///   parsed updated time, then [`parse_timestamp`] over the raw date string;
///   all failing leaves it `None`
pub fn normalize(entry: RawEntry, source: &str, category: Category) -> Option<NewsItem> {
    let title = entry.title.filter(|t| !t.is_empty())?;
    let link = entry.link.filter(|l| !l.is_empty())?;

    let published = entry
        .published
        .or(entry.updated)
        .or_else(|| entry.published_raw.as_deref().and_then(parse_timestamp));

    Some(NewsItem {
        title,
        link,
        summary: entry.summary.unwrap_or_default(),
        source: source.to_string(),
        category,
        published,
    })
}

/// Parses an ISO-8601-like timestamp string, assuming UTC when no timezone
/// is given.
///
/// Accepts RFC 3339 (`2024-01-02T03:04:05Z`, `...+01:00`), naive datetimes
/// with `T` or space separators (fractional seconds allowed), and bare dates
/// (midnight UTC). Returns `None` on anything else — parse failure is a data
/// case here, never an error.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    // Naive forms: no timezone info present, assume UTC.
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }

    None
}
