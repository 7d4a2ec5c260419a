//! Wire types shared across the pipeline and the snapshot file.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::category::Category;

/// A single normalized news entry, the canonical record of the pipeline.
///
/// Invariant: `title` and `link` are never empty — entries missing either are
/// dropped during normalization. `published` is `None` when no usable
/// timestamp could be derived from the entry; that is an ordinary state, not
/// an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub link: String,
    pub summary: String,
    /// Display title of the feed the entry came from.
    pub source: String,
    pub category: Category,
    /// UTC publication instant, serialized as RFC 3339 or JSON null.
    pub published: Option<DateTime<Utc>>,
}

/// Root of the JSON digest file. Rebuilt from scratch every run; the file is
/// replaced wholesale, never appended to or merged with a prior snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub generated_at: DateTime<Utc>,
    pub days_back: u32,
    pub total_items: usize,
    /// Sorted by `published` descending; unknown timestamps sort last.
    pub items: Vec<NewsItem>,
}
