//! The aggregation pipeline: fetch every subscribed feed, normalize, filter
//! by recency, and merge into one deduplicated mapping.
//!
//! Feeds are processed strictly sequentially in subscription order; each
//! fetch completes (or fails) before the next begins. The only shared state
//! is the in-memory merge map, so ordering here is simple — but the merge
//! rule itself is commutative only because of the "latest timestamp wins,
//! unknown loses ties" comparison in [`merge_item`].

use std::collections::HashMap;

use chrono::{Duration, Utc};

use crate::feed::{fetch_feed, normalize};
use crate::model::NewsItem;
use crate::subscriptions::FeedSubscription;

/// Dedup key for a news item: the link with at most one trailing `/`
/// removed. Nothing else is normalized — scheme, host case, query, and
/// fragment all stay significant.
pub fn canonical_link(link: &str) -> &str {
    link.strip_suffix('/').unwrap_or(link)
}

/// Merges one item into the map under its canonical link.
///
/// The existing item survives only when both timestamps are known and the
/// existing one is greater than or equal to the incoming one. In every other
/// case — no existing entry, either side unknown, or incoming strictly
/// newer — the incoming item is kept. The asymmetry is deliberate: an
/// unknown-dated existing item is always replaced, an unknown-dated incoming
/// item always replaces.
pub fn merge_item(items: &mut HashMap<String, NewsItem>, item: NewsItem) {
    let key = canonical_link(&item.link).to_string();
    if let Some(existing) = items.get(&key) {
        if let (Some(old), Some(new)) = (existing.published, item.published) {
            if old >= new {
                return;
            }
        }
    }
    items.insert(key, item);
}

/// Fetches all subscribed feeds and builds the deduplicated item mapping.
///
/// The recency cutoff (`now - days_back` days) is computed once, up front.
/// Per-feed failures — transport errors or malformed bodies — are logged as
/// warnings and never abort the run; whatever entries a degraded feed did
/// return are still processed. Items with a known `published` earlier than
/// the cutoff are dropped; items with no timestamp always pass the filter.
pub async fn aggregate(
    client: &reqwest::Client,
    subscriptions: &[FeedSubscription],
    days_back: u32,
) -> HashMap<String, NewsItem> {
    let cutoff = Utc::now() - Duration::days(i64::from(days_back));
    let total = subscriptions.len();
    let mut items: HashMap<String, NewsItem> = HashMap::new();

    for (idx, sub) in subscriptions.iter().enumerate() {
        tracing::info!(
            feed = idx + 1,
            total = total,
            title = %sub.title,
            url = %sub.url,
            "Fetching feed"
        );

        let fetched = match fetch_feed(client, &sub.url).await {
            Ok(fetched) => fetched,
            Err(e) => {
                tracing::warn!(url = %sub.url, error = %e, "Feed fetch failed, skipping");
                continue;
            }
        };

        if let Some(complaint) = &fetched.malformed {
            tracing::warn!(url = %sub.url, error = %complaint, "Problem parsing feed");
        }

        for entry in fetched.entries {
            let Some(item) = normalize(entry, &sub.title, sub.category) else {
                continue;
            };

            if let Some(published) = item.published {
                if published < cutoff {
                    continue;
                }
            }

            merge_item(&mut items, item);
        }
    }

    items
}
