//! Builds a consolidated JSON digest of recent security news.
//!
//! The run is a single batch pass: load the OPML subscription list, fetch
//! each feed sequentially, normalize entries into [`model::NewsItem`]
//! records, keep only the recency window, deduplicate by canonical link with
//! a most-recent-wins merge, then write one sorted [`model::Snapshot`] that
//! fully replaces the previous one.

pub mod category;
pub mod config;
pub mod feed;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod subscriptions;

pub use category::{classify, Category};
pub use config::Config;
pub use model::{NewsItem, Snapshot};
pub use pipeline::aggregate;
