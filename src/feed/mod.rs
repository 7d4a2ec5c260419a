//! Feed retrieval and entry normalization.
//!
//! Two submodules split the boundary the rest of the crate relies on:
//!
//! - [`fetcher`] - HTTP retrieval plus RSS/Atom decoding into loosely-typed
//!   [`RawEntry`] records with a malformed-feed indicator
//! - [`normalize`] - the adapter that turns a [`RawEntry`] into the canonical
//!   [`crate::model::NewsItem`] shape, or drops it
//!
//! Everything downstream of [`normalize`] only ever sees the canonical shape.

pub mod fetcher;
pub mod normalize;

pub use fetcher::{fetch_feed, FetchError, FetchedFeed, RawEntry};
pub use normalize::{normalize, parse_timestamp};
