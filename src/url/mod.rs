//! URL handling module for Sift
//!
//! URLs are the identity key for both the frontier's visited set and the cache,
//! so every URL entering either goes through [`normalize_url`] first.

mod normalize;

pub use normalize::{normalize_url, CrawlUrl};
