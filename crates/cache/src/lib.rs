//! Tag-aware read cache for paginated catalog pages.
//!
//! A write to a catalog resource invalidates every cached page of that
//! resource in one step, keyed by the resource tag. Reads go through
//! [`TagCache::get_or_compute`], which guarantees a single computation per
//! missing key even under concurrent callers.

pub mod key;
pub mod store;

pub use key::{PageParams, page_key, tags};
pub use store::{CacheStats, TagCache};
