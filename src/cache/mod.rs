//! Cache module for storing lookup results to disk
//!
//! Validation and autocomplete results are kept in a single JSON file so that
//! repeated lookups of the same postcode or prefix never hit the network twice.
//! The store sits behind the [`CacheStore`] trait and is handed to the API client,
//! so tests can swap in [`MemoryCache`].

mod store;

pub use store::{
    CacheEntry, CacheError, CacheMap, CacheStore, FileCache, MemoryCache, DEFAULT_CACHE_FILE,
};
