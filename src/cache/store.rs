//! Cache store for persisting lookup results to disk
//!
//! The cache is a flat JSON object mapping a normalized postcode (or
//! autocomplete prefix) to one of two record shapes:
//!
//! ```json
//! {
//!   "SW1A 1AA": { "valid": true },
//!   "SW1A": { "completions": ["SW1A 1AA", "SW1A 1AB"] }
//! }
//! ```
//!
//! Entries never expire. The whole mapping is loaded before a lookup and
//! rewritten after every miss, so concurrent writers race and the last one wins.

use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default cache file, relative to the working directory
pub const DEFAULT_CACHE_FILE: &str = "postcode_cache.json";

/// A single cached lookup result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CacheEntry {
    /// Result of a validation lookup
    Validity { valid: bool },
    /// Result of an autocomplete lookup
    Completions { completions: Vec<String> },
}

/// The full in-memory cache, keyed by normalized postcode or prefix
pub type CacheMap = BTreeMap<String, CacheEntry>;

/// Errors that can occur when reading or writing the cache
#[derive(Debug, Error)]
pub enum CacheError {
    /// The cache file could not be read or written
    #[error("cache I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The cache file exists but does not hold a valid mapping
    #[error("malformed cache file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The mapping could not be serialized
    #[error("failed to serialize cache: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Somewhere a [`CacheMap`] can be loaded from and saved to
pub trait CacheStore {
    /// Loads the full mapping. A store with nothing saved yet yields an empty map.
    fn load(&self) -> Result<CacheMap, CacheError>;

    /// Replaces the stored mapping with `cache`.
    fn save(&self, cache: &CacheMap) -> Result<(), CacheError>;
}

/// Cache store backed by a single JSON file
#[derive(Debug, Clone)]
pub struct FileCache {
    path: PathBuf,
}

impl FileCache {
    /// Creates a store for the given file path. Nothing is touched until `load` or `save`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path of the cache file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> CacheError {
        CacheError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl Default for FileCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_FILE)
    }
}

impl CacheStore for FileCache {
    fn load(&self) -> Result<CacheMap, CacheError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(CacheMap::new()),
            Err(e) => return Err(self.io_error(e)),
        };

        serde_json::from_str(&content).map_err(|source| CacheError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    fn save(&self, cache: &CacheMap) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
            }
        }

        let json = serde_json::to_string_pretty(cache)?;
        fs::write(&self.path, json).map_err(|e| self.io_error(e))
    }
}

/// Cache store held entirely in memory
///
/// Useful where filesystem side effects are unwanted. Counts saves so callers
/// can observe whether a lookup persisted anything.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RefCell<CacheMap>,
    saves: Cell<usize>,
}

impl MemoryCache {
    /// Creates an empty in-memory cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an in-memory cache pre-populated with `entries`
    pub fn with_entries(entries: CacheMap) -> Self {
        Self {
            entries: RefCell::new(entries),
            saves: Cell::new(0),
        }
    }

    /// Returns a copy of the current mapping
    pub fn snapshot(&self) -> CacheMap {
        self.entries.borrow().clone()
    }

    /// Number of times `save` has been called
    pub fn save_count(&self) -> usize {
        self.saves.get()
    }
}

impl CacheStore for MemoryCache {
    fn load(&self) -> Result<CacheMap, CacheError> {
        Ok(self.snapshot())
    }

    fn save(&self, cache: &CacheMap) -> Result<(), CacheError> {
        *self.entries.borrow_mut() = cache.clone();
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}
