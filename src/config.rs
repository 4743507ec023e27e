//! Runtime configuration
//!
//! Defaults suit the public postcodes.io service. Environment variables
//! override the defaults, and command-line flags override both.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::api::DEFAULT_BASE_URL;
use crate::cache::DEFAULT_CACHE_FILE;

/// Per-request timeout used when nothing else is configured
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

pub const ENV_API_URL: &str = "POSTCODES_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "POSTCODES_TIMEOUT_SECS";
pub const ENV_CACHE_FILE: &str = "POSTCODE_CACHE_FILE";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("POSTCODES_TIMEOUT_SECS must be a positive whole number of seconds, got '{0}'")]
    InvalidTimeout(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Base URL of the postcodes API
    pub base_url: String,
    /// Timeout applied to each HTTP request
    pub timeout: Duration,
    /// Location of the JSON cache file
    pub cache_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            cache_path: PathBuf::from(DEFAULT_CACHE_FILE),
        }
    }
}

impl Config {
    /// Builds a config from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_API_URL) {
            config.base_url = url;
        }
        if let Some(secs) = lookup(ENV_TIMEOUT_SECS) {
            let secs = secs
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|&s| s > 0)
                .ok_or_else(|| ConfigError::InvalidTimeout(secs.clone()))?;
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(path) = lookup(ENV_CACHE_FILE) {
            config.cache_path = PathBuf::from(path);
        }

        Ok(config)
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_path = path.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.base_url, "https://api.postcodes.io");
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.cache_path, PathBuf::from("postcode_cache.json"));
    }

    #[test]
    fn test_empty_environment_gives_defaults() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_environment_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            (ENV_API_URL, "http://localhost:8000"),
            (ENV_TIMEOUT_SECS, "3"),
            (ENV_CACHE_FILE, "/tmp/pc.json"),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.cache_path, PathBuf::from("/tmp/pc.json"));
    }

    #[test]
    fn test_invalid_timeout_is_error() {
        let err = Config::from_lookup(lookup_from(&[(ENV_TIMEOUT_SECS, "soon")])).unwrap_err();
        assert!(err.to_string().contains("soon"));
    }

    #[test]
    fn test_zero_timeout_is_error() {
        let result = Config::from_lookup(lookup_from(&[(ENV_TIMEOUT_SECS, "0")]));
        assert!(matches!(result, Err(ConfigError::InvalidTimeout(ref s)) if s == "0"));
    }

    #[test]
    fn test_builder_overrides() {
        let config = Config::default()
            .with_base_url("http://127.0.0.1:9")
            .with_timeout(Duration::from_secs(1))
            .with_cache_path("cache.json");

        assert_eq!(config.base_url, "http://127.0.0.1:9");
        assert_eq!(config.timeout, Duration::from_secs(1));
        assert_eq!(config.cache_path, PathBuf::from("cache.json"));
    }
}
