//! postcodes.io API client
//!
//! Wraps the four endpoints this tool uses. Validation and autocomplete results
//! are cached through the injected [`CacheStore`]; reverse geocoding and bulk
//! detail lookups always go to the network.

use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::error::PostcodeError;
use super::transport::{HttpResponse, HttpTransport};
use crate::cache::{CacheEntry, CacheStore};

/// Base URL for the postcodes.io API
pub const DEFAULT_BASE_URL: &str = "https://api.postcodes.io";

/// Most postcodes the bulk endpoint accepts in one request
pub const MAX_BULK_POSTCODES: usize = 100;

/// Envelope shared by every postcodes.io response
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    result: Option<T>,
}

/// A single record from the reverse geocoding endpoint
#[derive(Debug, Deserialize)]
struct LocationRecord {
    postcode: String,
}

/// Client for the postcodes.io API with a lookup cache
#[derive(Debug)]
pub struct PostcodeClient<T, C> {
    transport: T,
    cache: C,
    base_url: Url,
}

impl<T: HttpTransport, C: CacheStore> PostcodeClient<T, C> {
    /// Creates a client that talks to `base_url` through `transport` and caches into `cache`.
    pub fn new(transport: T, cache: C, base_url: &str) -> Result<Self, PostcodeError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| PostcodeError::BaseUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(PostcodeError::BaseUrl(base_url.to_string()));
        }

        Ok(Self {
            transport,
            cache,
            base_url,
        })
    }

    /// Returns the cache store backing this client
    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Checks whether `postcode` is a real postcode.
    ///
    /// # Returns
    /// * `Ok(true)` / `Ok(false)` - The validity reported by the API or cache
    /// * `Err(PostcodeError::InvalidInput)` - If the postcode is blank
    /// * `Err(PostcodeError::ServiceUnavailable)` - If the API reports a server error
    pub async fn validate(&self, postcode: &str) -> Result<bool, PostcodeError> {
        let key = normalize_key(postcode)?;
        let mut cache = self.cache.load()?;

        if let Some(CacheEntry::Validity { valid }) = cache.get(&key) {
            debug!(postcode = %key, valid, "validation cache hit");
            return Ok(*valid);
        }
        debug!(postcode = %key, "validation cache miss");

        let url = self.endpoint(&["postcodes", key.as_str(), "validate"])?;
        let response = self.transport.get(url).await?;
        let valid = parse_result::<bool>(&response)?.ok_or(PostcodeError::MissingResult)?;

        info!(postcode = %key, valid, "validated postcode");
        cache.insert(key, CacheEntry::Validity { valid });
        self.cache.save(&cache)?;

        Ok(valid)
    }

    /// Lists full postcodes beginning with `prefix`.
    ///
    /// The returned list is whatever the API sent, in order; callers take as
    /// many as they need. A prefix with no matches is [`PostcodeError::NotFound`]
    /// and is not cached.
    pub async fn complete(&self, prefix: &str) -> Result<Vec<String>, PostcodeError> {
        let key = normalize_key(prefix)?;
        let mut cache = self.cache.load()?;

        if let Some(CacheEntry::Completions { completions }) = cache.get(&key) {
            debug!(prefix = %key, count = completions.len(), "autocomplete cache hit");
            return Ok(completions.clone());
        }
        debug!(prefix = %key, "autocomplete cache miss");

        let url = self.endpoint(&["postcodes", key.as_str(), "autocomplete"])?;
        let response = self.transport.get(url).await?;
        let completions = parse_result::<Vec<String>>(&response)?
            .ok_or_else(|| PostcodeError::NotFound(key.clone()))?;

        info!(prefix = %key, count = completions.len(), "fetched completions");
        cache.insert(
            key,
            CacheEntry::Completions {
                completions: completions.clone(),
            },
        );
        self.cache.save(&cache)?;

        Ok(completions)
    }

    /// Finds the postcode nearest to the given coordinates.
    pub async fn locate(&self, lat: f64, lon: f64) -> Result<String, PostcodeError> {
        check_coordinates(lat, lon)?;

        let mut url = self.endpoint(&["postcodes"])?;
        url.query_pairs_mut()
            .append_pair("lon", &lon.to_string())
            .append_pair("lat", &lat.to_string());

        let response = self.transport.get(url).await?;
        let records = parse_result::<Vec<LocationRecord>>(&response)?.unwrap_or_default();

        records
            .into_iter()
            .next()
            .map(|record| record.postcode)
            .ok_or_else(|| PostcodeError::NotFound(format!("{lat}, {lon}")))
    }

    /// Fetches full details for several postcodes in one request.
    ///
    /// Returns the parsed response body untouched.
    pub async fn details(
        &self,
        postcodes: &[String],
    ) -> Result<serde_json::Value, PostcodeError> {
        if postcodes.is_empty() {
            return Err(PostcodeError::InvalidInput(
                "expected at least one postcode".to_string(),
            ));
        }
        if postcodes.len() > MAX_BULK_POSTCODES {
            return Err(PostcodeError::InvalidInput(format!(
                "at most {MAX_BULK_POSTCODES} postcodes per request, got {}",
                postcodes.len()
            )));
        }
        let postcodes = postcodes
            .iter()
            .map(|p| normalize_key(p))
            .collect::<Result<Vec<_>, _>>()?;

        let url = self.endpoint(&["postcodes"])?;
        let body = serde_json::json!({ "postcodes": postcodes });
        let response = self.transport.post_json(url, &body).await?;
        check_status(&response)?;

        Ok(serde_json::from_str(&response.body)?)
    }

    /// Appends path segments to the base URL, percent-encoding each one
    fn endpoint(&self, segments: &[&str]) -> Result<Url, PostcodeError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| PostcodeError::BaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

/// Trims and upper-cases a postcode or prefix, rejecting blank input
pub fn normalize_key(postcode: &str) -> Result<String, PostcodeError> {
    let key = postcode.trim().to_uppercase();
    if key.is_empty() {
        return Err(PostcodeError::InvalidInput(
            "postcode must not be empty".to_string(),
        ));
    }
    Ok(key)
}

fn check_coordinates(lat: f64, lon: f64) -> Result<(), PostcodeError> {
    if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
        return Err(PostcodeError::InvalidInput(format!(
            "latitude must be between -90 and 90, got {lat}"
        )));
    }
    if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
        return Err(PostcodeError::InvalidInput(format!(
            "longitude must be between -180 and 180, got {lon}"
        )));
    }
    Ok(())
}

fn check_status(response: &HttpResponse) -> Result<(), PostcodeError> {
    if response.status.is_server_error() {
        warn!(status = %response.status, "postcode service returned a server error");
        return Err(PostcodeError::ServiceUnavailable {
            status: response.status.as_u16(),
        });
    }
    Ok(())
}

/// Checks the status, then pulls `result` out of the response envelope
fn parse_result<R: DeserializeOwned>(
    response: &HttpResponse,
) -> Result<Option<R>, PostcodeError> {
    check_status(response)?;
    let envelope: ApiResponse<R> = serde_json::from_str(&response.body)?;
    Ok(envelope.result)
}
