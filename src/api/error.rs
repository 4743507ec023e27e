//! Errors returned by the postcodes.io client.

use thiserror::Error;

use crate::cache::CacheError;

/// Coarse classification of a [`PostcodeError`]
///
/// Lets callers tell "fix your call" apart from "retry later" and "no data".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller passed input that can never succeed
    Usage,
    /// The remote service could not be reached or reported a server error
    Unavailable,
    /// The query was valid but matched nothing
    NoData,
    /// A local failure: bad cache file, unexpected response shape, bad configuration
    Internal,
}

/// Errors that can occur when looking up postcodes
#[derive(Debug, Error)]
pub enum PostcodeError {
    /// Input rejected before any network access
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The API answered with a server error
    #[error("postcode service unavailable (HTTP {status})")]
    ServiceUnavailable { status: u16 },

    /// The request exceeded the configured timeout
    #[error("request to postcode service timed out")]
    Timeout,

    /// Transport-level failure (connection refused, DNS, TLS, ...)
    #[error("HTTP request failed: {0}")]
    Http(reqwest::Error),

    /// The query yielded no results
    #[error("no results for {0}")]
    NotFound(String),

    /// The response body had no `result` field
    #[error("API response did not contain a result")]
    MissingResult,

    /// The response body was not the JSON we expected
    #[error("failed to parse API response: {0}")]
    Json(#[from] serde_json::Error),

    /// The configured base URL cannot have paths appended to it
    #[error("invalid API base URL: {0}")]
    BaseUrl(String),

    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl From<reqwest::Error> for PostcodeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            PostcodeError::Timeout
        } else {
            PostcodeError::Http(err)
        }
    }
}

impl PostcodeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PostcodeError::InvalidInput(_) => ErrorKind::Usage,
            PostcodeError::ServiceUnavailable { .. }
            | PostcodeError::Timeout
            | PostcodeError::Http(_) => ErrorKind::Unavailable,
            PostcodeError::NotFound(_) => ErrorKind::NoData,
            PostcodeError::MissingResult
            | PostcodeError::Json(_)
            | PostcodeError::BaseUrl(_)
            | PostcodeError::Cache(_) => ErrorKind::Internal,
        }
    }

    /// Whether the same call might succeed later
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Unavailable
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NoData
    }
}
