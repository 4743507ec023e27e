//! HTTP transport used by the postcode client.
//!
//! The client only needs two verbs, so they sit behind a small trait. The
//! reqwest implementation is used at runtime; tests substitute canned responses.

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use tracing::debug;

use super::error::PostcodeError;

/// Status and body of an HTTP response
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Sends requests to the postcode API
#[allow(async_fn_in_trait)]
pub trait HttpTransport {
    /// Issues a GET request.
    async fn get(&self, url: Url) -> Result<HttpResponse, PostcodeError>;

    /// Issues a POST request with `body` serialized as JSON.
    async fn post_json(
        &self,
        url: Url,
        body: &serde_json::Value,
    ) -> Result<HttpResponse, PostcodeError>;
}

/// [`HttpTransport`] backed by a reqwest client with a fixed per-request timeout
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Builds a transport whose requests fail with [`PostcodeError::Timeout`] after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, PostcodeError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    async fn read(response: reqwest::Response) -> Result<HttpResponse, PostcodeError> {
        let status = response.status();
        let body = response.text().await?;
        debug!(%status, bytes = body.len(), "received response");
        Ok(HttpResponse { status, body })
    }
}

impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: Url) -> Result<HttpResponse, PostcodeError> {
        debug!(%url, "GET");
        let response = self.client.get(url).send().await?;
        Self::read(response).await
    }

    async fn post_json(
        &self,
        url: Url,
        body: &serde_json::Value,
    ) -> Result<HttpResponse, PostcodeError> {
        debug!(%url, "POST");
        let response = self.client.post(url).json(body).send().await?;
        Self::read(response).await
    }
}
