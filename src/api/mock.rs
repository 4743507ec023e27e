//! Mock transport for testing without network access.
//!
//! Serves queued responses in order and records every request it receives.

use std::cell::RefCell;
use std::collections::VecDeque;

use reqwest::{StatusCode, Url};

use super::error::PostcodeError;
use super::transport::{HttpResponse, HttpTransport};

/// A request seen by [`MockTransport`]
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: &'static str,
    pub url: String,
    pub body: Option<serde_json::Value>,
}

#[derive(Debug, Default)]
pub struct MockTransport {
    responses: RefCell<VecDeque<HttpResponse>>,
    requests: RefCell<Vec<RecordedRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a 200 response with the given JSON body
    pub fn with_json(self, body: serde_json::Value) -> Self {
        self.with_response(StatusCode::OK, body.to_string())
    }

    pub fn with_response(self, status: StatusCode, body: impl Into<String>) -> Self {
        self.responses
            .borrow_mut()
            .push_back(HttpResponse::new(status, body));
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.borrow().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }

    fn respond(&self, request: RecordedRequest) -> Result<HttpResponse, PostcodeError> {
        let url = request.url.clone();
        self.requests.borrow_mut().push(request);
        self.responses
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| PostcodeError::InvalidInput(format!("unexpected request to {url}")))
    }
}

impl HttpTransport for MockTransport {
    async fn get(&self, url: Url) -> Result<HttpResponse, PostcodeError> {
        self.respond(RecordedRequest {
            method: "GET",
            url: url.to_string(),
            body: None,
        })
    }

    async fn post_json(
        &self,
        url: Url,
        body: &serde_json::Value,
    ) -> Result<HttpResponse, PostcodeError> {
        self.respond(RecordedRequest {
            method: "POST",
            url: url.to_string(),
            body: Some(body.clone()),
        })
    }
}
