//! HTTP access to the remote store.
//!
//! The remote engine only talks to the store through [`HttpTransport`], so
//! tests can substitute a recording double for [`ReqwestTransport`].

use std::fmt::Debug;
use std::time::Duration;

use log::debug;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::CONTENT_TYPE;

use crate::error::{Result, SearchError};
use crate::remote::config::RemoteConfig;

/// Default connection timeout for requests.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default timeout for a whole request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A response of any status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub reason: String,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            reason: String::new(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }

    /// A client or server error status (400 and above).
    pub fn is_error(&self) -> bool {
        self.status >= 400
    }

    /// Turn a non-success status into an `Http` error.
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(SearchError::http(self.status, self.reason, self.body))
        }
    }
}

/// Blocking HTTP calls used by the remote engine.
///
/// An `Err` means the request could not be completed; every status code,
/// including errors, comes back as an `HttpResponse`.
pub trait HttpTransport: Send + Sync + Debug {
    fn get(&self, url: &str) -> Result<HttpResponse>;

    fn put_json(&self, url: &str, body: &str) -> Result<HttpResponse>;

    fn post_json(&self, url: &str, body: &str) -> Result<HttpResponse>;

    fn delete(&self, url: &str) -> Result<HttpResponse>;
}

/// [`HttpTransport`] over a blocking `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a transport with default timeouts.
    pub fn new() -> Result<Self> {
        Self::with_timeouts(DEFAULT_CONNECT_TIMEOUT, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeouts(connect_timeout: Duration, request_timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(request_timeout)
            .build()
            .map_err(|e| SearchError::transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    pub fn from_config(config: &RemoteConfig) -> Result<Self> {
        Self::with_timeouts(
            Duration::from_secs(config.connect_timeout_secs),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    fn send(&self, method: &str, url: &str, request: RequestBuilder) -> Result<HttpResponse> {
        debug!("{method} {url}");
        let response = request
            .send()
            .map_err(|e| SearchError::transport(format!("{method} {url}: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| SearchError::transport(format!("{method} {url}: {e}")))?;
        debug!("{method} {url} -> {status}");

        Ok(HttpResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            body,
        })
    }
}

impl HttpTransport for ReqwestTransport {
    fn get(&self, url: &str) -> Result<HttpResponse> {
        self.send("GET", url, self.client.get(url))
    }

    fn put_json(&self, url: &str, body: &str) -> Result<HttpResponse> {
        let request = self
            .client
            .put(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body.to_string());
        self.send("PUT", url, request)
    }

    fn post_json(&self, url: &str, body: &str) -> Result<HttpResponse> {
        let request = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body.to_string());
        self.send("POST", url, request)
    }

    fn delete(&self, url: &str) -> Result<HttpResponse> {
        self.send("DELETE", url, self.client.delete(url))
    }
}
