//! HTTP transport abstraction
//!
//! The connector drives all fetching through this trait so the retry logic
//! can be exercised against scripted responses; `ReqwestTransport` is the
//! production implementation.

use crate::error::Result;
use async_trait::async_trait;

/// One HTTP response with its body fully read.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body bytes
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// GET-only HTTP transport.
///
/// Transport-level failures (DNS, connect, timeout) surface as
/// `WebError::Transport`; non-2xx statuses are returned as responses and
/// classified by the caller.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Execute one GET request.
    async fn get(&self, url: &str) -> Result<HttpResponse>;
}

/// Production transport over a shared `reqwest::Client`.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Wrap an existing client.
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();
        Ok(HttpResponse { status, body })
    }
}
