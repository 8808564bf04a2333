//! JSON catalog web API connector implementation
//!
//! Implements the `CatalogBackend` trait against a static JSON catalog feed.

use async_trait::async_trait;
use core_sync::{BackendError, CatalogBackend, RemoteCategory, RemoteVideo, RemoteVideoDetails};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::error::{Result, WebError};
use crate::transport::{HttpTransport, ReqwestTransport};
use crate::types::{
    CategoryListResponse, VideoDetailsResponse, VideoLinksResponse, VideoListResponse,
};

/// Default number of attempts per fetch
const DEFAULT_MAX_RETRIES: u32 = 3;

/// Request timeout per attempt
const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// JSON catalog web API connector
///
/// Implements `CatalogBackend` over a feed of four document kinds: a
/// category index, per-category video lists, per-video details, and
/// per-video links. Transient failures (transport errors, 429, 5xx) are
/// retried with exponential backoff; other statuses fail immediately.
///
/// # Example
///
/// ```ignore
/// use provider_web::WebCatalogBackend;
/// use core_sync::CatalogBackend;
///
/// let backend = WebCatalogBackend::new("https://catalog.example".to_string())?;
/// let categories = backend.load_categories().await?;
/// ```
pub struct WebCatalogBackend {
    /// HTTP transport for document fetches
    transport: Arc<dyn HttpTransport>,

    /// Base URL of the catalog feed, no trailing slash
    base_url: String,

    /// Attempts per fetch before giving up
    max_retries: u32,
}

impl WebCatalogBackend {
    /// Create a new connector against `base_url`.
    pub fn new(base_url: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// Create a connector reusing an existing client.
    pub fn with_client(client: reqwest::Client, base_url: String) -> Self {
        Self::with_transport(Arc::new(ReqwestTransport::new(client)), base_url)
    }

    /// Create a connector over an arbitrary transport implementation.
    pub fn with_transport(transport: Arc<dyn HttpTransport>, base_url: String) -> Self {
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Resolve a possibly relative document URL against the feed base.
    fn absolute(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            format!("{}/{}", self.base_url, url.trim_start_matches('/'))
        }
    }

    /// Execute a GET with retry logic.
    ///
    /// Implements exponential backoff for rate limiting and transient errors.
    #[instrument(skip(self), fields(url = %url))]
    async fn execute_with_retry(&self, url: &str) -> Result<Vec<u8>> {
        let mut attempt = 0;

        loop {
            match self.transport.get(url).await {
                Ok(response) => {
                    let status = response.status;

                    if response.is_success() {
                        debug!("API request succeeded: status={}", status);
                        return Ok(response.body);
                    } else if status == 429 || (500..600).contains(&status) {
                        // Rate limit or server error - retry with backoff
                        attempt += 1;
                        if attempt >= self.max_retries {
                            warn!(
                                "API request failed after {} attempts: status={}",
                                self.max_retries, status
                            );
                            return Err(WebError::ApiError {
                                status_code: status,
                                message: format!(
                                    "Request failed after {} retries",
                                    self.max_retries
                                ),
                            });
                        }

                        let backoff_ms = 100u64 * 2u64.pow(attempt);
                        warn!(
                            "API request failed (attempt {}/{}): status={}, retrying in {}ms",
                            attempt, self.max_retries, status, backoff_ms
                        );
                        tokio::time::sleep(tokio::time::Duration::from_millis(backoff_ms)).await;
                    } else {
                        // Client error - don't retry
                        warn!("API request failed: status={}", status);
                        return Err(WebError::ApiError {
                            status_code: status,
                            message: String::from_utf8_lossy(&response.body).to_string(),
                        });
                    }
                }
                Err(e) => {
                    attempt += 1;
                    if attempt >= self.max_retries {
                        warn!("API request failed after {} attempts: {}", self.max_retries, e);
                        return Err(e);
                    }

                    let backoff_ms = 100u64 * 2u64.pow(attempt);
                    warn!(
                        "API request failed (attempt {}/{}): {}, retrying in {}ms",
                        attempt, self.max_retries, e, backoff_ms
                    );
                    tokio::time::sleep(tokio::time::Duration::from_millis(backoff_ms)).await;
                }
            }
        }
    }

    /// Fetch and decode one JSON document.
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let body = self.execute_with_retry(url).await?;
        serde_json::from_slice(&body)
            .map_err(|e| WebError::ParseError(format!("Failed to parse {}: {}", url, e)))
    }
}

#[async_trait]
impl CatalogBackend for WebCatalogBackend {
    #[instrument(skip(self))]
    async fn load_categories(
        &self,
    ) -> std::result::Result<Vec<RemoteCategory>, BackendError> {
        info!("Loading category index");

        let url = format!("{}/categories.json", self.base_url);
        let index: CategoryListResponse = self.get_json(&url).await?;

        let categories = index
            .categories
            .into_iter()
            .map(|c| RemoteCategory {
                category_id: c.id,
                title: c.title,
                url: self.absolute(&c.videos_url),
            })
            .collect::<Vec<_>>();

        info!("Loaded {} categories", categories.len());
        Ok(categories)
    }

    #[instrument(skip(self), fields(category_id = %category.category_id))]
    async fn load_videos(
        &self,
        category: &RemoteCategory,
    ) -> std::result::Result<Vec<RemoteVideo>, BackendError> {
        let list: VideoListResponse = self.get_json(&category.url).await?;

        let videos = list
            .videos
            .into_iter()
            .map(|v| RemoteVideo {
                video_id: v.id,
                title: v.title,
                image_url: self.absolute(&v.card_image_url),
                details_url: self.absolute(&v.details_url),
                list_url: v.links_url.map(|u| self.absolute(&u)),
            })
            .collect::<Vec<_>>();

        debug!("Loaded {} videos for {}", videos.len(), category.category_id);
        Ok(videos)
    }

    #[instrument(skip(self), fields(url = %details_url))]
    async fn load_video_details(
        &self,
        details_url: &str,
    ) -> std::result::Result<RemoteVideoDetails, BackendError> {
        let details: VideoDetailsResponse = self.get_json(details_url).await?;
        Ok(RemoteVideoDetails {
            description: details.description,
        })
    }

    #[instrument(skip(self), fields(url = %list_url))]
    async fn load_video_url(
        &self,
        list_url: &str,
    ) -> std::result::Result<String, BackendError> {
        let links: VideoLinksResponse = self.get_json(list_url).await?;
        links
            .sources
            .into_iter()
            .next()
            .map(|source| source.url)
            .ok_or_else(|| BackendError::Decode(format!("No sources in {}", list_url)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::HttpResponse;
    use mockall::mock;

    mock! {
        Transport {}

        #[async_trait]
        impl HttpTransport for Transport {
            async fn get(&self, url: &str) -> Result<HttpResponse>;
        }
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            body: body.as_bytes().to_vec(),
        }
    }

    fn backend(transport: MockTransport) -> WebCatalogBackend {
        WebCatalogBackend::with_transport(Arc::new(transport), "https://catalog.example".to_string())
    }

    fn reqwest_backend(base: &str) -> WebCatalogBackend {
        WebCatalogBackend::with_client(reqwest::Client::new(), base.to_string())
    }

    const DETAILS_BODY: &str = r#"{ "description": "A description" }"#;

    #[test]
    fn test_base_url_is_normalized() {
        let backend = reqwest_backend("https://catalog.example/");
        assert_eq!(backend.base_url, "https://catalog.example");
    }

    #[test]
    fn test_absolute_passes_through_full_urls() {
        let backend = reqwest_backend("https://catalog.example");
        assert_eq!(
            backend.absolute("https://cdn.example/v1.json"),
            "https://cdn.example/v1.json"
        );
    }

    #[test]
    fn test_absolute_joins_relative_paths() {
        let backend = reqwest_backend("https://catalog.example");
        assert_eq!(
            backend.absolute("/news/videos.json"),
            "https://catalog.example/news/videos.json"
        );
        assert_eq!(
            backend.absolute("news/videos.json"),
            "https://catalog.example/news/videos.json"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_server_error_is_retried_then_succeeds() {
        let mut transport = MockTransport::new();
        transport
            .expect_get()
            .times(1)
            .returning(|_| Ok(response(503, "")));
        transport
            .expect_get()
            .times(1)
            .returning(|_| Ok(response(200, DETAILS_BODY)));

        let backend = backend(transport);
        let details = backend
            .load_video_details("https://catalog.example/v1/details.json")
            .await
            .unwrap();
        assert_eq!(details.description, "A description");
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_is_retried() {
        let mut transport = MockTransport::new();
        transport
            .expect_get()
            .times(1)
            .returning(|_| Ok(response(429, "")));
        transport
            .expect_get()
            .times(1)
            .returning(|_| Ok(response(200, DETAILS_BODY)));

        let backend = backend(transport);
        assert!(backend
            .load_video_details("https://catalog.example/v1/details.json")
            .await
            .is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_exhausted_fails_with_status() {
        let mut transport = MockTransport::new();
        // The attempt counter includes the first call, so DEFAULT_MAX_RETRIES
        // bounds the total number of fetches.
        transport
            .expect_get()
            .times(DEFAULT_MAX_RETRIES as usize)
            .returning(|_| Ok(response(500, "")));

        let backend = backend(transport);
        let err = backend
            .load_video_details("https://catalog.example/v1/details.json")
            .await
            .unwrap_err();
        match err {
            BackendError::Http(message) => assert!(message.contains("500"), "{message}"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_client_error_fails_without_retry() {
        let mut transport = MockTransport::new();
        transport
            .expect_get()
            .times(1)
            .returning(|_| Ok(response(404, "no such document")));

        let backend = backend(transport);
        let err = backend
            .load_video_details("https://catalog.example/v1/details.json")
            .await
            .unwrap_err();
        match err {
            BackendError::Http(message) => assert!(message.contains("404"), "{message}"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_body_decodes_remote_categories() {
        let mut transport = MockTransport::new();
        transport.expect_get().times(1).returning(|url: &str| {
            assert_eq!(url, "https://catalog.example/categories.json");
            Ok(response(
                200,
                r#"{
                    "categories": [
                        {
                            "id": "news",
                            "title": "News",
                            "videosUrl": "/news/videos.json"
                        }
                    ]
                }"#,
            ))
        });

        let backend = backend(transport);
        let categories = backend.load_categories().await.unwrap();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].category_id, "news");
        assert_eq!(
            categories[0].url,
            "https://catalog.example/news/videos.json"
        );
    }
}
