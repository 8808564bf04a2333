//! Remote backend collaborator contract
//!
//! The coordinator consumes this trait; it never performs HTTP or JSON work
//! itself. `provider-web` supplies the production implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures of a single remote fetch.
///
/// The coordinator converts every one of these into a tally on the sync
/// report; they never escape a sync run.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}

/// A category as the remote catalog describes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteCategory {
    pub category_id: String,
    pub title: String,
    /// URL of this category's video list document.
    pub url: String,
}

/// A video entry from a category's list document. Carries enough for a stub
/// row; description and playback URL arrive in later stages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteVideo {
    pub video_id: String,
    pub title: String,
    pub image_url: String,
    pub details_url: String,
    pub list_url: Option<String>,
}

/// The details document of a single video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteVideoDetails {
    pub description: String,
}

/// Remote catalog backend.
///
/// Each operation performs one network fetch and may fail with a
/// [`BackendError`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogBackend: Send + Sync {
    /// Fetch the full category list.
    async fn load_categories(&self) -> Result<Vec<RemoteCategory>, BackendError>;

    /// Fetch the video list of one category.
    async fn load_videos(
        &self,
        category: &RemoteCategory,
    ) -> Result<Vec<RemoteVideo>, BackendError>;

    /// Fetch the details document behind `details_url`.
    async fn load_video_details(
        &self,
        details_url: &str,
    ) -> Result<RemoteVideoDetails, BackendError>;

    /// Resolve the playback URL behind a links document.
    async fn load_video_url(&self, list_url: &str) -> Result<String, BackendError>;
}
