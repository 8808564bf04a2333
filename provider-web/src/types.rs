//! Catalog web API response types
//!
//! Data structures for deserializing the JSON catalog feed documents.

use serde::{Deserialize, Serialize};

/// Top-level category index document.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryListResponse {
    /// All categories the catalog publishes.
    pub categories: Vec<CategoryDto>,
}

/// One category entry from the index document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDto {
    /// Stable category identifier
    pub id: String,

    /// Display title
    pub title: String,

    /// URL of this category's video list document
    pub videos_url: String,
}

/// A category's video list document.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoListResponse {
    /// Videos belonging to the category
    pub videos: Vec<VideoDto>,
}

/// One video entry from a category's list document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoDto {
    /// Stable video identifier
    pub id: String,

    /// Display title
    pub title: String,

    /// Card/thumbnail image URL
    pub card_image_url: String,

    /// URL of the per-video details document
    pub details_url: String,

    /// URL of the per-video links document (omitted for unplayable entries)
    #[serde(default)]
    pub links_url: Option<String>,
}

/// A video's details document.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoDetailsResponse {
    /// Long-form description text
    pub description: String,
}

/// A video's links document.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoLinksResponse {
    /// Playable sources, best first
    pub sources: Vec<VideoSourceDto>,
}

/// One playable source from a links document.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSourceDto {
    /// Stream URL
    pub url: String,

    /// Optional quality label ("1080p", "720p", ...)
    #[serde(default)]
    pub quality: Option<String>,
}
