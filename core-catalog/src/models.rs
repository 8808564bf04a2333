//! Domain models for the catalog cache
//!
//! Rows as the store persists and returns them. Identifiers are externally
//! assigned strings, unique within their table with replace-on-conflict
//! semantics; the surrogate primary key never appears here.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A named grouping of videos sourced from the remote catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Category {
    /// Externally assigned identifier, unique across categories.
    pub category_id: String,
    /// Display title.
    pub title: String,
    /// Source URL of the category's remote video list.
    pub url: String,
}

impl Category {
    /// Validate invariants the schema cannot express.
    pub fn validate(&self) -> Result<(), String> {
        if self.category_id.trim().is_empty() {
            return Err("category_id must not be blank".to_string());
        }
        Ok(())
    }
}

/// A video row.
///
/// The nullable fields are populated in later sync stages: `description` by
/// the details fetch, `video_url` by playback URL resolution. A row missing
/// them is a stub, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Video {
    /// Externally assigned identifier, unique across videos.
    pub video_id: String,
    /// Display title.
    pub title: String,
    /// Card/poster image URL.
    pub image_url: String,
    /// URL of the remote details document.
    pub details_url: String,
    /// Long description; absent until the details stage completes.
    pub description: Option<String>,
    /// URL of the remote links document used to resolve playback.
    pub list_url: Option<String>,
    /// Resolved playback URL; absent until the final sync stage completes.
    pub video_url: Option<String>,
}

impl Video {
    pub fn validate(&self) -> Result<(), String> {
        if self.video_id.trim().is_empty() {
            return Err("video_id must not be blank".to_string());
        }
        Ok(())
    }
}

/// A (category, video) membership row.
///
/// Unique per pair with replace-on-conflict. Both identifiers should
/// reference existing rows, but the store does not enforce it: deletions do
/// not cascade, and the next sync run reconciles any dangling rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct CategoryVideo {
    pub category_id: String,
    pub video_id: String,
}

impl CategoryVideo {
    pub fn validate(&self) -> Result<(), String> {
        if self.category_id.trim().is_empty() {
            return Err("category_id must not be blank".to_string());
        }
        if self.video_id.trim().is_empty() {
            return Err("video_id must not be blank".to_string());
        }
        Ok(())
    }
}
