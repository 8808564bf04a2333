//! URI Registry
//!
//! The closed set of addressable resource shapes. Each [`Resource`] variant
//! carries its path pattern, backing table, and content-type data; every
//! dispatch site matches exhaustively, so adding a variant is a compile-time
//! checklist of the places that must handle it.

use crate::schema;
use crate::uri::AUTHORITY;

/// Directory-style content-type base used for collection responses.
pub const CONTENT_TYPE_DIR: &str = "vnd.vcc.dir";
/// Item-style content-type base used for single-item responses.
pub const CONTENT_TYPE_ITEM: &str = "vnd.vcc.item";

/// A registered resource shape.
///
/// `*` in a pattern matches exactly one path segment and captures it as the
/// resource identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    /// `categories`: all categories.
    Categories,
    /// `categories/*`: a single category.
    Category,
    /// `categories/*/videos`: the videos belonging to a category.
    CategoryVideos,
    /// `videos`: all videos.
    Videos,
    /// `videos/*`: a single video.
    Video,
}

impl Resource {
    /// All registered resources, in registration priority order.
    pub const ALL: [Resource; 5] = [
        Resource::Categories,
        Resource::Category,
        Resource::CategoryVideos,
        Resource::Videos,
        Resource::Video,
    ];

    /// Stable dispatch code.
    pub fn code(&self) -> u32 {
        match self {
            Resource::Categories => 100,
            Resource::Category => 101,
            Resource::CategoryVideos => 102,
            Resource::Videos => 200,
            Resource::Video => 201,
        }
    }

    /// Path pattern this resource is registered under.
    pub fn pattern(&self) -> &'static str {
        match self {
            Resource::Categories => "categories",
            Resource::Category => "categories/*",
            Resource::CategoryVideos => "categories/*/videos",
            Resource::Videos => "videos",
            Resource::Video => "videos/*",
        }
    }

    /// Backing table. The nested collection targets the association table;
    /// its query path joins into the videos table.
    pub fn table(&self) -> &'static str {
        match self {
            Resource::Categories | Resource::Category => schema::CATEGORIES_TABLE,
            Resource::CategoryVideos => schema::ASSOCIATIONS_TABLE,
            Resource::Videos | Resource::Video => schema::VIDEOS_TABLE,
        }
    }

    /// Whether this shape addresses a single item rather than a collection.
    pub fn is_item(&self) -> bool {
        match self {
            Resource::Category | Resource::Video => true,
            Resource::Categories | Resource::CategoryVideos | Resource::Videos => false,
        }
    }

    /// MIME content type for responses of this shape.
    pub fn content_type(&self) -> String {
        let base = if self.is_item() {
            CONTENT_TYPE_ITEM
        } else {
            CONTENT_TYPE_DIR
        };
        format!("{}/vnd.{}.{}", base, AUTHORITY, self.type_suffix())
    }

    /// Row kind this shape yields. The nested collection returns video rows.
    fn type_suffix(&self) -> &'static str {
        match self {
            Resource::Categories | Resource::Category => "category",
            Resource::CategoryVideos | Resource::Videos | Resource::Video => "video",
        }
    }
}
