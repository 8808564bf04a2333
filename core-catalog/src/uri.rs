//! Catalog URI value type
//!
//! Every addressable resource in the store is named by a URI of the form
//! `catalog://<authority>/<path>`. The authority is a fixed provider
//! identifier; the path selects one of the registered resource shapes
//! (see [`crate::registry::Resource`]).

use crate::error::{CatalogError, Result};
use std::fmt;

/// URI scheme for all catalog resources.
pub const SCHEME: &str = "catalog";

/// Fixed provider authority. All URIs handled by the store carry it.
pub const AUTHORITY: &str = "catalog.vcc";

/// A parsed, validated catalog URI.
///
/// Only scheme, authority, and path segments are retained; query strings and
/// fragments are ignored because resource matching is purely structural.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CatalogUri {
    segments: Vec<String>,
}

impl CatalogUri {
    /// URI of the categories collection.
    pub fn categories() -> Self {
        Self::from_segments(vec!["categories".to_string()])
    }

    /// URI of a single category.
    pub fn category(id: &str) -> Self {
        Self::from_segments(vec!["categories".to_string(), id.to_string()])
    }

    /// URI of the videos belonging to a category (nested collection).
    pub fn category_videos(id: &str) -> Self {
        Self::from_segments(vec![
            "categories".to_string(),
            id.to_string(),
            "videos".to_string(),
        ])
    }

    /// URI of the videos collection.
    pub fn videos() -> Self {
        Self::from_segments(vec!["videos".to_string()])
    }

    /// URI of a single video.
    pub fn video(id: &str) -> Self {
        Self::from_segments(vec!["videos".to_string(), id.to_string()])
    }

    fn from_segments(segments: Vec<String>) -> Self {
        Self { segments }
    }

    /// Parse a URI string.
    ///
    /// Rejects a wrong scheme or authority and empty path segments, trailing
    /// slashes included, so `Display` and `parse` round-trip exactly. The
    /// path itself is not validated against the registry here; unregistered
    /// shapes surface later as `UnknownUri` from the matcher.
    pub fn parse(input: &str) -> Result<Self> {
        let rest = input
            .strip_prefix(SCHEME)
            .and_then(|r| r.strip_prefix("://"))
            .ok_or_else(|| CatalogError::InvalidUri(format!("expected {SCHEME}:// in {input}")))?;

        // Structural matching only: drop query string and fragment.
        let rest = rest.split(['?', '#']).next().unwrap_or("");

        let (authority, path) = rest
            .split_once('/')
            .ok_or_else(|| CatalogError::InvalidUri(format!("missing path in {input}")))?;

        if authority != AUTHORITY {
            return Err(CatalogError::InvalidUri(format!(
                "unexpected authority {authority} in {input}"
            )));
        }

        let segments: Vec<String> = path.split('/').map(str::to_string).collect();

        if segments.is_empty() || segments.iter().any(String::is_empty) {
            return Err(CatalogError::InvalidUri(format!("empty path segment in {input}")));
        }

        Ok(Self::from_segments(segments))
    }

    /// Path segments, in order.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The trailing path segment. Item URIs carry the row identifier here.
    pub fn last_segment(&self) -> &str {
        self.segments
            .last()
            .map(String::as_str)
            .unwrap_or_default()
    }
}

impl fmt::Display for CatalogUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{SCHEME}://{AUTHORITY}/{}", self.segments.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_round_trip() {
        let uri = CatalogUri::category_videos("c1");
        assert_eq!(uri.to_string(), "catalog://catalog.vcc/categories/c1/videos");
        assert_eq!(CatalogUri::parse(&uri.to_string()).unwrap(), uri);
    }

    #[test]
    fn test_parse_collection() {
        let uri = CatalogUri::parse("catalog://catalog.vcc/videos").unwrap();
        assert_eq!(uri, CatalogUri::videos());
        assert_eq!(uri.segments(), ["videos"]);
    }

    #[test]
    fn test_parse_ignores_query_and_fragment() {
        let uri = CatalogUri::parse("catalog://catalog.vcc/videos/v1?limit=5#top").unwrap();
        assert_eq!(uri, CatalogUri::video("v1"));
        assert_eq!(uri.last_segment(), "v1");
    }

    #[test]
    fn test_parse_rejects_wrong_scheme() {
        let err = CatalogUri::parse("http://catalog.vcc/videos").unwrap_err();
        assert!(matches!(err, CatalogError::InvalidUri(_)));
    }

    #[test]
    fn test_parse_rejects_wrong_authority() {
        let err = CatalogUri::parse("catalog://other.host/videos").unwrap_err();
        assert!(matches!(err, CatalogError::InvalidUri(_)));
    }

    #[test]
    fn test_parse_rejects_empty_segment() {
        assert!(CatalogUri::parse("catalog://catalog.vcc/").is_err());
        assert!(CatalogUri::parse("catalog://catalog.vcc/categories//videos").is_err());
    }

    #[test]
    fn test_trailing_slash_rejected() {
        // A blank item identifier must not silently collapse into the
        // collection URI on a display/parse round trip.
        assert!(CatalogUri::parse("catalog://catalog.vcc/categories/").is_err());
        assert!(CatalogUri::parse(&CatalogUri::category("").to_string()).is_err());
    }
}
