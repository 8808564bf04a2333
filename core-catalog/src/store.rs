//! Content Access Façade
//!
//! [`ContentStore`] is the sole read/write gateway to persisted categories,
//! videos, and associations. Every operation first resolves its URI through
//! the matcher; an unmatched URI aborts with the matcher's `UnknownUri`
//! error before any table is touched. Successful mutations emit a
//! [`CatalogEvent::ContentChanged`] scoped to the acted-upon URI so external
//! observers can refresh.

use crate::error::{CatalogError, Result};
use crate::matcher::{ResourceMatch, UriMatcher};
use crate::models::{Category, CategoryVideo, Video};
use crate::registry::Resource;
use crate::repositories::{
    AssociationRepository, CategoryRepository, SqliteAssociationRepository,
    SqliteCategoryRepository, SqliteVideoRepository, VideoRepository,
};
use crate::uri::CatalogUri;
use core_runtime::events::{CatalogEvent, CoreEvent, EventBus};
use sqlx::SqlitePool;
use tracing::{debug, instrument};

/// Typed values for insert operations.
///
/// The variant must agree with the resolved resource: category rows go to
/// the categories collection, video rows to the videos collection, and
/// association payloads to a category's nested video collection (which
/// injects the category identifier from the URI path).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentValues {
    Category(Category),
    Video(Video),
    /// Membership payload for `categories/{id}/videos`; the category half of
    /// the pair comes from the URI.
    Association { video_id: String },
}

/// Rows produced by [`ContentStore::query`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryResult {
    Categories(Vec<Category>),
    Videos(Vec<Video>),
}

impl QueryResult {
    /// Number of rows.
    pub fn len(&self) -> usize {
        match self {
            QueryResult::Categories(rows) => rows.len(),
            QueryResult::Videos(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Category rows, if this result carries them.
    pub fn categories(&self) -> Option<&[Category]> {
        match self {
            QueryResult::Categories(rows) => Some(rows),
            QueryResult::Videos(_) => None,
        }
    }

    /// Video rows, if this result carries them.
    pub fn videos(&self) -> Option<&[Video]> {
        match self {
            QueryResult::Videos(rows) => Some(rows),
            QueryResult::Categories(_) => None,
        }
    }
}

/// The provider-like read/write gateway over the catalog tables.
pub struct ContentStore {
    matcher: UriMatcher,
    events: EventBus,
    categories: SqliteCategoryRepository,
    videos: SqliteVideoRepository,
    associations: SqliteAssociationRepository,
}

impl ContentStore {
    /// Create a store over an already-prepared pool (see `db::create_pool`).
    pub fn new(pool: SqlitePool, events: EventBus) -> Self {
        Self {
            matcher: UriMatcher::new(),
            events,
            categories: SqliteCategoryRepository::new(pool.clone()),
            videos: SqliteVideoRepository::new(pool.clone()),
            associations: SqliteAssociationRepository::new(pool),
        }
    }

    /// The matcher this store validates URIs with.
    pub fn matcher(&self) -> &UriMatcher {
        &self.matcher
    }

    /// Query the rows addressed by `uri`.
    ///
    /// Collections return all rows; items return zero or one row filtered by
    /// the trailing path identifier; a category's nested collection joins
    /// the association table into the videos table and returns video rows.
    #[instrument(skip(self), fields(uri = %uri))]
    pub async fn query(&self, uri: &CatalogUri) -> Result<QueryResult> {
        let matched = self.matcher.match_uri(uri)?;

        match matched.resource {
            Resource::Categories => Ok(QueryResult::Categories(self.categories.list().await?)),
            Resource::Category => {
                let id = require_id(&matched, uri)?;
                let rows = self.categories.find_by_id(&id).await?.into_iter().collect();
                Ok(QueryResult::Categories(rows))
            }
            Resource::CategoryVideos => {
                let id = require_id(&matched, uri)?;
                Ok(QueryResult::Videos(
                    self.associations.videos_for_category(&id).await?,
                ))
            }
            Resource::Videos => Ok(QueryResult::Videos(self.videos.list().await?)),
            Resource::Video => {
                let id = require_id(&matched, uri)?;
                let rows = self.videos.find_by_id(&id).await?.into_iter().collect();
                Ok(QueryResult::Videos(rows))
            }
        }
    }

    /// Insert (or replace) one row addressed by `uri`.
    ///
    /// Returns the URI of the affected resource: the item URI for collection
    /// inserts, the nested-collection URI for association inserts. Item URIs
    /// do not accept inserts.
    #[instrument(skip(self, values), fields(uri = %uri))]
    pub async fn insert(&self, uri: &CatalogUri, values: ContentValues) -> Result<CatalogUri> {
        let matched = self.matcher.match_uri(uri)?;

        let affected = match (matched.resource, values) {
            (Resource::Categories, ContentValues::Category(category)) => {
                self.categories.upsert(&category).await?;
                CatalogUri::category(&category.category_id)
            }
            (Resource::Videos, ContentValues::Video(video)) => {
                self.videos.upsert(&video).await?;
                CatalogUri::video(&video.video_id)
            }
            (Resource::CategoryVideos, ContentValues::Association { video_id }) => {
                let category_id = require_id(&matched, uri)?;
                self.associations
                    .upsert(&CategoryVideo {
                        category_id: category_id.clone(),
                        video_id,
                    })
                    .await?;
                CatalogUri::category_videos(&category_id)
            }
            (Resource::Category | Resource::Video, _) => {
                return Err(CatalogError::Unsupported {
                    operation: "insert",
                    uri: uri.to_string(),
                });
            }
            (resource, values) => {
                return Err(values_mismatch(resource, &values));
            }
        };

        self.notify(&affected);
        Ok(affected)
    }

    /// Insert (or replace) a batch of rows in a single transaction.
    ///
    /// All values must agree with the resolved resource; one change
    /// notification is emitted for the whole batch. Returns the number of
    /// rows written.
    #[instrument(skip(self, values), fields(uri = %uri, rows = values.len()))]
    pub async fn insert_batch(&self, uri: &CatalogUri, values: Vec<ContentValues>) -> Result<u64> {
        let matched = self.matcher.match_uri(uri)?;

        let written = match matched.resource {
            Resource::Categories => {
                let rows = values
                    .into_iter()
                    .map(|v| match v {
                        ContentValues::Category(category) => Ok(category),
                        other => Err(values_mismatch(Resource::Categories, &other)),
                    })
                    .collect::<Result<Vec<_>>>()?;
                self.categories.upsert_many(&rows).await?
            }
            Resource::Videos => {
                let rows = values
                    .into_iter()
                    .map(|v| match v {
                        ContentValues::Video(video) => Ok(video),
                        other => Err(values_mismatch(Resource::Videos, &other)),
                    })
                    .collect::<Result<Vec<_>>>()?;
                self.videos.upsert_many(&rows).await?
            }
            Resource::CategoryVideos => {
                let category_id = require_id(&matched, uri)?;
                let rows = values
                    .into_iter()
                    .map(|v| match v {
                        ContentValues::Association { video_id } => Ok(CategoryVideo {
                            category_id: category_id.clone(),
                            video_id,
                        }),
                        other => Err(values_mismatch(Resource::CategoryVideos, &other)),
                    })
                    .collect::<Result<Vec<_>>>()?;
                self.associations.upsert_many(&rows).await?
            }
            Resource::Category | Resource::Video => {
                return Err(CatalogError::Unsupported {
                    operation: "insert",
                    uri: uri.to_string(),
                });
            }
        };

        self.notify(uri);
        Ok(written)
    }

    /// Delete the rows addressed by `uri`, returning the number removed.
    ///
    /// Collections delete every row of their table; items delete by
    /// identifier; a category's nested collection deletes its association
    /// rows only and never cascades into the videos table.
    #[instrument(skip(self), fields(uri = %uri))]
    pub async fn delete(&self, uri: &CatalogUri) -> Result<u64> {
        let matched = self.matcher.match_uri(uri)?;

        let removed = match matched.resource {
            Resource::Categories => self.categories.delete_all().await?,
            Resource::Category => {
                let id = require_id(&matched, uri)?;
                self.categories.delete_by_id(&id).await?
            }
            Resource::CategoryVideos => {
                let id = require_id(&matched, uri)?;
                self.associations.delete_by_category(&id).await?
            }
            Resource::Videos => self.videos.delete_all().await?,
            Resource::Video => {
                let id = require_id(&matched, uri)?;
                self.videos.delete_by_id(&id).await?
            }
        };

        self.notify(uri);
        Ok(removed)
    }

    /// Update is deliberately a no-op: replace-on-conflict insert is the
    /// only write path in this store. The URI is still validated, so unknown
    /// URIs fail; a valid URI always reports zero affected rows.
    pub async fn update(&self, uri: &CatalogUri, _values: ContentValues) -> Result<u64> {
        self.matcher.match_uri(uri)?;
        debug!(uri = %uri, "update ignored; rows are replaced via insert");
        Ok(0)
    }

    /// MIME content type of the resource addressed by `uri`.
    ///
    /// Unlike every other operation this degrades to `None` for unmatched
    /// URIs: content-type negotiation must not fail callers that probe
    /// unknown URIs.
    pub fn content_type(&self, uri: &CatalogUri) -> Option<String> {
        self.matcher
            .match_uri(uri)
            .ok()
            .map(|m| m.resource.content_type())
    }

    fn notify(&self, uri: &CatalogUri) {
        // Emission fails only with no subscribers, which is fine.
        self.events
            .emit(CoreEvent::Catalog(CatalogEvent::ContentChanged {
                uri: uri.to_string(),
            }))
            .ok();
    }
}

/// Item and nested-collection patterns always capture an identifier; a miss
/// here means the registry and matcher disagree.
fn require_id(matched: &ResourceMatch, uri: &CatalogUri) -> Result<String> {
    matched
        .id
        .clone()
        .ok_or_else(|| CatalogError::InvalidUri(format!("missing identifier in {uri}")))
}

fn values_mismatch(resource: Resource, values: &ContentValues) -> CatalogError {
    let variant = match values {
        ContentValues::Category(_) => "category",
        ContentValues::Video(_) => "video",
        ContentValues::Association { .. } => "association",
    };
    CatalogError::InvalidInput {
        field: "values".to_string(),
        message: format!("{variant} values do not fit {:?}", resource),
    }
}
