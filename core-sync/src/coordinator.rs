//! # Sync Coordinator
//!
//! Orchestrates one synchronization run: pull the content graph from the
//! remote backend and persist it through the content store in four strictly
//! sequential stages.
//!
//! ## Workflow
//!
//! 1. Fetch the category list; persist it into the categories collection.
//! 2. For each category, fetch its video list; persist video stub rows and
//!    the category's membership rows.
//! 3. For each video still lacking a description, fetch its details document
//!    and replace the row.
//! 4. For each video still lacking a playback URL, resolve it from the links
//!    document and replace the row.
//!
//! Every stage's writes go through a single transactional batch (or
//! per-video replacements in stages 3 and 4), and every remote failure
//! becomes a tally on the [`SyncReport`]: a failed fetch skips its category
//! or video and the run keeps going. There is no in-run retry; the next run
//! picks up whatever is still missing.
//!
//! Runs for the same account are serialized: starting a second one while the
//! first is in flight fails with [`SyncError::SyncInProgress`].

use crate::backend::CatalogBackend;
use crate::error::{Result, SyncError};
use crate::report::SyncReport;
use core_catalog::{CatalogUri, Category, ContentStore, ContentValues, QueryResult, Video};
use core_runtime::events::{CoreEvent, EventBus, SyncEvent};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

/// Sync coordinator configuration
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Whether stage 3 (details fetch) runs.
    pub fetch_details: bool,

    /// Whether stage 4 (playback URL resolution) runs.
    pub resolve_playback_urls: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            fetch_details: true,
            resolve_playback_urls: true,
        }
    }
}

/// Orchestrates synchronization runs against one content store.
pub struct SyncCoordinator {
    config: SyncConfig,
    store: Arc<ContentStore>,
    backend: Arc<dyn CatalogBackend>,
    events: EventBus,
    /// Accounts with a run in flight.
    active_syncs: Mutex<HashSet<String>>,
}

impl SyncCoordinator {
    /// Create a new sync coordinator.
    pub fn new(
        config: SyncConfig,
        store: Arc<ContentStore>,
        backend: Arc<dyn CatalogBackend>,
        events: EventBus,
    ) -> Self {
        Self {
            config,
            store,
            backend,
            events,
            active_syncs: Mutex::new(HashSet::new()),
        }
    }

    /// Run one complete synchronization for `account`.
    ///
    /// Remote failures never abort the run; they surface as tallies on the
    /// returned report. Storage failures are fatal and do propagate, since
    /// the store has no recovery strategy for them.
    ///
    /// # Errors
    ///
    /// [`SyncError::SyncInProgress`] when a run for the same account is
    /// already in flight.
    #[instrument(skip(self))]
    pub async fn sync(&self, account: &str) -> Result<SyncReport> {
        {
            let mut active = self.active_syncs.lock().await;
            if !active.insert(account.to_string()) {
                return Err(SyncError::SyncInProgress {
                    account: account.to_string(),
                });
            }
        }

        let result = self.run(account).await;
        self.active_syncs.lock().await.remove(account);
        result
    }

    async fn run(&self, account: &str) -> Result<SyncReport> {
        let mut report = SyncReport::new(account);
        info!(run_id = %report.run_id, account, "Starting sync run");

        self.events
            .emit(CoreEvent::Sync(SyncEvent::Started {
                run_id: report.run_id.to_string(),
                account: account.to_string(),
            }))
            .ok();

        let categories = self.sync_categories(&mut report).await?;
        self.sync_category_videos(&categories, &mut report).await?;
        if self.config.fetch_details {
            self.sync_video_details(&mut report).await?;
        }
        if self.config.resolve_playback_urls {
            self.sync_playback_urls(&mut report).await?;
        }

        report.finish();
        info!(
            run_id = %report.run_id,
            io_errors = report.io_errors,
            categories = report.categories_synced,
            videos = report.videos_synced,
            "Sync run finished"
        );

        self.events
            .emit(CoreEvent::Sync(SyncEvent::Completed {
                run_id: report.run_id.to_string(),
                io_errors: report.io_errors,
                categories_synced: report.categories_synced,
                videos_synced: report.videos_synced,
                duration_secs: report.duration_secs(),
            }))
            .ok();

        Ok(report)
    }

    /// Stage 1: category list.
    ///
    /// A failed fetch tallies once and yields no categories, which ends the
    /// remote half of the run early; stages 3 and 4 still sweep whatever the
    /// store already holds.
    async fn sync_categories(
        &self,
        report: &mut SyncReport,
    ) -> Result<Vec<crate::backend::RemoteCategory>> {
        let remote = match self.backend.load_categories().await {
            Ok(remote) => remote,
            Err(e) => {
                warn!(error = %e, "Category list fetch failed");
                report.record_io_error();
                return Ok(Vec::new());
            }
        };

        if remote.is_empty() {
            return Ok(remote);
        }

        let values = remote
            .iter()
            .map(|c| {
                ContentValues::Category(Category {
                    category_id: c.category_id.clone(),
                    title: c.title.clone(),
                    url: c.url.clone(),
                })
            })
            .collect();
        let written = self
            .store
            .insert_batch(&CatalogUri::categories(), values)
            .await?;
        report.categories_synced += written as u32;

        Ok(remote)
    }

    /// Stage 2: per-category video lists. A category whose fetch fails is
    /// skipped; the others still land.
    ///
    /// A video listed by several categories is stubbed (and tallied) only on
    /// its first appearance; every listing still gets a membership row.
    async fn sync_category_videos(
        &self,
        categories: &[crate::backend::RemoteCategory],
        report: &mut SyncReport,
    ) -> Result<()> {
        let mut stubbed = HashSet::new();

        for category in categories {
            let videos = match self.backend.load_videos(category).await {
                Ok(videos) => videos,
                Err(e) => {
                    warn!(
                        category_id = %category.category_id,
                        error = %e,
                        "Video list fetch failed; skipping category"
                    );
                    report.record_io_error();
                    continue;
                }
            };

            if videos.is_empty() {
                continue;
            }

            let stubs: Vec<ContentValues> = videos
                .iter()
                .filter(|v| stubbed.insert(v.video_id.clone()))
                .map(|v| {
                    ContentValues::Video(Video {
                        video_id: v.video_id.clone(),
                        title: v.title.clone(),
                        image_url: v.image_url.clone(),
                        details_url: v.details_url.clone(),
                        description: None,
                        list_url: v.list_url.clone(),
                        video_url: None,
                    })
                })
                .collect();
            if !stubs.is_empty() {
                let written = self
                    .store
                    .insert_batch(&CatalogUri::videos(), stubs)
                    .await?;
                report.videos_synced += written as u32;
            }

            let memberships = videos
                .iter()
                .map(|v| ContentValues::Association {
                    video_id: v.video_id.clone(),
                })
                .collect();
            let written = self
                .store
                .insert_batch(
                    &CatalogUri::category_videos(&category.category_id),
                    memberships,
                )
                .await?;
            report.associations_synced += written as u32;
        }

        Ok(())
    }

    /// Stage 3: details for every video still missing a description.
    async fn sync_video_details(&self, report: &mut SyncReport) -> Result<()> {
        for video in self.stored_videos().await? {
            if video.description.is_some() {
                continue;
            }

            match self.backend.load_video_details(&video.details_url).await {
                Ok(details) => {
                    let enriched = Video {
                        description: Some(details.description),
                        ..video
                    };
                    self.store
                        .insert(&CatalogUri::videos(), ContentValues::Video(enriched))
                        .await?;
                    report.details_fetched += 1;
                    report.videos_synced += 1;
                }
                Err(e) => {
                    warn!(video_id = %video.video_id, error = %e, "Details fetch failed");
                    report.record_io_error();
                }
            }
        }

        Ok(())
    }

    /// Stage 4: playback URL for every video that has a links document but
    /// no resolved URL yet.
    async fn sync_playback_urls(&self, report: &mut SyncReport) -> Result<()> {
        for video in self.stored_videos().await? {
            if video.video_url.is_some() {
                continue;
            }
            let Some(list_url) = video.list_url.clone() else {
                continue;
            };

            match self.backend.load_video_url(&list_url).await {
                Ok(url) => {
                    let resolved = Video {
                        video_url: Some(url),
                        ..video
                    };
                    self.store
                        .insert(&CatalogUri::videos(), ContentValues::Video(resolved))
                        .await?;
                    report.urls_resolved += 1;
                    report.videos_synced += 1;
                }
                Err(e) => {
                    warn!(video_id = %video.video_id, error = %e, "Playback URL fetch failed");
                    report.record_io_error();
                }
            }
        }

        Ok(())
    }

    async fn stored_videos(&self) -> Result<Vec<Video>> {
        match self.store.query(&CatalogUri::videos()).await? {
            QueryResult::Videos(videos) => Ok(videos),
            QueryResult::Categories(_) => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{
        BackendError, MockCatalogBackend, RemoteCategory, RemoteVideo, RemoteVideoDetails,
    };
    use core_catalog::create_test_pool;

    fn remote_category(id: &str) -> RemoteCategory {
        RemoteCategory {
            category_id: id.to_string(),
            title: format!("Category {}", id),
            url: format!("http://feed/{}", id),
        }
    }

    fn remote_video(id: &str) -> RemoteVideo {
        RemoteVideo {
            video_id: id.to_string(),
            title: format!("Video {}", id),
            image_url: format!("http://img/{}", id),
            details_url: format!("http://details/{}", id),
            list_url: Some(format!("http://links/{}", id)),
        }
    }

    async fn coordinator(backend: MockCatalogBackend) -> SyncCoordinator {
        let pool = create_test_pool().await.unwrap();
        let store = Arc::new(ContentStore::new(pool, EventBus::default()));
        SyncCoordinator::new(
            SyncConfig::default(),
            store,
            Arc::new(backend),
            EventBus::default(),
        )
    }

    #[tokio::test]
    async fn test_happy_path_populates_all_stages() {
        let mut backend = MockCatalogBackend::new();
        backend
            .expect_load_categories()
            .returning(|| Ok(vec![remote_category("c1")]));
        backend
            .expect_load_videos()
            .returning(|_| Ok(vec![remote_video("v1")]));
        backend.expect_load_video_details().returning(|_| {
            Ok(RemoteVideoDetails {
                description: "A description".to_string(),
            })
        });
        backend
            .expect_load_video_url()
            .returning(|_| Ok("http://stream/v1".to_string()));

        let coordinator = coordinator(backend).await;
        let report = coordinator.sync("default").await.unwrap();

        assert_eq!(report.io_errors, 0);
        assert_eq!(report.categories_synced, 1);
        assert_eq!(report.associations_synced, 1);
        assert_eq!(report.details_fetched, 1);
        assert_eq!(report.urls_resolved, 1);
        assert!(report.finished_at.is_some());

        let videos = coordinator.stored_videos().await.unwrap();
        assert_eq!(videos.len(), 1);
        assert_eq!(videos[0].description.as_deref(), Some("A description"));
        assert_eq!(videos[0].video_url.as_deref(), Some("http://stream/v1"));
    }

    #[tokio::test]
    async fn test_details_stage_failure_is_tallied_not_thrown() {
        let mut backend = MockCatalogBackend::new();
        backend
            .expect_load_categories()
            .returning(|| Ok(vec![remote_category("c1")]));
        backend
            .expect_load_videos()
            .returning(|_| Ok(vec![remote_video("v1")]));
        backend
            .expect_load_video_details()
            .returning(|_| Err(BackendError::Http("boom".to_string())));
        backend
            .expect_load_video_url()
            .returning(|_| Ok("http://stream/v1".to_string()));

        let coordinator = coordinator(backend).await;
        let report = coordinator.sync("default").await.unwrap();

        // Exactly one tally for the one failed details fetch; everything
        // before and after it still landed.
        assert_eq!(report.io_errors, 1);
        assert_eq!(report.categories_synced, 1);
        assert_eq!(report.associations_synced, 1);
        assert_eq!(report.details_fetched, 0);
        assert_eq!(report.urls_resolved, 1);

        let videos = coordinator.stored_videos().await.unwrap();
        assert_eq!(videos[0].description, None);
        assert_eq!(videos[0].video_url.as_deref(), Some("http://stream/v1"));
    }

    #[tokio::test]
    async fn test_category_fetch_failure_ends_run_cleanly() {
        let mut backend = MockCatalogBackend::new();
        backend
            .expect_load_categories()
            .returning(|| Err(BackendError::Unavailable("offline".to_string())));

        let coordinator = coordinator(backend).await;
        let report = coordinator.sync("default").await.unwrap();

        assert_eq!(report.io_errors, 1);
        assert_eq!(report.categories_synced, 0);
        assert_eq!(report.videos_synced, 0);
    }

    #[tokio::test]
    async fn test_failed_category_is_skipped_others_proceed() {
        let mut backend = MockCatalogBackend::new();
        backend
            .expect_load_categories()
            .returning(|| Ok(vec![remote_category("c0"), remote_category("c1")]));
        backend
            .expect_load_videos()
            .returning(|category: &RemoteCategory| {
                if category.category_id == "c0" {
                    Err(BackendError::Http("timeout".to_string()))
                } else {
                    Ok(vec![remote_video("v1"), remote_video("v2")])
                }
            });
        backend.expect_load_video_details().returning(|_| {
            Ok(RemoteVideoDetails {
                description: "d".to_string(),
            })
        });
        backend
            .expect_load_video_url()
            .returning(|_| Ok("http://stream".to_string()));

        let coordinator = coordinator(backend).await;
        let report = coordinator.sync("default").await.unwrap();

        assert_eq!(report.io_errors, 1);
        assert_eq!(report.categories_synced, 2);
        assert_eq!(report.associations_synced, 2);

        let members = coordinator
            .store
            .query(&CatalogUri::category_videos("c1"))
            .await
            .unwrap();
        assert_eq!(members.len(), 2);
        assert!(coordinator
            .store
            .query(&CatalogUri::category_videos("c0"))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_shared_video_is_stubbed_and_tallied_once() {
        let mut backend = MockCatalogBackend::new();
        backend
            .expect_load_categories()
            .returning(|| Ok(vec![remote_category("c0"), remote_category("c1")]));
        // Both categories list the same video.
        backend
            .expect_load_videos()
            .returning(|_| Ok(vec![remote_video("v1")]));

        let pool = create_test_pool().await.unwrap();
        let store = Arc::new(ContentStore::new(pool, EventBus::default()));
        let coordinator = SyncCoordinator::new(
            SyncConfig {
                fetch_details: false,
                resolve_playback_urls: false,
            },
            store,
            Arc::new(backend),
            EventBus::default(),
        );

        let report = coordinator.sync("default").await.unwrap();

        assert_eq!(report.videos_synced, 1);
        assert_eq!(report.associations_synced, 2);
        assert_eq!(coordinator.stored_videos().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_disabled_stages_do_not_fetch() {
        let mut backend = MockCatalogBackend::new();
        backend
            .expect_load_categories()
            .returning(|| Ok(vec![remote_category("c1")]));
        backend
            .expect_load_videos()
            .returning(|_| Ok(vec![remote_video("v1")]));
        // No expectations for details/url: calling them would panic.

        let pool = create_test_pool().await.unwrap();
        let store = Arc::new(ContentStore::new(pool, EventBus::default()));
        let coordinator = SyncCoordinator::new(
            SyncConfig {
                fetch_details: false,
                resolve_playback_urls: false,
            },
            store,
            Arc::new(backend),
            EventBus::default(),
        );

        let report = coordinator.sync("default").await.unwrap();
        assert_eq!(report.details_fetched, 0);
        assert_eq!(report.urls_resolved, 0);

        let videos = coordinator.stored_videos().await.unwrap();
        assert_eq!(videos[0].description, None);
        assert_eq!(videos[0].video_url, None);
    }
}
