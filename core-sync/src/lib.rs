//! # Video Catalog Core - Sync
//!
//! Synchronization engine for the video catalog. Pulls categories, videos,
//! details and playback URLs from a remote [`CatalogBackend`] and persists
//! them through the catalog's content store, producing a [`SyncReport`] per
//! run.

pub mod backend;
pub mod coordinator;
pub mod error;
pub mod report;

pub use backend::{
    BackendError, CatalogBackend, RemoteCategory, RemoteVideo, RemoteVideoDetails,
};
pub use coordinator::{SyncConfig, SyncCoordinator};
pub use error::{Result, SyncError};
pub use report::SyncReport;
