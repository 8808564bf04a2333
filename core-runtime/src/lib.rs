//! # Runtime Infrastructure Module
//!
//! Shared infrastructure for the Video Catalog Core crates.
//!
//! ## Overview
//!
//! This module provides:
//! - Typed event bus for content-change and sync-lifecycle notifications
//! - Logging and tracing initialization built on `tracing-subscriber`

pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
pub use events::{CatalogEvent, CoreEvent, EventBus, SyncEvent};
pub use logging::{init_logging, LogFormat, LoggingConfig};
