//! # Event Bus System
//!
//! Decoupled communication between the catalog store and its observers using
//! `tokio::sync::broadcast`.
//!
//! ## Overview
//!
//! Two event families flow through the bus:
//! - **Catalog events**: a content change scoped to the URI that was acted
//!   upon. External observers (e.g., UI collaborators holding open queries)
//!   use these to refresh.
//! - **Sync events**: lifecycle of a synchronization run.
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{CatalogEvent, CoreEvent, EventBus};
//!
//! let bus = EventBus::new(100);
//! let mut subscriber = bus.subscribe();
//!
//! bus.emit(CoreEvent::Catalog(CatalogEvent::ContentChanged {
//!     uri: "catalog://catalog.vcc/categories".to_string(),
//! }))
//! .ok();
//! ```
//!
//! ## Error Handling
//!
//! `emit` fails only when there are no subscribers, which callers treat as
//! non-fatal (`.ok()`). Slow subscribers receive `RecvError::Lagged` and can
//! keep consuming; `RecvError::Closed` signals shutdown.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

// Re-export commonly used types
pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
///
/// Subscribers that fall behind by more than this receive `RecvError::Lagged`.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

/// Top-level event enum encompassing all event categories.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    /// Catalog content changes
    Catalog(CatalogEvent),
    /// Sync-related events
    Sync(SyncEvent),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Catalog(e) => e.description(),
            CoreEvent::Sync(e) => e.description(),
        }
    }
}

/// Events emitted by the content store when persisted data changes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum CatalogEvent {
    /// Rows addressed by `uri` were inserted, replaced, or deleted.
    ContentChanged {
        /// The catalog URI the mutation was issued against.
        uri: String,
    },
}

impl CatalogEvent {
    fn description(&self) -> &str {
        match self {
            CatalogEvent::ContentChanged { .. } => "Catalog content changed",
        }
    }
}

/// Events describing the lifecycle of a synchronization run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum SyncEvent {
    /// A sync run started for an account.
    Started {
        /// Unique identifier for this run.
        run_id: String,
        /// The account being synced.
        account: String,
    },
    /// A sync run finished. The run completes even when individual remote
    /// fetches failed; failures surface only in the tallies.
    Completed {
        /// The run identifier.
        run_id: String,
        /// Number of remote I/O failures recorded during the run.
        io_errors: u32,
        /// Categories persisted.
        categories_synced: u32,
        /// Videos persisted (stubs plus detail refreshes).
        videos_synced: u32,
        /// Duration of the run in seconds.
        duration_secs: u64,
    },
}

impl SyncEvent {
    fn description(&self) -> &str {
        match self {
            SyncEvent::Started { .. } => "Sync started",
            SyncEvent::Completed { .. } => "Sync completed",
        }
    }
}

/// Central event bus for publishing and subscribing to events.
///
/// Uses `tokio::sync::broadcast` internally: clone the `EventBus` for more
/// producers, call [`EventBus::subscribe`] for independent consumers.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer size.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an
    /// error when there are none.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber to receive all future events.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change_event(uri: &str) -> CoreEvent {
        CoreEvent::Catalog(CatalogEvent::ContentChanged {
            uri: uri.to_string(),
        })
    }

    #[tokio::test]
    async fn test_event_bus_creation() {
        let bus = EventBus::new(10);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_event_emission_no_subscribers() {
        let bus = EventBus::new(10);
        assert!(bus.emit(change_event("catalog://catalog.vcc/videos")).is_err());
    }

    #[tokio::test]
    async fn test_event_emission_with_subscribers() {
        let bus = EventBus::new(10);
        let mut sub = bus.subscribe();

        let event = change_event("catalog://catalog.vcc/categories/c1");
        let result = bus.emit(event.clone());
        assert_eq!(result.unwrap(), 1);

        let received = sub.recv().await.unwrap();
        assert_eq!(received, event);
    }

    #[tokio::test]
    async fn test_multiple_subscribers_receive_same_event() {
        let bus = EventBus::new(10);
        let mut sub1 = bus.subscribe();
        let mut sub2 = bus.subscribe();

        let event = CoreEvent::Sync(SyncEvent::Started {
            run_id: "run-1".to_string(),
            account: "default".to_string(),
        });
        bus.emit(event.clone()).ok();

        assert_eq!(sub1.recv().await.unwrap(), event);
        assert_eq!(sub2.recv().await.unwrap(), event);
    }

    #[tokio::test]
    async fn test_lagged_subscriber() {
        let bus = EventBus::new(2); // Very small buffer
        let mut sub = bus.subscribe();

        for i in 0..5 {
            bus.emit(change_event(&format!("catalog://catalog.vcc/videos/v{}", i)))
                .ok();
        }

        let result = sub.recv().await;
        assert!(matches!(result, Err(RecvError::Lagged(_))));
    }

    #[tokio::test]
    async fn test_event_serialization() {
        let event = CoreEvent::Sync(SyncEvent::Completed {
            run_id: "run-123".to_string(),
            io_errors: 1,
            categories_synced: 4,
            videos_synced: 20,
            duration_secs: 3,
        });

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("run-123"));

        let deserialized: CoreEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, event);
    }

    #[test]
    fn test_event_description() {
        let event = change_event("catalog://catalog.vcc/categories");
        assert_eq!(event.description(), "Catalog content changed");
    }
}
