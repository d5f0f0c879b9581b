//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the publish/subscribe hub for [`PlatformEvent`]s, shared
//! via `Arc<EventBus>` across the application. Publishing never blocks and
//! never fails the publisher.

use chrono::{DateTime, Utc};
use ecodeli_core::types::DbId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Event type names. Each has a seeded row in `event_types`.
pub mod event_types {
    pub const DOCUMENT_UPLOADED: &str = "document.uploaded";
    pub const DOCUMENT_REVIEWED: &str = "document.reviewed";
    pub const DOCUMENT_EXPIRED: &str = "document.expired";
    pub const ROLE_ACTIVATED: &str = "role.activated";
    pub const DOCUMENTS_MISSING: &str = "documents.missing";
}

// ---------------------------------------------------------------------------
// PlatformEvent
// ---------------------------------------------------------------------------

/// A domain event that occurred on the platform.
///
/// Constructed via [`PlatformEvent::new`] and enriched with
/// [`with_source`](PlatformEvent::with_source),
/// [`with_actor`](PlatformEvent::with_actor) and
/// [`with_payload`](PlatformEvent::with_payload).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformEvent {
    /// Dot-separated event name, e.g. `"document.reviewed"`.
    pub event_type: String,
    pub source_entity_type: Option<String>,
    pub source_entity_id: Option<DbId>,
    /// User that triggered the event (the uploader or the reviewing admin).
    pub actor_user_id: Option<DbId>,
    pub payload: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

impl PlatformEvent {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            source_entity_type: None,
            source_entity_id: None,
            actor_user_id: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    pub fn with_source(mut self, entity_type: impl Into<String>, entity_id: DbId) -> Self {
        self.source_entity_type = Some(entity_type.into());
        self.source_entity_id = Some(entity_id);
        self
    }

    pub fn with_actor(mut self, user_id: DbId) -> Self {
        self.actor_user_id = Some(user_id);
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }

    /// The user the event concerns (`payload.user_id`), who receives notifications.
    pub fn recipient_id(&self) -> Option<DbId> {
        self.payload.get("user_id").and_then(|v| v.as_i64())
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// ```rust
/// use ecodeli_events::bus::{event_types, EventBus, PlatformEvent};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(PlatformEvent::new(event_types::DOCUMENT_UPLOADED));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<PlatformEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest messages are dropped and slow
    /// receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    pub fn publish(&self, event: PlatformEvent) {
        // A send error only means there are no receivers.
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PlatformEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_and_receive_single_subscriber() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        bus.publish(
            PlatformEvent::new(event_types::DOCUMENT_REVIEWED)
                .with_source("document", 42)
                .with_actor(7)
                .with_payload(serde_json::json!({"user_id": 3, "status": "APPROVED"})),
        );

        let received = rx.recv().await.expect("should receive the event");
        assert_eq!(received.event_type, "document.reviewed");
        assert_eq!(received.source_entity_type.as_deref(), Some("document"));
        assert_eq!(received.source_entity_id, Some(42));
        assert_eq!(received.actor_user_id, Some(7));
        assert_eq!(received.recipient_id(), Some(3));
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_event() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(PlatformEvent::new(event_types::ROLE_ACTIVATED));

        assert_eq!(rx1.recv().await.unwrap().event_type, "role.activated");
        assert_eq!(rx2.recv().await.unwrap().event_type, "role.activated");
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        let bus = EventBus::default();
        bus.publish(PlatformEvent::new(event_types::DOCUMENT_EXPIRED));
    }

    #[test]
    fn event_without_user_has_no_recipient() {
        let event = PlatformEvent::new(event_types::DOCUMENT_UPLOADED);
        assert!(event.recipient_id().is_none());
        assert!(event.payload.is_object());
    }
}
