//! Durable event persistence service.
//!
//! [`EventPersistence`] subscribes to the [`EventBus`](crate::bus::EventBus)
//! and writes every received [`PlatformEvent`] to the `events` table. It
//! runs as a long-lived background task and stops when the bus is dropped.

use ecodeli_core::types::DbId;
use ecodeli_db::repositories::EventRepo;
use ecodeli_db::DbPool;
use tokio::sync::broadcast;

use crate::bus::PlatformEvent;

pub struct EventPersistence;

impl EventPersistence {
    /// Run the persistence loop until the channel closes.
    pub async fn run(pool: DbPool, mut receiver: broadcast::Receiver<PlatformEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(e) = Self::persist(&pool, &event).await {
                        tracing::error!(
                            error = %e,
                            event_type = %event.event_type,
                            "Failed to persist event"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(
                        skipped = n,
                        "Event persistence lagged, some events were not persisted"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, persistence shutting down");
                    break;
                }
            }
        }
    }

    /// Write a single event, resolving its type name to `event_types.id`.
    pub async fn persist(pool: &DbPool, event: &PlatformEvent) -> Result<DbId, sqlx::Error> {
        let event_type = EventRepo::get_event_type_by_name(pool, &event.event_type)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;

        EventRepo::insert(
            pool,
            event_type.id,
            event.source_entity_type.as_deref(),
            event.source_entity_id,
            event.actor_user_id,
            &event.payload,
        )
        .await
    }
}
