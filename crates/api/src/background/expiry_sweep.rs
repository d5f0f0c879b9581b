//! Periodic sweep for approved documents whose expiry date has passed.
//!
//! Each expired document is marked once via `expiry_notified_at`, together
//! with a system audit row, and a `document.expired` event is published for
//! its owner.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use ecodeli_core::types::Timestamp;
use ecodeli_db::models::audit::{CreateAuditLog, ACTION_DOCUMENT_EXPIRED, ENTITY_DOCUMENT};
use ecodeli_db::repositories::{AuditLogRepo, DocumentRepo};
use ecodeli_db::DbPool;
use ecodeli_events::bus::{event_types, PlatformEvent};
use ecodeli_events::EventBus;
use serde_json::json;
use tokio_util::sync::CancellationToken;

/// Documents handled per sweep. Remaining ones are picked up next tick.
const BATCH_SIZE: i64 = 200;

/// Run the expiry sweep loop until `cancel` is triggered.
pub async fn run(
    pool: DbPool,
    event_bus: Arc<EventBus>,
    interval: Duration,
    cancel: CancellationToken,
) {
    tracing::info!(interval_secs = interval.as_secs(), "Expiry sweep job started");

    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Expiry sweep job stopping");
                break;
            }
            _ = ticker.tick() => {
                match sweep_once(&pool, &event_bus, Utc::now()).await {
                    Ok(0) => tracing::debug!("Expiry sweep: nothing expired"),
                    Ok(notified) => tracing::info!(notified, "Expiry sweep: documents expired"),
                    Err(e) => tracing::error!(error = %e, "Expiry sweep failed"),
                }
            }
        }
    }
}

/// Mark and announce every approved document expired at `now`.
///
/// Returns how many documents were newly marked.
pub async fn sweep_once(
    pool: &DbPool,
    event_bus: &EventBus,
    now: Timestamp,
) -> Result<usize, sqlx::Error> {
    let expired = DocumentRepo::list_expired_unnotified(pool, now, BATCH_SIZE).await?;
    let mut notified = 0;

    for document in expired {
        let mut tx = pool.begin().await?;
        // Another instance may have claimed it between the list and the update.
        if !DocumentRepo::mark_expiry_notified(&mut *tx, document.id).await? {
            continue;
        }
        AuditLogRepo::create(
            &mut *tx,
            &CreateAuditLog {
                action: ACTION_DOCUMENT_EXPIRED,
                entity_type: ENTITY_DOCUMENT,
                entity_id: document.id,
                performed_by_id: None,
                changes: Some(json!({
                    "document_type": document.document_type,
                    "expires_at": document.expires_at,
                    "auto_expired": true,
                })),
            },
        )
        .await?;
        tx.commit().await?;
        notified += 1;

        tracing::info!(
            user_id = document.user_id,
            document_id = document.id,
            document_type = %document.document_type,
            "Document expired"
        );

        event_bus.publish(
            PlatformEvent::new(event_types::DOCUMENT_EXPIRED)
                .with_source(ENTITY_DOCUMENT, document.id)
                .with_payload(json!({
                    "user_id": document.user_id,
                    "document_id": document.id,
                    "document_type": document.document_type,
                    "expires_at": document.expires_at,
                })),
        );
    }

    Ok(notified)
}
