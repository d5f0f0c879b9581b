//! Periodic reminder for users who still have required documents to provide.
//!
//! Only users awaiting verification are considered, and each one is
//! reminded at most once per [`REMIND_COOLDOWN_DAYS`].

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use ecodeli_core::requirements::RequirementCatalog;
use ecodeli_core::roles::UserRole;
use ecodeli_core::types::{StatusId, Timestamp};
use ecodeli_db::repositories::UserRepo;
use ecodeli_db::DbPool;
use ecodeli_events::EventBus;
use tokio_util::sync::CancellationToken;

use crate::error::AppError;
use crate::verification::reminders;

pub const REMIND_COOLDOWN_DAYS: i64 = 7;

const BATCH_SIZE: i64 = 200;

/// Run the reminder loop until `cancel` is triggered.
pub async fn run(
    pool: DbPool,
    event_bus: Arc<EventBus>,
    catalog: Arc<RequirementCatalog>,
    interval: Duration,
    cancel: CancellationToken,
) {
    tracing::info!(interval_secs = interval.as_secs(), "Document reminder job started");

    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Document reminder job stopping");
                break;
            }
            _ = ticker.tick() => {
                match remind_pending(&pool, &event_bus, &catalog, Utc::now()).await {
                    Ok(0) => tracing::debug!("Document reminders: nobody to remind"),
                    Ok(reminded) => tracing::info!(reminded, "Document reminders sent"),
                    Err(e) => tracing::error!(error = %e, "Document reminder run failed"),
                }
            }
        }
    }
}

/// Remind every eligible user as of `now`. Returns how many were reminded.
pub async fn remind_pending(
    pool: &DbPool,
    event_bus: &EventBus,
    catalog: &RequirementCatalog,
    now: Timestamp,
) -> Result<usize, AppError> {
    let role_ids: Vec<StatusId> = UserRole::ALL
        .iter()
        .filter(|role| !catalog.required_types(**role).is_empty())
        .map(|role| role.id())
        .collect();
    if role_ids.is_empty() {
        return Ok(0);
    }

    let reminded_before = now - chrono::Duration::days(REMIND_COOLDOWN_DAYS);
    let mut reminded = 0;
    let mut after_id = 0;

    loop {
        let users = UserRepo::list_reminder_candidates(
            pool,
            &role_ids,
            reminded_before,
            after_id,
            BATCH_SIZE,
        )
        .await?;
        let Some(last) = users.last() else {
            break;
        };
        after_id = last.id;

        for user in users {
            let Some(role) = user.role() else {
                tracing::warn!(
                    user_id = user.id,
                    role_id = user.role_id,
                    "Skipping user with unknown role"
                );
                continue;
            };
            if reminders::remind_user(pool, event_bus, catalog, user.id, role)
                .await?
                .reminded
            {
                reminded += 1;
            }
        }
    }

    Ok(reminded)
}
