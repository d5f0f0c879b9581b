//! Reminders for users whose required documents are not all approved yet.

use ecodeli_core::aggregation::VerificationSummary;
use ecodeli_core::error::CoreError;
use ecodeli_core::requirements::RequirementCatalog;
use ecodeli_core::roles::UserRole;
use ecodeli_core::types::DbId;
use ecodeli_db::repositories::UserRepo;
use ecodeli_db::DbPool;
use ecodeli_events::bus::{event_types, PlatformEvent};
use ecodeli_events::EventBus;
use serde::Serialize;
use serde_json::json;

use super::{aggregator, role_from_id, user_not_found};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ReminderOutcome {
    pub summary: VerificationSummary,
    /// `false` when nothing is missing and no reminder was sent.
    pub reminded: bool,
}

/// Evaluate one user and, if required types are missing, stamp
/// `documents_reminded_at` and publish `documents.missing`.
pub async fn remind_user(
    pool: &DbPool,
    event_bus: &EventBus,
    catalog: &RequirementCatalog,
    user_id: DbId,
    role: UserRole,
) -> Result<ReminderOutcome, AppError> {
    let summary = aggregator::evaluate_user(pool, catalog, user_id, role).await?;
    if summary.missing_types.is_empty() {
        return Ok(ReminderOutcome {
            summary,
            reminded: false,
        });
    }

    UserRepo::mark_documents_reminded(pool, user_id).await?;

    tracing::info!(
        user_id,
        role = %role,
        missing = summary.missing_types.len(),
        "Missing documents reminder sent"
    );

    event_bus.publish(
        PlatformEvent::new(event_types::DOCUMENTS_MISSING)
            .with_source("user", user_id)
            .with_payload(json!({
                "user_id": user_id,
                "role": role,
                "missing_types": summary.missing_types,
            })),
    );

    Ok(ReminderOutcome {
        summary,
        reminded: true,
    })
}

/// Admin-triggered reminder for one user.
pub async fn remind(state: &AppState, user_id: DbId) -> AppResult<ReminderOutcome> {
    let user = UserRepo::find_by_id(&state.pool, user_id)
        .await?
        .ok_or_else(|| user_not_found(user_id))?;
    let role = role_from_id(user.role_id)?;

    if state.catalog.required_types(role).is_empty() {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Role {role} has no required documents"
        ))));
    }

    remind_user(&state.pool, &state.event_bus, &state.catalog, user_id, role).await
}
