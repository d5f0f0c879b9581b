//! Role activation trigger.
//!
//! Flips the role's profile to verified, activates the user account and
//! records one history row. The conditional upsert in
//! [`ProfileRepo::mark_verified`] makes repeated or concurrent calls safe:
//! only the call that actually changes the profile writes anything else.

use ecodeli_core::aggregation::VerificationSummary;
use ecodeli_core::error::CoreError;
use ecodeli_core::requirements::RequirementCatalog;
use ecodeli_core::roles::UserRole;
use ecodeli_core::status::{ProfileVerificationStatus, UserStatus};
use ecodeli_core::types::DbId;
use ecodeli_db::models::audit::{CreateAuditLog, ACTION_ROLE_RECONCILED, ENTITY_USER};
use ecodeli_db::models::verification_history::CreateVerificationHistory;
use ecodeli_db::repositories::{AuditLogRepo, ProfileRepo, UserRepo, VerificationHistoryRepo};
use serde::Serialize;
use serde_json::json;
use sqlx::PgConnection;

use super::ledger::role_activated_event;
use super::{aggregator, role_from_id, user_not_found};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

const ACTIVATION_REASON: &str = "All required documents approved";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivationOutcome {
    Activated { profile_id: DbId, history_id: DbId },
    AlreadyVerified,
    /// The role has no profile to activate (CLIENT, ADMIN).
    NoProfile,
}

impl ActivationOutcome {
    pub fn is_activated(self) -> bool {
        matches!(self, ActivationOutcome::Activated { .. })
    }
}

/// Activate `role` for `user_id`. Must run inside a transaction.
pub async fn activate(
    conn: &mut PgConnection,
    catalog: &RequirementCatalog,
    user_id: DbId,
    role: UserRole,
    verified_by: Option<DbId>,
) -> Result<ActivationOutcome, sqlx::Error> {
    let Some(kind) = catalog.profile_kind(role) else {
        return Ok(ActivationOutcome::NoProfile);
    };

    let Some(profile_id) = ProfileRepo::mark_verified(&mut *conn, kind, user_id).await? else {
        tracing::debug!(user_id, role = %role, "Profile already verified");
        return Ok(ActivationOutcome::AlreadyVerified);
    };

    UserRepo::set_status(&mut *conn, user_id, UserStatus::Active.id()).await?;

    let history = VerificationHistoryRepo::create(
        &mut *conn,
        &CreateVerificationHistory {
            user_id,
            role_id: role.id(),
            verified_by_id: verified_by,
            status_id: ProfileVerificationStatus::Verified.id(),
            reason: Some(ACTIVATION_REASON.to_string()),
        },
    )
    .await?;

    tracing::info!(user_id, role = %role, profile_id, "Role activated");

    Ok(ActivationOutcome::Activated {
        profile_id,
        history_id: history.id,
    })
}

/// Evaluate the user's documents and activate when they are complete.
///
/// Returns the summary and, when complete, the activation outcome.
pub async fn evaluate_and_activate(
    conn: &mut PgConnection,
    catalog: &RequirementCatalog,
    user_id: DbId,
    role: UserRole,
    verified_by: Option<DbId>,
) -> Result<(VerificationSummary, Option<ActivationOutcome>), AppError> {
    let summary = aggregator::evaluate_user(&mut *conn, catalog, user_id, role).await?;
    if !summary.is_complete {
        return Ok((summary, None));
    }
    let outcome = activate(conn, catalog, user_id, role, verified_by).await?;
    Ok((summary, Some(outcome)))
}

/// Result of an admin-triggered reconcile.
#[derive(Debug, Serialize)]
pub struct ReconcileOutcome {
    pub summary: VerificationSummary,
    pub activation: Option<ActivationOutcome>,
}

/// Re-run evaluation and activation for one user.
///
/// Recovers users whose documents were all approved but whose activation
/// failed. Users whose profile is already verified are refused.
pub async fn reconcile(
    state: &AppState,
    user_id: DbId,
    admin_id: DbId,
) -> AppResult<ReconcileOutcome> {
    let user = UserRepo::find_by_id(&state.pool, user_id)
        .await?
        .ok_or_else(|| user_not_found(user_id))?;
    let role = role_from_id(user.role_id)?;

    let kind = state.catalog.profile_kind(role).ok_or_else(|| {
        AppError::Core(CoreError::Validation(format!(
            "Role {role} has no profile to verify"
        )))
    })?;

    if let Some(profile) = ProfileRepo::find_by_user(&state.pool, kind, user_id).await? {
        if profile.is_verified {
            return Err(AppError::Core(CoreError::Validation(
                "User is already verified".into(),
            )));
        }
    }

    let mut tx = state.pool.begin().await?;
    UserRepo::lock_for_update(&mut *tx, user_id).await?;
    let (summary, activation) =
        evaluate_and_activate(&mut *tx, &state.catalog, user_id, role, Some(admin_id)).await?;

    if activation.is_some_and(ActivationOutcome::is_activated) {
        AuditLogRepo::create(
            &mut *tx,
            &CreateAuditLog {
                action: ACTION_ROLE_RECONCILED,
                entity_type: ENTITY_USER,
                entity_id: user_id,
                performed_by_id: Some(admin_id),
                changes: Some(json!({ "role": role })),
            },
        )
        .await?;
    }
    tx.commit().await?;

    tracing::info!(
        user_id,
        admin_id,
        role = %role,
        complete = summary.is_complete,
        activated = activation.is_some_and(ActivationOutcome::is_activated),
        "Verification reconciled"
    );

    if activation.is_some_and(ActivationOutcome::is_activated) {
        state
            .event_bus
            .publish(role_activated_event(user_id, role, Some(admin_id)));
    }

    Ok(ReconcileOutcome {
        summary,
        activation,
    })
}
