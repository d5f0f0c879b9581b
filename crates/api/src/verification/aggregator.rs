//! Database-facing loader for the verification aggregator.

use chrono::Utc;
use ecodeli_core::aggregation::{self, DocumentSnapshot, VerificationSummary};
use ecodeli_core::documents::DocumentType;
use ecodeli_core::requirements::RequirementCatalog;
use ecodeli_core::roles::UserRole;
use ecodeli_core::status::ProfileVerificationStatus;
use ecodeli_core::types::DbId;
use ecodeli_db::models::document::Document;
use ecodeli_db::repositories::{DocumentRepo, ProfileRepo, UserRepo};
use serde::Serialize;
use sqlx::PgExecutor;

use super::{role_from_id, user_not_found};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// A user's verification state as shown to the user and to admins.
#[derive(Debug, Serialize)]
pub struct VerificationOverview {
    pub user_id: DbId,
    pub role: UserRole,
    pub required_types: Vec<DocumentType>,
    /// Profile status; `None` for roles without a profile.
    pub profile_status: Option<ProfileVerificationStatus>,
    pub is_verified: bool,
    pub summary: VerificationSummary,
}

/// Evaluate `user_id`'s documents against the requirements of `role`.
///
/// Reads through `executor`, so inside a transaction the result includes
/// that transaction's uncommitted writes.
pub async fn evaluate_user<'e>(
    executor: impl PgExecutor<'e>,
    catalog: &RequirementCatalog,
    user_id: DbId,
    role: UserRole,
) -> Result<VerificationSummary, AppError> {
    let documents = DocumentRepo::list_by_user(executor, user_id).await?;
    let snapshots = documents
        .iter()
        .map(Document::snapshot)
        .collect::<Result<Vec<DocumentSnapshot>, _>>()?;

    Ok(aggregation::evaluate(
        catalog.required_types(role),
        &snapshots,
        Utc::now(),
    ))
}

/// Build the [`VerificationOverview`] of one user.
pub async fn overview(state: &AppState, user_id: DbId) -> AppResult<VerificationOverview> {
    let user = UserRepo::find_by_id(&state.pool, user_id)
        .await?
        .ok_or_else(|| user_not_found(user_id))?;
    let role = role_from_id(user.role_id)?;

    let profile_status = match state.catalog.profile_kind(role) {
        Some(kind) => Some(
            ProfileRepo::find_by_user(&state.pool, kind, user_id)
                .await?
                .and_then(|p| p.verification_status())
                .unwrap_or(ProfileVerificationStatus::Pending),
        ),
        None => None,
    };

    let summary = evaluate_user(&state.pool, &state.catalog, user_id, role).await?;

    Ok(VerificationOverview {
        user_id,
        role,
        required_types: state.catalog.required_types(role).to_vec(),
        is_verified: profile_status.map_or(true, |s| s == ProfileVerificationStatus::Verified),
        profile_status,
        summary,
    })
}
