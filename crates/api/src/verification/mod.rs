//! Document verification and role activation workflow.
//!
//! Handlers stay thin; the multi-step operations that span several tables
//! (upload, review, resubmission, activation, reminders) live here so they
//! can share transactions.

pub mod activation;
pub mod aggregator;
pub mod documents;
pub mod ledger;
pub mod reminders;

use ecodeli_core::error::CoreError;
use ecodeli_core::roles::UserRole;
use ecodeli_core::types::{DbId, StatusId};

use ecodeli_db::repositories::UserRepo;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

pub(crate) fn document_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Document",
        id,
    })
}

pub(crate) fn user_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "User", id })
}

/// Resolve a stored role id, treating an unknown id as corrupt data.
pub(crate) fn role_from_id(role_id: StatusId) -> Result<UserRole, AppError> {
    UserRole::from_id(role_id).ok_or_else(|| {
        AppError::Core(CoreError::Internal(format!("unknown role id {role_id}")))
    })
}

/// The user's role as stored, not as carried by a possibly stale token.
pub(crate) async fn stored_role(state: &AppState, user_id: DbId) -> AppResult<UserRole> {
    let user = UserRepo::find_by_id(&state.pool, user_id)
        .await?
        .ok_or_else(|| user_not_found(user_id))?;
    role_from_id(user.role_id)
}
