//! Verification history entity model.
//!
//! One row per role activation (or manual verification decision) for a user.

use ecodeli_core::types::{DbId, StatusId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct VerificationHistory {
    pub id: DbId,
    pub user_id: DbId,
    pub role_id: StatusId,
    pub verified_by_id: Option<DbId>,
    pub status_id: StatusId,
    pub reason: Option<String>,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct CreateVerificationHistory {
    pub user_id: DbId,
    pub role_id: StatusId,
    pub verified_by_id: Option<DbId>,
    pub status_id: StatusId,
    pub reason: Option<String>,
}
