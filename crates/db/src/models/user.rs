//! User entity model and DTOs.

use ecodeli_core::roles::UserRole;
use ecodeli_core::status::UserStatus;
use ecodeli_core::types::{DbId, StatusId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Row from the `users` table.
///
/// Credentials live with the external identity service; this table only
/// carries what the verification workflow reads and writes.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role_id: StatusId,
    pub status_id: StatusId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    pub fn role(&self) -> Option<UserRole> {
        UserRole::from_id(self.role_id)
    }

    pub fn status(&self) -> Option<UserStatus> {
        UserStatus::from_id(self.status_id)
    }
}

/// DTO for creating a user record.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUser {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    pub phone: Option<String>,
    pub role_id: StatusId,
}
