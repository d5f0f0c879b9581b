//! Shared query parameter types for API handlers.

use ecodeli_core::error::CoreError;
use ecodeli_core::pagination::{SortField, SortOrder};
use ecodeli_core::roles::UserRole;
use serde::Deserialize;

/// Optional `?role=` filter used by the admin review queues.
#[derive(Debug, Default, Deserialize)]
pub struct RoleFilterParams {
    pub role: Option<String>,
}

impl RoleFilterParams {
    /// Parse the role filter. An empty value means no filter.
    pub fn role(&self) -> Result<Option<UserRole>, CoreError> {
        match self.role.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => raw.to_ascii_uppercase().parse().map(Some),
        }
    }
}

/// `GET /admin/verifications/pending` query string.
#[derive(Debug, Default, Deserialize)]
pub struct PendingVerificationParams {
    pub role: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
    #[serde(default)]
    pub sort_by: SortField,
    #[serde(default)]
    pub sort_order: SortOrder,
}

impl PendingVerificationParams {
    pub fn role_filter(&self) -> RoleFilterParams {
        RoleFilterParams {
            role: self.role.clone(),
        }
    }
}

/// `GET /documents/expiring` query string.
#[derive(Debug, Default, Deserialize)]
pub struct ExpiringParams {
    pub days: Option<i64>,
}
