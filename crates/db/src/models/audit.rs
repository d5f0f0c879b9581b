//! Audit log entity model and DTO.
//!
//! Audit rows are append-only.

use ecodeli_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

pub const ENTITY_DOCUMENT: &str = "document";
pub const ENTITY_VERIFICATION: &str = "verification_request";
pub const ENTITY_USER: &str = "user";

pub const ACTION_DOCUMENT_DELETED: &str = "document.deleted";
pub const ACTION_DOCUMENT_EXPIRED: &str = "document.expired";
pub const ACTION_VERIFICATION_REVIEWED: &str = "verification.reviewed";
pub const ACTION_VERIFICATION_RESUBMITTED: &str = "verification.resubmitted";
pub const ACTION_ROLE_RECONCILED: &str = "role.reconciled";

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AuditLog {
    pub id: DbId,
    pub action: String,
    pub entity_type: String,
    pub entity_id: DbId,
    pub performed_by_id: Option<DbId>,
    pub changes: Option<serde_json::Value>,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct CreateAuditLog {
    pub action: &'static str,
    pub entity_type: &'static str,
    pub entity_id: DbId,
    pub performed_by_id: Option<DbId>,
    pub changes: Option<serde_json::Value>,
}
