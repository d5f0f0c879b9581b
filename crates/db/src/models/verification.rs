//! Verification request entity model and DTOs.

use ecodeli_core::status::ReviewStatus;
use ecodeli_core::types::{DbId, StatusId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Row from the `verification_requests` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct VerificationRequest {
    pub id: DbId,
    pub submitter_id: DbId,
    pub document_id: DbId,
    pub verifier_id: Option<DbId>,
    pub status_id: StatusId,
    pub notes: Option<String>,
    pub requested_at: Timestamp,
    pub verified_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl VerificationRequest {
    pub fn status(&self) -> Option<ReviewStatus> {
        ReviewStatus::from_id(self.status_id)
    }
}

/// Row for the admin pending-verification queue, joined with submitter and document.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PendingVerification {
    pub id: DbId,
    pub document_id: DbId,
    pub submitter_id: DbId,
    pub submitter_name: String,
    pub submitter_email: String,
    pub submitter_role_id: StatusId,
    pub document_type: String,
    pub filename: String,
    pub file_url: String,
    pub status_id: StatusId,
    pub notes: Option<String>,
    pub requested_at: Timestamp,
}

/// Body for `POST /documents/{id}/verifications`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateVerification {
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

/// Body for `PUT /admin/verifications/{id}`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ReviewVerification {
    pub status: ReviewStatus,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

/// Pending count for one submitter role.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RolePendingCount {
    pub role: String,
    pub count: i64,
}

/// Aggregate counters for the admin dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationStats {
    pub total_pending: i64,
    pub total_approved: i64,
    pub total_rejected: i64,
    /// Approved share of decided requests, rounded to a whole percent.
    pub approval_rate: i64,
    pub pending_by_role: Vec<RolePendingCount>,
}

impl VerificationStats {
    pub fn approval_rate(approved: i64, rejected: i64) -> i64 {
        let decided = approved + rejected;
        if decided == 0 {
            return 0;
        }
        ((approved as f64 / decided as f64) * 100.0).round() as i64
    }
}
