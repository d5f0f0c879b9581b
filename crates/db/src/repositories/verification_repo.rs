//! Repository for the `verification_requests` table.

use ecodeli_core::pagination::{PageRequest, SortField, SortOrder};
use ecodeli_core::status::ReviewStatus;
use ecodeli_core::types::{DbId, StatusId};
use sqlx::{PgConnection, PgExecutor, PgPool};

use crate::models::verification::{
    PendingVerification, RolePendingCount, VerificationRequest, VerificationStats,
};

const COLUMNS: &str = "\
    id, submitter_id, document_id, verifier_id, status_id, notes, \
    requested_at, verified_at, created_at, updated_at";

const PENDING_COLUMNS: &str = "\
    vr.id, vr.document_id, vr.submitter_id, u.name AS submitter_name, \
    u.email AS submitter_email, u.role_id AS submitter_role_id, \
    d.document_type, d.filename, d.file_url, vr.status_id, vr.notes, vr.requested_at";

pub struct VerificationRepo;

impl VerificationRepo {
    /// Insert a PENDING request for `document_id`.
    ///
    /// Fails with a unique violation on `uq_verification_requests_document`
    /// if the document already has a request.
    pub async fn create(
        conn: &mut PgConnection,
        submitter_id: DbId,
        document_id: DbId,
        notes: Option<&str>,
    ) -> Result<VerificationRequest, sqlx::Error> {
        let query = format!(
            "INSERT INTO verification_requests (submitter_id, document_id, notes, status_id) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, VerificationRequest>(&query)
            .bind(submitter_id)
            .bind(document_id)
            .bind(notes)
            .bind(ReviewStatus::Pending.id())
            .fetch_one(conn)
            .await
    }

    pub async fn find_by_id<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<Option<VerificationRequest>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM verification_requests WHERE id = $1");
        sqlx::query_as::<_, VerificationRequest>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Lock a request row so concurrent reviews of it serialise.
    pub async fn find_by_id_for_update(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<VerificationRequest>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM verification_requests WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, VerificationRequest>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// The live request of a document, if one exists.
    pub async fn find_by_document<'e>(
        executor: impl PgExecutor<'e>,
        document_id: DbId,
    ) -> Result<Option<VerificationRequest>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM verification_requests WHERE document_id = $1");
        sqlx::query_as::<_, VerificationRequest>(&query)
            .bind(document_id)
            .fetch_optional(executor)
            .await
    }

    /// Put an existing request back into the queue with fresh notes.
    pub async fn reset_to_pending(
        conn: &mut PgConnection,
        id: DbId,
        notes: Option<&str>,
    ) -> Result<VerificationRequest, sqlx::Error> {
        let query = format!(
            "UPDATE verification_requests \
             SET status_id = $2, notes = $3, verifier_id = NULL, verified_at = NULL, \
                 requested_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, VerificationRequest>(&query)
            .bind(id)
            .bind(ReviewStatus::Pending.id())
            .bind(notes)
            .fetch_one(conn)
            .await
    }

    /// Record a reviewer's decision.
    pub async fn record_decision(
        conn: &mut PgConnection,
        id: DbId,
        verifier_id: DbId,
        status: ReviewStatus,
        notes: Option<&str>,
    ) -> Result<VerificationRequest, sqlx::Error> {
        let query = format!(
            "UPDATE verification_requests \
             SET status_id = $2, verifier_id = $3, notes = COALESCE($4, notes), \
                 verified_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, VerificationRequest>(&query)
            .bind(id)
            .bind(status.id())
            .bind(verifier_id)
            .bind(notes)
            .fetch_one(conn)
            .await
    }

    /// One page of the pending queue, optionally filtered by submitter role.
    pub async fn list_pending(
        pool: &PgPool,
        role_id: Option<StatusId>,
        page: PageRequest,
        sort_by: SortField,
        sort_order: SortOrder,
    ) -> Result<Vec<PendingVerification>, sqlx::Error> {
        let query = format!(
            "SELECT {PENDING_COLUMNS} \
             FROM verification_requests vr \
             JOIN users u ON u.id = vr.submitter_id \
             JOIN documents d ON d.id = vr.document_id \
             WHERE vr.status_id = $1 AND ($2::SMALLINT IS NULL OR u.role_id = $2) \
             ORDER BY {} {}, vr.id {} \
             LIMIT $3 OFFSET $4",
            sort_by.column(),
            sort_order.keyword(),
            sort_order.keyword(),
        );
        sqlx::query_as::<_, PendingVerification>(&query)
            .bind(ReviewStatus::Pending.id())
            .bind(role_id)
            .bind(page.limit)
            .bind(page.offset())
            .fetch_all(pool)
            .await
    }

    /// Total size of the pending queue for [`list_pending`](Self::list_pending).
    pub async fn count_pending(
        pool: &PgPool,
        role_id: Option<StatusId>,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*)::BIGINT \
             FROM verification_requests vr \
             JOIN users u ON u.id = vr.submitter_id \
             WHERE vr.status_id = $1 AND ($2::SMALLINT IS NULL OR u.role_id = $2)",
        )
        .bind(ReviewStatus::Pending.id())
        .bind(role_id)
        .fetch_one(pool)
        .await
    }

    /// Requests submitted by a user, most recent first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<VerificationRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM verification_requests WHERE submitter_id = $1 \
             ORDER BY requested_at DESC, id DESC"
        );
        sqlx::query_as::<_, VerificationRequest>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    pub async fn list_for_document(
        pool: &PgPool,
        document_id: DbId,
    ) -> Result<Vec<VerificationRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM verification_requests WHERE document_id = $1 \
             ORDER BY requested_at DESC, id DESC"
        );
        sqlx::query_as::<_, VerificationRequest>(&query)
            .bind(document_id)
            .fetch_all(pool)
            .await
    }

    /// Queue and decision totals for the admin dashboard.
    pub async fn stats(pool: &PgPool) -> Result<VerificationStats, sqlx::Error> {
        let (pending, approved, rejected): (i64, i64, i64) = sqlx::query_as(
            "SELECT \
                COUNT(*) FILTER (WHERE status_id = $1), \
                COUNT(*) FILTER (WHERE status_id = $2), \
                COUNT(*) FILTER (WHERE status_id = $3) \
             FROM verification_requests",
        )
        .bind(ReviewStatus::Pending.id())
        .bind(ReviewStatus::Approved.id())
        .bind(ReviewStatus::Rejected.id())
        .fetch_one(pool)
        .await?;

        let pending_by_role = sqlx::query_as::<_, RolePendingCount>(
            "SELECT r.name AS role, COUNT(*)::BIGINT AS count \
             FROM verification_requests vr \
             JOIN users u ON u.id = vr.submitter_id \
             JOIN roles r ON r.id = u.role_id \
             WHERE vr.status_id = $1 \
             GROUP BY r.name \
             ORDER BY r.name",
        )
        .bind(ReviewStatus::Pending.id())
        .fetch_all(pool)
        .await?;

        Ok(VerificationStats {
            total_pending: pending,
            total_approved: approved,
            total_rejected: rejected,
            approval_rate: VerificationStats::approval_rate(approved, rejected),
            pending_by_role,
        })
    }
}
