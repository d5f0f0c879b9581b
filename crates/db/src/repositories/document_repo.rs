//! Repository for the `documents` table.

use ecodeli_core::status::ReviewStatus;
use ecodeli_core::types::{DbId, StatusId, Timestamp};
use sqlx::{PgConnection, PgExecutor, PgPool};

use crate::models::document::{CreateDocument, Document, PendingDocument, UpdateDocumentMetadata};

const COLUMNS: &str = "\
    id, user_id, user_role_id, document_type, file_url, storage_key, filename, \
    mime_type, file_size_bytes, checksum_sha256, status_id, rejection_reason, \
    notes, expires_at, expiry_notified_at, uploaded_at, reviewed_by, reviewed_at, \
    created_at, updated_at";

/// Public path prefix of the document download route.
const DOWNLOAD_PATH_PREFIX: &str = "/api/v1/documents/";

pub struct DocumentRepo;

impl DocumentRepo {
    /// Insert a PENDING document row.
    ///
    /// The id is drawn up front so `file_url` can point at the download
    /// route of the row being inserted.
    pub async fn create(
        conn: &mut PgConnection,
        input: &CreateDocument,
    ) -> Result<Document, sqlx::Error> {
        let query = format!(
            "WITH next AS (SELECT nextval(pg_get_serial_sequence('documents', 'id')) AS id) \
             INSERT INTO documents \
                (id, user_id, user_role_id, document_type, file_url, storage_key, filename, \
                 mime_type, file_size_bytes, checksum_sha256, notes, expires_at, status_id) \
             SELECT next.id, $1, $2, $3, '{DOWNLOAD_PATH_PREFIX}' || next.id || '/download', \
                    $4, $5, $6, $7, $8, $9, $10, $11 \
             FROM next \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Document>(&query)
            .bind(input.user_id)
            .bind(input.user_role_id)
            .bind(input.document_type.as_str())
            .bind(&input.storage_key)
            .bind(&input.filename)
            .bind(&input.mime_type)
            .bind(input.file_size_bytes)
            .bind(&input.checksum_sha256)
            .bind(&input.notes)
            .bind(input.expires_at)
            .bind(ReviewStatus::Pending.id())
            .fetch_one(conn)
            .await
    }

    pub async fn find_by_id<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<Option<Document>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM documents WHERE id = $1");
        sqlx::query_as::<_, Document>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Lock a document row for the remainder of the transaction.
    pub async fn find_by_id_for_update(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<Document>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM documents WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Document>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// All documents of a user, most recent upload first.
    pub async fn list_by_user<'e>(
        executor: impl PgExecutor<'e>,
        user_id: DbId,
    ) -> Result<Vec<Document>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM documents WHERE user_id = $1 \
             ORDER BY uploaded_at DESC, id DESC"
        );
        sqlx::query_as::<_, Document>(&query)
            .bind(user_id)
            .fetch_all(executor)
            .await
    }

    /// PENDING documents with their owner, oldest first, optionally for one role.
    pub async fn list_pending(
        pool: &PgPool,
        role_id: Option<StatusId>,
    ) -> Result<Vec<PendingDocument>, sqlx::Error> {
        sqlx::query_as::<_, PendingDocument>(
            "SELECT d.id, d.user_id, u.name AS user_name, u.email AS user_email, \
                    d.user_role_id, d.document_type, d.filename, d.file_url, \
                    d.mime_type, d.notes, d.uploaded_at \
             FROM documents d \
             JOIN users u ON u.id = d.user_id \
             WHERE d.status_id = $1 AND ($2::SMALLINT IS NULL OR d.user_role_id = $2) \
             ORDER BY d.uploaded_at ASC, d.id ASC",
        )
        .bind(ReviewStatus::Pending.id())
        .bind(role_id)
        .fetch_all(pool)
        .await
    }

    /// Record a review decision on the document.
    ///
    /// `rejection_reason` is stored only for REJECTED and cleared otherwise.
    pub async fn set_review_status(
        conn: &mut PgConnection,
        id: DbId,
        status: ReviewStatus,
        reviewer_id: DbId,
        rejection_reason: Option<&str>,
    ) -> Result<Document, sqlx::Error> {
        let reason = match status {
            ReviewStatus::Rejected => rejection_reason,
            _ => None,
        };
        let query = format!(
            "UPDATE documents \
             SET status_id = $2, reviewed_by = $3, reviewed_at = NOW(), rejection_reason = $4 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Document>(&query)
            .bind(id)
            .bind(status.id())
            .bind(reviewer_id)
            .bind(reason)
            .fetch_one(conn)
            .await
    }

    /// Put a rejected document back in the review queue.
    pub async fn reset_to_pending(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Document, sqlx::Error> {
        let query = format!(
            "UPDATE documents \
             SET status_id = $2, reviewed_by = NULL, reviewed_at = NULL, rejection_reason = NULL \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Document>(&query)
            .bind(id)
            .bind(ReviewStatus::Pending.id())
            .fetch_one(conn)
            .await
    }

    /// Patch notes and expiry. `None` fields keep their current value.
    pub async fn update_metadata(
        pool: &PgPool,
        id: DbId,
        input: &UpdateDocumentMetadata,
    ) -> Result<Option<Document>, sqlx::Error> {
        let query = format!(
            "UPDATE documents \
             SET notes = COALESCE($2, notes), expires_at = COALESCE($3, expires_at) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Document>(&query)
            .bind(id)
            .bind(&input.notes)
            .bind(input.expires_at)
            .fetch_optional(pool)
            .await
    }

    /// Delete a document. Verification requests cascade.
    pub async fn delete(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Approved documents whose expiry passed before `now` and whose owner
    /// has not been told yet.
    pub async fn list_expired_unnotified(
        pool: &PgPool,
        now: Timestamp,
        limit: i64,
    ) -> Result<Vec<Document>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM documents \
             WHERE status_id = $1 AND expires_at < $2 AND expiry_notified_at IS NULL \
             ORDER BY expires_at ASC \
             LIMIT $3"
        );
        sqlx::query_as::<_, Document>(&query)
            .bind(ReviewStatus::Approved.id())
            .bind(now)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Stamp `expiry_notified_at`. Returns `false` if another sweep got there first.
    pub async fn mark_expiry_notified<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE documents SET expiry_notified_at = NOW() \
             WHERE id = $1 AND expiry_notified_at IS NULL",
        )
        .bind(id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// A user's documents with an expiry date on or before `until`, soonest
    /// first. Already expired documents are included.
    pub async fn list_expiring<'e>(
        executor: impl PgExecutor<'e>,
        user_id: DbId,
        until: Timestamp,
    ) -> Result<Vec<Document>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM documents \
             WHERE user_id = $1 AND expires_at IS NOT NULL AND expires_at <= $2 \
             ORDER BY expires_at ASC, id ASC"
        );
        sqlx::query_as::<_, Document>(&query)
            .bind(user_id)
            .bind(until)
            .fetch_all(executor)
            .await
    }
}
