//! Repository for the `verification_history` table.

use ecodeli_core::types::DbId;
use sqlx::{PgConnection, PgExecutor};

use crate::models::verification_history::{CreateVerificationHistory, VerificationHistory};

const COLUMNS: &str = "id, user_id, role_id, verified_by_id, status_id, reason, created_at";

pub struct VerificationHistoryRepo;

impl VerificationHistoryRepo {
    pub async fn create(
        conn: &mut PgConnection,
        input: &CreateVerificationHistory,
    ) -> Result<VerificationHistory, sqlx::Error> {
        let query = format!(
            "INSERT INTO verification_history (user_id, role_id, verified_by_id, status_id, reason) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, VerificationHistory>(&query)
            .bind(input.user_id)
            .bind(input.role_id)
            .bind(input.verified_by_id)
            .bind(input.status_id)
            .bind(&input.reason)
            .fetch_one(conn)
            .await
    }

    /// History for a user, newest first.
    pub async fn list_for_user<'e>(
        executor: impl PgExecutor<'e>,
        user_id: DbId,
    ) -> Result<Vec<VerificationHistory>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM verification_history WHERE user_id = $1 \
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, VerificationHistory>(&query)
            .bind(user_id)
            .fetch_all(executor)
            .await
    }
}
