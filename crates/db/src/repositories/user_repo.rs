//! Repository for the `users` table.

use ecodeli_core::status::UserStatus;
use ecodeli_core::types::{DbId, StatusId, Timestamp};
use sqlx::{PgConnection, PgExecutor, PgPool};

use crate::models::user::{CreateUser, User};

const COLUMNS: &str = "id, name, email, phone, role_id, status_id, created_at, updated_at";

pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (name, email, phone, role_id) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(input.role_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Lock the user row for the rest of the transaction.
    ///
    /// Serialises work that reads all of a user's documents and then
    /// decides on activation. Returns `false` if the user does not exist.
    pub async fn lock_for_update(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let locked: Option<DbId> =
            sqlx::query_scalar("SELECT id FROM users WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(conn)
                .await?;
        Ok(locked.is_some())
    }

    /// Set the account status. Returns `false` if the user does not exist.
    pub async fn set_status(
        conn: &mut PgConnection,
        id: DbId,
        status_id: StatusId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET status_id = $2 WHERE id = $1")
            .bind(id)
            .bind(status_id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Users awaiting verification in one of `role_ids` who were never
    /// reminded about missing documents, or last reminded before
    /// `reminded_before`. Keyset-paginated by id.
    pub async fn list_reminder_candidates(
        pool: &PgPool,
        role_ids: &[StatusId],
        reminded_before: Timestamp,
        after_id: DbId,
        limit: i64,
    ) -> Result<Vec<User>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM users \
             WHERE status_id = $1 AND role_id = ANY($2) AND id > $3 \
               AND (documents_reminded_at IS NULL OR documents_reminded_at < $4) \
             ORDER BY id ASC \
             LIMIT $5"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(UserStatus::PendingVerification.id())
            .bind(role_ids)
            .bind(after_id)
            .bind(reminded_before)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    pub async fn mark_documents_reminded<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET documents_reminded_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Update the contact phone. `None` leaves the current value unchanged.
    pub async fn update_phone(
        pool: &PgPool,
        id: DbId,
        phone: Option<&str>,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET phone = COALESCE($2, phone) WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(phone)
            .fetch_optional(pool)
            .await
    }
}
