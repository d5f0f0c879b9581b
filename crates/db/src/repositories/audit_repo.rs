//! Repository for the `audit_logs` table.

use ecodeli_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::audit::{AuditLog, CreateAuditLog};

const COLUMNS: &str =
    "id, action, entity_type, entity_id, performed_by_id, changes, created_at";

pub struct AuditLogRepo;

impl AuditLogRepo {
    /// Append an audit entry, usually inside the transaction it describes.
    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        input: &CreateAuditLog,
    ) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO audit_logs (action, entity_type, entity_id, performed_by_id, changes) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id",
        )
        .bind(input.action)
        .bind(input.entity_type)
        .bind(input.entity_id)
        .bind(input.performed_by_id)
        .bind(&input.changes)
        .fetch_one(executor)
        .await
    }

    /// Entries for one entity, oldest first.
    pub async fn list_for_entity(
        pool: &PgPool,
        entity_type: &str,
        entity_id: DbId,
    ) -> Result<Vec<AuditLog>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM audit_logs \
             WHERE entity_type = $1 AND entity_id = $2 \
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, AuditLog>(&query)
            .bind(entity_type)
            .bind(entity_id)
            .fetch_all(pool)
            .await
    }
}
