//! Repository for the role profile tables.
//!
//! Every method takes the [`ProfileKind`] that selects the table. Table
//! names come from the closed `ProfileKind` enum, never from user input.

use ecodeli_core::requirements::ProfileKind;
use ecodeli_core::status::ProfileVerificationStatus;
use ecodeli_core::types::DbId;
use sqlx::{PgExecutor, PgConnection, PgPool};

use crate::models::profile::{profile_columns, RoleProfile, UpdateProfileDetails};

pub struct ProfileRepo;

impl ProfileRepo {
    pub async fn find_by_user<'e>(
        executor: impl PgExecutor<'e>,
        kind: ProfileKind,
        user_id: DbId,
    ) -> Result<Option<RoleProfile>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM {} WHERE user_id = $1",
            profile_columns(kind),
            kind.table()
        );
        sqlx::query_as::<_, RoleProfile>(&query)
            .bind(user_id)
            .fetch_optional(executor)
            .await
    }

    /// Mark the user's profile verified, creating it if absent.
    ///
    /// Returns the profile id when this call flipped it to verified, and
    /// `None` when it was already verified. Under concurrent calls exactly one
    /// caller sees `Some`.
    pub async fn mark_verified(
        conn: &mut PgConnection,
        kind: ProfileKind,
        user_id: DbId,
    ) -> Result<Option<DbId>, sqlx::Error> {
        let table = kind.table();
        let query = format!(
            "INSERT INTO {table} (user_id, is_verified, verification_status_id, verification_date) \
             VALUES ($1, TRUE, $2, NOW()) \
             ON CONFLICT (user_id) DO UPDATE \
             SET is_verified = TRUE, \
                 verification_status_id = EXCLUDED.verification_status_id, \
                 verification_date = EXCLUDED.verification_date \
             WHERE NOT {table}.is_verified \
             RETURNING id"
        );
        sqlx::query_scalar(&query)
            .bind(user_id)
            .bind(ProfileVerificationStatus::Verified.id())
            .fetch_optional(conn)
            .await
    }

    /// Create or patch the role-specific fields of a user's profile.
    pub async fn upsert_details(
        pool: &PgPool,
        kind: ProfileKind,
        user_id: DbId,
        input: &UpdateProfileDetails,
    ) -> Result<RoleProfile, sqlx::Error> {
        let table = kind.table();
        let columns = profile_columns(kind);
        match kind {
            ProfileKind::Deliverer => {
                let query = format!(
                    "INSERT INTO {table} (user_id, vehicle_type) VALUES ($1, $2) \
                     ON CONFLICT (user_id) DO UPDATE \
                     SET vehicle_type = COALESCE(EXCLUDED.vehicle_type, {table}.vehicle_type) \
                     RETURNING {columns}"
                );
                sqlx::query_as::<_, RoleProfile>(&query)
                    .bind(user_id)
                    .bind(&input.vehicle_type)
                    .fetch_one(pool)
                    .await
            }
            ProfileKind::Merchant | ProfileKind::Provider => {
                let query = format!(
                    "INSERT INTO {table} (user_id, company_name, siret, address) \
                     VALUES ($1, $2, $3, $4) \
                     ON CONFLICT (user_id) DO UPDATE \
                     SET company_name = COALESCE(EXCLUDED.company_name, {table}.company_name), \
                         siret = COALESCE(EXCLUDED.siret, {table}.siret), \
                         address = COALESCE(EXCLUDED.address, {table}.address) \
                     RETURNING {columns}"
                );
                sqlx::query_as::<_, RoleProfile>(&query)
                    .bind(user_id)
                    .bind(&input.company_name)
                    .bind(&input.siret)
                    .bind(&input.address)
                    .fetch_one(pool)
                    .await
            }
        }
    }
}
