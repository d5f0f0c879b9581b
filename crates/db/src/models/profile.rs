//! Role profile model.
//!
//! Deliverer, merchant and provider profiles live in separate tables but
//! share their verification columns; [`RoleProfile`] is the common
//! projection, with role-specific columns left `None` where a table lacks
//! them.

use ecodeli_core::profile::ProfileFields;
use ecodeli_core::requirements::ProfileKind;
use ecodeli_core::status::ProfileVerificationStatus;
use ecodeli_core::types::{DbId, StatusId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RoleProfile {
    pub id: DbId,
    pub user_id: DbId,
    pub is_verified: bool,
    pub verification_status_id: StatusId,
    pub verification_date: Option<Timestamp>,
    pub vehicle_type: Option<String>,
    pub company_name: Option<String>,
    pub siret: Option<String>,
    pub address: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl RoleProfile {
    pub fn verification_status(&self) -> Option<ProfileVerificationStatus> {
        ProfileVerificationStatus::from_id(self.verification_status_id)
    }

    /// Completion fields, with `phone` taken from the user record.
    pub fn fields(&self, phone: Option<String>) -> ProfileFields {
        ProfileFields {
            phone,
            company_name: self.company_name.clone(),
            siret: self.siret.clone(),
            address: self.address.clone(),
        }
    }
}

/// Body for `PATCH /profile`. Fields a profile table lacks are ignored.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProfileDetails {
    #[validate(length(min = 6, max = 32))]
    pub phone: Option<String>,
    #[validate(length(max = 100))]
    pub vehicle_type: Option<String>,
    #[validate(length(max = 200))]
    pub company_name: Option<String>,
    #[validate(length(equal = 14))]
    pub siret: Option<String>,
    #[validate(length(max = 500))]
    pub address: Option<String>,
}

/// Column list for a profile kind. Missing columns are selected as NULL.
pub fn profile_columns(kind: ProfileKind) -> &'static str {
    match kind {
        ProfileKind::Deliverer => {
            "id, user_id, is_verified, verification_status_id, verification_date, \
             vehicle_type, NULL::TEXT AS company_name, NULL::TEXT AS siret, \
             NULL::TEXT AS address, created_at, updated_at"
        }
        ProfileKind::Merchant | ProfileKind::Provider => {
            "id, user_id, is_verified, verification_status_id, verification_date, \
             NULL::TEXT AS vehicle_type, company_name, siret, address, \
             created_at, updated_at"
        }
    }
}
