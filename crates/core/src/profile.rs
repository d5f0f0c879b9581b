//! Profile completion checks.
//!
//! A profile is complete when the role's mandatory contact fields are filled
//! in and every required document has been approved.

use serde::Serialize;

use crate::aggregation::VerificationSummary;
use crate::roles::UserRole;
use crate::status::ProfileVerificationStatus;

/// The optional fields completion is judged on.
#[derive(Debug, Clone, Default)]
pub struct ProfileFields {
    pub phone: Option<String>,
    pub company_name: Option<String>,
    pub siret: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileCompletion {
    pub is_complete: bool,
    pub missing_fields: Vec<String>,
    pub verification_status: ProfileVerificationStatus,
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

/// Names of mandatory profile fields that are empty for `role`.
pub fn missing_profile_fields(role: UserRole, fields: &ProfileFields) -> Vec<&'static str> {
    let checks: &[(&'static str, &Option<String>)] = match role {
        UserRole::Client | UserRole::Deliverer => &[("phone", &fields.phone)],
        UserRole::Merchant | UserRole::Provider => &[
            ("company_name", &fields.company_name),
            ("siret", &fields.siret),
            ("address", &fields.address),
        ],
        UserRole::Admin => &[],
    };
    checks
        .iter()
        .filter(|(_, value)| is_blank(value))
        .map(|(name, _)| *name)
        .collect()
}

/// Combine missing profile fields with missing document types.
///
/// `verification_status` is the profile record's status; roles without a
/// profile pass `None` and are reported as VERIFIED.
pub fn completion(
    role: UserRole,
    fields: &ProfileFields,
    summary: &VerificationSummary,
    verification_status: Option<ProfileVerificationStatus>,
) -> ProfileCompletion {
    let mut missing_fields: Vec<String> = missing_profile_fields(role, fields)
        .into_iter()
        .map(str::to_string)
        .collect();
    missing_fields.extend(summary.missing_types.iter().map(|t| t.as_str().to_string()));

    ProfileCompletion {
        is_complete: missing_fields.is_empty(),
        missing_fields,
        verification_status: verification_status.unwrap_or(ProfileVerificationStatus::Verified),
    }
}
