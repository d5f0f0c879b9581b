//! Handlers for the caller's own profile and verification state.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use ecodeli_core::profile::{self, ProfileFields};
use ecodeli_core::status::ProfileVerificationStatus;
use ecodeli_db::models::profile::{RoleProfile, UpdateProfileDetails};
use ecodeli_db::models::user::User;
use ecodeli_db::repositories::{ProfileRepo, UserRepo};
use serde::Serialize;
use validator::Validate;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::verification::{aggregator, role_from_id, user_not_found};

#[derive(Debug, Serialize)]
pub struct ProfileView {
    pub user: User,
    pub profile: Option<RoleProfile>,
}

/// GET /api/v1/profile/completion
///
/// Missing profile fields plus missing document types for the caller's role.
pub async fn get_completion(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| user_not_found(auth.user_id))?;
    let role = role_from_id(user.role_id)?;

    let (fields, verification_status) = match state.catalog.profile_kind(role) {
        Some(kind) => {
            let record = ProfileRepo::find_by_user(&state.pool, kind, user.id).await?;
            let status = record
                .as_ref()
                .and_then(RoleProfile::verification_status)
                .unwrap_or(ProfileVerificationStatus::Pending);
            let fields = match record {
                Some(record) => record.fields(user.phone.clone()),
                None => ProfileFields {
                    phone: user.phone.clone(),
                    ..Default::default()
                },
            };
            (fields, Some(status))
        }
        None => (
            ProfileFields {
                phone: user.phone.clone(),
                ..Default::default()
            },
            None,
        ),
    };

    let summary = aggregator::evaluate_user(&state.pool, &state.catalog, user.id, role).await?;
    let completion = profile::completion(role, &fields, &summary, verification_status);

    Ok(Json(DataResponse { data: completion }))
}

/// GET /api/v1/profile/verification
pub async fn get_verification(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let overview = aggregator::overview(&state, auth.user_id).await?;
    Ok(Json(DataResponse { data: overview }))
}

/// PATCH /api/v1/profile
///
/// Update the caller's phone and role-specific profile fields. Omitted
/// fields keep their current value.
pub async fn update_profile(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<UpdateProfileDetails>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let user = UserRepo::update_phone(&state.pool, auth.user_id, input.phone.as_deref())
        .await?
        .ok_or_else(|| user_not_found(auth.user_id))?;
    let role = role_from_id(user.role_id)?;

    let profile = match state.catalog.profile_kind(role) {
        Some(kind) => Some(ProfileRepo::upsert_details(&state.pool, kind, user.id, &input).await?),
        None => None,
    };

    tracing::info!(user_id = user.id, role = %role, "Profile updated");

    Ok(Json(DataResponse {
        data: ProfileView { user, profile },
    }))
}
