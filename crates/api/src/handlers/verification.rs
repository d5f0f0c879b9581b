//! Handlers for verification requests owned by the caller.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use ecodeli_core::types::DbId;
use ecodeli_db::models::verification::CreateVerification;
use ecodeli_db::repositories::VerificationRepo;
use validator::Validate;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::verification::{documents, ledger};

/// POST /api/v1/documents/{id}/verifications
///
/// Request (or re-request) review of one of the caller's documents.
pub async fn create_verification(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(document_id): Path<DbId>,
    Json(input): Json<CreateVerification>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let request =
        ledger::create_or_reset(&state, &auth, document_id, input.notes.as_deref()).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: request })))
}

/// GET /api/v1/documents/{id}/verifications
pub async fn list_document_verifications(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(document_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    documents::find_accessible(&state, &auth, document_id).await?;
    let requests = VerificationRepo::list_for_document(&state.pool, document_id).await?;
    Ok(Json(DataResponse { data: requests }))
}

/// GET /api/v1/verifications
pub async fn list_my_verifications(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let requests = VerificationRepo::list_for_user(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse { data: requests }))
}
