//! Admin handlers for the review queues, decisions and per-user verification.
//!
//! All endpoints require the `ADMIN` role via [`RequireAdmin`].

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use ecodeli_core::pagination::{PageRequest, Pagination};
use ecodeli_core::types::DbId;
use ecodeli_db::models::document::UpdateDocumentStatus;
use ecodeli_db::models::verification::{ReviewVerification, VerificationStats};
use ecodeli_db::repositories::{
    DocumentRepo, UserRepo, VerificationHistoryRepo, VerificationRepo,
};
use validator::Validate;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::query::{PendingVerificationParams, RoleFilterParams};
use crate::response::{DataResponse, Paginated};
use crate::state::AppState;
use crate::verification::{activation, aggregator, ledger, reminders, user_not_found};

/// GET /api/v1/admin/documents/pending?role=
///
/// Pending documents, oldest first.
pub async fn list_pending_documents(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<RoleFilterParams>,
) -> AppResult<impl IntoResponse> {
    let role = params.role()?;
    let documents = DocumentRepo::list_pending(&state.pool, role.map(|r| r.id())).await?;
    Ok(Json(DataResponse { data: documents }))
}

/// PUT /api/v1/admin/documents/{id}/status
pub async fn update_document_status(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(document_id): Path<DbId>,
    Json(input): Json<UpdateDocumentStatus>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let outcome = ledger::update_document_status(
        &state,
        document_id,
        admin.user_id,
        input.status,
        input.rejection_reason.as_deref(),
    )
    .await?;
    Ok(Json(DataResponse { data: outcome }))
}

/// GET /api/v1/admin/verifications/pending?role=&page=&limit=&sort_by=&sort_order=
pub async fn list_pending_verifications(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<PendingVerificationParams>,
) -> AppResult<impl IntoResponse> {
    let role_id = params.role_filter().role()?.map(|r| r.id());
    let page = PageRequest::new(params.page, params.limit)?;

    let items = VerificationRepo::list_pending(
        &state.pool,
        role_id,
        page,
        params.sort_by,
        params.sort_order,
    )
    .await?;
    let total = VerificationRepo::count_pending(&state.pool, role_id).await?;

    Ok(Json(DataResponse {
        data: Paginated {
            items,
            pagination: Pagination::new(page, total),
        },
    }))
}

/// PUT /api/v1/admin/verifications/{id}
pub async fn review_verification(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ReviewVerification>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let outcome =
        ledger::review(&state, id, admin.user_id, input.status, input.notes.as_deref()).await?;
    Ok(Json(DataResponse { data: outcome }))
}

/// GET /api/v1/admin/verifications/stats
pub async fn verification_stats(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<VerificationStats>>> {
    let stats = VerificationRepo::stats(&state.pool).await?;
    Ok(Json(DataResponse { data: stats }))
}

/// GET /api/v1/admin/users/{id}/verification
pub async fn user_verification(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let overview = aggregator::overview(&state, user_id).await?;
    Ok(Json(DataResponse { data: overview }))
}

/// POST /api/v1/admin/users/{id}/verification/reconcile
pub async fn reconcile_user(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let outcome = activation::reconcile(&state, user_id, admin.user_id).await?;
    Ok(Json(DataResponse { data: outcome }))
}

/// POST /api/v1/admin/users/{id}/verification/remind
///
/// Sends a missing-documents reminder now, ignoring the reminder cooldown.
pub async fn remind_user(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let outcome = reminders::remind(&state, user_id).await?;
    Ok(Json(DataResponse { data: outcome }))
}

/// GET /api/v1/admin/users/{id}/verification-history
pub async fn verification_history(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    UserRepo::find_by_id(&state.pool, user_id)
        .await?
        .ok_or_else(|| user_not_found(user_id))?;
    let history = VerificationHistoryRepo::list_for_user(&state.pool, user_id).await?;
    Ok(Json(DataResponse { data: history }))
}
