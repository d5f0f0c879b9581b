//! Handlers for the `/documents` resource.
//!
//! Every endpoint requires authentication. Single-document endpoints are
//! limited to the owner and admins.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, Utc};
use ecodeli_core::documents::DocumentType;
use ecodeli_core::roles::UserRole;
use ecodeli_core::types::DbId;
use ecodeli_db::models::document::{DocumentResponse, UpdateDocumentMetadata};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::ExpiringParams;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::verification;
use crate::verification::documents::{self, UploadInput};

#[derive(Debug, Serialize)]
pub struct RequiredTypesResponse {
    pub role: UserRole,
    pub required_types: Vec<DocumentType>,
}

/// POST /api/v1/documents
///
/// Multipart upload with fields `type`, `file`, and optional `notes` and
/// `expires_at` (RFC 3339).
pub async fn upload_document(
    auth: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<DocumentResponse>>)> {
    let mut input = UploadInput::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                input.filename = field.file_name().map(str::to_string);
                input.content_type = field.content_type().map(str::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                input.data = data.to_vec();
            }
            "type" | "document_type" => {
                input.document_type = Some(read_text(field).await?);
            }
            "notes" => {
                let text = read_text(field).await?;
                input.notes = (!text.trim().is_empty()).then_some(text);
            }
            "expires_at" => {
                let text = read_text(field).await?;
                input.expires_at = parse_expiry(&text)?;
            }
            _ => {} // ignore unknown fields
        }
    }

    let document = documents::upload(&state, &auth, input).await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: document })))
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> AppResult<String> {
    field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))
}

fn parse_expiry(raw: &str) -> AppResult<Option<DateTime<Utc>>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| Some(dt.with_timezone(&Utc)))
        .map_err(|_| AppError::BadRequest(format!("Invalid expires_at '{raw}'. Expected RFC 3339")))
}

/// GET /api/v1/documents
///
/// The caller's documents, most recent first.
pub async fn list_documents(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let documents = documents::list_for_user(&state, auth.user_id).await?;
    Ok(Json(DataResponse { data: documents }))
}

/// GET /api/v1/documents/expiring?days=30
pub async fn list_expiring_documents(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ExpiringParams>,
) -> AppResult<impl IntoResponse> {
    let documents = documents::list_expiring(&state, auth.user_id, params.days).await?;
    Ok(Json(DataResponse { data: documents }))
}

/// GET /api/v1/documents/required-types
///
/// Answers for the stored role, the same one upload checks against.
pub async fn required_types(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let role = verification::stored_role(&state, auth.user_id).await?;
    let data = RequiredTypesResponse {
        role,
        required_types: state.catalog.required_types(role).to_vec(),
    };
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/documents/{id}
pub async fn get_document(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let document = documents::find_accessible(&state, &auth, id).await?;
    let data = DocumentResponse::from_document(document, Utc::now())?;
    Ok(Json(DataResponse { data }))
}

/// PATCH /api/v1/documents/{id}
pub async fn update_document(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateDocumentMetadata>,
) -> AppResult<impl IntoResponse> {
    let document = documents::update_metadata(&state, &auth, id, input).await?;
    Ok(Json(DataResponse { data: document }))
}

/// DELETE /api/v1/documents/{id}
pub async fn delete_document(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    documents::delete(&state, &auth, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/documents/{id}/download
///
/// Streams the stored file back with its recorded MIME type.
pub async fn download_document(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let file = documents::download(&state, &auth, id).await?;
    let disposition = format!("attachment; filename=\"{}\"", file.filename);
    Ok((
        [
            (header::CONTENT_TYPE, file.mime_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.bytes,
    ))
}
