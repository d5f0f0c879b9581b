//! Document store operations that touch both the database and the file store.

use chrono::Utc;
use ecodeli_core::documents::{expiry_window, DocumentType};
use ecodeli_core::error::CoreError;
use ecodeli_core::status::ReviewStatus;
use ecodeli_core::types::{DbId, Timestamp};
use ecodeli_core::upload::{
    resolve_mime_type, sanitize_filename, validate_expiry, validate_file_size, validate_notes,
};
use ecodeli_db::models::audit::{CreateAuditLog, ACTION_DOCUMENT_DELETED, ENTITY_DOCUMENT};
use ecodeli_db::models::document::{
    CreateDocument, Document, DocumentResponse, UpdateDocumentMetadata,
};
use ecodeli_db::repositories::{AuditLogRepo, DocumentRepo, UserRepo, VerificationRepo};
use ecodeli_events::bus::{event_types, PlatformEvent};
use serde_json::json;
use validator::Validate;

use super::{document_not_found, role_from_id, user_not_found};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::storage::StoredFile;

/// A parsed upload form.
#[derive(Debug, Default)]
pub struct UploadInput {
    pub document_type: Option<String>,
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
    pub notes: Option<String>,
    pub expires_at: Option<Timestamp>,
}

/// Downloaded file contents with the metadata needed for response headers.
#[derive(Debug)]
pub struct DownloadedFile {
    pub filename: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Load a document the caller may act on (owner or admin).
pub async fn find_accessible(
    state: &AppState,
    caller: &AuthUser,
    document_id: DbId,
) -> AppResult<Document> {
    let document = DocumentRepo::find_by_id(&state.pool, document_id)
        .await?
        .ok_or_else(|| document_not_found(document_id))?;
    if !caller.can_access(document.user_id) {
        return Err(AppError::Core(CoreError::Forbidden(
            "You do not have access to this document".into(),
        )));
    }
    Ok(document)
}

/// Validate, store and register an uploaded document with its PENDING
/// verification request.
pub async fn upload(
    state: &AppState,
    caller: &AuthUser,
    input: UploadInput,
) -> AppResult<DocumentResponse> {
    let now = Utc::now();

    let raw_type = input
        .document_type
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("Missing 'type' field".into()))?;
    let document_type: DocumentType = raw_type.parse()?;
    let original_filename = input
        .filename
        .as_deref()
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing 'file' field".into()))?;

    let mime_type = resolve_mime_type(input.content_type.as_deref(), original_filename)?;
    validate_file_size(input.data.len() as u64)?;
    validate_notes(input.notes.as_deref())?;
    validate_expiry(input.expires_at, now)?;

    let user = UserRepo::find_by_id(&state.pool, caller.user_id)
        .await?
        .ok_or_else(|| user_not_found(caller.user_id))?;
    let role = role_from_id(user.role_id)?;

    if !state.catalog.accepts(role, document_type) {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Document type {document_type} is not required for role {role}"
        ))));
    }

    let filename = sanitize_filename(original_filename);
    let stored = state
        .storage
        .store(user.id, &filename, &input.data)
        .await?;

    let create = CreateDocument {
        user_id: user.id,
        user_role_id: user.role_id,
        document_type,
        storage_key: stored.storage_key.clone(),
        filename,
        mime_type: mime_type.to_string(),
        file_size_bytes: stored.size_bytes,
        checksum_sha256: stored.checksum_sha256.clone(),
        notes: input.notes,
        expires_at: input.expires_at,
    };

    let document = match insert_with_request(state, &create).await {
        Ok(document) => document,
        Err(e) => {
            discard_file(state, &stored).await;
            return Err(e);
        }
    };

    tracing::info!(
        user_id = user.id,
        document_id = document.id,
        document_type = %document_type,
        size = stored.size_bytes,
        "Document uploaded"
    );

    let response = DocumentResponse::from_document(document, now)?;

    state.event_bus.publish(
        PlatformEvent::new(event_types::DOCUMENT_UPLOADED)
            .with_source(ENTITY_DOCUMENT, response.id)
            .with_actor(user.id)
            .with_payload(json!({
                "user_id": user.id,
                "document_id": response.id,
                "document_type": document_type,
                "role": role,
            })),
    );

    Ok(response)
}

async fn insert_with_request(state: &AppState, create: &CreateDocument) -> AppResult<Document> {
    let mut tx = state.pool.begin().await?;
    let document = DocumentRepo::create(&mut *tx, create).await?;
    VerificationRepo::create(&mut *tx, create.user_id, document.id, None).await?;
    tx.commit().await?;
    Ok(document)
}

async fn discard_file(state: &AppState, stored: &StoredFile) {
    if let Err(e) = state.storage.remove(&stored.storage_key).await {
        tracing::warn!(
            error = %e,
            storage_key = %stored.storage_key,
            "Failed to remove orphaned document file"
        );
    }
}

/// The caller's documents, most recent first, with derived status flags.
pub async fn list_for_user(state: &AppState, user_id: DbId) -> AppResult<Vec<DocumentResponse>> {
    let now = Utc::now();
    let documents = DocumentRepo::list_by_user(&state.pool, user_id).await?;
    documents
        .into_iter()
        .map(|doc| DocumentResponse::from_document(doc, now).map_err(AppError::from))
        .collect()
}

/// The caller's documents expiring within `days` (default 30), soonest
/// first. Documents already past their expiry date are included.
pub async fn list_expiring(
    state: &AppState,
    user_id: DbId,
    days: Option<i64>,
) -> AppResult<Vec<DocumentResponse>> {
    let now = Utc::now();
    let until = now + expiry_window(days)?;
    let documents = DocumentRepo::list_expiring(&state.pool, user_id, until).await?;
    documents
        .into_iter()
        .map(|doc| DocumentResponse::from_document(doc, now).map_err(AppError::from))
        .collect()
}

/// Patch notes and expiry. The expiry is frozen once a document is reviewed.
pub async fn update_metadata(
    state: &AppState,
    caller: &AuthUser,
    document_id: DbId,
    input: UpdateDocumentMetadata,
) -> AppResult<DocumentResponse> {
    input.validate()?;
    let now = Utc::now();

    let document = find_accessible(state, caller, document_id).await?;

    if input.expires_at.is_some() {
        if document.status()? != ReviewStatus::Pending {
            return Err(AppError::Core(CoreError::Validation(
                "Expiry date can only be changed while the document is pending review".into(),
            )));
        }
        validate_expiry(input.expires_at, now)?;
    }

    let updated = DocumentRepo::update_metadata(&state.pool, document_id, &input)
        .await?
        .ok_or_else(|| document_not_found(document_id))?;

    Ok(DocumentResponse::from_document(updated, now)?)
}

/// Read a document's file from the store.
pub async fn download(
    state: &AppState,
    caller: &AuthUser,
    document_id: DbId,
) -> AppResult<DownloadedFile> {
    let document = find_accessible(state, caller, document_id).await?;

    let bytes = state
        .storage
        .read(&document.storage_key)
        .await
        .map_err(|e| {
            if e.is_not_found() {
                tracing::warn!(document_id, storage_key = %document.storage_key, "Document file missing");
                AppError::Core(CoreError::NotFound {
                    entity: "DocumentFile",
                    id: document_id,
                })
            } else {
                AppError::from(e)
            }
        })?;

    Ok(DownloadedFile {
        filename: document.filename,
        mime_type: document.mime_type,
        bytes,
    })
}

/// Delete a document, its ledger rows and its file.
///
/// An already-activated role is left as it is.
pub async fn delete(state: &AppState, caller: &AuthUser, document_id: DbId) -> AppResult<()> {
    let document = find_accessible(state, caller, document_id).await?;

    let mut tx = state.pool.begin().await?;
    if !DocumentRepo::delete(&mut *tx, document_id).await? {
        return Err(document_not_found(document_id));
    }
    AuditLogRepo::create(
        &mut *tx,
        &CreateAuditLog {
            action: ACTION_DOCUMENT_DELETED,
            entity_type: ENTITY_DOCUMENT,
            entity_id: document_id,
            performed_by_id: Some(caller.user_id),
            changes: Some(json!({
                "user_id": document.user_id,
                "document_type": document.document_type,
                "status_id": document.status_id,
                "filename": document.filename,
            })),
        },
    )
    .await?;
    tx.commit().await?;

    if let Err(e) = state.storage.remove(&document.storage_key).await {
        tracing::warn!(
            error = %e,
            document_id,
            storage_key = %document.storage_key,
            "Failed to remove document file"
        );
    }

    tracing::info!(user_id = caller.user_id, document_id, "Document deleted");
    Ok(())
}
