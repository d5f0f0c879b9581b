//! Document entity model and DTOs.

use ecodeli_core::aggregation::DocumentSnapshot;
use ecodeli_core::documents::{DocumentType, EffectiveStatus};
use ecodeli_core::error::CoreError;
use ecodeli_core::roles::UserRole;
use ecodeli_core::status::ReviewStatus;
use ecodeli_core::types::{DbId, StatusId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Row from the `documents` table.
///
/// `storage_key` is the path inside the document store and is never exposed
/// to clients; use [`DocumentResponse`] for API output.
#[derive(Debug, Clone, FromRow)]
pub struct Document {
    pub id: DbId,
    pub user_id: DbId,
    pub user_role_id: StatusId,
    pub document_type: String,
    pub file_url: String,
    pub storage_key: String,
    pub filename: String,
    pub mime_type: String,
    pub file_size_bytes: i64,
    pub checksum_sha256: String,
    pub status_id: StatusId,
    pub rejection_reason: Option<String>,
    pub notes: Option<String>,
    pub expires_at: Option<Timestamp>,
    pub expiry_notified_at: Option<Timestamp>,
    pub uploaded_at: Timestamp,
    pub reviewed_by: Option<DbId>,
    pub reviewed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Document {
    pub fn kind(&self) -> Result<DocumentType, CoreError> {
        self.document_type.parse()
    }

    pub fn status(&self) -> Result<ReviewStatus, CoreError> {
        ReviewStatus::from_id(self.status_id).ok_or_else(|| {
            CoreError::Internal(format!(
                "document {} has unknown status id {}",
                self.id, self.status_id
            ))
        })
    }

    pub fn is_owned_by(&self, user_id: DbId) -> bool {
        self.user_id == user_id
    }

    /// Project the fields the verification aggregator reads.
    pub fn snapshot(&self) -> Result<DocumentSnapshot, CoreError> {
        Ok(DocumentSnapshot {
            id: self.id,
            document_type: self.kind()?,
            status: self.status()?,
            uploaded_at: self.uploaded_at,
            expires_at: self.expires_at,
        })
    }
}

/// Client-facing view of a document, annotated with its effective status.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentResponse {
    pub id: DbId,
    pub user_id: DbId,
    pub role: Option<UserRole>,
    pub document_type: DocumentType,
    pub filename: String,
    pub file_url: String,
    pub mime_type: String,
    pub file_size_bytes: i64,
    pub checksum_sha256: String,
    pub status: ReviewStatus,
    pub effective_status: EffectiveStatus,
    pub is_expired: bool,
    pub can_resubmit: bool,
    pub rejection_reason: Option<String>,
    pub notes: Option<String>,
    pub expires_at: Option<Timestamp>,
    pub uploaded_at: Timestamp,
    pub reviewed_by: Option<DbId>,
    pub reviewed_at: Option<Timestamp>,
}

impl DocumentResponse {
    pub fn from_document(doc: Document, now: Timestamp) -> Result<Self, CoreError> {
        let status = doc.status()?;
        let effective_status = EffectiveStatus::of(status, doc.expires_at, now);
        Ok(Self {
            id: doc.id,
            user_id: doc.user_id,
            role: UserRole::from_id(doc.user_role_id),
            document_type: doc.kind()?,
            filename: doc.filename,
            file_url: doc.file_url,
            mime_type: doc.mime_type,
            file_size_bytes: doc.file_size_bytes,
            checksum_sha256: doc.checksum_sha256,
            status,
            effective_status,
            is_expired: effective_status == EffectiveStatus::Expired,
            can_resubmit: effective_status.can_resubmit(),
            rejection_reason: doc.rejection_reason,
            notes: doc.notes,
            expires_at: doc.expires_at,
            uploaded_at: doc.uploaded_at,
            reviewed_by: doc.reviewed_by,
            reviewed_at: doc.reviewed_at,
        })
    }
}

/// DTO for inserting a freshly uploaded document. Status starts PENDING and
/// `file_url` is derived from the new id.
#[derive(Debug, Clone)]
pub struct CreateDocument {
    pub user_id: DbId,
    pub user_role_id: StatusId,
    pub document_type: DocumentType,
    pub storage_key: String,
    pub filename: String,
    pub mime_type: String,
    pub file_size_bytes: i64,
    pub checksum_sha256: String,
    pub notes: Option<String>,
    pub expires_at: Option<Timestamp>,
}

/// DTO for patching document metadata. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateDocumentMetadata {
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    pub expires_at: Option<Timestamp>,
}

/// Admin request body for `PUT /admin/documents/{id}/status`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateDocumentStatus {
    pub status: ReviewStatus,
    #[validate(length(max = 2000))]
    pub rejection_reason: Option<String>,
}

/// Row for the admin pending-documents listing.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PendingDocument {
    pub id: DbId,
    pub user_id: DbId,
    pub user_name: String,
    pub user_email: String,
    pub user_role_id: StatusId,
    pub document_type: String,
    pub filename: String,
    pub file_url: String,
    pub mime_type: String,
    pub notes: Option<String>,
    pub uploaded_at: Timestamp,
}
