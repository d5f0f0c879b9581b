//! Verification request ledger.
//!
//! Requests move PENDING -> APPROVED | REJECTED by admin review and back to
//! PENDING on resubmission. A decision is mirrored onto the document in the
//! same transaction, and the owner's role is re-evaluated inside a savepoint
//! so an activation failure never loses the review itself.
//!
//! Rows are locked document first, then request, then the owning user, on
//! every path. The user lock serialises reviews of one user's documents so
//! each evaluation sees every decision committed before it.

use chrono::Utc;
use ecodeli_core::aggregation::VerificationSummary;
use ecodeli_core::error::CoreError;
use ecodeli_core::requirements::RequirementCatalog;
use ecodeli_core::roles::UserRole;
use ecodeli_core::status::{ensure_resubmittable, ensure_reviewable, validate_decision, ReviewStatus};
use ecodeli_core::types::DbId;
use ecodeli_core::upload::validate_notes;
use ecodeli_db::models::audit::{
    CreateAuditLog, ACTION_VERIFICATION_RESUBMITTED, ACTION_VERIFICATION_REVIEWED,
    ENTITY_VERIFICATION,
};
use ecodeli_db::models::document::DocumentResponse;
use ecodeli_db::models::verification::VerificationRequest;
use ecodeli_db::repositories::{AuditLogRepo, DocumentRepo, UserRepo, VerificationRepo};
use ecodeli_events::bus::{event_types, PlatformEvent};
use serde::Serialize;
use serde_json::json;
use sqlx::{Connection, PgConnection};

use super::activation::{self, ActivationOutcome};
use super::{document_not_found, role_from_id, user_not_found};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Result of an admin review.
#[derive(Debug, Serialize)]
pub struct ReviewOutcome {
    pub verification: VerificationRequest,
    pub document: DocumentResponse,
    /// The owner's verification state after the review. Absent when the
    /// evaluation itself failed.
    pub summary: Option<VerificationSummary>,
    pub activation: Option<ActivationOutcome>,
    /// Set when the review committed but role activation did not.
    pub activation_error: Option<String>,
}

fn verification_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "VerificationRequest",
        id,
    })
}

fn request_status(request: &VerificationRequest) -> Result<ReviewStatus, AppError> {
    request.status().ok_or_else(|| {
        AppError::Core(CoreError::Internal(format!(
            "verification request {} has unknown status id {}",
            request.id, request.status_id
        )))
    })
}

/// Open (or reopen) the verification request for a document.
///
/// Only the owner may do this. A REJECTED document goes back to PENDING in
/// the same transaction; an APPROVED one is refused.
pub async fn create_or_reset(
    state: &AppState,
    caller: &AuthUser,
    document_id: DbId,
    notes: Option<&str>,
) -> AppResult<VerificationRequest> {
    validate_notes(notes)?;

    let mut tx = state.pool.begin().await?;

    let document = DocumentRepo::find_by_id_for_update(&mut *tx, document_id)
        .await?
        .ok_or_else(|| document_not_found(document_id))?;

    if !document.is_owned_by(caller.user_id) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the document owner can request verification".into(),
        )));
    }

    let status = document.status()?;
    ensure_resubmittable(status)?;

    let request = match VerificationRepo::find_by_document(&mut *tx, document_id).await? {
        Some(existing) => {
            VerificationRepo::reset_to_pending(&mut *tx, existing.id, notes).await?
        }
        None => VerificationRepo::create(&mut *tx, caller.user_id, document_id, notes).await?,
    };

    if status == ReviewStatus::Rejected {
        DocumentRepo::reset_to_pending(&mut *tx, document_id).await?;
        AuditLogRepo::create(
            &mut *tx,
            &CreateAuditLog {
                action: ACTION_VERIFICATION_RESUBMITTED,
                entity_type: ENTITY_VERIFICATION,
                entity_id: request.id,
                performed_by_id: Some(caller.user_id),
                changes: Some(json!({
                    "document_id": document_id,
                    "from": status,
                    "to": ReviewStatus::Pending,
                })),
            },
        )
        .await?;
    }

    tx.commit().await?;

    tracing::info!(
        user_id = caller.user_id,
        document_id,
        verification_id = request.id,
        resubmitted = status == ReviewStatus::Rejected,
        "Verification requested"
    );

    Ok(request)
}

/// Record an admin decision on a verification request.
pub async fn review(
    state: &AppState,
    request_id: DbId,
    verifier_id: DbId,
    status: ReviewStatus,
    notes: Option<&str>,
) -> AppResult<ReviewOutcome> {
    validate_decision(status)?;
    validate_notes(notes)?;

    let document_id = VerificationRepo::find_by_id(&state.pool, request_id)
        .await?
        .ok_or_else(|| verification_not_found(request_id))?
        .document_id;

    let mut tx = state.pool.begin().await?;

    let document = DocumentRepo::find_by_id_for_update(&mut *tx, document_id)
        .await?
        .ok_or_else(|| document_not_found(document_id))?;
    let request = VerificationRepo::find_by_id_for_update(&mut *tx, request_id)
        .await?
        .ok_or_else(|| verification_not_found(request_id))?;

    // A concurrent reviewer that got here first leaves the request decided.
    ensure_reviewable(request_status(&request)?, status)?;
    let previous = document.status()?;
    ensure_reviewable(previous, status)?;

    let owner_id = document.user_id;
    if !UserRepo::lock_for_update(&mut *tx, owner_id).await? {
        return Err(user_not_found(owner_id));
    }

    let request =
        VerificationRepo::record_decision(&mut *tx, request_id, verifier_id, status, notes)
            .await?;
    let document =
        DocumentRepo::set_review_status(&mut *tx, document_id, status, verifier_id, notes)
            .await?;

    AuditLogRepo::create(
        &mut *tx,
        &CreateAuditLog {
            action: ACTION_VERIFICATION_REVIEWED,
            entity_type: ENTITY_VERIFICATION,
            entity_id: request_id,
            performed_by_id: Some(verifier_id),
            changes: Some(json!({
                "document_id": document_id,
                "from": previous,
                "to": status,
                "notes": notes,
            })),
        },
    )
    .await?;

    let role = role_from_id(document.user_role_id)?;

    let (summary, activation, activation_error) =
        match evaluate_in_savepoint(&mut *tx, &state.catalog, owner_id, role, verifier_id).await {
            Ok((summary, activation)) => (Some(summary), activation, None),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    user_id = owner_id,
                    document_id,
                    verification_id = request_id,
                    "Role activation failed after review; profile and documents are out of sync"
                );
                (None, None, Some(e.to_string()))
            }
        };

    let document = DocumentResponse::from_document(document, Utc::now())?;

    tx.commit().await?;

    tracing::info!(
        verifier_id,
        document_id,
        verification_id = request_id,
        status = %status,
        "Verification reviewed"
    );

    state
        .event_bus
        .publish(reviewed_event(&document, status, notes, verifier_id));
    if activation.is_some_and(ActivationOutcome::is_activated) {
        state
            .event_bus
            .publish(role_activated_event(owner_id, role, Some(verifier_id)));
    }

    Ok(ReviewOutcome {
        verification: request,
        document,
        summary,
        activation,
        activation_error,
    })
}

/// Decide a document directly. Routed through the document's ledger entry
/// so document and request stay in sync.
pub async fn update_document_status(
    state: &AppState,
    document_id: DbId,
    verifier_id: DbId,
    status: ReviewStatus,
    rejection_reason: Option<&str>,
) -> AppResult<ReviewOutcome> {
    validate_decision(status)?;

    let document = DocumentRepo::find_by_id(&state.pool, document_id)
        .await?
        .ok_or_else(|| document_not_found(document_id))?;
    ensure_reviewable(document.status()?, status)?;

    let request = match VerificationRepo::find_by_document(&state.pool, document_id).await? {
        Some(request) => request,
        None => {
            let mut tx = state.pool.begin().await?;
            let request =
                VerificationRepo::create(&mut *tx, document.user_id, document_id, None).await?;
            tx.commit().await?;
            request
        }
    };

    review(state, request.id, verifier_id, status, rejection_reason).await
}

async fn evaluate_in_savepoint(
    conn: &mut PgConnection,
    catalog: &RequirementCatalog,
    user_id: DbId,
    role: UserRole,
    verifier_id: DbId,
) -> Result<(VerificationSummary, Option<ActivationOutcome>), AppError> {
    let mut savepoint = conn.begin().await?;
    match activation::evaluate_and_activate(&mut *savepoint, catalog, user_id, role, Some(verifier_id))
        .await
    {
        Ok(result) => {
            savepoint.commit().await?;
            Ok(result)
        }
        Err(e) => {
            savepoint.rollback().await?;
            Err(e)
        }
    }
}

pub(crate) fn reviewed_event(
    document: &DocumentResponse,
    status: ReviewStatus,
    reason: Option<&str>,
    verifier_id: DbId,
) -> PlatformEvent {
    PlatformEvent::new(event_types::DOCUMENT_REVIEWED)
        .with_source("document", document.id)
        .with_actor(verifier_id)
        .with_payload(json!({
            "user_id": document.user_id,
            "document_type": document.document_type,
            "status": status,
            "reason": reason,
            "document": document,
        }))
}

pub(crate) fn role_activated_event(
    user_id: DbId,
    role: UserRole,
    verified_by: Option<DbId>,
) -> PlatformEvent {
    let event = PlatformEvent::new(event_types::ROLE_ACTIVATED)
        .with_source("user", user_id)
        .with_payload(json!({
            "user_id": user_id,
            "role": role,
        }));
    match verified_by {
        Some(admin_id) => event.with_actor(admin_id),
        None => event,
    }
}
