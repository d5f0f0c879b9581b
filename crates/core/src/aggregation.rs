//! Verification aggregation.
//!
//! Decides, from a user's documents, whether every document type required
//! for a role has been approved. Pure and idempotent: callers load the
//! documents (inside whatever transaction they need for read-after-write
//! consistency) and act on the returned [`VerificationSummary`].

use std::collections::HashMap;

use serde::Serialize;

use crate::documents::{DocumentType, EffectiveStatus};
use crate::status::ReviewStatus;
use crate::types::{DbId, Timestamp};

/// The fields of a document the aggregator looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSnapshot {
    pub id: DbId,
    pub document_type: DocumentType,
    pub status: ReviewStatus,
    pub uploaded_at: Timestamp,
    pub expires_at: Option<Timestamp>,
}

/// Roll-up status across all required document types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverallVerificationStatus {
    NotSubmitted,
    Pending,
    Approved,
    Rejected,
    Expired,
}

/// Outcome of evaluating one user against one role's requirements.
///
/// Every required type lands in exactly one of `approved_types`,
/// `pending_types`, `rejected_types`, `expired_types` or
/// `not_submitted_types`. `missing_types` lists every required type that is
/// not approved, whatever the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationSummary {
    pub is_complete: bool,
    pub overall_status: OverallVerificationStatus,
    pub missing_types: Vec<DocumentType>,
    pub approved_types: Vec<DocumentType>,
    pub pending_types: Vec<DocumentType>,
    pub rejected_types: Vec<DocumentType>,
    pub expired_types: Vec<DocumentType>,
    pub not_submitted_types: Vec<DocumentType>,
}

/// Pick the live document for each type: latest upload, higher id on ties.
pub fn live_documents(documents: &[DocumentSnapshot]) -> HashMap<DocumentType, &DocumentSnapshot> {
    let mut live: HashMap<DocumentType, &DocumentSnapshot> = HashMap::new();
    for doc in documents {
        live.entry(doc.document_type)
            .and_modify(|current| {
                if (doc.uploaded_at, doc.id) > (current.uploaded_at, current.id) {
                    *current = doc;
                }
            })
            .or_insert(doc);
    }
    live
}

/// Evaluate `documents` against the `required` types at time `now`.
pub fn evaluate(
    required: &[DocumentType],
    documents: &[DocumentSnapshot],
    now: Timestamp,
) -> VerificationSummary {
    let live = live_documents(documents);

    let mut summary = VerificationSummary {
        is_complete: false,
        overall_status: OverallVerificationStatus::NotSubmitted,
        missing_types: Vec::new(),
        approved_types: Vec::new(),
        pending_types: Vec::new(),
        rejected_types: Vec::new(),
        expired_types: Vec::new(),
        not_submitted_types: Vec::new(),
    };

    for &required_type in required {
        let Some(doc) = live.get(&required_type) else {
            summary.not_submitted_types.push(required_type);
            summary.missing_types.push(required_type);
            continue;
        };

        match EffectiveStatus::of(doc.status, doc.expires_at, now) {
            EffectiveStatus::Approved => {
                summary.approved_types.push(required_type);
                continue;
            }
            EffectiveStatus::Pending => summary.pending_types.push(required_type),
            EffectiveStatus::Rejected => summary.rejected_types.push(required_type),
            EffectiveStatus::Expired => summary.expired_types.push(required_type),
        }
        summary.missing_types.push(required_type);
    }

    summary.is_complete = summary.missing_types.is_empty();
    summary.overall_status = overall_status(required, &summary);
    summary
}

fn overall_status(required: &[DocumentType], summary: &VerificationSummary) -> OverallVerificationStatus {
    if summary.is_complete {
        OverallVerificationStatus::Approved
    } else if summary.not_submitted_types.len() == required.len() {
        OverallVerificationStatus::NotSubmitted
    } else if !summary.expired_types.is_empty() {
        OverallVerificationStatus::Expired
    } else if !summary.rejected_types.is_empty() {
        OverallVerificationStatus::Rejected
    } else {
        OverallVerificationStatus::Pending
    }
}
