//! Route definitions for `/admin`.
//!
//! All endpoints require the `ADMIN` role.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// ```text
/// GET    /documents/pending                       -> list_pending_documents
/// PUT    /documents/{id}/status                   -> update_document_status
///
/// GET    /verifications/pending                   -> list_pending_verifications
/// GET    /verifications/stats                     -> verification_stats
/// PUT    /verifications/{id}                      -> review_verification
///
/// GET    /users/{id}/verification                 -> user_verification
/// POST   /users/{id}/verification/reconcile       -> reconcile_user
/// POST   /users/{id}/verification/remind          -> remind_user
/// GET    /users/{id}/verification-history         -> verification_history
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/documents/pending", get(admin::list_pending_documents))
        .route("/documents/{id}/status", put(admin::update_document_status))
        .route(
            "/verifications/pending",
            get(admin::list_pending_verifications),
        )
        .route("/verifications/stats", get(admin::verification_stats))
        .route("/verifications/{id}", put(admin::review_verification))
        .route("/users/{id}/verification", get(admin::user_verification))
        .route(
            "/users/{id}/verification/reconcile",
            post(admin::reconcile_user),
        )
        .route(
            "/users/{id}/verification/remind",
            post(admin::remind_user),
        )
        .route(
            "/users/{id}/verification-history",
            get(admin::verification_history),
        )
}
