pub mod admin;
pub mod documents;
pub mod health;
pub mod notification;
pub mod profile;
pub mod verifications;

use axum::Router;

use crate::config::ServerConfig;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /documents                                       list, upload (multipart)
/// /documents/required-types                        document types for the caller's role
/// /documents/{id}                                  get, update metadata, delete
/// /documents/{id}/download                         file contents
/// /documents/{id}/verifications                    list, request review (POST)
///
/// /verifications                                   caller's verification requests
///
/// /profile                                         update details (PATCH)
/// /profile/completion                              missing fields and documents
/// /profile/verification                            verification overview
///
/// /admin/documents/pending                         pending documents (?role=)
/// /admin/documents/{id}/status                     approve / reject (PUT)
/// /admin/verifications/pending                     paginated review queue
/// /admin/verifications/stats                       queue statistics
/// /admin/verifications/{id}                        approve / reject (PUT)
/// /admin/users/{id}/verification                   user verification overview
/// /admin/users/{id}/verification/reconcile         re-run activation (POST)
/// /admin/users/{id}/verification-history           activation history
///
/// /notifications                                   list
/// /notifications/unread-count                      unread count
/// /notifications/{id}/read                         mark read (POST)
/// ```
pub fn api_routes(config: &ServerConfig) -> Router<AppState> {
    Router::new()
        .nest(
            "/documents",
            documents::router(config.upload_body_limit_bytes),
        )
        .nest("/verifications", verifications::router())
        .nest("/profile", profile::router())
        .nest("/admin", admin::router())
        .nest("/notifications", notification::router())
}
