//! Route definitions for the `/documents` resource.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{documents, verification};
use crate::state::AppState;

/// Routes mounted at `/documents`.
///
/// The upload route accepts bodies up to `upload_body_limit` bytes so
/// oversize files are rejected by validation with a 400, not by axum.
///
/// ```text
/// GET    /                          -> list_documents
/// POST   /                          -> upload_document (multipart)
/// GET    /required-types            -> required_types
/// GET    /expiring                  -> list_expiring_documents
/// GET    /{id}                      -> get_document
/// PATCH  /{id}                      -> update_document
/// DELETE /{id}                      -> delete_document
/// GET    /{id}/download             -> download_document
/// GET    /{id}/verifications        -> list_document_verifications
/// POST   /{id}/verifications        -> create_verification
/// ```
pub fn router(upload_body_limit: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            post(documents::upload_document)
                .layer(DefaultBodyLimit::max(upload_body_limit))
                .get(documents::list_documents),
        )
        .route("/required-types", get(documents::required_types))
        .route("/expiring", get(documents::list_expiring_documents))
        .route(
            "/{id}",
            get(documents::get_document)
                .patch(documents::update_document)
                .delete(documents::delete_document),
        )
        .route("/{id}/download", get(documents::download_document))
        .route(
            "/{id}/verifications",
            get(verification::list_document_verifications).post(verification::create_verification),
        )
}
