//! Route definitions for the caller's `/profile`.

use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::profile;
use crate::state::AppState;

/// Routes mounted at `/profile`.
///
/// ```text
/// PATCH  /                          -> update_profile
/// GET    /completion                -> get_completion
/// GET    /verification              -> get_verification
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", patch(profile::update_profile))
        .route("/completion", get(profile::get_completion))
        .route("/verification", get(profile::get_verification))
}
