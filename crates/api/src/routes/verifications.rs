//! Route definitions for the `/verifications` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::verification;
use crate::state::AppState;

/// Routes mounted at `/verifications`.
///
/// ```text
/// GET    /                          -> list_my_verifications
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(verification::list_my_verifications))
}
