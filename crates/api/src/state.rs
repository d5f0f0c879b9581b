use std::sync::Arc;

use ecodeli_core::requirements::RequirementCatalog;

use crate::config::ServerConfig;
use crate::storage::DocumentStorage;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything is behind `Arc` or already `Clone`.
#[derive(Clone)]
pub struct AppState {
    pub pool: ecodeli_db::DbPool,
    pub config: Arc<ServerConfig>,
    pub event_bus: Arc<ecodeli_events::EventBus>,
    /// Role requirement table, fixed at startup.
    pub catalog: Arc<RequirementCatalog>,
    pub storage: Arc<DocumentStorage>,
}
