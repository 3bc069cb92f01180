//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::persistence::SqlitePersistence;
use crate::service::ConnectionHub;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Connection hub for WebSocket clients.
    pub hub: Arc<ConnectionHub>,
    /// Allow-list and decision storage for the admin endpoints.
    pub persistence: Arc<SqlitePersistence>,
}
