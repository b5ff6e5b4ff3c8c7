use std::sync::Arc;

use tokenward_core::session::SessionStore;

use crate::auth::service::TokenService;
use crate::config::ServerConfig;
use crate::notifications::NotificationDispatcher;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration (read by the client address extractor).
    pub config: Arc<ServerConfig>,
    /// Token issuance and rotation.
    pub tokens: Arc<TokenService>,
    /// Session store, also checked by the health endpoint.
    pub store: Arc<dyn SessionStore>,
    /// Address-change notification dispatcher, drained at shutdown.
    pub notifications: NotificationDispatcher,
}
