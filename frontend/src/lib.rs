//! Library gateway service
//!
//! OIDC login against the identity provider, token relay to the backend API
//! and the JSON facade consumed by the rendered pages.

use std::sync::Arc;

pub mod client;
pub mod config;
pub mod error;
pub mod session;
pub mod web;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub sessions: Arc<session::SessionStore>,
    pub oidc: Arc<client::oidc::OidcClient>,
    pub backend: Arc<client::backend::LibraryBackendClient>,
    pub keycloak: Arc<client::keycloak::KeycloakAdminClient>,
}
