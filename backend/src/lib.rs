//! Library lending backend
//!
//! REST JSON API over the book catalog, the user directory and the loan
//! ledger, secured by bearer tokens from an external identity provider.

use std::sync::Arc;

use library_commons::security::TokenVerifier;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod policy;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
    pub verifier: Arc<TokenVerifier>,
}
