//! Library Gateway - Library Lending System
//!
//! Web gateway handling the OIDC login and relaying authenticated requests
//! to the backend API.

use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use library_frontend::{
    client::{backend::LibraryBackendClient, keycloak::KeycloakAdminClient, oidc::OidcClient},
    config::AppConfig,
    session::SessionStore,
    web, AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("library_frontend={},tower_http=debug", config.logging.level).into()
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting library gateway v{}", env!("CARGO_PKG_VERSION"));

    // Save server address before moving config
    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    // Clients for the provider and the backend
    let oidc = OidcClient::new(config.oidc.clone());
    let backend = LibraryBackendClient::new(config.backend.base_url.clone());
    let keycloak = KeycloakAdminClient::new(config.keycloak.clone());

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        sessions: Arc::new(SessionStore::new()),
        oidc: Arc::new(oidc),
        backend: Arc::new(backend),
        keycloak: Arc::new(keycloak),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(
        server_host.parse().expect("Invalid host address"),
        server_port,
    );

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    let facade = Router::new()
        .route("/me", get(web::library::me))
        .route("/books", get(web::library::books))
        .route("/books/:isbn", get(web::library::book))
        .route("/users", get(web::library::users))
        .route("/users/:user_name", get(web::library::user))
        .route("/me/borrowBook/:isbn", post(web::library::borrow_book))
        .route("/me/returnBook/:loan_id", post(web::library::return_book))
        .route("/admin/users", post(web::admin::create_user));

    Router::new()
        .route("/health", get(web::health::health_check))
        .route("/login", get(web::auth::login))
        .route("/login/callback", get(web::auth::callback))
        .route("/logout", get(web::auth::logout))
        .nest("/library/rest", facade)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
