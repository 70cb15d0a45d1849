//! Configuration management for the library gateway

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Location of the backend API.
#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    pub base_url: String,
}

/// OIDC client registration for the login flow.
#[derive(Debug, Deserialize, Clone)]
pub struct OidcConfig {
    pub issuer_uri: String,
    pub jwks_uri: String,
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

/// Machine-to-machine account for the provider's admin API.
#[derive(Debug, Deserialize, Clone)]
pub struct KeycloakConfig {
    pub base_url: String,
    /// Realm holding the library users.
    pub realm: String,
    /// Realm the admin account authenticates against.
    pub admin_realm: String,
    pub admin_client_id: String,
    pub admin_username: String,
    pub admin_password: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub oidc: OidcConfig,
    pub keycloak: KeycloakConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default"))
            // Layer on the environment-specific file
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add environment variables (with prefix GATEWAY_)
            .add_source(
                Environment::with_prefix("GATEWAY")
                    .separator("_")
                    .try_parsing(true),
            )
            // Override key endpoints from env vars if present
            .set_override_option("backend.base_url", env::var("BACKEND_BASE_URL").ok())?
            .set_override_option("oidc.issuer_uri", env::var("OIDC_ISSUER_URI").ok())?
            .set_override_option("oidc.client_secret", env::var("OIDC_CLIENT_SECRET").ok())?
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8082,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
