//! Keycloak admin API client
//!
//! Machine-to-machine client used only at user-creation time. The admin
//! token is cached together with its expiry timestamp and refreshed only
//! once that has passed.

use chrono::{DateTime, Duration, Utc};
use library_commons::model::User;
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::{
    config::KeycloakConfig,
    error::{AppError, AppResult},
};

/// Seconds subtracted from the reported lifetime to avoid using a token
/// that expires mid-request.
const TOKEN_EXPIRY_SKEW_SECONDS: i64 = 30;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

pub struct KeycloakAdminClient {
    http: reqwest::Client,
    config: KeycloakConfig,
    cached: Mutex<Option<CachedToken>>,
}

impl KeycloakAdminClient {
    pub fn new(config: KeycloakConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            cached: Mutex::new(None),
        }
    }

    /// Create the user in the provider realm with an initial password.
    pub async fn create_user(&self, user: &User, password: &str) -> AppResult<()> {
        let token = self.token().await?;

        let body = serde_json::json!({
            "username": user.username,
            "firstName": user.first_name,
            "lastName": user.last_name,
            "email": user.email,
            "enabled": true,
            "emailVerified": true,
            "credentials": [{
                "type": "password",
                "value": password,
                "temporary": false
            }]
        });

        let response = self
            .http
            .post(format!(
                "{}/admin/realms/{}/users",
                self.config.base_url, self.config.realm
            ))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Provider(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::Provider(format!(
                "user creation failed with status {}",
                response.status()
            )));
        }

        Ok(())
    }

    /// Cached admin token, fetched via password grant when absent or expired.
    async fn token(&self) -> AppResult<String> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref() {
            if Utc::now() < token.expires_at {
                return Ok(token.token.clone());
            }
        }

        let response = self
            .http
            .post(format!(
                "{}/realms/{}/protocol/openid-connect/token",
                self.config.base_url, self.config.admin_realm
            ))
            .form(&[
                ("grant_type", "password"),
                ("client_id", self.config.admin_client_id.as_str()),
                ("username", self.config.admin_username.as_str()),
                ("password", self.config.admin_password.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::Provider(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::Provider(format!(
                "admin token request failed with status {}",
                response.status()
            )));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::Provider(e.to_string()))?;

        let lifetime = (body.expires_in - TOKEN_EXPIRY_SKEW_SECONDS).max(0);
        let fresh = CachedToken {
            token: body.access_token,
            expires_at: Utc::now() + Duration::seconds(lifetime),
        };
        let token = fresh.token.clone();
        *cached = Some(fresh);

        tracing::debug!("refreshed provider admin token, valid for {}s", lifetime);
        Ok(token)
    }
}
