//! OAuth2/OIDC client for the login flow

use library_commons::security::{Claims, TokenVerifier};
use serde::Deserialize;

use crate::{
    config::OidcConfig,
    error::{AppError, AppResult},
};

/// Token endpoint response.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}

/// Client for the provider's authorization and token endpoints.
pub struct OidcClient {
    http: reqwest::Client,
    config: OidcConfig,
    verifier: TokenVerifier,
}

impl OidcClient {
    pub fn new(config: OidcConfig) -> Self {
        let verifier = TokenVerifier::new(config.jwks_uri.clone(), config.issuer_uri.clone());
        Self {
            http: reqwest::Client::new(),
            config,
            verifier,
        }
    }

    /// Authorization endpoint redirect target for the login flow.
    pub fn authorize_url(&self, state: &str) -> AppResult<String> {
        let url = reqwest::Url::parse_with_params(
            &format!("{}/protocol/openid-connect/auth", self.config.issuer_uri),
            &[
                ("response_type", "code"),
                ("client_id", self.config.client_id.as_str()),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("scope", "openid profile email"),
                ("state", state),
            ],
        )
        .map_err(|e| AppError::Internal(format!("invalid authorize url: {}", e)))?;

        Ok(url.into())
    }

    /// Exchange an authorization code for tokens.
    pub async fn exchange_code(&self, code: &str) -> AppResult<TokenResponse> {
        self.token_request(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
        ])
        .await
    }

    /// Obtain a fresh access token from a refresh token.
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<TokenResponse> {
        self.token_request(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
        ])
        .await
    }

    /// Validate an access token against the provider's key set.
    pub async fn verify(&self, access_token: &str) -> AppResult<Claims> {
        self.verifier
            .verify(access_token)
            .await
            .map_err(|e| AppError::Login(e.to_string()))
    }

    async fn token_request(&self, params: &[(&str, &str)]) -> AppResult<TokenResponse> {
        let response = self
            .http
            .post(format!(
                "{}/protocol/openid-connect/token",
                self.config.issuer_uri
            ))
            .form(params)
            .send()
            .await
            .map_err(|e| AppError::Provider(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::Login(format!(
                "token request failed with status {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Provider(e.to_string()))
    }
}
