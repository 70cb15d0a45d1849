//! Bearer-token verification against the identity provider's key set

use std::collections::HashMap;

use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;

/// Prefix mapping provider realm roles to internal authorities.
pub const ROLE_PREFIX: &str = "ROLE_";

/// Realm role granting librarian capabilities.
pub const LIBRARIAN_ROLE: &str = "LIBRARIAN";

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("token carries no key id")]
    MissingKeyId,

    #[error("no signing key published for kid {0}")]
    UnknownKey(String),

    #[error("failed to fetch key set: {0}")]
    KeySetFetch(#[from] reqwest::Error),

    #[error("token rejected: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),
}

/// Nested realm-role claim as issued by the provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RealmAccess {
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Claims of a validated access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub preferred_username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub realm_access: RealmAccess,
    pub exp: i64,
    #[serde(default)]
    pub iat: i64,
}

impl Claims {
    /// Internal authorities derived from the realm roles.
    pub fn authorities(&self) -> Vec<String> {
        self.realm_access
            .roles
            .iter()
            .map(|role| format!("{ROLE_PREFIX}{role}"))
            .collect()
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.realm_access.roles.iter().any(|r| r == role)
    }

    pub fn is_librarian(&self) -> bool {
        self.has_role(LIBRARIAN_ROLE)
    }

    /// Whether the token belongs to the given user.
    pub fn is_self(&self, username: &str) -> bool {
        self.preferred_username == username
    }
}

#[derive(Debug, Deserialize)]
struct JwkSet {
    keys: Vec<Jwk>,
}

#[derive(Debug, Deserialize)]
struct Jwk {
    kid: String,
    kty: String,
    #[serde(default)]
    alg: Option<String>,
    #[serde(rename = "use", default)]
    usage: Option<String>,
    #[serde(default)]
    n: Option<String>,
    #[serde(default)]
    e: Option<String>,
}

/// Validates RS256 bearer tokens against the provider's published JWKS.
///
/// Signing keys are cached by `kid`; an unknown `kid` triggers one refetch
/// before the token is rejected, which covers provider key rotation.
pub struct TokenVerifier {
    http: reqwest::Client,
    jwks_uri: String,
    issuer: String,
    keys: RwLock<HashMap<String, DecodingKey>>,
}

impl TokenVerifier {
    pub fn new(jwks_uri: impl Into<String>, issuer: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            jwks_uri: jwks_uri.into(),
            issuer: issuer.into(),
            keys: RwLock::new(HashMap::new()),
        }
    }

    /// Validate the token signature, expiry and issuer; return its claims.
    pub async fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let header = decode_header(token)?;
        let kid = header.kid.ok_or(TokenError::MissingKeyId)?;

        if !self.keys.read().await.contains_key(&kid) {
            self.refresh().await?;
        }

        let keys = self.keys.read().await;
        let key = keys
            .get(&kid)
            .ok_or_else(|| TokenError::UnknownKey(kid.clone()))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[self.issuer.as_str()]);
        // Keycloak access tokens carry client-specific audiences
        validation.validate_aud = false;

        let data = decode::<Claims>(token, key, &validation)?;
        Ok(data.claims)
    }

    async fn refresh(&self) -> Result<(), TokenError> {
        let set: JwkSet = self
            .http
            .get(&self.jwks_uri)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let mut keys = self.keys.write().await;
        keys.clear();
        for jwk in set.keys {
            if jwk.kty != "RSA" || jwk.usage.as_deref() == Some("enc") {
                continue;
            }
            if jwk.alg.as_deref().is_some_and(|alg| alg != "RS256") {
                continue;
            }
            let (Some(n), Some(e)) = (&jwk.n, &jwk.e) else {
                continue;
            };
            match DecodingKey::from_rsa_components(n, e) {
                Ok(key) => {
                    keys.insert(jwk.kid, key);
                }
                Err(err) => tracing::warn!("skipping unusable jwk {}: {err}", jwk.kid),
            }
        }
        tracing::debug!("loaded {} signing keys from {}", keys.len(), self.jwks_uri);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(username: &str, roles: &[&str]) -> Claims {
        Claims {
            sub: "f3b0c440-0000-0000-0000-000000000000".to_string(),
            preferred_username: username.to_string(),
            email: None,
            name: None,
            realm_access: RealmAccess {
                roles: roles.iter().map(|r| r.to_string()).collect(),
            },
            exp: 4_102_444_800,
            iat: 0,
        }
    }

    #[test]
    fn realm_roles_map_to_prefixed_authorities() {
        let claims = claims("kim", &["LIBRARIAN", "offline_access"]);
        assert_eq!(
            claims.authorities(),
            vec!["ROLE_LIBRARIAN", "ROLE_offline_access"]
        );
        assert!(claims.is_librarian());
    }

    #[test]
    fn missing_realm_access_means_no_roles() {
        let parsed: Claims = serde_json::from_value(serde_json::json!({
            "sub": "abc",
            "preferred_username": "kim",
            "exp": 4_102_444_800i64
        }))
        .unwrap();
        assert!(parsed.realm_access.roles.is_empty());
        assert!(!parsed.is_librarian());
    }

    #[test]
    fn self_check_compares_preferred_username() {
        let claims = claims("kim", &[]);
        assert!(claims.is_self("kim"));
        assert!(!claims.is_self("sam"));
    }
}
