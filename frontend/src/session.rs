//! Server-side sessions for the OIDC login

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use library_commons::security::Claims;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Cookie carrying the session id.
pub const SESSION_COOKIE: &str = "LIBRARY_SESSION";

/// Short-lived cookie binding the login `state` parameter to the browser.
pub const STATE_COOKIE: &str = "LIBRARY_OIDC_STATE";

/// Tokens and identity of one logged-in browser session.
#[derive(Debug, Clone)]
pub struct Session {
    pub claims: Claims,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub access_token_expires_at: DateTime<Utc>,
}

impl Session {
    pub fn access_token_expired(&self) -> bool {
        Utc::now() >= self.access_token_expires_at
    }
}

/// In-memory session map keyed by the session cookie.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a fresh session and hand back its id.
    pub async fn insert(&self, session: Session) -> Uuid {
        let id = Uuid::new_v4();
        self.sessions.write().await.insert(id, session);
        id
    }

    pub async fn get(&self, id: &Uuid) -> Option<Session> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Swap in freshly obtained tokens after a refresh.
    pub async fn update_tokens(
        &self,
        id: &Uuid,
        access_token: String,
        refresh_token: Option<String>,
        expires_at: DateTime<Utc>,
    ) {
        if let Some(session) = self.sessions.write().await.get_mut(id) {
            session.access_token = access_token;
            if refresh_token.is_some() {
                session.refresh_token = refresh_token;
            }
            session.access_token_expires_at = expires_at;
        }
    }

    pub async fn remove(&self, id: &Uuid) {
        self.sessions.write().await.remove(id);
    }
}
