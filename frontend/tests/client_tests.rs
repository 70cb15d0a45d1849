//! Client tests against mocked backend and identity provider

use std::sync::Arc;

use chrono::{Duration, Utc};
use library_commons::{
    model::User,
    security::{Claims, RealmAccess},
};
use library_frontend::{
    client::{backend::LibraryBackendClient, keycloak::KeycloakAdminClient, oidc::OidcClient},
    config::{AppConfig, BackendConfig, KeycloakConfig, LoggingConfig, OidcConfig, ServerConfig},
    error::AppError,
    session::{Session, SessionStore},
    web::{self, SessionUser},
    AppState,
};
use serde_json::json;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

fn keycloak_config(base_url: &str) -> KeycloakConfig {
    KeycloakConfig {
        base_url: base_url.to_string(),
        realm: "library".to_string(),
        admin_realm: "master".to_string(),
        admin_client_id: "admin-cli".to_string(),
        admin_username: "admin".to_string(),
        admin_password: "admin".to_string(),
    }
}

fn oidc_config(base_url: &str) -> OidcConfig {
    OidcConfig {
        issuer_uri: format!("{}/realms/library", base_url),
        jwks_uri: format!("{}/realms/library/protocol/openid-connect/certs", base_url),
        client_id: "library-frontend".to_string(),
        client_secret: "change-me".to_string(),
        redirect_uri: "http://localhost:8082/login/callback".to_string(),
    }
}

fn demo_user() -> User {
    User {
        username: "nina_new".to_string(),
        first_name: "Nina".to_string(),
        last_name: "Neu".to_string(),
        email: "nina.neu@example.com".to_string(),
    }
}

fn librarian_session() -> SessionUser {
    SessionUser {
        id: uuid::Uuid::new_v4(),
        session: Session {
            claims: Claims {
                sub: "test-subject".to_string(),
                preferred_username: "demo_librarian".to_string(),
                email: None,
                name: None,
                realm_access: RealmAccess {
                    roles: vec!["LIBRARIAN".to_string()],
                },
                exp: 4_102_444_800,
                iat: 0,
            },
            access_token: "relay-token".to_string(),
            refresh_token: None,
            access_token_expires_at: Utc::now() + Duration::minutes(5),
        },
    }
}

fn app_state(backend_url: &str, keycloak_url: &str) -> AppState {
    let config = AppConfig {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        backend: BackendConfig {
            base_url: backend_url.to_string(),
        },
        oidc: oidc_config(keycloak_url),
        keycloak: keycloak_config(keycloak_url),
        logging: LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        },
    };

    AppState {
        oidc: Arc::new(OidcClient::new(config.oidc.clone())),
        backend: Arc::new(LibraryBackendClient::new(config.backend.base_url.clone())),
        keycloak: Arc::new(KeycloakAdminClient::new(config.keycloak.clone())),
        sessions: Arc::new(SessionStore::new()),
        config: Arc::new(config),
    }
}

#[tokio::test]
async fn admin_token_is_cached_until_expiry() {
    let server = MockServer::start().await;

    // one token fetch serves both admin calls
    Mock::given(method("POST"))
        .and(path("/realms/master/protocol/openid-connect/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "admin-token-1",
            "expires_in": 300
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/admin/realms/library/users"))
        .respond_with(ResponseTemplate::new(201))
        .expect(2)
        .mount(&server)
        .await;

    let client = KeycloakAdminClient::new(keycloak_config(&server.uri()));
    client.create_user(&demo_user(), "secret").await.unwrap();
    client.create_user(&demo_user(), "secret").await.unwrap();
}

#[tokio::test]
async fn expired_admin_token_is_fetched_again() {
    let server = MockServer::start().await;

    // lifetime below the skew expires immediately, forcing a refetch
    Mock::given(method("POST"))
        .and(path("/realms/master/protocol/openid-connect/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "short-lived",
            "expires_in": 10
        })))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/admin/realms/library/users"))
        .respond_with(ResponseTemplate::new(201))
        .expect(2)
        .mount(&server)
        .await;

    let client = KeycloakAdminClient::new(keycloak_config(&server.uri()));
    client.create_user(&demo_user(), "secret").await.unwrap();
    client.create_user(&demo_user(), "secret").await.unwrap();
}

#[tokio::test]
async fn backend_conflict_carries_the_hints() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/library/api/users"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "error": "conflict",
            "message": "User already exists",
            "hints": "username, email"
        })))
        .mount(&server)
        .await;

    let client = LibraryBackendClient::new(server.uri());
    let result = client.create_user("relay-token", &demo_user()).await;

    match result {
        Err(AppError::Conflict { message, hints }) => {
            assert_eq!(message, "User already exists");
            assert_eq!(hints.as_deref(), Some("username, email"));
        }
        other => panic!("expected conflict, got {:?}", other),
    }
}

#[tokio::test]
async fn unknown_isbn_is_not_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/library/api/books/0000000000000"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": "not_found",
            "message": "Book with isbn 0000000000000 not found"
        })))
        .mount(&server)
        .await;

    let client = LibraryBackendClient::new(server.uri());
    let book = client
        .get_book("relay-token", "0000000000000")
        .await
        .unwrap();
    assert!(book.is_none());
}

#[tokio::test]
async fn borrow_conflict_is_passed_through() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/library/api/users/demo_user_1/loans"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "error": "conflict",
            "message": "Book is already borrowed"
        })))
        .mount(&server)
        .await;

    let client = LibraryBackendClient::new(server.uri());
    let result = client
        .borrow_book("relay-token", "9780132350884", "demo_user_1")
        .await;

    assert!(matches!(result, Err(AppError::Conflict { .. })));
}

#[tokio::test]
async fn failed_provider_creation_rolls_back_the_backend_user() {
    let backend = MockServer::start().await;
    let keycloak = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/library/api/users"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "username": "nina_new",
            "first_name": "Nina",
            "last_name": "Neu",
            "email": "nina.neu@example.com"
        })))
        .expect(1)
        .mount(&backend)
        .await;

    // the rollback deletes the freshly created backend user
    Mock::given(method("DELETE"))
        .and(path("/library/api/users/nina_new"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&backend)
        .await;

    Mock::given(method("POST"))
        .and(path("/realms/master/protocol/openid-connect/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "admin-token",
            "expires_in": 300
        })))
        .mount(&keycloak)
        .await;

    Mock::given(method("POST"))
        .and(path("/admin/realms/library/users"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&keycloak)
        .await;

    let state = app_state(&backend.uri(), &keycloak.uri());

    let result = web::admin::create_user(
        axum::extract::State(state),
        librarian_session(),
        axum::Json(web::admin::CreateUserRequest {
            username: "nina_new".to_string(),
            first_name: "Nina".to_string(),
            last_name: "Neu".to_string(),
            email: "nina.neu@example.com".to_string(),
            password: "secret".to_string(),
        }),
    )
    .await;

    assert!(matches!(result, Err(AppError::Provider(_))));
}

#[tokio::test]
async fn provisioning_requires_the_librarian_role() {
    let backend = MockServer::start().await;
    let keycloak = MockServer::start().await;
    let state = app_state(&backend.uri(), &keycloak.uri());

    let mut session_user = librarian_session();
    session_user.session.claims.realm_access = RealmAccess::default();

    let result = web::admin::create_user(
        axum::extract::State(state),
        session_user,
        axum::Json(web::admin::CreateUserRequest {
            username: "nina_new".to_string(),
            first_name: "Nina".to_string(),
            last_name: "Neu".to_string(),
            email: "nina.neu@example.com".to_string(),
            password: "secret".to_string(),
        }),
    )
    .await;

    assert!(matches!(result, Err(AppError::Forbidden(_))));
}
