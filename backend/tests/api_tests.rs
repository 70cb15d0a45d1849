//! API integration tests
//!
//! Run against a local stack (Keycloak realm `library` plus the backend with
//! the demo data migrations applied): `cargo test -- --ignored`

use reqwest::Client;
use serde_json::Value;
use std::time::{SystemTime, UNIX_EPOCH};

const BASE_URL: &str = "http://localhost:8081/library/api";
const KEYCLOAK_URL: &str = "http://localhost:8080";

/// Password grant against the demo realm; all demo accounts share the password.
async fn get_token(client: &Client, username: &str) -> String {
    let response = client
        .post(format!(
            "{}/realms/library/protocol/openid-connect/token",
            KEYCLOAK_URL
        ))
        .form(&[
            ("grant_type", "password"),
            ("client_id", "library-frontend"),
            ("client_secret", "change-me"),
            ("username", username),
            ("password", "password"),
        ])
        .send()
        .await
        .expect("Failed to send token request");

    let body: Value = response.json().await.expect("Failed to parse token response");
    body["access_token"]
        .as_str()
        .expect("No access token in response")
        .to_string()
}

fn unique_suffix() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos()
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_unauthenticated_request_is_rejected() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_search_books_by_substring() {
    let client = Client::new();
    let token = get_token(&client, "demo_user_1").await;

    let response = client
        .get(format!("{}/books?searchString=clean", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    let titles: Vec<&str> = body["content"]
        .as_array()
        .expect("content is an array")
        .iter()
        .map(|b| b["title"].as_str().unwrap())
        .collect();
    assert!(titles.contains(&"Clean Code"));
    assert_eq!(body["empty"], false);
}

#[tokio::test]
#[ignore]
async fn test_search_books_without_match_is_empty() {
    let client = Client::new();
    let token = get_token(&client, "demo_user_1").await;

    let response = client
        .get(format!("{}/books?searchString=zzzznotabook", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["empty"], true);
    assert_eq!(body["total_elements"], 0);
}

#[tokio::test]
#[ignore]
async fn test_get_unknown_isbn_is_not_found() {
    let client = Client::new();
    let token = get_token(&client, "demo_user_1").await;

    let response = client
        .get(format!("{}/books/0000000000000", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_borrow_and_return_lifecycle() {
    let client = Client::new();
    let token_1 = get_token(&client, "demo_user_1").await;
    let token_2 = get_token(&client, "demo_user_2").await;
    let isbn = "9780132350884";

    // demo_user_1 borrows Clean Code
    let response = client
        .post(format!("{}/users/demo_user_1/loans", BASE_URL))
        .bearer_auth(&token_1)
        .body(isbn)
        .send()
        .await
        .expect("Failed to send borrow request");
    assert!(response.status().is_success());

    let loan: Value = response.json().await.expect("Failed to parse loan");
    assert_eq!(loan["book"]["isbn"], isbn);
    assert!(loan["returned_at"].is_null());
    let loan_id = loan["id"].as_i64().expect("loan id");

    // the book now reports the open loan
    let response = client
        .get(format!("{}/books/{}", BASE_URL, isbn))
        .bearer_auth(&token_1)
        .send()
        .await
        .expect("Failed to send request");
    let book: Value = response.json().await.expect("Failed to parse book");
    assert_eq!(book["loan_status"]["available"], false);
    assert!(book["loan_status"]["borrowed_by"].is_i64());
    assert!(book["loan_status"]["borrowed_at"].is_string());

    // a second borrow by anyone conflicts and creates no loan
    let response = client
        .post(format!("{}/users/demo_user_2/loans", BASE_URL))
        .bearer_auth(&token_2)
        .body(isbn)
        .send()
        .await
        .expect("Failed to send borrow request");
    assert_eq!(response.status(), 409);

    // returning someone else's loan looks like a missing loan
    let response = client
        .delete(format!("{}/users/demo_user_2/loans/{}", BASE_URL, loan_id))
        .bearer_auth(&token_2)
        .send()
        .await
        .expect("Failed to send return request");
    assert_eq!(response.status(), 404);

    // the owner returns it
    let response = client
        .delete(format!("{}/users/demo_user_1/loans/{}", BASE_URL, loan_id))
        .bearer_auth(&token_1)
        .send()
        .await
        .expect("Failed to send return request");
    assert!(response.status().is_success());

    // the book is available again
    let response = client
        .get(format!("{}/books/{}", BASE_URL, isbn))
        .bearer_auth(&token_1)
        .send()
        .await
        .expect("Failed to send request");
    let book: Value = response.json().await.expect("Failed to parse book");
    assert_eq!(book["loan_status"]["available"], true);

    // a second return conflicts
    let response = client
        .delete(format!("{}/users/demo_user_1/loans/{}", BASE_URL, loan_id))
        .bearer_auth(&token_1)
        .send()
        .await
        .expect("Failed to send return request");
    assert_eq!(response.status(), 409);
}

#[tokio::test]
#[ignore]
async fn test_loan_listing_includes_returned_loans() {
    let client = Client::new();
    let token = get_token(&client, "demo_user_2").await;
    let isbn = "9780134685991";

    let response = client
        .post(format!("{}/users/demo_user_2/loans", BASE_URL))
        .bearer_auth(&token)
        .body(isbn)
        .send()
        .await
        .expect("Failed to send borrow request");
    assert!(response.status().is_success());
    let loan: Value = response.json().await.expect("Failed to parse loan");
    let loan_id = loan["id"].as_i64().expect("loan id");

    let response = client
        .delete(format!("{}/users/demo_user_2/loans/{}", BASE_URL, loan_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send return request");
    assert!(response.status().is_success());

    let response = client
        .get(format!("{}/users/demo_user_2/loans", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    let loans: Value = response.json().await.expect("Failed to parse loans");
    let returned = loans
        .as_array()
        .expect("loans is an array")
        .iter()
        .find(|l| l["id"].as_i64() == Some(loan_id))
        .expect("returned loan still listed");
    assert!(returned["returned_at"].is_string());
}

#[tokio::test]
#[ignore]
async fn test_user_search_requires_librarian() {
    let client = Client::new();

    let token = get_token(&client, "demo_user_1").await;
    let response = client
        .get(format!("{}/users", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 403);

    let token = get_token(&client, "demo_librarian").await;
    let response = client
        .get(format!("{}/users", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["content"].is_array());
}

#[tokio::test]
#[ignore]
async fn test_profile_is_librarian_or_self() {
    let client = Client::new();
    let token = get_token(&client, "demo_user_1").await;

    let response = client
        .get(format!("{}/users/demo_user_1", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let response = client
        .get(format!("{}/users/demo_user_2", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_borrow_for_another_user_is_forbidden() {
    let client = Client::new();
    let token = get_token(&client, "demo_librarian").await;

    let response = client
        .post(format!("{}/users/demo_user_1/loans", BASE_URL))
        .bearer_auth(&token)
        .body("9780135957059")
        .send()
        .await
        .expect("Failed to send borrow request");

    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_create_and_delete_user() {
    let client = Client::new();
    let token = get_token(&client, "demo_librarian").await;
    let suffix = unique_suffix();
    let username = format!("it_user_{}", suffix);

    let response = client
        .post(format!("{}/users", BASE_URL))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "username": username,
            "first_name": "Ida",
            "last_name": "Test",
            "email": format!("ida.test+{}@example.com", suffix)
        }))
        .send()
        .await
        .expect("Failed to send create request");
    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["username"], username.as_str());

    let response = client
        .delete(format!("{}/users/{}", BASE_URL, username))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send delete request");
    assert_eq!(response.status(), 204);
}

#[tokio::test]
#[ignore]
async fn test_duplicate_user_names_colliding_fields() {
    let client = Client::new();
    let token = get_token(&client, "demo_librarian").await;

    // both username and email taken
    let response = client
        .post(format!("{}/users", BASE_URL))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "username": "demo_user_1",
            "first_name": "Dana",
            "last_name": "Miller",
            "email": "dana.miller@example.com"
        }))
        .send()
        .await
        .expect("Failed to send create request");
    assert_eq!(response.status(), 409);
    let body: Value = response.json().await.expect("Failed to parse response");
    let hints = body["hints"].as_str().expect("hints present");
    assert!(hints.contains("username"));
    assert!(hints.contains("email"));

    // only the email collides
    let response = client
        .post(format!("{}/users", BASE_URL))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "username": format!("it_user_{}", unique_suffix()),
            "first_name": "Dana",
            "last_name": "Miller",
            "email": "dana.miller@example.com"
        }))
        .send()
        .await
        .expect("Failed to send create request");
    assert_eq!(response.status(), 409);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["hints"], "email");
}
