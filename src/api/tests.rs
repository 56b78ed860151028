//! End-to-end API tests
//!
//! Drives the full router over an in-memory database with axum-test,
//! covering the register/login/browse flow, the purchase-until-empty
//! flow, and the authorization tiers.

use axum::http::{header, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::api::{build_router, AppState};
use crate::db::repositories::{SqlxSweetRepository, SqlxUserRepository, UserRepository};
use crate::db::{create_test_pool, migrations};
use crate::models::User;
use crate::services::password::hash_password;
use crate::services::{AuthService, CatalogService, InventoryService, TokenService};

const TEST_SECRET: &str = "e2e-test-secret";

/// Build a server over a fresh in-memory database.
///
/// Returns the server and the user repository so tests can provision
/// admin accounts, which registration never creates.
async fn test_server() -> (TestServer, Arc<dyn UserRepository>) {
    let pool = create_test_pool().await.expect("Failed to create test pool");
    migrations::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    let user_repo = SqlxUserRepository::boxed(pool.clone());
    let sweet_repo = SqlxSweetRepository::boxed(pool);

    let state = AppState {
        auth_service: Arc::new(AuthService::new(
            user_repo.clone(),
            TokenService::new(TEST_SECRET, 60),
        )),
        catalog_service: Arc::new(CatalogService::new(sweet_repo.clone())),
        inventory_service: Arc::new(InventoryService::new(sweet_repo)),
    };

    let app = build_router(state, "http://localhost:5173");
    let server = TestServer::new(app).expect("Failed to start test server");

    (server, user_repo)
}

/// Register and log in a regular user, returning a bearer token
async fn login_user(server: &TestServer, email: &str, password: &str) -> String {
    let response = server
        .post("/api/auth/register")
        .json(&json!({ "email": email, "password": password }))
        .await;
    response.assert_status(StatusCode::CREATED);

    let response = server
        .post("/api/auth/login")
        .json(&json!({ "email": email, "password": password }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["token_type"], "bearer");
    body["access_token"].as_str().unwrap().to_string()
}

/// Provision an admin directly in the store and log them in
async fn login_admin(
    server: &TestServer,
    user_repo: &Arc<dyn UserRepository>,
    email: &str,
    password: &str,
) -> String {
    let hash = hash_password(password).expect("Failed to hash password");
    user_repo
        .create(&User::new(email.to_string(), hash, true))
        .await
        .expect("Failed to create admin");

    let response = server
        .post("/api/auth/login")
        .json(&json!({ "email": email, "password": password }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    body["access_token"].as_str().unwrap().to_string()
}

fn bearer(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Bearer {}", token)).expect("token is valid header text")
}

#[tokio::test]
async fn test_root_is_public() {
    let (server, _) = test_server().await;

    let response = server.get("/").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["message"], "Sweet Shop API is running");
}

#[tokio::test]
async fn test_register_login_and_list_flow() {
    let (server, _) = test_server().await;

    // Without a token the list is off-limits
    let response = server.get("/api/sweets").await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    let token = login_user(&server, "a@x.com", "pw").await;

    let response = server
        .get("/api/sweets")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await;
    response.assert_status_ok();
    let sweets: Vec<Value> = response.json();
    assert!(sweets.is_empty());
}

#[tokio::test]
async fn test_register_duplicate_email_conflicts() {
    let (server, _) = test_server().await;
    login_user(&server, "a@x.com", "pw").await;

    let response = server
        .post("/api/auth/register")
        .json(&json!({ "email": "a@x.com", "password": "other" }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn test_login_bad_credentials_unauthorized() {
    let (server, _) = test_server().await;
    login_user(&server, "a@x.com", "pw").await;

    let response = server
        .post("/api/auth/login")
        .json(&json!({ "email": "a@x.com", "password": "wrong" }))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    let response = server
        .post("/api/auth/login")
        .json(&json!({ "email": "nobody@x.com", "password": "pw" }))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_returns_identity_without_hash() {
    let (server, _) = test_server().await;
    let token = login_user(&server, "a@x.com", "pw").await;

    let response = server
        .get("/api/auth/me")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["email"], "a@x.com");
    assert_eq!(body["is_admin"], false);
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn test_me_without_token_unauthorized() {
    let (server, _) = test_server().await;

    let response = server.get("/api/auth/me").await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_non_admin_cannot_create_sweet() {
    let (server, _) = test_server().await;
    let token = login_user(&server, "a@x.com", "pw").await;

    let response = server
        .post("/api/sweets")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .json(&json!({ "name": "Ladoo", "category": "Indian", "price": 10.0, "quantity": 2 }))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "FORBIDDEN");
}

#[tokio::test]
async fn test_create_sweet_without_token_unauthorized() {
    let (server, _) = test_server().await;

    let response = server
        .post("/api/sweets")
        .json(&json!({ "name": "Ladoo", "category": "Indian", "price": 10.0, "quantity": 2 }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_catalog_crud() {
    let (server, user_repo) = test_server().await;
    let admin = login_admin(&server, &user_repo, "admin@x.com", "pw").await;

    // Create
    let response = server
        .post("/api/sweets")
        .add_header(header::AUTHORIZATION, bearer(&admin))
        .json(&json!({ "name": "Ladoo", "category": "Indian", "price": 10.0, "quantity": 50 }))
        .await;
    response.assert_status_ok();
    let created: Value = response.json();
    let id = created["id"].as_i64().unwrap();
    assert_eq!(created["name"], "Ladoo");

    // Partial update
    let response = server
        .put(&format!("/api/sweets/{}", id))
        .add_header(header::AUTHORIZATION, bearer(&admin))
        .json(&json!({ "price": 12.5 }))
        .await;
    response.assert_status_ok();
    let updated: Value = response.json();
    assert_eq!(updated["price"], 12.5);
    assert_eq!(updated["name"], "Ladoo");

    // Empty update payload is rejected
    let response = server
        .put(&format!("/api/sweets/{}", id))
        .add_header(header::AUTHORIZATION, bearer(&admin))
        .json(&json!({}))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    // Delete
    let response = server
        .delete(&format!("/api/sweets/{}", id))
        .add_header(header::AUTHORIZATION, bearer(&admin))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["detail"], "Sweet deleted successfully");

    // Deleting again is a 404
    let response = server
        .delete(&format!("/api/sweets/{}", id))
        .add_header(header::AUTHORIZATION, bearer(&admin))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_bulk_create() {
    let (server, user_repo) = test_server().await;
    let admin = login_admin(&server, &user_repo, "admin@x.com", "pw").await;

    let response = server
        .post("/api/sweets/bulk")
        .add_header(header::AUTHORIZATION, bearer(&admin))
        .json(&json!([
            { "name": "Ladoo", "category": "Indian", "price": 10.0, "quantity": 50 },
            { "name": "Barfi", "category": "Indian", "price": 8.0, "quantity": 30 }
        ]))
        .await;

    response.assert_status_ok();
    let created: Vec<Value> = response.json();
    assert_eq!(created.len(), 2);
}

#[tokio::test]
async fn test_search_filters() {
    let (server, user_repo) = test_server().await;
    let admin = login_admin(&server, &user_repo, "admin@x.com", "pw").await;

    server
        .post("/api/sweets/bulk")
        .add_header(header::AUTHORIZATION, bearer(&admin))
        .json(&json!([
            { "name": "Ladoo", "category": "Indian", "price": 10.0, "quantity": 50 },
            { "name": "Barfi", "category": "Indian", "price": 4.0, "quantity": 30 },
            { "name": "Truffle", "category": "Chocolate", "price": 7.5, "quantity": 10 }
        ]))
        .await
        .assert_status_ok();

    // Inclusive price range [5, 10]
    let response = server
        .get("/api/sweets/search?min_price=5&max_price=10")
        .add_header(header::AUTHORIZATION, bearer(&admin))
        .await;
    response.assert_status_ok();
    let results: Vec<Value> = response.json();
    let mut names: Vec<_> = results.iter().map(|s| s["name"].as_str().unwrap()).collect();
    names.sort();
    assert_eq!(names, vec!["Ladoo", "Truffle"]);

    // Case-insensitive substring on name
    let response = server
        .get("/api/sweets/search?name=LAD")
        .add_header(header::AUTHORIZATION, bearer(&admin))
        .await;
    response.assert_status_ok();
    let results: Vec<Value> = response.json();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["name"], "Ladoo");

    // Case-insensitive category filter
    let response = server
        .get("/api/sweets/search?category=chocolate")
        .add_header(header::AUTHORIZATION, bearer(&admin))
        .await;
    response.assert_status_ok();
    let results: Vec<Value> = response.json();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["name"], "Truffle");
}

#[tokio::test]
async fn test_purchase_flow_until_out_of_stock() {
    let (server, user_repo) = test_server().await;
    let admin = login_admin(&server, &user_repo, "admin@x.com", "pw").await;

    // Admin creates a sweet with two units
    let response = server
        .post("/api/sweets")
        .add_header(header::AUTHORIZATION, bearer(&admin))
        .json(&json!({ "name": "Ladoo", "category": "Indian", "price": 10.0, "quantity": 2 }))
        .await;
    response.assert_status_ok();
    let id = response.json::<Value>()["id"].as_i64().unwrap();

    // A regular user buys both units
    let user = login_user(&server, "buyer@x.com", "pw").await;
    for _ in 0..2 {
        let response = server
            .post(&format!("/api/inventory/{}/purchase", id))
            .add_header(header::AUTHORIZATION, bearer(&user))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["detail"], "Purchase successful");
    }

    // Third attempt fails out-of-stock and stock stays at zero
    let response = server
        .post(&format!("/api/inventory/{}/purchase", id))
        .add_header(header::AUTHORIZATION, bearer(&user))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "OUT_OF_STOCK");

    let response = server
        .get("/api/sweets")
        .add_header(header::AUTHORIZATION, bearer(&user))
        .await;
    let sweets: Vec<Value> = response.json();
    assert_eq!(sweets[0]["quantity"], 0);
}

#[tokio::test]
async fn test_purchase_missing_sweet_not_found() {
    let (server, _) = test_server().await;
    let user = login_user(&server, "buyer@x.com", "pw").await;

    let response = server
        .post("/api/inventory/99999/purchase")
        .add_header(header::AUTHORIZATION, bearer(&user))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_restock_requires_admin() {
    let (server, user_repo) = test_server().await;
    let admin = login_admin(&server, &user_repo, "admin@x.com", "pw").await;

    let response = server
        .post("/api/sweets")
        .add_header(header::AUTHORIZATION, bearer(&admin))
        .json(&json!({ "name": "Ladoo", "category": "Indian", "price": 10.0, "quantity": 1 }))
        .await;
    let id = response.json::<Value>()["id"].as_i64().unwrap();

    // Regular users cannot restock
    let user = login_user(&server, "buyer@x.com", "pw").await;
    let response = server
        .post(&format!("/api/inventory/{}/restock?amount=5", id))
        .add_header(header::AUTHORIZATION, bearer(&user))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);

    // Admin restock succeeds
    let response = server
        .post(&format!("/api/inventory/{}/restock?amount=5", id))
        .add_header(header::AUTHORIZATION, bearer(&admin))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["detail"], "Restocked 5 units successfully");

    let response = server
        .get("/api/sweets")
        .add_header(header::AUTHORIZATION, bearer(&admin))
        .await;
    let sweets: Vec<Value> = response.json();
    assert_eq!(sweets[0]["quantity"], 6);
}

#[tokio::test]
async fn test_restock_rejects_non_positive_amount() {
    let (server, user_repo) = test_server().await;
    let admin = login_admin(&server, &user_repo, "admin@x.com", "pw").await;

    let response = server
        .post("/api/sweets")
        .add_header(header::AUTHORIZATION, bearer(&admin))
        .json(&json!({ "name": "Ladoo", "category": "Indian", "price": 10.0, "quantity": 1 }))
        .await;
    let id = response.json::<Value>()["id"].as_i64().unwrap();

    let response = server
        .post(&format!("/api/inventory/{}/restock?amount=0", id))
        .add_header(header::AUTHORIZATION, bearer(&admin))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = server
        .post(&format!("/api/inventory/{}/restock?amount=-3", id))
        .add_header(header::AUTHORIZATION, bearer(&admin))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_invalid_token_rejected() {
    let (server, _) = test_server().await;

    let response = server
        .get("/api/sweets")
        .add_header(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer not-a-real-token"),
        )
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_expired_token_rejected() {
    let pool = create_test_pool().await.expect("Failed to create test pool");
    migrations::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    let user_repo = SqlxUserRepository::boxed(pool.clone());
    let sweet_repo = SqlxSweetRepository::boxed(pool);

    // Tokens from this server are already expired when issued
    let state = AppState {
        auth_service: Arc::new(AuthService::new(
            user_repo.clone(),
            TokenService::new(TEST_SECRET, -2),
        )),
        catalog_service: Arc::new(CatalogService::new(sweet_repo.clone())),
        inventory_service: Arc::new(InventoryService::new(sweet_repo)),
    };
    let server =
        TestServer::new(build_router(state, "http://localhost:5173")).expect("Failed to start");

    let token = login_user(&server, "a@x.com", "pw").await;

    let response = server
        .get("/api/sweets")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_sweet_rejects_negative_price() {
    let (server, user_repo) = test_server().await;
    let admin = login_admin(&server, &user_repo, "admin@x.com", "pw").await;

    let response = server
        .post("/api/sweets")
        .add_header(header::AUTHORIZATION, bearer(&admin))
        .json(&json!({ "name": "Bad", "category": "Misc", "price": -1.0, "quantity": 5 }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}
