mod common;

use axum::http::StatusCode;
use common::{TEST_PASSWORD, TestApp};
use serde_json::{Value, json};

fn signup(email: &str) -> Value {
    json!({
        "first_name": "Alice",
        "last_name": "Doe",
        "email": email,
        "password": TEST_PASSWORD,
    })
}

#[tokio::test]
async fn test_register_returns_public_user() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post("/api/auth/register", signup("Alice@Example.com"), None)
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["email"], json!("alice@example.com"));
    assert_eq!(body["user"]["role"], json!("user"));
    assert!(body["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_duplicate_email_differing_in_case_conflicts() {
    let app = TestApp::new().await;

    let (first, _) = app
        .post("/api/auth/register", signup("alice@example.com"), None)
        .await;
    let (second, body) = app
        .post("/api/auth/register", signup("ALICE@Example.COM"), None)
        .await;

    assert_eq!(first, StatusCode::CREATED);
    assert_eq!(second, StatusCode::CONFLICT);
    assert_eq!(body["code"], json!("already_exists"));
}

#[tokio::test]
async fn test_register_validation() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post(
            "/api/auth/register",
            json!({ "first_name": "A", "last_name": "B", "email": "nope", "password": "123" }),
            None,
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], json!("validation_error"));
    assert_eq!(body["details"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_login_and_me() {
    let app = TestApp::new().await;
    app.post("/api/auth/register", signup("bob@example.com"), None)
        .await;

    let (status, login) = app
        .post(
            "/api/auth/login",
            json!({ "email": "BOB@example.com", "password": TEST_PASSWORD }),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(login["expires_in"], json!(3600));
    assert_eq!(login["user"]["email"], json!("bob@example.com"));
    let token = login["token"].as_str().unwrap();

    let (status, me) = app.get("/api/auth/me", Some(token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["user"]["id"], login["user"]["id"]);
}

#[tokio::test]
async fn test_bad_credentials_are_unauthorized() {
    let app = TestApp::new().await;
    app.post("/api/auth/register", signup("carol@example.com"), None)
        .await;

    let (status, body) = app
        .post(
            "/api/auth/login",
            json!({ "email": "carol@example.com", "password": "wrong-password" }),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], json!("Unauthorized"));

    let (status, _) = app
        .post(
            "/api/auth/login",
            json!({ "email": "nobody@example.com", "password": TEST_PASSWORD }),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_routes_require_a_valid_token() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/api/users/1", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], json!("Unauthorized"));

    let (status, body) = app.get("/api/auth/me", Some("not.a.jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], json!("Unauthorized"));

    let (status, _) = app.get("/api/users", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_self_or_admin_access() {
    let app = TestApp::new().await;
    let (alice_id, alice) = app.register_and_login("alice@example.com").await;
    let (bob_id, _) = app.register_and_login("bob@example.com").await;
    let (_, admin) = app.admin("admin@example.com").await;

    let (status, own) = app.get(&format!("/api/users/{alice_id}"), Some(&alice)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(own["email"], json!("alice@example.com"));

    let (status, _) = app.get(&format!("/api/users/{bob_id}"), Some(&alice)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.get(&format!("/api/users/{bob_id}"), Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.get("/api/users", Some(&alice)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, page) = app.get("/api/users", Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], json!(3));
}

#[tokio::test]
async fn test_only_admins_change_roles() {
    let app = TestApp::new().await;
    let (alice_id, alice) = app.register_and_login("alice@example.com").await;
    let (_, admin) = app.admin("admin@example.com").await;

    let (status, _) = app
        .patch(
            &format!("/api/users/{alice_id}"),
            json!({ "role": "admin" }),
            Some(&alice),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, renamed) = app
        .patch(
            &format!("/api/users/{alice_id}"),
            json!({ "first_name": "Alicia" }),
            Some(&alice),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(renamed["first_name"], json!("Alicia"));
    assert_eq!(renamed["role"], json!("user"));

    let (status, promoted) = app
        .patch(
            &format!("/api/users/{alice_id}"),
            json!({ "role": "admin" }),
            Some(&admin),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(promoted["role"], json!("admin"));
}

#[tokio::test]
async fn test_email_change_conflict() {
    let app = TestApp::new().await;
    let (alice_id, alice) = app.register_and_login("alice@example.com").await;
    app.register_and_login("bob@example.com").await;

    let (status, _) = app
        .patch(
            &format!("/api/users/{alice_id}"),
            json!({ "email": "Bob@Example.com" }),
            Some(&alice),
        )
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_admin_creates_and_deletes_users() {
    let app = TestApp::new().await;
    let (_, admin) = app.admin("admin@example.com").await;

    let (status, created) = app
        .post(
            "/api/users",
            json!({
                "first_name": "Dan",
                "last_name": "Staff",
                "email": "dan@example.com",
                "password": TEST_PASSWORD,
                "role": "admin"
            }),
            Some(&admin),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["role"], json!("admin"));

    let (victim_id, victim) = app.register_and_login("victim@example.com").await;

    let (status, _) = app
        .delete(&format!("/api/users/{victim_id}"), Some(&victim))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .delete(&format!("/api/users/{victim_id}"), Some(&admin))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // The token is still well-formed, but its subject is gone
    let (status, _) = app.get("/api/auth/me", Some(&victim)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .delete(&format!("/api/users/{victim_id}"), Some(&admin))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
