//! Shared setup for the HTTP integration tests: an in-memory database with
//! migrations applied and the full application router.
#![allow(dead_code)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{
        Method, Request, StatusCode,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
};
use kitchan_backend::{
    build_router,
    config::Config,
    database::{
        Database,
        models::{CreateUserRequest, Role},
    },
    services::user_service::UserService,
};
use serde_json::{Value, json};
use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use tower::ServiceExt;

pub const TEST_PASSWORD: &str = "hunter22";

pub fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        max_connections: 1,
        acquire_timeout_seconds: 3,
        jwt_secret: "integration-test-secret".to_string(),
        jwt_expires_in_seconds: 3600,
        server_port: 0,
        request_timeout_seconds: 30,
        static_dir: concat!(env!("CARGO_MANIFEST_DIR"), "/public").to_string(),
        bcrypt_cost: 4,
    }
}

pub struct TestApp {
    pub router: Router,
    pub pool: SqlitePool,
}

impl TestApp {
    pub async fn new() -> Self {
        // One connection that never expires keeps the in-memory database alive
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory database");

        Database::from_pool(pool.clone())
            .migrate()
            .await
            .expect("migrations");

        let router = build_router(pool.clone(), test_config());
        TestApp { router, pool }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let (status, bytes) = self.raw_request(method, uri, body, token).await;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    pub async fn raw_request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> (StatusCode, Vec<u8>) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None, token).await
    }

    pub async fn post(&self, uri: &str, body: Value, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(body), token).await
    }

    pub async fn put(&self, uri: &str, body: Value, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(body), token).await
    }

    pub async fn patch(&self, uri: &str, body: Value, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::PATCH, uri, Some(body), token).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, None, token).await
    }

    /// Creates an event through the API and returns its JSON.
    pub async fn create_event(&self, body: Value) -> Value {
        let (status, event) = self.post("/api/events", body, None).await;
        assert_eq!(status, StatusCode::CREATED, "create event failed: {event}");
        event
    }

    /// Signs up through the API and returns `(user id, token)`.
    pub async fn register_and_login(&self, email: &str) -> (i64, String) {
        let (status, body) = self
            .post(
                "/api/auth/register",
                json!({
                    "first_name": "Test",
                    "last_name": "User",
                    "email": email,
                    "password": TEST_PASSWORD,
                }),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
        let id = body["user"]["id"].as_i64().unwrap();

        (id, self.login(email).await)
    }

    pub async fn login(&self, email: &str) -> String {
        let (status, body) = self
            .post(
                "/api/auth/login",
                json!({ "email": email, "password": TEST_PASSWORD }),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["token"].as_str().unwrap().to_string()
    }

    /// Inserts an administrator directly and returns `(user id, token)`.
    pub async fn admin(&self, email: &str) -> (i64, String) {
        let admin = UserService::new(&self.pool, 4)
            .create_user(CreateUserRequest {
                first_name: "Ada".to_string(),
                last_name: "Admin".to_string(),
                email: email.to_string(),
                password: TEST_PASSWORD.to_string(),
                role: Some(Role::Admin),
            })
            .await
            .expect("admin user");

        (admin.id, self.login(email).await)
    }

    pub async fn count(&self, sql: &str, id: i64) -> i64 {
        sqlx::query_scalar(sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }
}

/// Minimal valid event body.
pub fn event_body(title: &str, start_at: &str) -> Value {
    json!({ "title": title, "start_at": start_at })
}
