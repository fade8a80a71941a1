//! Service-level endpoints and the static front end.
//!
//! The front end under `STATIC_DIR` is plain HTML/JS that talks to the JSON
//! API over HTTP like any other client.

use crate::api::common::{ApiError, error_response, service_error_to_http};
use crate::errors::ServiceError;
use axum::{
    Router,
    extract::Extension,
    http::{StatusCode, Uri},
    response::Json,
    routing::get,
};
use serde_json::{Value, json};
use sqlx::SqlitePool;
use std::path::Path;
use tower_http::services::{ServeDir, ServeFile};

/// Welcome document at `/`
pub async fn root_handler() -> Json<Value> {
    Json(json!({
        "service": "Kit-Chan Events Backend",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Liveness plus a round trip to the database
pub async fn health_handler(
    Extension(pool): Extension<SqlitePool>,
) -> Result<Json<Value>, ApiError> {
    sqlx::query("SELECT 1")
        .execute(&pool)
        .await
        .map_err(|e| service_error_to_http(ServiceError::from(anyhow::Error::from(e))))?;

    Ok(Json(json!({ "status": "ok" })))
}

/// JSON 404 for every unmatched path
pub async fn not_found_handler(uri: Uri) -> ApiError {
    tracing::debug!("No route for {}", uri);
    error_response(StatusCode::NOT_FOUND, "not_found", "Route not found", None)
}

/// Static assets and the staff application form page.
pub fn web_router(static_dir: &str) -> Router {
    let static_dir = Path::new(static_dir);

    Router::new()
        .route("/", get(root_handler))
        .route("/api/health", get(health_handler))
        .nest_service("/static", ServeDir::new(static_dir))
        .route_service(
            "/events/{event_id}/staff-apply",
            ServeFile::new(static_dir.join("staff-apply.html")),
        )
}
