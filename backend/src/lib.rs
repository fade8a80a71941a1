//! Kit-Chan events backend.
//!
//! A JSON API for users, events with ordered image galleries, staff
//! applications and registrations, backed by SQLite. `build_router` assembles
//! the whole application so that the binary and the integration tests serve
//! the same routes.

pub mod api;
pub mod auth;
pub mod config;
pub mod database;
pub mod errors;
pub mod repositories;
pub mod services;
pub mod utils;

use axum::{Extension, Router, http::StatusCode};
use config::Config;
use sqlx::SqlitePool;
use std::{sync::Arc, time::Duration};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use utils::jwt::JwtUtils;

/// Builds the application router with every route and shared layer.
///
/// The pool, the JWT keys and the configuration are handed to handlers as
/// request extensions.
pub fn build_router(pool: SqlitePool, config: Config) -> Router {
    let jwt_utils = Arc::new(JwtUtils::from_config(&config));
    let request_timeout = Duration::from_secs(config.request_timeout_seconds);
    let static_dir = config.static_dir.clone();
    let config = Arc::new(config);

    Router::new()
        .merge(api::web::web_router(&static_dir))
        .nest("/api/auth", auth::routes::auth_router())
        .nest("/api/events", api::event::routes::event_router())
        .nest("/api/users", api::user::routes::user_router())
        .nest(
            "/api/registrations",
            api::registration::routes::registration_router(),
        )
        .nest(
            "/api/staff-applications",
            api::staff_application::routes::staff_application_router(),
        )
        .fallback(api::web::not_found_handler)
        .layer(Extension(pool))
        .layer(Extension(jwt_utils))
        .layer(Extension(config))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(request_timeout_layer(request_timeout))
                .layer(CorsLayer::permissive()),
        )
}

/// Answers `408 Request Timeout` when a request runs longer than `timeout`.
fn request_timeout_layer(timeout: Duration) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout)
}
