//! Handler functions for authentication-related API endpoints.
//!
//! These functions parse request data and hand it to `auth::service` for the
//! core business logic.

use crate::api::common::{ApiError, JsonBody, service_error_to_http};
use crate::auth::models::{LoginRequest, LoginResponse, UserEnvelope};
use crate::auth::service::AuthService;
use crate::config::Config;
use crate::database::models::RegisterUser;
use crate::utils::jwt::{Claims, JwtUtils};
use axum::{extract::Extension, http::StatusCode, response::Json};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Handle self-service sign up
#[axum::debug_handler]
pub async fn register(
    Extension(pool): Extension<SqlitePool>,
    Extension(jwt_utils): Extension<Arc<JwtUtils>>,
    Extension(config): Extension<Arc<Config>>,
    JsonBody(payload): JsonBody<RegisterUser>,
) -> Result<(StatusCode, Json<UserEnvelope>), ApiError> {
    let auth_service = AuthService::new(&pool, &jwt_utils, config.bcrypt_cost);

    let user = auth_service
        .register(payload)
        .await
        .map_err(service_error_to_http)?;

    Ok((StatusCode::CREATED, Json(UserEnvelope { user })))
}

/// Handle user login request
#[axum::debug_handler]
pub async fn login(
    Extension(pool): Extension<SqlitePool>,
    Extension(jwt_utils): Extension<Arc<JwtUtils>>,
    Extension(config): Extension<Arc<Config>>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let auth_service = AuthService::new(&pool, &jwt_utils, config.bcrypt_cost);

    let response = auth_service
        .login(payload)
        .await
        .map_err(service_error_to_http)?;

    Ok(Json(response))
}

/// Returns the user behind the bearer token
#[axum::debug_handler]
pub async fn me(
    Extension(pool): Extension<SqlitePool>,
    Extension(jwt_utils): Extension<Arc<JwtUtils>>,
    Extension(config): Extension<Arc<Config>>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<UserEnvelope>, ApiError> {
    let auth_service = AuthService::new(&pool, &jwt_utils, config.bcrypt_cost);

    let user = auth_service.me(&claims).await.map_err(service_error_to_http)?;

    Ok(Json(UserEnvelope { user }))
}
