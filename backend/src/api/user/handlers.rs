//! Handler functions for user profile and management endpoints.

use crate::api::common::{ApiError, JsonBody, Page, PageParams, parse_id, service_error_to_http};
use crate::auth::middleware::ensure_role;
use crate::config::Config;
use crate::database::models::{CreateUserRequest, Role, UpdateUserRequest, User};
use crate::services::user_service::UserService;
use crate::utils::jwt::Claims;
use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::Json,
};
use sqlx::SqlitePool;
use std::sync::Arc;

const DEFAULT_USER_PAGE_SIZE: u32 = 20;

/// Lists all users (admin only).
#[axum::debug_handler]
pub async fn list_users(
    Extension(pool): Extension<SqlitePool>,
    Extension(config): Extension<Arc<Config>>,
    Query(params): Query<PageParams>,
) -> Result<Json<Page<User>>, ApiError> {
    let service = UserService::new(&pool, config.bcrypt_cost);

    let page = service
        .list_users(params.pagination(DEFAULT_USER_PAGE_SIZE))
        .await
        .map_err(service_error_to_http)?;

    Ok(Json(page))
}

/// Creates a user with an explicit role (admin only).
#[axum::debug_handler]
pub async fn create_user(
    Extension(pool): Extension<SqlitePool>,
    Extension(config): Extension<Arc<Config>>,
    JsonBody(payload): JsonBody<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let service = UserService::new(&pool, config.bcrypt_cost);

    let user = service
        .create_user(payload)
        .await
        .map_err(service_error_to_http)?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// Retrieves a user by ID (self or admin).
#[axum::debug_handler]
pub async fn get_user_by_id(
    Extension(pool): Extension<SqlitePool>,
    Extension(config): Extension<Arc<Config>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<User>, ApiError> {
    let id = parse_id(&id, "User")?;
    let service = UserService::new(&pool, config.bcrypt_cost);

    let user = service
        .get_user_as(&claims, id)
        .await
        .map_err(service_error_to_http)?;

    Ok(Json(user))
}

/// Updates a user (self or admin; role changes admin only).
#[axum::debug_handler]
pub async fn update_user(
    Extension(pool): Extension<SqlitePool>,
    Extension(config): Extension<Arc<Config>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<UpdateUserRequest>,
) -> Result<Json<User>, ApiError> {
    let id = parse_id(&id, "User")?;
    let service = UserService::new(&pool, config.bcrypt_cost);

    let user = service
        .update_user_as(&claims, id, payload)
        .await
        .map_err(service_error_to_http)?;

    Ok(Json(user))
}

/// Deletes a user (admin only).
#[axum::debug_handler]
pub async fn delete_user(
    Extension(pool): Extension<SqlitePool>,
    Extension(config): Extension<Arc<Config>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    ensure_role(Some(&claims), &[Role::Admin]).map_err(service_error_to_http)?;
    let id = parse_id(&id, "User")?;
    let service = UserService::new(&pool, config.bcrypt_cost);

    service.delete_user(id).await.map_err(service_error_to_http)?;

    Ok(StatusCode::NO_CONTENT)
}
