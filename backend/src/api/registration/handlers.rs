//! Handler functions for registration endpoints.

use crate::api::common::{
    ApiError, JsonBody, Page, Pagination, parse_id, service_error_to_http,
    validation_error_response,
};
use crate::database::models::{CreateRegistration, Registration, UpdateRegistration};
use crate::repositories::registration_repository::RegistrationFilter;
use crate::services::registration_service::{
    DEFAULT_REGISTRATION_PAGE_SIZE, RegistrationService,
};
use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use sqlx::SqlitePool;

#[derive(Debug, Default, Deserialize)]
pub struct RegistrationListParams {
    /// Filter by user id
    pub user: Option<String>,
    /// Filter by event id
    pub event: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl RegistrationListParams {
    /// Id filters must be integers when given; unlike paging they are not
    /// silently ignored.
    fn filter(&self) -> Result<RegistrationFilter, ApiError> {
        let parse = |name: &str, value: &Option<String>| -> Result<Option<i64>, ApiError> {
            match value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                Some(raw) => raw.parse::<i64>().map(Some).map_err(|_| {
                    validation_error_response(format!("{}: must be a numeric id", name))
                }),
                None => Ok(None),
            }
        };

        Ok(RegistrationFilter {
            user_id: parse("user", &self.user)?,
            event_id: parse("event", &self.event)?,
        })
    }
}

/// Lists registrations, optionally filtered by user and/or event.
#[axum::debug_handler]
pub async fn list_registrations(
    Extension(pool): Extension<SqlitePool>,
    Query(params): Query<RegistrationListParams>,
) -> Result<Json<Page<Registration>>, ApiError> {
    let filter = params.filter()?;
    let pagination = Pagination::from_query(
        params.page.as_deref(),
        params.limit.as_deref(),
        DEFAULT_REGISTRATION_PAGE_SIZE,
    );
    let service = RegistrationService::new(&pool);

    let page = service
        .list_registrations(filter, pagination)
        .await
        .map_err(service_error_to_http)?;

    Ok(Json(page))
}

#[axum::debug_handler]
pub async fn create_registration(
    Extension(pool): Extension<SqlitePool>,
    JsonBody(payload): JsonBody<CreateRegistration>,
) -> Result<(StatusCode, Json<Registration>), ApiError> {
    let service = RegistrationService::new(&pool);

    let registration = service
        .create_registration(payload)
        .await
        .map_err(service_error_to_http)?;

    Ok((StatusCode::CREATED, Json(registration)))
}

#[axum::debug_handler]
pub async fn get_registration(
    Extension(pool): Extension<SqlitePool>,
    Path(id): Path<String>,
) -> Result<Json<Registration>, ApiError> {
    let id = parse_id(&id, "Registration")?;
    let service = RegistrationService::new(&pool);

    let registration = service
        .get_registration(id)
        .await
        .map_err(service_error_to_http)?;

    Ok(Json(registration))
}

/// Changes the registration status.
#[axum::debug_handler]
pub async fn update_registration(
    Extension(pool): Extension<SqlitePool>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<UpdateRegistration>,
) -> Result<Json<Registration>, ApiError> {
    let id = parse_id(&id, "Registration")?;
    let service = RegistrationService::new(&pool);

    let registration = service
        .update_registration(id, payload)
        .await
        .map_err(service_error_to_http)?;

    Ok(Json(registration))
}

#[axum::debug_handler]
pub async fn delete_registration(
    Extension(pool): Extension<SqlitePool>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id, "Registration")?;
    let service = RegistrationService::new(&pool);

    service
        .delete_registration(id)
        .await
        .map_err(service_error_to_http)?;

    Ok(StatusCode::NO_CONTENT)
}
