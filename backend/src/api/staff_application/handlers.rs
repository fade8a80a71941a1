//! Handler functions for staff application endpoints.

use crate::api::common::{ApiError, JsonBody, Page, Pagination, parse_id, service_error_to_http};
use crate::database::models::{CreateStaffApplication, StaffApplication, UpdateStaffApplication};
use crate::services::staff_application_service::{
    DEFAULT_APPLICATION_PAGE_SIZE, StaffApplicationService,
};
use crate::utils::jwt::Claims;
use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use sqlx::SqlitePool;

#[derive(Debug, Default, Deserialize)]
pub struct ApplicationListParams {
    pub status: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// Lists the staff applications of one event.
#[axum::debug_handler]
pub async fn list_event_applications(
    Extension(pool): Extension<SqlitePool>,
    Path(event_id): Path<String>,
    Query(params): Query<ApplicationListParams>,
) -> Result<Json<Page<StaffApplication>>, ApiError> {
    let event_id = parse_id(&event_id, "Event")?;
    let service = StaffApplicationService::new(&pool);

    let page = service
        .list_for_event(
            event_id,
            params.status.as_deref(),
            Pagination::from_query(
                params.page.as_deref(),
                params.limit.as_deref(),
                DEFAULT_APPLICATION_PAGE_SIZE,
            ),
        )
        .await
        .map_err(service_error_to_http)?;

    Ok(Json(page))
}

/// Submits an application. Signed-in applicants are linked by user id.
#[axum::debug_handler]
pub async fn submit_application(
    Extension(pool): Extension<SqlitePool>,
    Extension(claims): Extension<Option<Claims>>,
    Path(event_id): Path<String>,
    JsonBody(payload): JsonBody<CreateStaffApplication>,
) -> Result<(StatusCode, Json<StaffApplication>), ApiError> {
    let event_id = parse_id(&event_id, "Event")?;
    let service = StaffApplicationService::new(&pool);

    let application = service
        .submit(event_id, claims.map(|c| c.user_id()), payload)
        .await
        .map_err(service_error_to_http)?;

    Ok((StatusCode::CREATED, Json(application)))
}

#[axum::debug_handler]
pub async fn get_application(
    Extension(pool): Extension<SqlitePool>,
    Path(id): Path<String>,
) -> Result<Json<StaffApplication>, ApiError> {
    let id = parse_id(&id, "Staff application")?;
    let service = StaffApplicationService::new(&pool);

    let application = service
        .get_application(id)
        .await
        .map_err(service_error_to_http)?;

    Ok(Json(application))
}

/// Updates status and/or applicant fields.
#[axum::debug_handler]
pub async fn update_application(
    Extension(pool): Extension<SqlitePool>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<UpdateStaffApplication>,
) -> Result<Json<StaffApplication>, ApiError> {
    let id = parse_id(&id, "Staff application")?;
    let service = StaffApplicationService::new(&pool);

    let application = service
        .update_application(id, payload)
        .await
        .map_err(service_error_to_http)?;

    Ok(Json(application))
}

#[axum::debug_handler]
pub async fn delete_application(
    Extension(pool): Extension<SqlitePool>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id, "Staff application")?;
    let service = StaffApplicationService::new(&pool);

    service
        .delete_application(id)
        .await
        .map_err(service_error_to_http)?;

    Ok(StatusCode::NO_CONTENT)
}
