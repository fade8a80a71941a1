//! Handler functions for event management API endpoints.

use crate::api::common::{ApiError, JsonBody, Page, parse_id, service_error_to_http};
use crate::database::models::{CreateEvent, Event, UpdateEvent};
use crate::repositories::event_query::EventListParams;
use crate::services::event_service::EventService;
use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::Json,
};
use sqlx::SqlitePool;

/// Lists events with search, date filters, sorting and pagination.
#[axum::debug_handler]
pub async fn list_events(
    Extension(pool): Extension<SqlitePool>,
    Query(params): Query<EventListParams>,
) -> Result<Json<Page<Event>>, ApiError> {
    let service = EventService::new(&pool);

    let page = service
        .list_events(params)
        .await
        .map_err(service_error_to_http)?;

    Ok(Json(page))
}

/// Retrieves a specific event by ID.
#[axum::debug_handler]
pub async fn get_event(
    Extension(pool): Extension<SqlitePool>,
    Path(id): Path<String>,
) -> Result<Json<Event>, ApiError> {
    let id = parse_id(&id, "Event")?;
    let service = EventService::new(&pool);

    let event = service.get_event(id).await.map_err(service_error_to_http)?;

    Ok(Json(event))
}

#[axum::debug_handler]
pub async fn create_event(
    Extension(pool): Extension<SqlitePool>,
    JsonBody(payload): JsonBody<CreateEvent>,
) -> Result<(StatusCode, Json<Event>), ApiError> {
    let service = EventService::new(&pool);

    let event = service
        .create_event(payload)
        .await
        .map_err(service_error_to_http)?;

    Ok((StatusCode::CREATED, Json(event)))
}

/// Sparse update; a present `images` array replaces the whole gallery.
#[axum::debug_handler]
pub async fn update_event(
    Extension(pool): Extension<SqlitePool>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<UpdateEvent>,
) -> Result<Json<Event>, ApiError> {
    let id = parse_id(&id, "Event")?;
    let service = EventService::new(&pool);

    let event = service
        .update_event(id, payload)
        .await
        .map_err(service_error_to_http)?;

    Ok(Json(event))
}

#[axum::debug_handler]
pub async fn delete_event(
    Extension(pool): Extension<SqlitePool>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id, "Event")?;
    let service = EventService::new(&pool);

    service.delete_event(id).await.map_err(service_error_to_http)?;

    Ok(StatusCode::NO_CONTENT)
}
