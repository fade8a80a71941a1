//! Defines the HTTP routes for event management.
//!
//! Mounted under `/api/events`.

use super::handlers::{create_event, delete_event, get_event, list_events, update_event};
use crate::api::staff_application::handlers::{list_event_applications, submit_application};
use crate::auth::middleware::optional_jwt_auth;
use axum::{Router, middleware, routing::get};

pub fn event_router() -> Router {
    Router::new()
        .route("/", get(list_events).post(create_event))
        .route(
            "/{id}",
            get(get_event).put(update_event).delete(delete_event),
        )
        .route(
            "/{id}/staff-applications",
            get(list_event_applications)
                .post(submit_application)
                .layer(middleware::from_fn(optional_jwt_auth)),
        )
}
