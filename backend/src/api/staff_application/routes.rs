//! Defines the HTTP routes for single staff applications.
//!
//! Mounted under `/api/staff-applications`.

use super::handlers::{delete_application, get_application, update_application};
use axum::{Router, routing::get};

pub fn staff_application_router() -> Router {
    Router::new().route(
        "/{id}",
        get(get_application)
            .patch(update_application)
            .delete(delete_application),
    )
}
