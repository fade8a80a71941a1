//! Defines the HTTP routes for registrations.
//!
//! Mounted under `/api/registrations`.

use super::handlers::*;
use axum::{Router, routing::get};

pub fn registration_router() -> Router {
    Router::new()
        .route("/", get(list_registrations).post(create_registration))
        .route(
            "/{id}",
            get(get_registration)
                .put(update_registration)
                .delete(delete_registration),
        )
}
