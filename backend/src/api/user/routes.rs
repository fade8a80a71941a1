//! Defines the HTTP routes for user profile and management.
//!
//! Mounted under `/api/users`.

use super::handlers::{create_user, delete_user, get_user_by_id, list_users, update_user};
use crate::auth::middleware::{admin_auth, jwt_auth};
use axum::{Router, middleware, routing::get};

pub fn user_router() -> Router {
    Router::new()
        .route(
            "/",
            get(list_users)
                .post(create_user)
                .layer(middleware::from_fn(admin_auth)),
        )
        .route(
            "/{id}",
            get(get_user_by_id).patch(update_user).delete(delete_user),
        )
        .layer(middleware::from_fn(jwt_auth))
}
