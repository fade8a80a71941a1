//! Data structures for authentication requests and responses.
//!
//! Sign-up reuses `database::models::RegisterUser`; this module holds the
//! login payload and the response envelopes.

use crate::database::models::User;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Login request payload
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Login response containing the bearer token and user info
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    /// Token lifetime in seconds
    pub expires_in: u64,
    pub user: User,
}

/// `{ "user": ... }` envelope used by register and me
#[derive(Debug, Serialize)]
pub struct UserEnvelope {
    pub user: User,
}
