//! Module for user management API endpoints.
//!
//! Every route requires a bearer token. Listing, creation and deletion are
//! admin-only; reading and updating a single profile is allowed for the user
//! themself or an admin.

pub mod handlers;
pub mod routes;
