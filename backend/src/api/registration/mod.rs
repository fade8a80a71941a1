//! Module for event registration API endpoints.

pub mod handlers;
pub mod routes;
