//! Module for event management API endpoints.
//!
//! Listing with filters, CRUD, and the nested staff application collection
//! of each event.

pub mod handlers;
pub mod routes;
