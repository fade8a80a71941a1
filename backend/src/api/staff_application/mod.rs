//! Module for staff application API endpoints.
//!
//! Collection endpoints are nested under each event (see `api::event`);
//! single applications are addressed at `/api/staff-applications/{id}`.

pub mod handlers;
pub mod routes;
