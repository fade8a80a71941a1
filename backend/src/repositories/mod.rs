//! Data access layer.
//!
//! One repository per entity. Repositories borrow the shared pool, run
//! parameterized SQL and return `anyhow::Result`, leaving classification of
//! store errors to the services.

pub mod event_query;
pub mod event_repository;
pub mod registration_repository;
pub mod staff_application_repository;
pub mod user_repository;
