//! Module for core business logic services.
//!
//! Services validate input, apply access rules and translate repository
//! outcomes into `ServiceError`s. Each one borrows the shared pool for the
//! duration of a request.

pub mod event_service;
pub mod registration_service;
pub mod staff_application_service;
pub mod user_service;
