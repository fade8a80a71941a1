//! Authentication module for managing sign up, sessions, and access control.
//!
//! This module provides the public interface for authentication-related
//! functionality such as login, registration, bearer token checks and role
//! gates.

pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod service;
