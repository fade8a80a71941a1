//! Central module for organizing the application's HTTP API.
//!
//! Each domain has a `handlers` / `routes` pair. Authentication routes live
//! in `crate::auth`.

pub mod common;
pub mod event;
pub mod registration;
pub mod staff_application;
pub mod user;
pub mod web;
