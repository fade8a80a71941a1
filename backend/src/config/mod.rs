//! Central module for application-wide configuration settings.
//!
//! This module handles loading and managing configuration parameters such as
//! the database URL, pool sizing, JWT signing settings and the server port.

use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub acquire_timeout_seconds: u64,
    pub jwt_secret: String,
    pub jwt_expires_in_seconds: u64,
    pub server_port: u16,
    pub request_timeout_seconds: u64,
    pub static_dir: String,
    pub bcrypt_cost: u32,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://kitchan.db?mode=rwc".to_string());

        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET not set")?;
        if jwt_secret.trim().is_empty() {
            anyhow::bail!("JWT_SECRET must not be empty");
        }

        let static_dir = env::var("STATIC_DIR").unwrap_or_else(|_| "public".to_string());

        Ok(Config {
            database_url,
            max_connections: parse_var("DB_MAX_CONNECTIONS", 5)?,
            acquire_timeout_seconds: parse_var("DB_ACQUIRE_TIMEOUT_SECONDS", 3)?,
            jwt_secret,
            jwt_expires_in_seconds: parse_var("JWT_EXPIRES_IN_SECONDS", 3600)?,
            server_port: parse_var("SERVER_PORT", 3000)?,
            request_timeout_seconds: parse_var("REQUEST_TIMEOUT_SECONDS", 30)?,
            static_dir,
            bcrypt_cost: parse_var("BCRYPT_COST", 10)?,
        })
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| anyhow::anyhow!("{name} must be a valid number")),
        Err(_) => Ok(default),
    }
}
