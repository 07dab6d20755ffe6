//! Load [`ServerConfig`] from environment variables.

use crate::config::{validate, ServerConfig};
use crate::error::ConfigError;
use std::str::FromStr;

pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
pub const ENV_STORAGE: &str = "COURSES_STORAGE";
pub const ENV_SCHEMA: &str = "COURSES_SCHEMA";
pub const ENV_BIND_ADDR: &str = "BIND_ADDR";
pub const ENV_MAX_CONNECTIONS: &str = "DB_MAX_CONNECTIONS";
pub const ENV_MAX_STUDENTS: &str = "MAX_STUDENTS_PER_COURSE";
pub const ENV_MAX_BODY_BYTES: &str = "MAX_BODY_BYTES";

/// Read config from the process environment (after loading `.env` if present). Unset keys keep their defaults.
pub fn load_from_env() -> Result<ServerConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_with(|key| std::env::var(key).ok())
}

/// Build config from an arbitrary key lookup, then validate it.
pub fn load_with<F>(lookup: F) -> Result<ServerConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = ServerConfig::default();
    if let Some(v) = lookup(ENV_DATABASE_URL) {
        config.database_url = v;
    }
    if let Some(v) = lookup(ENV_STORAGE) {
        config.storage = v.parse()?;
    }
    if let Some(v) = lookup(ENV_SCHEMA) {
        config.schema = v.trim().to_string();
    }
    if let Some(v) = lookup(ENV_BIND_ADDR) {
        config.bind_addr = parse(ENV_BIND_ADDR, &v)?;
    }
    if let Some(v) = lookup(ENV_MAX_CONNECTIONS) {
        config.max_connections = parse(ENV_MAX_CONNECTIONS, &v)?;
    }
    if let Some(v) = lookup(ENV_MAX_STUDENTS) {
        config.max_students_per_course = parse(ENV_MAX_STUDENTS, &v)?;
    }
    if let Some(v) = lookup(ENV_MAX_BODY_BYTES) {
        config.max_body_bytes = parse(ENV_MAX_BODY_BYTES, &v)?;
    }
    validate(&config)?;
    Ok(config)
}

fn parse<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key,
        reason: format!("'{}': {}", raw, e),
    })
}
