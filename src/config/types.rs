//! Server configuration types.

use crate::error::ConfigError;
use std::net::SocketAddr;
use std::str::FromStr;

/// Which [`crate::store::Store`] implementation backs the API.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(StorageBackend::Postgres),
            "memory" | "mem" => Ok(StorageBackend::Memory),
            other => Err(ConfigError::UnknownStorage(other.to_string())),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub database_url: String,
    pub storage: StorageBackend,
    /// PostgreSQL schema holding the course, student and enrollment tables.
    pub schema: String,
    pub bind_addr: SocketAddr,
    pub max_connections: u32,
    pub max_students_per_course: usize,
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            database_url: "postgres://localhost/courses".into(),
            storage: StorageBackend::Postgres,
            schema: "public".into(),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            max_connections: 5,
            max_students_per_course: 20,
            max_body_bytes: 64 * 1024,
        }
    }
}
