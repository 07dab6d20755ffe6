//! Course API: REST CRUD for courses and students over PostgreSQL or an in-memory store.

pub mod app;
pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod model;
pub mod response;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;
pub mod store;

pub use app::{app, build_store, API_PREFIX};
pub use config::{load_from_env, load_with, ServerConfig, StorageBackend};
pub use error::{AppError, ConfigError};
pub use model::{Course, CourseChanges, ListFilter, NewCourse, NewStudent, Student, StudentChanges};
pub use routes::{common_routes, resource_routes};
pub use service::{CourseService, StudentService};
pub use state::AppState;
pub use store::{ensure_database_exists, MemoryStore, PgStore, Store};
