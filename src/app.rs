//! Router assembly and store selection.

use crate::config::{ServerConfig, StorageBackend};
use crate::error::AppError;
use crate::routes::{common_routes, resource_routes};
use crate::state::AppState;
use crate::store::{MemoryStore, PgStore, Store};
use axum::Router;
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Prefix under which the resource routes are mounted.
pub const API_PREFIX: &str = "/api/v1";

/// Open the configured store.
pub async fn build_store(config: &ServerConfig) -> Result<Arc<dyn Store>, AppError> {
    let store: Arc<dyn Store> = match config.storage {
        StorageBackend::Postgres => {
            Arc::new(PgStore::connect(&config.database_url, &config.schema, config.max_connections).await?)
        }
        StorageBackend::Memory => {
            tracing::warn!("using in-memory storage; data is lost on restart");
            Arc::new(MemoryStore::new())
        }
    };
    Ok(store)
}

/// Full application: common routes at the root, resources under [`API_PREFIX`].
pub fn app(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .merge(common_routes(state.clone()))
        .nest(API_PREFIX, resource_routes(state))
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TraceLayer::new_for_http())
}
