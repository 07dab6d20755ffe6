//! Course API server: loads config from the environment, opens the store, serves the API.
//!
//! Run from repo root: `cargo run -p course-server`
//! Without PostgreSQL: `COURSES_STORAGE=memory cargo run -p course-server`

use course_api::{app, build_store, load_from_env, AppState};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("course_api=info,course_server=info")),
        )
        .init();

    let config = load_from_env()?;
    tracing::info!(storage = ?config.storage, schema = %config.schema, "starting");
    let store = build_store(&config).await?;
    let state = AppState::new(store, config.max_students_per_course);

    let app = app(state, config.max_body_bytes);
    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("shutting down");
        })
        .await?;
    Ok(())
}
