use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;

use chatbot_backend::core::config::{AppPaths, ConfigService};
use chatbot_backend::core::logging;
use chatbot_backend::server;
use chatbot_backend::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let paths = Arc::new(AppPaths::new());
    let config = ConfigService::new(paths.clone())
        .load_config()
        .context("Failed to load configuration")?;
    logging::init(&paths, &config.logging);

    let state = AppState::initialize(&paths, config).await;

    if state
        .sessions
        .spawn_sweeper(state.config.session.sweep_interval())
        .is_some()
    {
        tracing::debug!("Session sweeper started");
    }

    let bind_addr = state.config.server.bind_addr();
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    let addr = listener.local_addr()?;

    tracing::info!("Listening on {}", addr);

    let app: Router = server::router(state.clone());

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
