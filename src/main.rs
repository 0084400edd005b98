use std::sync::Arc;

use apptrack::api::RestClient;
use apptrack::server::{app, AppState};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up APPTRACK_API_HOST etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = apptrack::config::config();
    tracing::info!(
        "Starting AppTrack datasource in {:?} mode against {}",
        config.environment,
        config.api.host
    );
    if apptrack::is_development!() {
        tracing::debug!("Grid failure policy: {:?}", config.grid.failure_policy);
    }

    let client = RestClient::from_config()?;
    let state = AppState::from_config(Arc::new(client));
    state.spawn_idle_sweep();

    // Allow tests or deployments to override port via env
    let port = std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(config.server.port);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("AppTrack datasource listening on http://{}", bind_addr);

    axum::serve(listener, app(state)).await?;
    Ok(())
}
