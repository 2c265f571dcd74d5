mod config;
mod dispatch;
mod errors;
mod handlers;
mod metrics;
mod probe;
mod response;
mod routes;
mod state;

use config::Config;
use state::AppState;
use std::{net::SocketAddr, sync::Arc};
use tokio::signal;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cfg = Config::from_env()?;
    let state = Arc::new(AppState::from_config(cfg)?);

    let addr: SocketAddr = state.config.listen_addr().parse()?;
    info!(
        %addr,
        name = %state.config.app_name,
        version = %state.config.version,
        environment = state.config.environment.as_str(),
        "Starting micropulse"
    );

    let app = dispatch::router(state);

    let server = axum::Server::bind(&addr).serve(app.into_make_service());

    let graceful = server.with_graceful_shutdown(shutdown_signal());
    graceful.await?;
    Ok(())
}

async fn shutdown_signal() {
    let _ = signal::ctrl_c().await;
    info!("Shutdown signal received");
}
