use std::net::SocketAddr;

use anyhow::{Context, Result};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<()> {
    // Observability
    sunwx_obs::init("sunwx");

    // Config
    let cfg = sunwx_config::AppConfig::load().context("Failed to load configuration")?;
    let http_bind = cfg.http_bind();

    // Build app and state
    let dashboard = sunwx_cli::Dashboard::from_config(&cfg)?;
    let (app, state) = sunwx_cli::build_app(dashboard)?;

    // Start HTTP server
    let addr: SocketAddr = http_bind
        .parse()
        .with_context(|| format!("Invalid HTTP bind address: {http_bind}"))?;
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind TCP listener")?;

    // Mark ready just before serving
    sunwx_cli::set_ready(&state, true);

    tracing::info!(%addr, "HTTP server listening");
    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
