//! Oracle binary: serves the game registry over HTTP.

use rps_game_oracle::{create_router, OracleConfig, OracleState};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = OracleConfig::from_env();
    let app = create_router(Arc::new(OracleState::new()));

    let addr = config.socket_addr();
    let listener = TcpListener::bind(addr).await?;
    info!("Oracle service listening on http://{}", addr);

    axum::serve(listener, app).await
}
