//! HTTP server for cafe-scout
//!
//! Serves the chat page and the session API.

pub mod routes;
pub mod state;

use crate::ai::Recommender;
use crate::config::Config;
use crate::error::{Error, Result};
use routes::create_router;
use state::LiveState;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Start the HTTP server on the configured address
///
/// Never returns unless the server shuts down
pub async fn run(config: Config) -> Result<()> {
    let addr = config.server_addr();
    run_on(&addr, config).await
}

/// Start the HTTP server with a specific address
pub async fn run_on(addr: &str, config: Config) -> Result<()> {
    let addr: SocketAddr = addr
        .parse()
        .map_err(|e| Error::Server(format!("Invalid server address: {}", e)))?;

    let state = Arc::new(LiveState::live(config)?);
    if !state.recommender().is_configured() {
        warn!(
            "{} is not set; recommendation requests will fail until it is",
            state.config.ai.api_key_env
        );
    }

    // Resolve the default location so the first request has coordinates
    state.schedule_geocode();

    let app = create_router(Arc::clone(&state));

    info!("Starting server on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| Error::Server(format!("Failed to bind to {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| Error::Server(format!("Server error: {}", e)))?;

    Ok(())
}
