//! HTTP server for STASH.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use super::handlers::AppState;
use super::router::create_router;
use crate::config::Config;
use crate::Result;

/// Bind and serve the API until the process is stopped.
pub async fn serve(config: &Config, state: Arc<AppState>) -> Result<()> {
    let router = create_router(
        state,
        &config.server.cors_origins,
        config.max_upload_size_bytes() as usize,
    );

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, router).await?;

    Ok(())
}
