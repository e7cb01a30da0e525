mod config;
mod routes;

use config::Config;
use cott::{MemoryReplayCache, Validator};
use routes::AppState;
use tracing::{error, info, warn};
use tracing_subscriber::prelude::__tracing_subscriber_SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env().map_err(|e| {
        error!("{}", e);
        e
    })?;

    if config.debug {
        warn!("Debug mode: demo device key is loaded, CORS allows any origin");
    }
    if config.fallback_key.is_some() {
        warn!("Fallback key configured: unknown devices will not be reported");
    }

    let validator = Validator::new(config.key_store(), MemoryReplayCache::new());
    let app = routes::router(AppState::new(validator), config.debug);

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    info!("COTT server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("COTT server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down...");
}
