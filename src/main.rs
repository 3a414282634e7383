//! Guardian Engine entrypoint: loads config, starts the session sweeper, and
//! serves the /v1 surface until Ctrl+C.

use std::sync::Arc;

use guardian_engine::{config::EngineConfig, http, Engine, StructuredLogger};
use tokio_util::sync::CancellationToken;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config_path = std::env::var("GUARDIAN_CONFIG_PATH")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| std::path::PathBuf::from("config.json"));
    let config = EngineConfig::load(&config_path);

    StructuredLogger::init(config.log.json, &config.log.level);

    info!(
        idle_ttl_hours = config.session.idle_ttl_hours,
        max_age_hours = config.session.max_age_hours,
        "guardian engine starting"
    );

    let engine = Arc::new(Engine::new(&config));

    let cancel = CancellationToken::new();
    let sweeper = engine.spawn_sweeper(cancel.clone());

    let router = http::create_router(engine);
    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr).await?;
    info!(addr = %config.server.bind_addr, "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    cancel.cancel();
    let _ = sweeper.await;
    info!("guardian engine stopping");
    Ok(())
}
