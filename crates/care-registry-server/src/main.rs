use std::sync::{Arc, Mutex};

use anyhow::Context;
use care_registry_core::Database;
use care_registry_server::config::{self, ServerConfig};
use care_registry_server::start_server;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    if let Some(dir) = config.database_path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating database directory {}", dir.display()))?;
    }
    let db = Database::open(&config.database_path)
        .with_context(|| format!("opening database {}", config.database_path.display()))?;
    tracing::info!(path = %config.database_path.display(), "database ready");

    let mut server = start_server(config.bind_addr, Arc::new(Mutex::new(db))).await?;

    tokio::signal::ctrl_c()
        .await
        .context("waiting for shutdown signal")?;
    server.shutdown();
    server.stopped().await;

    Ok(())
}
