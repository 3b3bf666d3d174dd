//! Static asset server
//!
//! Loads configuration, sets up logging, and serves the configured root
//! directory over HTTP.

use anyhow::{anyhow, Context};
use static_revalidate::{AssetConfig, AssetServer, AssetService};
use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

/// Main entry point for the asset server
///
/// # Usage
/// ```bash
/// # Start with default config (static_revalidate.yaml)
/// cargo run
///
/// # Start with custom config
/// cargo run -- /path/to/config.yaml
/// ```
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = env::args()
        .nth(1)
        .unwrap_or_else(|| "static_revalidate.yaml".to_string());

    let config = AssetConfig::from_file(&config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path))?;

    let level = config
        .log_level
        .parse::<tracing::Level>()
        .unwrap_or(tracing::Level::INFO);
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(true)
        .with_line_number(true)
        .init();

    info!("Configuration loaded from {}", config_path);
    info!("  - Root path: {}", config.root_path);
    info!("  - Mount prefix: {}", config.mount_prefix);
    info!("  - Production: {}", config.production);
    info!("  - Default Cache-Control: {}", config.default_cache_control);
    info!("  - Cache-Control overrides: {}", config.cache_control.len());
    info!("  - Default charset: {}", config.default_charset);

    let addr: SocketAddr = config
        .listen_address
        .parse()
        .with_context(|| format!("Invalid listen address {}", config.listen_address))?;

    let service = Arc::new(AssetService::filesystem(Arc::new(config)));
    AssetServer::new(service, addr)
        .start()
        .await
        .map_err(|e| anyhow!("Asset server failed: {}", e))
}
