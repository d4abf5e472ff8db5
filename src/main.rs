use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use privalert::bot::{self, AppState};
use privalert::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    privalert::init_logging();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    info!("Loading configuration from: {}", config_path.display());
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    let telegram = config.telegram()?;
    info!("Configuration loaded successfully");
    info!("  Telegram API: {}", telegram.api_url);
    info!("  Web app: {}", telegram.web_app_url);

    let state = Arc::new(AppState::from_config(&config)?);

    info!("Webhook is starting...");
    bot::run(state, &config.server.listen).await?;

    Ok(())
}
