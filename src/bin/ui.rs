//! PrivAlert analysis client.
//!
//! Without flags: serves the browser UI (default http://127.0.0.1:8719) and
//! opens it. With `--cli`: runs an interactive terminal session instead.
//! The first non-flag argument is the config path (default `config.toml`,
//! optional for this binary).

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use privalert::analysis::AnalysisClient;
use privalert::config::Config;
use privalert::ui::{self, server, Store};

#[tokio::main]
async fn main() -> Result<()> {
    privalert::init_logging();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli_mode = args.iter().any(|a| a == "--cli");
    let config_path = args
        .iter()
        .find(|a| !a.starts_with("--"))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    let config = Config::load_or_default(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    let client = AnalysisClient::new(&config.backend);
    info!("Analysis backend: {}", client.base_url());

    if cli_mode {
        return ui::cli::run(client).await;
    }

    let store = Store::default();
    {
        let store = store.clone();
        let client = client.clone();
        tokio::spawn(async move {
            ui::check_backend(&store, &client).await;
        });
    }

    if config.ui.open_browser {
        let url = format!("http://{}", config.ui.listen);
        tokio::spawn(async move {
            tokio::time::sleep(tokio::time::Duration::from_millis(400)).await;
            // Try xdg-open (Linux), then open (macOS); ignore errors.
            let _ = std::process::Command::new("xdg-open").arg(&url).status();
            let _ = std::process::Command::new("open").arg(&url).status();
        });
    }

    let state = server::AppState { store, client };
    server::run(state, &config.ui.listen, config.ui.max_upload_bytes).await
}
