use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Public backend used when neither the environment nor the config names one.
pub const DEFAULT_BACKEND_URL: &str = "https://privalert-backend.vercel.app";

/// Environment variable that overrides `[backend] base_url`.
pub const BACKEND_URL_ENV: &str = "PRIVALERT_API_URL";

/// Environment variable that overrides `[telegram] bot_token`.
pub const BOT_TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    /// Only the webhook binary needs this section.
    #[serde(default)]
    pub telegram: Option<TelegramConfig>,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelegramConfig {
    #[serde(default)]
    pub bot_token: String,
    /// Address the "Start Now!" button opens as a Telegram web app.
    pub web_app_url: String,
    #[serde(default = "default_telegram_api_url")]
    pub api_url: String,
    #[serde(default = "default_telegram_timeout")]
    pub request_timeout_secs: u64,
}

impl TelegramConfig {
    /// Bot token with the `TELEGRAM_BOT_TOKEN` override applied.
    pub fn effective_bot_token(&self) -> String {
        match std::env::var(BOT_TOKEN_ENV) {
            Ok(token) if !token.trim().is_empty() => token,
            _ => self.bot_token.clone(),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_server_listen")]
    pub listen: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_server_listen(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    #[serde(default)]
    pub base_url: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_health_timeout")]
    pub health_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            request_timeout_secs: default_request_timeout(),
            health_timeout_secs: default_health_timeout(),
        }
    }
}

impl BackendConfig {
    /// Returns the effective base URL: `PRIVALERT_API_URL` wins, then the
    /// configured value, then the public default. Trailing slashes are dropped.
    pub fn effective_base_url(&self) -> String {
        let from_env = std::env::var(BACKEND_URL_ENV).ok();
        resolve_base_url(from_env.as_deref(), &self.base_url)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn health_timeout(&self) -> Duration {
        Duration::from_secs(self.health_timeout_secs)
    }
}

fn resolve_base_url(from_env: Option<&str>, configured: &str) -> String {
    let chosen = from_env
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .or_else(|| Some(configured.trim()).filter(|s| !s.is_empty()))
        .unwrap_or(DEFAULT_BACKEND_URL);
    chosen.trim_end_matches('/').to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct UiConfig {
    #[serde(default = "default_ui_listen")]
    pub listen: String,
    #[serde(default = "default_open_browser")]
    pub open_browser: bool,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            listen: default_ui_listen(),
            open_browser: default_open_browser(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_telegram_api_url() -> String {
    "https://api.telegram.org".to_string()
}

fn default_telegram_timeout() -> u64 {
    10
}

fn default_server_listen() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_request_timeout() -> u64 {
    60
}

fn default_health_timeout() -> u64 {
    5
}

fn default_ui_listen() -> String {
    "127.0.0.1:8719".to_string()
}

fn default_open_browser() -> bool {
    true
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Like [`Config::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// The `[telegram]` section, required by the webhook service.
    pub fn telegram(&self) -> Result<&TelegramConfig> {
        self.telegram
            .as_ref()
            .context("Missing [telegram] section in config")
    }
}
