//! PrivAlert: a Telegram `/start` webhook and a client for an image
//! privacy-analysis backend.

pub mod analysis;
pub mod bot;
pub mod config;
pub mod platform;
pub mod ui;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the fmt subscriber; `RUST_LOG` overrides the default filter.
pub fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,privalert=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
