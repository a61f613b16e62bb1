mod bot;
mod config;
mod persona;
mod platform;
mod random;
mod replies;
mod server;

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,persona_bot=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // An explicit path must exist; the default one is optional.
    let config = match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            Config::load(&path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?
        }
        None if PathBuf::from(DEFAULT_CONFIG_PATH).exists() => {
            info!("Loading configuration from: {}", DEFAULT_CONFIG_PATH);
            Config::load(&PathBuf::from(DEFAULT_CONFIG_PATH))?
        }
        None => {
            info!("No {} found, using built-in settings", DEFAULT_CONFIG_PATH);
            Config::defaults()?
        }
    };

    info!("Configuration loaded successfully");
    info!("  Persona: {}", config.persona.name);
    info!("  Keyword rules: {}", config.persona.rules.len());
    info!("  Telegram API: {}", config.telegram.api_base_url);
    info!("  Token variable: {}", config.telegram.token_env);

    info!("Bot is starting...");
    server::serve(config).await?;

    Ok(())
}
