use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::persona::Persona;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub persona: Persona,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelegramConfig {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Environment variable holding the bot token. The token never lives in
    /// the config file.
    #[serde(default = "default_token_env")]
    pub token_env: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            token_env: default_token_env(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_api_base_url() -> String {
    "https://api.telegram.org".to_string()
}

fn default_token_env() -> String {
    "TELEGRAM_BOT_TOKEN".to_string()
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validated()
    }

    /// Built-in settings, used when no config file is present.
    pub fn defaults() -> Result<Self> {
        Config::default().validated()
    }

    fn validated(mut self) -> Result<Self> {
        self.persona = self.persona.validate().context("Invalid persona")?;
        Ok(self)
    }

    pub fn token_source(&self) -> TokenSource {
        TokenSource::Env(self.telegram.token_env.clone())
    }
}

/// Where the bot token comes from. Resolved on every request so a missing
/// token fails that request only.
#[derive(Debug, Clone)]
pub enum TokenSource {
    Env(String),
    #[cfg(test)]
    Fixed(Option<String>),
}

impl TokenSource {
    pub fn resolve(&self) -> Option<String> {
        let token = match self {
            TokenSource::Env(var) => std::env::var(var).ok(),
            #[cfg(test)]
            TokenSource::Fixed(token) => token.clone(),
        };
        token.filter(|t| !t.trim().is_empty())
    }
}
