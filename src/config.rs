//! Configuration loading — TOML file with environment overrides.
//!
//! A missing config file is fine as long as `BOT_TOKEN` is set in the
//! environment; a missing token anywhere is a startup error.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_POLL_TIMEOUT_SECS: u64 = 30;

/// On-disk shape; every field optional so a partial file works.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    bot_token: Option<String>,
    poll_timeout_secs: Option<u64>,
    request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Telegram bot token. `BOT_TOKEN` in the environment takes precedence
    /// over the config file.
    pub bot_token: String,
    /// Long-poll timeout passed to `getUpdates`.
    pub poll_timeout_secs: u64,
    /// HTTP client timeout; kept above the poll timeout so long polls
    /// aren't cut off locally.
    pub request_timeout_secs: u64,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        Self::load_with_env(path, std::env::var("BOT_TOKEN").ok())
    }

    fn load_with_env(path: &Path, env_token: Option<String>) -> Result<Self> {
        let file = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("Invalid config file: {}", path.display()))?
        } else {
            FileConfig::default()
        };
        Self::from_parts(file, env_token)
    }

    fn from_parts(file: FileConfig, env_token: Option<String>) -> Result<Self> {
        let bot_token = env_token
            .filter(|t| !t.is_empty())
            .or(file.bot_token)
            .filter(|t| !t.is_empty());
        let Some(bot_token) = bot_token else {
            bail!("No bot token: set BOT_TOKEN or bot_token in the config file");
        };

        let poll_timeout_secs = file.poll_timeout_secs.unwrap_or(DEFAULT_POLL_TIMEOUT_SECS);
        let request_timeout_secs = file
            .request_timeout_secs
            .unwrap_or(poll_timeout_secs + 10)
            .max(poll_timeout_secs + 5);

        Ok(Self {
            bot_token,
            poll_timeout_secs,
            request_timeout_secs,
        })
    }
}
