//! rollhost — Telegram dice game coordinator.
//!
//! Runs a long-polling Telegram bot that manages per-group dice games: a
//! host creates a session with `/host`, up to 8 players `/join`, and the
//! host `/roll`s scored rounds announcing winners and losers.

mod config;
mod game;
mod telegram;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tokio::time::Duration;

const INITIAL_BACKOFF_SECS: u64 = 1;
const MAX_BACKOFF_SECS: u64 = 30;

#[derive(Debug, Parser)]
#[command(name = "rollhost", version, about = "Telegram dice game coordinator")]
struct Cli {
    /// Path to the TOML config file.
    #[arg(long, default_value = "rollhost.toml")]
    config: PathBuf,
    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = config::Config::load(&cli.config)?;
    let api = telegram::TelegramApi::new(&config)?;
    let registry = game::GameRegistry::new();

    let me = api
        .get_me()
        .await
        .context("Failed to authenticate with Telegram")?;
    let dispatcher = telegram::Dispatcher::new(api.clone(), registry, me.username.clone());

    println!("🎲 rollhost started");
    println!(
        "   Bot:     @{}",
        me.username.as_deref().unwrap_or("<unnamed>")
    );
    println!("   Polling: {}s long poll", config.poll_timeout_secs);
    println!("   Ctrl+C to stop");

    tokio::select! {
        result = poll_updates(&api, &dispatcher, &config) => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown requested");
            Ok(())
        }
    }
}

/// Long-poll `getUpdates` forever, dispatching each message. Poll failures
/// back off exponentially and reset on the next success.
async fn poll_updates(
    api: &telegram::TelegramApi,
    dispatcher: &telegram::Dispatcher,
    config: &config::Config,
) -> Result<()> {
    let mut offset: i64 = 0;
    let mut backoff = INITIAL_BACKOFF_SECS;

    loop {
        match api.get_updates(offset, config.poll_timeout_secs).await {
            Ok(updates) => {
                backoff = INITIAL_BACKOFF_SECS;
                for update in updates {
                    offset = offset.max(update.update_id + 1);
                    let Some(message) = update.message else {
                        continue;
                    };
                    if let Err(e) = dispatcher.handle_message(&message).await {
                        tracing::warn!(chat = message.chat.id, error = %e, "Failed to handle message");
                    }
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "getUpdates failed; retrying in {backoff}s");
                tokio::time::sleep(Duration::from_secs(backoff)).await;
                backoff = backoff.saturating_mul(2).min(MAX_BACKOFF_SECS);
            }
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_env("ROLLHOST_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults() {
        let cli = Cli::parse_from(["rollhost"]);
        assert_eq!(cli.config, PathBuf::from("rollhost.toml"));
        assert!(!cli.verbose);
    }

    #[test]
    fn cli_accepts_config_and_verbose() {
        let cli = Cli::parse_from(["rollhost", "--config", "/etc/rollhost.toml", "-v"]);
        assert_eq!(cli.config, PathBuf::from("/etc/rollhost.toml"));
        assert!(cli.verbose);
    }
}
