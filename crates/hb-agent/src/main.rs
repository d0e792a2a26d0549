//! helpbot agent
//!
//! Opens a real-time session with the chat platform and answers every
//! message asking for help. Any failure after startup ends the process so
//! a supervisor can restart it.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hb_core::config::{self, TOKEN_ENV};

#[derive(Parser)]
#[command(name = "helpbot")]
#[command(about = "helpbot - answers help requests over a real-time chat session")]
#[command(version)]
struct Args {
    /// Path to configuration file (defaults to ./config.toml, then the
    /// user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bot token; overrides connection.token from the config file
    #[arg(long, env = TOKEN_ENV, hide_env_values = true)]
    token: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Verbose output (debug logging)
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose {
        "debug"
    } else {
        args.log_level.as_str()
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match config::resolve_config(args.config.as_deref(), args.token)
        .context("Failed to load configuration")?
    {
        Some(config) => config,
        None => {
            tracing::info!("No configuration loaded - nothing to do");
            return Ok(());
        }
    };

    let err = match hb_agent::run(config).await {
        Ok(never) => match never {},
        Err(e) => e,
    };

    let summary = hb_agent::failure_summary(&err);
    Err(anyhow::Error::new(err).context(summary))
}
