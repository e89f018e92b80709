use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use crate::fetch::DEFAULT_TIMEOUT;

/// Report API used when neither flag nor environment override it.
pub const DEFAULT_API_BASE: &str = "https://api.pearktrue.cn";

/// Command-line overrides for values that normally come from the environment.
#[derive(Debug, Parser)]
#[command(name = "ranklist-bot", about = "Matrix bot serving ranked reports from a REST API")]
pub struct Cli {
    /// Base URL of the report API
    #[arg(long)]
    pub api_base: Option<String>,

    /// Total fetch timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

/// Everything the bot needs, resolved once at startup.
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub homeserver: String,
    pub username: String,
    pub password: String,
    pub api_base: String,
    pub timeout: Duration,
}

impl BotConfig {
    /// Resolve configuration from CLI flags and environment variables.
    /// Flags win over the environment; the environment wins over defaults.
    pub fn load(cli: &Cli) -> Result<Self> {
        let homeserver = std::env::var("MATRIX_HOMESERVER")
            .context("MATRIX_HOMESERVER environment variable not set")?;
        let username =
            std::env::var("MATRIX_USER").context("MATRIX_USER environment variable not set")?;
        let password = std::env::var("MATRIX_PASSWORD")
            .context("MATRIX_PASSWORD environment variable not set")?;

        let api_base = cli
            .api_base
            .clone()
            .or_else(|| std::env::var("REPORT_API_BASE").ok())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        let timeout = match cli.timeout_secs {
            Some(secs) => Duration::from_secs(secs),
            None => match std::env::var("REPORT_TIMEOUT_SECS") {
                Ok(raw) => Duration::from_secs(
                    raw.parse()
                        .context("REPORT_TIMEOUT_SECS is not a valid number of seconds")?,
                ),
                Err(_) => DEFAULT_TIMEOUT,
            },
        };

        Ok(Self {
            homeserver,
            username,
            password,
            api_base,
            timeout,
        })
    }
}
