use clap::{Parser, ValueEnum};
use strum::Display as StrumDisplay;

use crate::config::{DEFAULT_BASE_URL, DEFAULT_MODEL};

#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Cli {
    #[arg(short, long, default_value_t = 5173)]
    pub port: u16,

    #[arg(long, value_enum, default_value_t = Log::Plain)]
    pub log: Log,

    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    #[arg(long, default_value = DEFAULT_MODEL)]
    pub default_model: String,

    #[arg(long, env = "APP_ENV", default_value = "development")]
    pub environment: String,

    /// Attempts per remote call, including the first one
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_retries: u32,

    /// Backoff before the second attempt; doubles for every further attempt
    #[arg(long, default_value_t = 1000)]
    pub base_delay_ms: u64,

    /// Minimum spacing between outbound requests
    #[arg(long, default_value_t = 1000)]
    pub min_interval_ms: u64,

    #[arg(long, default_value_t = 30_000)]
    pub timeout_ms: u64,

    #[arg(long)]
    pub backoff_jitter: bool,
}

#[derive(Debug, Clone, ValueEnum, StrumDisplay)]
#[strum(serialize_all = "snake_case")]
pub enum Log {
    Plain,
    Json,
}
