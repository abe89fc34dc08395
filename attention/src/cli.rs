//! CLI definitions

use clap::Parser;
use std::path::PathBuf;
use tracing::debug;

use crate::arbiter::Strategy;

/// Attention - one driver, a noisy road and a bored passenger
#[derive(Debug, Parser)]
#[command(
    name = "attention",
    about = "Arbitrates one driver's attention between road alerts and passenger questions",
    version,
    after_help = after_help()
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Arbitration strategy (overrides config)
    #[arg(short, long, value_enum)]
    pub strategy: Option<Strategy>,

    /// Seed for reproducible subject and duration picks (overrides config)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Stop on its own after this many milliseconds instead of waiting for Ctrl+C
    #[arg(long = "run-for-ms", value_name = "MS")]
    pub run_for_ms: Option<u64>,

    /// Output format for the trip report
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

fn after_help() -> String {
    format!("Logs are written to: {}", get_log_path().display())
}

/// Get the log file path
pub fn get_log_path() -> PathBuf {
    debug!("get_log_path: called");
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("attention")
        .join("logs")
        .join("attention.log")
}

/// Output format for the trip report
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        debug!(%s, "OutputFormat::from_str: called");
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {}. Use: text or json", s)),
        }
    }
}
