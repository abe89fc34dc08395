//! Attention - CLI entry point
//!
//! Starts the trip and keeps it going until Ctrl+C, SIGTERM or `--run-for-ms`.

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use crossterm::ExecutableCommand;
use crossterm::style::ResetColor;
use eyre::{Context, Result};
use tracing::{debug, info, warn};

use attention::cancel::CancellationToken;
use attention::cli::{Cli, OutputFormat};
use attention::config::Config;
use attention::status::ConsoleSink;
use attention::trip::Trip;

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Note: Can't log params here since logging isn't initialized yet
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("attention")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Determine log level with priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(log_dir.join("attention.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

/// Cancel the trip on SIGINT/SIGTERM, or when the optional deadline passes
async fn wait_for_stop(run_for: Option<Duration>) -> Result<()> {
    let deadline = async {
        match run_for {
            Some(run_for) => tokio::time::sleep(run_for).await,
            None => std::future::pending().await,
        }
    };

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut sigint = signal(SignalKind::interrupt())?;
        let mut sigterm = signal(SignalKind::terminate())?;

        tokio::select! {
            _ = sigint.recv() => warn!("SIGINT received"),
            _ = sigterm.recv() => warn!("SIGTERM received"),
            _ = deadline => info!(?run_for, "Run time elapsed"),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result?;
                warn!("Ctrl+C received");
            }
            _ = deadline => info!(?run_for, "Run time elapsed"),
        }
    }

    Ok(())
}

/// Put the terminal's colors back the way we found them
fn restore_terminal() {
    debug!("restore_terminal: called");
    let mut stdout = std::io::stdout();
    if let Err(e) = stdout.execute(ResetColor) {
        debug!(error = %e, "restore_terminal: failed to reset color");
    }
    let _ = stdout.flush();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    setup_logging(cli.log_level.as_deref(), config.log_level.as_deref()).context("Failed to setup logging")?;

    // CLI overrides config
    if let Some(strategy) = cli.strategy {
        config.strategy = strategy;
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    config.validate().context("Invalid configuration")?;
    info!(strategy = %config.strategy, seed = ?config.seed, "Attention loaded config");

    let cancel = CancellationToken::new();
    let trip = tokio::spawn(Trip::new(config, Arc::new(ConsoleSink)).run(cancel.clone()));

    let stopper = {
        let cancel = cancel.clone();
        let run_for = cli.run_for_ms.map(Duration::from_millis);
        tokio::spawn(async move {
            if let Err(e) = wait_for_stop(run_for).await {
                warn!(error = %e, "Failed to wait for stop signal, stopping now");
            }
            cancel.cancel();
        })
    };

    let report = trip.await.context("Trip task panicked")?;
    stopper.abort();
    restore_terminal();
    let report = report?;

    match cli.format {
        OutputFormat::Text => print!("{}", report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    info!("Attention shutdown complete");
    Ok(())
}
