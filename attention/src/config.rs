//! Attention configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::arbiter::Strategy;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,

    /// Arbitration strategy for the driver's attention
    pub strategy: Strategy,

    /// Seed for payload selection; random when absent
    pub seed: Option<u64>,

    /// Road (alert producer) settings
    pub road: RoadConfig,

    /// Passenger (question producer) settings
    pub passenger: PassengerConfig,

    /// Driver settings
    pub driver: DriverConfig,
}

impl Config {
    /// Validate configuration before use
    pub fn validate(&self) -> Result<()> {
        debug!("Config::validate: called");
        if self.road.subjects.is_empty() {
            return Err(eyre::eyre!("road.subjects must not be empty"));
        }
        if self.passenger.subjects.is_empty() {
            return Err(eyre::eyre!("passenger.subjects must not be empty"));
        }
        self.road.attention_ms.validate("road.attention-ms")?;
        self.road.pause_ms.validate("road.pause-ms")?;
        self.passenger.pause_ms.validate("passenger.pause-ms")?;
        self.driver.answer_ms.validate("driver.answer-ms")?;
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .attention.yml
        let local_config = PathBuf::from(".attention.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    // Logging is not up yet; make sure the fallback is seen
                    eprintln!("Warning: Failed to load config from {}: {:#}", local_config.display(), e);
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/attention/attention.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("attention").join("attention.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        // Logging is not up yet; make sure the fallback is seen
                    eprintln!("Warning: Failed to load config from {}: {:#}", user_config.display(), e);
                    tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// Half-open millisecond range `[min, max)`; `min == max` is a fixed duration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationRange {
    pub min: u64,
    pub max: u64,
}

impl DurationRange {
    pub const fn new(min: u64, max: u64) -> Self {
        Self { min, max }
    }

    /// A range that always yields `ms`
    pub const fn fixed(ms: u64) -> Self {
        Self { min: ms, max: ms }
    }

    pub fn min_duration(&self) -> Duration {
        Duration::from_millis(self.min)
    }

    fn validate(&self, name: &str) -> Result<()> {
        if self.min > self.max {
            return Err(eyre::eyre!("{}: min ({}) exceeds max ({})", name, self.min, self.max));
        }
        Ok(())
    }
}

/// Road settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoadConfig {
    /// Dangers the road can throw at the driver
    pub subjects: Vec<String>,

    /// How long each danger holds the driver's attention
    #[serde(rename = "attention-ms")]
    pub attention_ms: DurationRange,

    /// Quiet time between dangers
    #[serde(rename = "pause-ms")]
    pub pause_ms: DurationRange,
}

impl Default for RoadConfig {
    fn default() -> Self {
        Self {
            subjects: vec![
                "passing truck".to_string(),
                "cat on the road".to_string(),
                "sun shining in the eye".to_string(),
                "drunk driver".to_string(),
                "ambulance".to_string(),
            ],
            attention_ms: DurationRange::new(3_000, 7_000),
            pause_ms: DurationRange::new(1_000, 5_000),
        }
    }
}

/// Passenger settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PassengerConfig {
    /// Questions the passenger asks
    pub subjects: Vec<String>,

    /// Sulking time after each answer
    #[serde(rename = "pause-ms")]
    pub pause_ms: DurationRange,
}

impl Default for PassengerConfig {
    fn default() -> Self {
        Self {
            subjects: vec![
                "are we there yet?".to_string(),
                "can we stop at McDonalds?".to_string(),
                "I'm hungry".to_string(),
                "I'm bored".to_string(),
            ],
            pause_ms: DurationRange::new(1_000, 5_000),
        }
    }
}

/// Driver settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Time spent thinking about a question
    #[serde(rename = "answer-ms")]
    pub answer_ms: DurationRange,

    /// The reply to every question
    pub reply: String,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            answer_ms: DurationRange::new(1_000, 3_000),
            reply: "Pffft".to_string(),
        }
    }
}
