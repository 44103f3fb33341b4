//! Configuration management for taproot.
//!
//! This module handles the layered configuration system with the following
//! precedence:
//! 1. Command-line arguments (highest priority)
//! 2. Environment variables
//! 3. JSON config file
//! 4. Default values (lowest priority)

use chrono::NaiveDate;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{Result, TaprootError};
use crate::tabular::ColumnSpec;

/// Command-line arguments for the seed-trend app
#[derive(Parser, Debug)]
#[command(name = "taproot")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the seed-collection CSV; demonstration data is generated
    /// when omitted
    pub csv_file: Option<PathBuf>,

    /// Path to JSON configuration file
    #[arg(short, long, env = "TAPROOT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "TAPROOT_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Reference date the elapsed-years axis is measured from
    #[arg(long, env = "TAPROOT_EPOCH")]
    pub epoch: Option<NaiveDate>,

    /// Seed for the demonstration-data generator
    #[arg(long, env = "TAPROOT_SEED")]
    pub seed: Option<u64>,

    /// Header of the category column
    #[arg(long)]
    pub category_column: Option<String>,

    /// Header of the amount column
    #[arg(long)]
    pub amount_column: Option<String>,

    /// Header of the date column (located by substring match when omitted)
    #[arg(long)]
    pub date_column: Option<String>,

    /// Write plot payloads as JSON to this path
    #[arg(long)]
    pub plot_out: Option<PathBuf>,
}

/// Trend-fitting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendConfig {
    /// Epoch for the elapsed-years axis
    #[serde(default = "default_epoch")]
    pub epoch: NaiveDate,
}

/// Demonstration-data configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyntheticConfig {
    /// PRNG seed
    #[serde(default = "default_seed")]
    pub seed: u64,
}

/// Complete configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Column resolution for the record loader
    #[serde(default)]
    pub columns: ColumnSpec,

    /// Trend fitting
    #[serde(default)]
    pub trend: TrendConfig,

    /// Demonstration data
    #[serde(default)]
    pub synthetic: SyntheticConfig,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Optional plot payload output path
    #[serde(default)]
    pub plot_out: Option<PathBuf>,
}

impl Config {
    /// Load configuration from all sources with proper precedence
    pub fn load() -> Result<(Self, Option<PathBuf>)> {
        let args = Args::parse();
        Self::from_args(args)
    }

    /// Build the configuration from parsed arguments
    pub fn from_args(args: Args) -> Result<(Self, Option<PathBuf>)> {
        let mut config = Config::default();

        // Load from JSON file if provided
        if let Some(config_path) = &args.config {
            let json_config = Self::load_from_file(config_path)?;
            config.merge(json_config);
        }

        // Override with command-line arguments
        config.log_level = args.log_level;
        if let Some(epoch) = args.epoch {
            config.trend.epoch = epoch;
        }
        if let Some(seed) = args.seed {
            config.synthetic.seed = seed;
        }
        if let Some(category) = args.category_column {
            config.columns.category = category;
        }
        if let Some(amount) = args.amount_column {
            config.columns.amount = amount;
        }
        if let Some(date) = args.date_column {
            config.columns.date = Some(date);
        }
        if args.plot_out.is_some() {
            config.plot_out = args.plot_out;
        }

        Ok((config, args.csv_file))
    }

    /// Load configuration from a JSON file
    fn load_from_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        self.columns = other.columns;
        self.trend = other.trend;
        self.synthetic = other.synthetic;
        self.log_level = other.log_level;
        if other.plot_out.is_some() {
            self.plot_out = other.plot_out;
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.columns.category.is_empty() {
            return Err(TaprootError::Config {
                message: "Category column name cannot be empty".to_string(),
            });
        }

        if self.columns.amount.is_empty() {
            return Err(TaprootError::Config {
                message: "Amount column name cannot be empty".to_string(),
            });
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(TaprootError::Config {
                    message: format!(
                        "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                        self.log_level
                    ),
                });
            }
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            columns: ColumnSpec::default(),
            trend: TrendConfig::default(),
            synthetic: SyntheticConfig::default(),
            log_level: default_log_level(),
            plot_out: None,
        }
    }
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            epoch: default_epoch(),
        }
    }
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
        }
    }
}

// Default value functions for serde
fn default_epoch() -> NaiveDate {
    *crate::trend::DEFAULT_EPOCH
}

fn default_seed() -> u64 {
    crate::tabular::synthetic::DEFAULT_SEED
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.columns.category, "species");
        assert_eq!(config.columns.amount, "Available lb");
        assert_eq!(config.columns.date, None);
        assert_eq!(config.trend.epoch, *crate::trend::DEFAULT_EPOCH);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_config_merge() {
        let mut config1 = Config::default();
        let mut config2 = Config::default();

        config2.columns.category = "taxon".to_string();
        config2.synthetic.seed = 99;
        config2.plot_out = Some(PathBuf::from("plots.json"));

        config1.merge(config2);

        assert_eq!(config1.columns.category, "taxon");
        assert_eq!(config1.synthetic.seed, 99);
        assert_eq!(config1.plot_out, Some(PathBuf::from("plots.json")));
    }

    #[test]
    fn test_config_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());

        let mut config = Config::default();
        config.columns.category = "".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.log_level = "invalid".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_json() {
        let json = r#"{
            "columns": { "category": "taxon" },
            "trend": { "epoch": "2000-01-01" },
            "log_level": "debug"
        }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.columns.category, "taxon");
        // Unset fields fall back to serde defaults.
        assert_eq!(config.columns.amount, "Available lb");
        assert_eq!(
            config.trend.epoch,
            NaiveDate::from_ymd_opt(2000, 1, 1).unwrap()
        );
        assert_eq!(config.synthetic.seed, 42);
        assert_eq!(config.log_level, "debug");
    }
}
