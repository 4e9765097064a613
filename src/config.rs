//! Application configuration module
//!
//! Handles loading and validating configuration from command-line flags,
//! environment variables and an optional `.env` file.

use crate::models::Dataset;
use clap::{Parser, ValueEnum};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load environment variables: {0}")]
    EnvLoad(#[from] dotenvy::Error),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

/// How reports are written to stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Command-line flags, each backed by an environment variable
#[derive(Debug, Parser)]
#[command(name = "matchday", version, about = "Load football results into SQLite and run the fixed report queries")]
pub struct Cli {
    /// Match results CSV
    #[arg(long, env = "RESULTS_CSV", default_value = "results.csv")]
    pub results: PathBuf,

    /// Penalty shootouts CSV
    #[arg(long, env = "SHOOTOUTS_CSV", default_value = "shootouts.csv")]
    pub shootouts: PathBuf,

    /// Goal scorers CSV
    #[arg(long, env = "GOALSCORERS_CSV", default_value = "goalscorers.csv")]
    pub goalscorers: PathBuf,

    /// SQLite database file, created if missing
    #[arg(long, env = "DATABASE_PATH", default_value = "Database.db")]
    pub database: PathBuf,

    /// Row cap for the combined sample report
    #[arg(long, env = "SAMPLE_SIZE", default_value_t = 10)]
    pub sample_size: usize,

    /// Report output format
    #[arg(long, env = "OUTPUT_FORMAT", value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

/// Paths of the three source datasets
#[derive(Debug, Clone)]
pub struct DataPaths {
    pub results: PathBuf,
    pub shootouts: PathBuf,
    pub goalscorers: PathBuf,
}

impl DataPaths {
    /// Source file of a dataset
    pub fn path(&self, dataset: Dataset) -> &Path {
        match dataset {
            Dataset::Results => &self.results,
            Dataset::Shootouts => &self.shootouts,
            Dataset::Goalscorers => &self.goalscorers,
        }
    }
}

impl Default for DataPaths {
    fn default() -> Self {
        Self {
            results: PathBuf::from("results.csv"),
            shootouts: PathBuf::from("shootouts.csv"),
            goalscorers: PathBuf::from("goalscorers.csv"),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("Database.db"),
        }
    }
}

/// Report configuration
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub sample_size: usize,
    pub format: OutputFormat,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            sample_size: 10,
            format: OutputFormat::Table,
        }
    }
}

/// Complete application settings
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub data: DataPaths,
    pub database: DatabaseConfig,
    pub report: ReportConfig,
}

impl Settings {
    /// Load settings from the process arguments and environment
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if it exists (ignore errors if file not found)
        match dotenvy::dotenv() {
            Ok(_) => {}
            Err(e) if e.not_found() => {}
            Err(e) => return Err(ConfigError::EnvLoad(e)),
        }

        Self::from_cli(Cli::parse())
    }

    /// Build settings from already-parsed flags
    pub fn from_cli(cli: Cli) -> Result<Self, ConfigError> {
        if cli.sample_size == 0 {
            return Err(ConfigError::InvalidValue(
                "SAMPLE_SIZE must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            data: DataPaths {
                results: cli.results,
                shootouts: cli.shootouts,
                goalscorers: cli.goalscorers,
            },
            database: DatabaseConfig { path: cli.database },
            report: ReportConfig {
                sample_size: cli.sample_size,
                format: cli.format,
            },
        })
    }
}
