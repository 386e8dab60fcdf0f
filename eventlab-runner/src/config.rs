//! Serializable run configuration, loaded from TOML.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use eventlab_core::engine::{EngineConfig, DEFAULT_MAX_VENUE_RETRIES};
use eventlab_core::execution::{
    CommissionModel, SimulatedExecution, TieredPerShare, ZeroCommission, DEFAULT_VENUE,
};
use eventlab_core::ledger::DEFAULT_SIZING_FRACTION;
use eventlab_core::strategy::{
    BuyAndHold, CalendarError, CatalystCalendar, MovingAverageCross, Strategy,
};

use crate::data_loader::{CsvLayout, LoadOptions};
use crate::metrics::DEFAULT_PERIODS_PER_YEAR;

/// Unique identifier for a run (content-addressable hash).
pub type RunId = String;

/// Errors from loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("symbol list is empty")]
    EmptyUniverse,

    #[error("symbol '{0}' listed more than once")]
    DuplicateSymbol(String),

    #[error("initial_capital must be > 0, got {0}")]
    InvalidCapital(f64),

    #[error("position_sizing_fraction must be in (0, 1], got {0}")]
    InvalidSizingFraction(f64),

    #[error("sharpe_periods_per_year must be > 0, got {0}")]
    InvalidPeriods(u32),

    #[error("moving-average windows must satisfy 0 < short < long, got short={short} long={long}")]
    InvalidWindows { short: usize, long: usize },

    #[error("catalyst calendar: {0}")]
    Calendar(#[from] CalendarError),
}

/// Everything needed to reproduce one backtest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunConfig {
    /// Symbols to load and track.
    pub symbols: Vec<String>,

    /// Directory holding `<SYMBOL>.csv` files.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Column layout shared by every price file.
    #[serde(default)]
    pub csv_layout: CsvLayout,

    #[serde(default = "default_initial_capital")]
    pub initial_capital: f64,

    /// Pause between heartbeats in milliseconds. Pacing only.
    #[serde(default)]
    pub heartbeat_ms: u64,

    /// Timestamp of the seed holdings snapshot.
    pub start_timestamp: NaiveDateTime,

    #[serde(default = "default_sizing_fraction")]
    pub position_sizing_fraction: f64,

    #[serde(default = "default_periods")]
    pub sharpe_periods_per_year: u32,

    #[serde(default)]
    pub commission: CommissionConfig,

    pub strategy: StrategyConfig,

    #[serde(default)]
    pub execution: ExecutionConfig,

    /// Where artifacts are written.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Generate deterministic synthetic bars for symbols with no CSV file.
    #[serde(default)]
    pub synthetic: bool,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_initial_capital() -> f64 {
    100_000.0
}

fn default_sizing_fraction() -> f64 {
    DEFAULT_SIZING_FRACTION
}

fn default_periods() -> u32 {
    DEFAULT_PERIODS_PER_YEAR
}

/// Strategy selection (serializable enum).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StrategyConfig {
    /// Long every symbol on its first bar and hold.
    BuyAndHold,

    /// Short SMA crosses long SMA on adjusted closes.
    MaCross { short: usize, long: usize },

    /// Enter the bar after each catalyst date, exit after `hold_months`.
    CatalystCalendar {
        calendar: PathBuf,
        #[serde(default = "default_hold_months")]
        hold_months: u32,
    },
}

fn default_hold_months() -> u32 {
    eventlab_core::strategy::catalyst::DEFAULT_HOLD_MONTHS
}

/// Commission schedule (serializable enum).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommissionConfig {
    TieredPerShare(TieredPerShare),
    Zero,
}

impl Default for CommissionConfig {
    fn default() -> Self {
        Self::TieredPerShare(TieredPerShare::default())
    }
}

/// Execution venue settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExecutionConfig {
    #[serde(default = "default_venue")]
    pub venue: String,

    #[serde(default = "default_retries")]
    pub max_venue_retries: u32,
}

fn default_venue() -> String {
    DEFAULT_VENUE.to_string()
}

fn default_retries() -> u32 {
    DEFAULT_MAX_VENUE_RETRIES
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            venue: default_venue(),
            max_venue_retries: default_retries(),
        }
    }
}

impl RunConfig {
    /// Read and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Parse and validate TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.symbols.is_empty() {
            return Err(ConfigError::EmptyUniverse);
        }
        let mut seen = std::collections::HashSet::new();
        for symbol in &self.symbols {
            if !seen.insert(symbol.as_str()) {
                return Err(ConfigError::DuplicateSymbol(symbol.clone()));
            }
        }
        if !(self.initial_capital.is_finite() && self.initial_capital > 0.0) {
            return Err(ConfigError::InvalidCapital(self.initial_capital));
        }
        validate_fraction(self.position_sizing_fraction)?;
        if self.sharpe_periods_per_year == 0 {
            return Err(ConfigError::InvalidPeriods(self.sharpe_periods_per_year));
        }
        if let StrategyConfig::MaCross { short, long } = self.strategy {
            if short == 0 || short >= long {
                return Err(ConfigError::InvalidWindows { short, long });
            }
        }
        Ok(())
    }

    /// Deterministic hash ID of this configuration.
    ///
    /// Two runs with identical configs share a RunId.
    pub fn run_id(&self) -> Result<RunId, ConfigError> {
        let json = serde_json::to_string(self)?;
        Ok(blake3::hash(json.as_bytes()).to_hex().to_string())
    }

    /// Loader options for this run's price files.
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions::from_start(self.start_timestamp, self.synthetic).with_layout(self.csv_layout)
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            heartbeat: std::time::Duration::from_millis(self.heartbeat_ms),
            max_venue_retries: self.execution.max_venue_retries,
        }
    }

    pub fn build_commission(&self) -> Box<dyn CommissionModel> {
        match &self.commission {
            CommissionConfig::TieredPerShare(tiers) => Box::new(*tiers),
            CommissionConfig::Zero => Box::new(ZeroCommission),
        }
    }

    pub fn build_execution(&self) -> SimulatedExecution {
        SimulatedExecution::new(self.execution.venue.clone(), self.build_commission())
    }

    /// Instantiate the configured strategy. Catalyst calendars are read here.
    pub fn build_strategy(&self) -> Result<Box<dyn Strategy>, ConfigError> {
        Ok(match &self.strategy {
            StrategyConfig::BuyAndHold => Box::new(BuyAndHold::new(1)),
            StrategyConfig::MaCross { short, long } => {
                if *short == 0 || short >= long {
                    return Err(ConfigError::InvalidWindows {
                        short: *short,
                        long: *long,
                    });
                }
                Box::new(MovingAverageCross::new(1, *short, *long))
            }
            StrategyConfig::CatalystCalendar {
                calendar,
                hold_months,
            } => Box::new(CatalystCalendar::from_path(calendar, 1, *hold_months)?),
        })
    }
}

pub(crate) fn validate_fraction(fraction: f64) -> Result<(), ConfigError> {
    if fraction.is_finite() && fraction > 0.0 && fraction <= 1.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidSizingFraction(fraction))
    }
}
