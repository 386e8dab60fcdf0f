//! Backtest runner: wires together configuration, data, engine, and metrics.
//!
//! Two entry points:
//! - `run_single_backtest()`: loads data from disk, then runs. Used by the CLI.
//! - `run_backtest_from_data()`: takes pre-loaded data. Used by sweeps so the
//!   CSV files are read once.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use eventlab_core::data::HistoricalSource;
use eventlab_core::domain::Symbol;
use eventlab_core::engine::{Backtest, EngineError, RunCounters};
use eventlab_core::ledger::{EquityCurve, FixedFraction, Ledger};
use eventlab_core::BarCursor;

use crate::config::{validate_fraction, ConfigError, RunConfig};
use crate::data_loader::{load_bars, LoadError, LoadedData};
use crate::metrics::{drawdown_series, PerformanceSummary};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete result of a single backtest run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestResult {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub run_id: String,
    pub strategy: String,
    pub symbols: Vec<Symbol>,
    pub initial_capital: f64,
    pub position_sizing_fraction: f64,
    pub summary: PerformanceSummary,
    pub counters: RunCounters,
    pub equity_curve: EquityCurve,
    /// Drawdown fraction per equity-curve row.
    pub drawdown: Vec<f64>,
    pub final_positions: BTreeMap<Symbol, i64>,
    pub dataset_hash: String,
    pub has_synthetic: bool,
}

/// Default schema version for serde deserialization of older JSON without the field.
fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Validate the config, load its data, and run one backtest.
pub fn run_single_backtest(config: &RunConfig) -> Result<BacktestResult, RunError> {
    config.validate()?;
    let opts = config.load_options();
    let loaded = load_bars(&config.symbols, &config.data_dir, &opts)?;
    run_backtest_from_data(config, &loaded)
}

/// Run a backtest with pre-loaded data: no file I/O beyond the strategy's own inputs.
///
/// The engine itself is single-threaded; callers may run several of these
/// in parallel on clones of the same data.
pub fn run_backtest_from_data(
    config: &RunConfig,
    loaded: &LoadedData,
) -> Result<BacktestResult, RunError> {
    validate_fraction(config.position_sizing_fraction)?;
    let run_id = config.run_id()?;
    let strategy = config.build_strategy()?;
    let strategy_name = strategy.name().to_string();
    let symbols = loaded.aligned.symbols.clone();

    let ledger = Ledger::with_sizer(
        &symbols,
        config.start_timestamp,
        config.initial_capital,
        Box::new(FixedFraction::new(config.position_sizing_fraction)),
    );
    let cursor = BarCursor::new(Box::new(HistoricalSource::new(loaded.aligned.clone())));

    let mut backtest = Backtest::new(
        cursor,
        strategy,
        ledger,
        Box::new(config.build_execution()),
        config.engine_config(),
    );
    let counters = backtest.run()?;
    let ledger = backtest.into_ledger();

    let equity_curve = ledger.equity_curve();
    let summary = PerformanceSummary::compute(&equity_curve, config.sharpe_periods_per_year);
    let drawdown = drawdown_series(&equity_curve.equity()).series;

    info!(
        run_id = %run_id,
        total_return_pct = summary.total_return_pct,
        sharpe = summary.sharpe_ratio,
        max_drawdown_pct = summary.max_drawdown_pct,
        "backtest summarised"
    );

    Ok(BacktestResult {
        schema_version: SCHEMA_VERSION,
        run_id,
        strategy: strategy_name,
        symbols,
        initial_capital: config.initial_capital,
        position_sizing_fraction: config.position_sizing_fraction,
        summary,
        counters,
        equity_curve,
        drawdown,
        final_positions: ledger.positions().clone(),
        dataset_hash: loaded.dataset_hash.clone(),
        has_synthetic: loaded.has_synthetic,
    })
}
