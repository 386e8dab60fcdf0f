//! EventLab Runner: configuration, data loading, metrics, and artifacts.
//!
//! This crate builds on `eventlab-core` to provide:
//! - TOML run configuration with validation and content-hashed run IDs
//! - CSV bar loading with a synthetic fallback
//! - Performance summary over the ledger's equity curve
//! - Single-run orchestration and a parallel sizing sweep
//! - CSV / Parquet / JSON artifact export

pub mod config;
pub mod data_loader;
pub mod metrics;
pub mod reporting;
pub mod runner;
pub mod sweep;

pub use config::{CommissionConfig, ConfigError, ExecutionConfig, RunConfig, StrategyConfig};
pub use data_loader::{load_bars, CsvLayout, DataOrigin, LoadError, LoadOptions, LoadedData};
pub use metrics::PerformanceSummary;
pub use reporting::{export_run_with_report, render_summary, ArtifactManager, ArtifactPaths};
pub use runner::{run_backtest_from_data, run_single_backtest, BacktestResult, RunError};
pub use sweep::{rank_by_sharpe, run_sweep, SweepPoint};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn backtest_result_is_send_sync() {
        assert_send::<BacktestResult>();
        assert_sync::<BacktestResult>();
    }

    #[test]
    fn config_types_are_send_sync() {
        assert_send::<RunConfig>();
        assert_sync::<RunConfig>();
        assert_send::<LoadOptions>();
        assert_sync::<LoadOptions>();
    }

    #[test]
    fn loaded_data_is_shareable_across_sweep_workers() {
        assert_send::<LoadedData>();
        assert_sync::<LoadedData>();
    }

    #[test]
    fn run_error_is_send() {
        assert_send::<RunError>();
    }
}
