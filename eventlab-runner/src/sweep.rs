//! Parallel sizing sweep.
//!
//! Each backtest stays single-threaded and strictly ordered; rayon only runs
//! independent backtests side by side over shared, pre-loaded data.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::RunConfig;
use crate::data_loader::LoadedData;
use crate::metrics::PerformanceSummary;
use crate::runner::{run_backtest_from_data, BacktestResult, RunError};

/// One sweep point: the fraction tried and its summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepPoint {
    pub position_sizing_fraction: f64,
    pub run_id: String,
    pub summary: PerformanceSummary,
}

impl From<&BacktestResult> for SweepPoint {
    fn from(result: &BacktestResult) -> Self {
        Self {
            position_sizing_fraction: result.position_sizing_fraction,
            run_id: result.run_id.clone(),
            summary: result.summary,
        }
    }
}

/// Run one backtest per sizing fraction in parallel.
///
/// Results come back in the order of `fractions`. The first failing run
/// aborts the sweep.
pub fn run_sweep(
    base: &RunConfig,
    data: &LoadedData,
    fractions: &[f64],
) -> Result<Vec<BacktestResult>, RunError> {
    fractions
        .par_iter()
        .map(|&fraction| {
            let mut config = base.clone();
            config.position_sizing_fraction = fraction;
            run_backtest_from_data(&config, data)
        })
        .collect()
}

/// Sort sweep points by Sharpe ratio, best first.
pub fn rank_by_sharpe(results: &[BacktestResult]) -> Vec<SweepPoint> {
    let mut points: Vec<SweepPoint> = results.iter().map(SweepPoint::from).collect();
    points.sort_by(|a, b| b.summary.sharpe_ratio.total_cmp(&a.summary.sharpe_ratio));
    points
}
