//! Performance summary: pure functions over the equity curve.
//!
//! Every statistic is a pure function: returns or equity index in, scalar out.
//! Computing the summary twice over the same curve gives bit-identical values.

use serde::{Deserialize, Serialize};

use eventlab_core::ledger::EquityCurve;

/// Default annualisation factor for daily bars.
pub const DEFAULT_PERIODS_PER_YEAR: u32 = 252;

/// Summary statistics for a single backtest run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    /// `(final equity index - 1) × 100`.
    pub total_return_pct: f64,
    pub sharpe_ratio: f64,
    /// Largest peak-to-trough decline of the equity index, in percent.
    pub max_drawdown_pct: f64,
    /// Longest run of consecutive periods spent below the running peak.
    pub max_drawdown_duration: usize,
}

impl PerformanceSummary {
    pub fn compute(curve: &EquityCurve, periods_per_year: u32) -> Self {
        let equity = curve.equity();
        let drawdown = drawdown_series(&equity);
        Self {
            total_return_pct: total_return_pct(&equity),
            sharpe_ratio: sharpe_ratio(&curve.returns(), f64::from(periods_per_year)),
            max_drawdown_pct: drawdown.max_drawdown * 100.0,
            max_drawdown_duration: drawdown.max_duration,
        }
    }
}

// ─── Individual statistics ──────────────────────────────────────────

/// Total return in percent from a cumulative equity index seeded at 1.0.
pub fn total_return_pct(equity: &[f64]) -> f64 {
    match equity.last() {
        Some(last) => (last - 1.0) * 100.0,
        None => 0.0,
    }
}

/// Annualised Sharpe ratio of period returns, zero risk-free rate.
///
/// `mean / sample stdev × √periods`. Returns 0.0 with fewer than two returns
/// or a zero standard deviation.
pub fn sharpe_ratio(returns: &[f64], periods_per_year: f64) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }
    let std = std_dev(returns);
    if std < 1e-15 || !std.is_finite() {
        return 0.0;
    }
    mean_f64(returns) / std * periods_per_year.sqrt()
}

/// Per-row drawdown and its extremes.
#[derive(Debug, Clone, PartialEq)]
pub struct Drawdown {
    /// `(peak - value) / peak` per row, as a fraction.
    pub series: Vec<f64>,
    pub max_drawdown: f64,
    pub max_duration: usize,
}

/// Drawdown from the running high-water mark.
///
/// Duration counts consecutive rows below the peak and resets to 0 on a new
/// peak (or a return to it).
pub fn drawdown_series(equity: &[f64]) -> Drawdown {
    let mut series = Vec::with_capacity(equity.len());
    let mut peak = f64::NEG_INFINITY;
    let mut max_drawdown = 0.0_f64;
    let mut duration = 0usize;
    let mut max_duration = 0usize;

    for &value in equity {
        peak = peak.max(value);
        let dd = if peak > 0.0 { (peak - value) / peak } else { 0.0 };
        if dd > 0.0 {
            duration += 1;
        } else {
            duration = 0;
        }
        max_drawdown = max_drawdown.max(dd);
        max_duration = max_duration.max(duration);
        series.push(dd);
    }

    Drawdown {
        series,
        max_drawdown,
        max_duration,
    }
}

// ─── Helpers ────────────────────────────────────────────────────────

pub(crate) fn mean_f64(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub(crate) fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = mean_f64(values);
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}
