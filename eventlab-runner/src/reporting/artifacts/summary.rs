//! Summary record export (JSON).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use eventlab_core::engine::RunCounters;

use crate::metrics::PerformanceSummary;
use crate::runner::BacktestResult;

/// What `summary.json` holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub run_id: String,
    pub strategy: String,
    pub has_synthetic: bool,
    #[serde(flatten)]
    pub summary: PerformanceSummary,
    pub counters: RunCounters,
}

impl SummaryRecord {
    pub fn from_result(result: &BacktestResult) -> Self {
        Self {
            run_id: result.run_id.clone(),
            strategy: result.strategy.clone(),
            has_synthetic: result.has_synthetic,
            summary: result.summary,
            counters: result.counters,
        }
    }
}

pub fn write_summary_json(path: &Path, result: &BacktestResult) -> Result<()> {
    let record = SummaryRecord::from_result(result);
    let json = serde_json::to_string_pretty(&record).context("Failed to serialize summary")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write summary {}", path.display()))?;
    Ok(())
}
