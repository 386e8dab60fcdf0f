//! Artifact manager for persisting run outputs.

mod equity;
mod manifest;
mod summary;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::runner::BacktestResult;

pub use equity::{write_equity_csv, write_equity_parquet};
pub use manifest::read_manifest;
pub use summary::SummaryRecord;

/// Artifact paths returned after export.
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub run_dir: PathBuf,
    pub manifest: PathBuf,
    pub summary_json: PathBuf,
    pub equity_csv: PathBuf,
    pub equity_parquet: PathBuf,
    pub report_markdown: Option<PathBuf>,
}

/// Manages writing all artifacts for a run.
#[derive(Debug, Clone)]
pub struct ArtifactManager {
    output_dir: PathBuf,
}

impl ArtifactManager {
    pub fn new(output_dir: impl AsRef<Path>) -> Result<Self> {
        let output_dir = output_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&output_dir)
            .context("Failed to create artifact output directory")?;
        Ok(Self { output_dir })
    }

    /// Save complete run artifacts under `<output_dir>/<run_id>/`.
    pub fn save_run(&self, result: &BacktestResult) -> Result<ArtifactPaths> {
        let run_dir = self.output_dir.join(&result.run_id);
        std::fs::create_dir_all(&run_dir).context("Failed to create run artifact directory")?;

        let manifest_path = run_dir.join("manifest.json");
        manifest::write_manifest(&manifest_path, result)?;

        let summary_json = run_dir.join("summary.json");
        summary::write_summary_json(&summary_json, result)?;

        let equity_csv = run_dir.join("equity.csv");
        let equity_parquet = run_dir.join("equity.parquet");
        equity::write_equity_csv(&equity_csv, &result.equity_curve, &result.drawdown)?;
        equity::write_equity_parquet(&equity_parquet, &result.equity_curve, &result.drawdown)?;

        Ok(ArtifactPaths {
            run_dir,
            manifest: manifest_path,
            summary_json,
            equity_csv,
            equity_parquet,
            report_markdown: None,
        })
    }
}
