//! Run manifest export (JSON).
//!
//! The manifest is the full `BacktestResult`. Unknown schema versions are
//! rejected on load.

use anyhow::{bail, Context, Result};
use std::path::Path;

use crate::runner::{BacktestResult, SCHEMA_VERSION};

pub fn write_manifest(path: &Path, result: &BacktestResult) -> Result<()> {
    let json =
        serde_json::to_string_pretty(result).context("Failed to serialize run manifest")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write manifest to {}", path.display()))?;
    Ok(())
}

pub fn read_manifest(path: &Path) -> Result<BacktestResult> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest {}", path.display()))?;
    let result: BacktestResult =
        serde_json::from_str(&json).context("Failed to deserialize run manifest")?;
    if result.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            result.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(result)
}
