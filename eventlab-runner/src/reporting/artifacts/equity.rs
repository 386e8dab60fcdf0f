//! Equity curve export (CSV/Parquet).
//!
//! One row per holdings snapshot, keyed by timestamp:
//! `timestamp, <symbol value>…, cash, commission, total, returns, equity_curve, drawdown`.

use anyhow::{ensure, Context, Result};
use polars::prelude::{Column, DataFrame, NamedFrom, ParquetWriter, Series};
use std::fs::File;
use std::path::Path;

use eventlab_core::ledger::EquityCurve;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn header(curve: &EquityCurve) -> Vec<String> {
    let mut columns = vec!["timestamp".to_string()];
    columns.extend(curve.symbols.iter().cloned());
    columns.extend(
        ["cash", "commission", "total", "returns", "equity_curve", "drawdown"]
            .iter()
            .map(|c| c.to_string()),
    );
    columns
}

pub fn write_equity_csv(path: &Path, curve: &EquityCurve, drawdown: &[f64]) -> Result<()> {
    ensure!(
        drawdown.len() == curve.len(),
        "drawdown has {} rows, equity curve has {}",
        drawdown.len(),
        curve.len()
    );
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create equity CSV {}", path.display()))?;
    writer.write_record(header(curve))?;

    for (row, dd) in curve.rows.iter().zip(drawdown) {
        let mut record = vec![row.timestamp.format(TIMESTAMP_FORMAT).to_string()];
        for symbol in &curve.symbols {
            let value = row.values.get(symbol).copied().unwrap_or(0.0);
            record.push(value.to_string());
        }
        for value in [
            row.cash,
            row.commission,
            row.total,
            row.returns,
            row.equity_curve,
            *dd,
        ] {
            record.push(value.to_string());
        }
        writer.write_record(&record)?;
    }
    writer.flush().context("Failed to flush equity CSV")?;
    Ok(())
}

pub fn write_equity_parquet(path: &Path, curve: &EquityCurve, drawdown: &[f64]) -> Result<()> {
    ensure!(
        drawdown.len() == curve.len(),
        "drawdown has {} rows, equity curve has {}",
        drawdown.len(),
        curve.len()
    );
    let timestamps: Vec<String> = curve
        .rows
        .iter()
        .map(|r| r.timestamp.format(TIMESTAMP_FORMAT).to_string())
        .collect();

    let mut columns = vec![Column::Series(Series::new("timestamp".into(), timestamps).into())];
    for symbol in &curve.symbols {
        let values: Vec<f64> = curve
            .rows
            .iter()
            .map(|r| r.values.get(symbol).copied().unwrap_or(0.0))
            .collect();
        columns.push(Column::Series(Series::new(symbol.as_str().into(), values).into()));
    }
    let numeric: [(&str, Vec<f64>); 5] = [
        ("cash", curve.rows.iter().map(|r| r.cash).collect()),
        ("commission", curve.rows.iter().map(|r| r.commission).collect()),
        ("total", curve.totals()),
        ("returns", curve.rows.iter().map(|r| r.returns).collect()),
        ("equity_curve", curve.equity()),
    ];
    for (name, values) in numeric {
        columns.push(Column::Series(Series::new(name.into(), values).into()));
    }
    columns.push(Column::Series(Series::new(
        "drawdown".into(),
        drawdown.to_vec(),
    ).into()));

    let mut df = DataFrame::new(columns).context("Failed to build equity dataframe")?;

    let mut file = File::create(path)
        .with_context(|| format!("Failed to create equity parquet {}", path.display()))?;
    ParquetWriter::new(&mut file)
        .finish(&mut df)
        .context("Failed to write equity parquet")?;
    Ok(())
}
