use std::path::Path;

use eventlab_runner::reporting::{read_manifest, ArtifactManager, SummaryRecord};
use eventlab_runner::{export_run_with_report, render_summary, run_single_backtest, RunConfig};

fn synthetic_config(dir: &Path) -> RunConfig {
    RunConfig::from_toml_str(&format!(
        r#"
        symbols = ["SPY", "QQQ"]
        data_dir = "{0}/data"
        output_dir = "{0}/out"
        start_timestamp = "2021-12-31T00:00:00"
        synthetic = true

        [strategy]
        type = "MA_CROSS"
        short = 10
        long = 30
        "#,
        dir.display()
    ))
    .unwrap()
}

#[test]
fn artifact_manager_writes_every_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let config = synthetic_config(dir.path());
    let result = run_single_backtest(&config).unwrap();

    let manager = ArtifactManager::new(&config.output_dir).unwrap();
    let paths = manager.save_run(&result).unwrap();

    assert!(paths.run_dir.ends_with(&result.run_id));
    assert!(paths.manifest.exists());
    assert!(paths.summary_json.exists());
    assert!(paths.equity_csv.exists());
    assert!(paths.equity_parquet.exists());
    assert!(paths.report_markdown.is_none());
}

#[test]
fn equity_csv_has_one_row_per_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let config = synthetic_config(dir.path());
    let result = run_single_backtest(&config).unwrap();
    let paths = ArtifactManager::new(&config.output_dir)
        .unwrap()
        .save_run(&result)
        .unwrap();

    let mut reader = csv::Reader::from_path(&paths.equity_csv).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(
        headers.iter().collect::<Vec<_>>(),
        vec![
            "timestamp",
            "QQQ",
            "SPY",
            "cash",
            "commission",
            "total",
            "returns",
            "equity_curve",
            "drawdown"
        ]
    );
    let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
    assert_eq!(rows.len(), result.equity_curve.len());
    assert_eq!(&rows[0][6], "0");
    assert_eq!(&rows[0][7], "1");
}

#[test]
fn summary_json_carries_summary_and_counters() {
    let dir = tempfile::tempdir().unwrap();
    let config = synthetic_config(dir.path());
    let result = run_single_backtest(&config).unwrap();
    let paths = ArtifactManager::new(&config.output_dir)
        .unwrap()
        .save_run(&result)
        .unwrap();

    let text = std::fs::read_to_string(&paths.summary_json).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    for key in [
        "total_return_pct",
        "sharpe_ratio",
        "max_drawdown_pct",
        "max_drawdown_duration",
        "counters",
    ] {
        assert!(value.get(key).is_some(), "summary.json missing {key}");
    }
    let record: SummaryRecord = serde_json::from_str(&text).unwrap();
    assert_eq!(record, SummaryRecord::from_result(&result));
}

#[test]
fn manifest_round_trips_and_rejects_future_versions() {
    let dir = tempfile::tempdir().unwrap();
    let config = synthetic_config(dir.path());
    let result = run_single_backtest(&config).unwrap();
    let paths = ArtifactManager::new(&config.output_dir)
        .unwrap()
        .save_run(&result)
        .unwrap();

    let loaded = read_manifest(&paths.manifest).unwrap();
    assert_eq!(loaded.run_id, result.run_id);
    assert_eq!(loaded.counters, result.counters);
    assert_eq!(loaded.equity_curve.len(), result.equity_curve.len());

    let mut value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&paths.manifest).unwrap()).unwrap();
    value["schema_version"] = serde_json::json!(99);
    std::fs::write(&paths.manifest, value.to_string()).unwrap();
    assert!(read_manifest(&paths.manifest).is_err());
}

#[test]
fn report_is_written_on_request() {
    let dir = tempfile::tempdir().unwrap();
    let config = synthetic_config(dir.path());
    let result = run_single_backtest(&config).unwrap();

    let paths = export_run_with_report(&config.output_dir, &result, true).unwrap();
    let report_path = paths.report_markdown.unwrap();
    let report = std::fs::read_to_string(report_path).unwrap();
    assert_eq!(report, render_summary(&result));
    assert!(report.contains("Sharpe Ratio"));
    assert!(report.contains("Synthetic data"));
    assert!(report.contains(&result.run_id));
}
