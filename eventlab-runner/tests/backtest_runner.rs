//! End-to-end runs from TOML config and CSV files on disk.

use std::path::Path;

use eventlab_runner::{run_single_backtest, RunConfig, RunError};

fn write(dir: &Path, name: &str, body: &str) {
    std::fs::write(dir.join(name), body).unwrap();
}

fn daily_csv(start_day: u32, closes: &[f64]) -> String {
    let mut body = String::from("timestamp,open,high,low,close,adj_close,volume\n");
    for (i, close) in closes.iter().enumerate() {
        let day = chrono::NaiveDate::from_ymd_opt(2024, 1, start_day).unwrap()
            + chrono::Duration::days(i as i64);
        body.push_str(&format!(
            "{day},{close},{close},{close},{close},{close},1000\n"
        ));
    }
    body
}

fn config(data_dir: &Path, strategy: &str, extra: &str) -> RunConfig {
    let text = format!(
        r#"
        symbols = ["AAA", "BBB"]
        data_dir = "{}"
        start_timestamp = "2024-01-01T00:00:00"
        {extra}

        [strategy]
        {strategy}
        "#,
        data_dir.display()
    );
    RunConfig::from_toml_str(&text).unwrap()
}

#[test]
fn two_symbol_buy_and_hold_from_csv() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "AAA.csv", &daily_csv(2, &[50.0, 55.0, 60.0]));
    write(dir.path(), "BBB.csv", &daily_csv(2, &[100.0, 90.0, 100.0]));

    let result = run_single_backtest(&config(dir.path(), "type = \"BUY_AND_HOLD\"", "")).unwrap();

    assert_eq!(result.counters.heartbeats, 3);
    assert_eq!(result.counters.signals, 2);
    assert_eq!(result.counters.orders, 2);
    assert_eq!(result.counters.fills, 2);
    assert_eq!(result.final_positions["AAA"], 100);
    assert_eq!(result.final_positions["BBB"], 50);

    // seed + one row per heartbeat
    let totals = result.equity_curve.totals();
    assert_eq!(totals.len(), 4);
    assert_eq!(totals[0], 100_000.0);
    assert_eq!(totals[1], 100_000.0);
    assert!((totals[2] - 99_997.4).abs() < 1e-6);
    assert!((totals[3] - 100_997.4).abs() < 1e-6);
    let last = result.equity_curve.rows.last().unwrap();
    assert!((last.cash - 89_997.4).abs() < 1e-6);
    assert!((last.commission - 2.6).abs() < 1e-9);

    assert!((result.summary.total_return_pct - 0.9974).abs() < 1e-6);
    assert_eq!(result.summary.max_drawdown_duration, 1);
    assert_eq!(result.drawdown.len(), 4);
    assert!(!result.has_synthetic);
}

#[test]
fn late_symbol_is_valued_only_once_it_has_bars() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "AAA.csv", &daily_csv(2, &[50.0, 50.0, 50.0, 50.0]));
    write(dir.path(), "BBB.csv", &daily_csv(4, &[20.0, 25.0]));

    let result = run_single_backtest(&config(dir.path(), "type = \"BUY_AND_HOLD\"", "")).unwrap();
    assert_eq!(result.counters.heartbeats, 4);
    assert_eq!(result.final_positions["BBB"], 250);
    let last = result.equity_curve.rows.last().unwrap();
    assert!((last.values["BBB"] - 250.0 * 25.0).abs() < 1e-9);
}

#[test]
fn moving_average_run_on_synthetic_data_is_reproducible() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(
        dir.path(),
        "type = \"MA_CROSS\"\nshort = 5\nlong = 20",
        "synthetic = true",
    );
    let a = run_single_backtest(&cfg).unwrap();
    let b = run_single_backtest(&cfg).unwrap();

    assert!(a.has_synthetic);
    assert_eq!(a.run_id, b.run_id);
    assert_eq!(a.dataset_hash, b.dataset_hash);
    assert_eq!(a.equity_curve, b.equity_curve);
    assert_eq!(a.counters, b.counters);
    assert_eq!(a.counters.orders, a.counters.fills);
    assert_eq!(
        a.summary.sharpe_ratio.to_bits(),
        b.summary.sharpe_ratio.to_bits()
    );
}

#[test]
fn catalyst_calendar_enters_after_catalyst_and_exits_after_hold() {
    let dir = tempfile::tempdir().unwrap();
    let closes = vec![40.0; 60];
    write(dir.path(), "AAA.csv", &daily_csv(2, &closes));
    write(dir.path(), "BBB.csv", &daily_csv(2, &closes));
    let calendar = dir.path().join("calendar.csv");
    std::fs::write(
        &calendar,
        "ticker,catalyst_date,direction\nAAA,2024-01-03,LONG\nBBB,2024-01-05,SIDEWAYS\n",
    )
    .unwrap();

    let cfg = config(
        dir.path(),
        &format!(
            "type = \"CATALYST_CALENDAR\"\ncalendar = \"{}\"\nhold_months = 1",
            calendar.display()
        ),
        "",
    );
    let result = run_single_backtest(&cfg).unwrap();

    // AAA: entry on 01-04, exit on 02-04. BBB's row is dropped.
    assert_eq!(result.counters.signals, 2);
    assert_eq!(result.counters.orders, 2);
    assert_eq!(result.final_positions["AAA"], 0);
    assert_eq!(result.final_positions["BBB"], 0);
    let held: Vec<_> = result
        .equity_curve
        .rows
        .iter()
        .filter(|r| r.values["AAA"] != 0.0)
        .map(|r| r.timestamp.date().to_string())
        .collect();
    assert_eq!(held.first().map(String::as_str), Some("2024-01-05"));
    assert_eq!(held.last().map(String::as_str), Some("2024-02-04"));
}

#[test]
fn catalyst_run_on_adjusted_close_files() {
    let dir = tempfile::tempdir().unwrap();
    let mut body = String::from("Date,Adj_Close\n");
    for i in 0..40 {
        let day = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap() + chrono::Duration::days(i);
        body.push_str(&format!("{day},{}\n", 40.0 + i as f64));
    }
    write(dir.path(), "AAA.csv", &body);
    write(dir.path(), "BBB.csv", &body);
    let calendar = dir.path().join("calendar.csv");
    std::fs::write(&calendar, "ticker,catalyst_date,direction\nAAA,2024-01-03,LONG\n").unwrap();

    let cfg = config(
        dir.path(),
        &format!(
            "type = \"CATALYST_CALENDAR\"\ncalendar = \"{}\"\nhold_months = 1",
            calendar.display()
        ),
        "csv_layout = \"ADJ_CLOSE_ONLY\"",
    );
    let result = run_single_backtest(&cfg).unwrap();

    assert_eq!(result.counters.heartbeats, 40);
    assert_eq!(result.counters.fills, 2);
    assert_eq!(result.final_positions["AAA"], 0);
    assert!(result.equity_curve.totals().iter().all(|t| t.is_finite()));
}

#[test]
fn non_finite_price_in_csv_is_a_data_error() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "AAA.csv", &daily_csv(2, &[50.0, 50.0, f64::NAN, 50.0]));
    write(dir.path(), "BBB.csv", &daily_csv(2, &[50.0, 50.0, 50.0, 50.0]));
    let err = run_single_backtest(&config(dir.path(), "type = \"BUY_AND_HOLD\"", "")).unwrap_err();
    assert!(matches!(err, RunError::Data(_)), "{err}");
    assert!(err.to_string().contains("row 3"), "{err}");
}

#[test]
fn missing_data_without_synthetic_is_a_data_error() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "AAA.csv", &daily_csv(2, &[50.0]));
    let err = run_single_backtest(&config(dir.path(), "type = \"BUY_AND_HOLD\"", "")).unwrap_err();
    assert!(matches!(err, RunError::Data(_)), "{err}");
}

#[test]
fn missing_calendar_is_a_config_error() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "AAA.csv", &daily_csv(2, &[50.0]));
    write(dir.path(), "BBB.csv", &daily_csv(2, &[50.0]));
    let cfg = config(
        dir.path(),
        "type = \"CATALYST_CALENDAR\"\ncalendar = \"/nonexistent/cal.csv\"",
        "",
    );
    let err = run_single_backtest(&cfg).unwrap_err();
    assert!(matches!(err, RunError::Config(_)), "{err}");
}
