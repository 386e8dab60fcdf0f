//! Human-readable run summary.

use std::fmt::Write;

use crate::runner::BacktestResult;

/// Render the summary and counters as Markdown.
///
/// The same text is printed by the CLI and saved as `report.md`.
pub fn render_summary(result: &BacktestResult) -> String {
    let s = &result.summary;
    let c = &result.counters;
    let mut out = String::new();

    // Writing to a String cannot fail.
    let _ = writeln!(out, "# EventLab Run Report\n");
    let _ = writeln!(out, "Run ID: `{}`", result.run_id);
    let _ = writeln!(out, "Strategy: {}", result.strategy);
    let _ = writeln!(out, "Symbols: {}", result.symbols.join(", "));
    if result.has_synthetic {
        let _ = writeln!(out, "\n**Synthetic data was used for at least one symbol.**");
    }

    let _ = writeln!(out, "\n## Summary");
    let _ = writeln!(out, "- Total Return: {:+.2}%", s.total_return_pct);
    let _ = writeln!(out, "- Sharpe Ratio: {:.2}", s.sharpe_ratio);
    let _ = writeln!(out, "- Max Drawdown: {:.2}%", s.max_drawdown_pct);
    let _ = writeln!(out, "- Drawdown Duration: {}", s.max_drawdown_duration);
    if let Some(final_equity) = result.equity_curve.rows.last().map(|r| r.total) {
        let _ = writeln!(
            out,
            "- Final Total: {:.2} (from {:.2})",
            final_equity, result.initial_capital
        );
    }

    let _ = writeln!(out, "\n## Counters");
    let _ = writeln!(out, "- Heartbeats: {}", c.heartbeats);
    let _ = writeln!(out, "- Signals: {}", c.signals);
    let _ = writeln!(out, "- Orders: {}", c.orders);
    let _ = writeln!(out, "- Fills: {}", c.fills);
    let _ = writeln!(out, "- Malformed (dropped): {}", c.malformed);
    let _ = writeln!(out, "- Venue retries: {}", c.venue_retries);

    let open: Vec<String> = result
        .final_positions
        .iter()
        .filter(|(_, q)| **q != 0)
        .map(|(symbol, q)| format!("{symbol} {q:+}"))
        .collect();
    if !open.is_empty() {
        let _ = writeln!(out, "\n## Open Positions\n{}", open.join("\n"));
    }
    out
}
