//! Catalyst calendar: trade around dated events listed in a CSV file.
//!
//! Calendar columns: `ticker,catalyst_date[,direction]`. When a symbol's bar
//! lands on a catalyst date the strategy enters on the following bar, holds
//! for `hold_months`, then exits on the first bar at or past that horizon.
//! `direction` defaults to LONG.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use chrono::{Months, NaiveDate};
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use super::Strategy;
use crate::cursor::{BarCursor, CursorError};
use crate::domain::{SignalDirection, SignalEvent, Symbol, Timestamp};
use crate::engine::SignalSink;

/// Default holding period after entry.
pub const DEFAULT_HOLD_MONTHS: u32 = 6;

#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("calendar read error: {0}")]
    Csv(#[from] csv::Error),

    #[error("calendar row {row}: invalid date '{value}'")]
    BadDate { row: usize, value: String },
}

#[derive(Debug, Deserialize)]
struct CalendarRow {
    ticker: String,
    catalyst_date: String,
    #[serde(default)]
    direction: Option<String>,
}

/// One dated catalyst.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEntry {
    pub symbol: Symbol,
    pub date: NaiveDate,
    pub direction: SignalDirection,
}

#[derive(Debug, Clone, Copy)]
enum Stage {
    Out,
    Armed(SignalDirection),
    In { exit_at: Timestamp },
}

#[derive(Debug)]
pub struct CatalystCalendar {
    strategy_id: u32,
    hold_months: u32,
    catalysts: HashMap<Symbol, HashMap<NaiveDate, SignalDirection>>,
    stages: HashMap<Symbol, Stage>,
    seen: HashMap<Symbol, Timestamp>,
}

impl CatalystCalendar {
    pub fn new(strategy_id: u32, hold_months: u32, entries: Vec<CalendarEntry>) -> Self {
        let mut catalysts: HashMap<Symbol, HashMap<NaiveDate, SignalDirection>> = HashMap::new();
        for entry in entries {
            catalysts
                .entry(entry.symbol)
                .or_default()
                .insert(entry.date, entry.direction);
        }
        Self {
            strategy_id,
            hold_months,
            catalysts,
            stages: HashMap::new(),
            seen: HashMap::new(),
        }
    }

    pub fn from_path(
        path: impl AsRef<Path>,
        strategy_id: u32,
        hold_months: u32,
    ) -> Result<Self, CalendarError> {
        let reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_path(path)?;
        Ok(Self::new(strategy_id, hold_months, read_entries(reader)?))
    }

    pub fn from_reader<R: Read>(
        reader: R,
        strategy_id: u32,
        hold_months: u32,
    ) -> Result<Self, CalendarError> {
        let reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        Ok(Self::new(strategy_id, hold_months, read_entries(reader)?))
    }

    /// Catalyst dates known for a symbol.
    pub fn dates(&self, symbol: &str) -> Vec<NaiveDate> {
        let mut dates: Vec<NaiveDate> = self
            .catalysts
            .get(symbol)
            .map(|m| m.keys().copied().collect())
            .unwrap_or_default();
        dates.sort();
        dates
    }
}

/// Rows with an unreadable direction are dropped with a warning. Bad dates fail.
fn read_entries<R: Read>(mut reader: csv::Reader<R>) -> Result<Vec<CalendarEntry>, CalendarError> {
    let mut entries = Vec::new();
    for (i, row) in reader.deserialize::<CalendarRow>().enumerate() {
        let row = row?;
        let date = NaiveDate::parse_from_str(row.catalyst_date.trim(), "%Y-%m-%d").map_err(|_| {
            CalendarError::BadDate {
                row: i + 1,
                value: row.catalyst_date.clone(),
            }
        })?;
        let direction = match row.direction.as_deref().map(str::trim) {
            None | Some("") => SignalDirection::Long,
            Some(text) => match text.parse::<SignalDirection>() {
                Ok(SignalDirection::Exit) | Err(_) => {
                    warn!(
                        row = i + 1,
                        ticker = %row.ticker,
                        direction = text,
                        "malformed calendar direction, row dropped"
                    );
                    continue;
                }
                Ok(direction) => direction,
            },
        };
        entries.push(CalendarEntry {
            symbol: row.ticker.trim().to_string(),
            date,
            direction,
        });
    }
    Ok(entries)
}

impl Strategy for CatalystCalendar {
    fn name(&self) -> &str {
        "catalyst_calendar"
    }

    fn calculate_signals(
        &mut self,
        bars: &BarCursor,
        sink: &mut SignalSink<'_>,
    ) -> Result<(), CursorError> {
        for symbol in bars.symbols() {
            let Some(bar) = bars.latest_n(symbol, 1)?.last() else {
                continue;
            };
            let now = bar.timestamp;
            // One decision per released bar.
            if self.seen.get(symbol) == Some(&now) {
                continue;
            }
            self.seen.insert(symbol.clone(), now);

            let stage = self.stages.get(symbol).copied().unwrap_or(Stage::Out);
            let next = match stage {
                Stage::Armed(direction) => {
                    sink.push(SignalEvent::new(
                        self.strategy_id,
                        symbol.clone(),
                        now,
                        direction,
                        1.0,
                    ));
                    let exit_at = now
                        .checked_add_months(Months::new(self.hold_months))
                        .unwrap_or(Timestamp::MAX);
                    Stage::In { exit_at }
                }
                Stage::In { exit_at } if now >= exit_at => {
                    sink.push(SignalEvent::new(
                        self.strategy_id,
                        symbol.clone(),
                        now,
                        SignalDirection::Exit,
                        1.0,
                    ));
                    Stage::Out
                }
                other => other,
            };

            let next = match next {
                Stage::Out => match self.catalysts.get(symbol).and_then(|c| c.get(&now.date())) {
                    Some(&direction) => Stage::Armed(direction),
                    None => Stage::Out,
                },
                other => other,
            };
            self.stages.insert(symbol.clone(), next);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Event;
    use crate::engine::EventQueue;
    use crate::strategy::test_support::{cursor, day};

    const CALENDAR: &str = "ticker,catalyst_date,direction\n\
                            BIO,2024-01-03,LONG\n\
                            BIO,2024-01-05,sideways\n\
                            OTHER,2024-01-02,\n";

    #[test]
    fn parses_rows_and_drops_malformed_directions() {
        let calendar = CatalystCalendar::from_reader(CALENDAR.as_bytes(), 1, 6).unwrap();
        assert_eq!(
            calendar.dates("BIO"),
            vec![NaiveDate::from_ymd_opt(2024, 1, 3).unwrap()]
        );
        assert_eq!(calendar.dates("OTHER").len(), 1);
        assert!(calendar.dates("NONE").is_empty());
    }

    #[test]
    fn direction_column_is_optional() {
        let csv = "ticker,catalyst_date\nBIO,2024-02-01\n";
        let calendar = CatalystCalendar::from_reader(csv.as_bytes(), 1, 6).unwrap();
        assert_eq!(calendar.dates("BIO").len(), 1);
    }

    #[test]
    fn bad_date_is_an_error() {
        let csv = "ticker,catalyst_date\nBIO,01/02/2024\n";
        let result = CatalystCalendar::from_reader(csv.as_bytes(), 1, 6);
        assert!(matches!(result, Err(CalendarError::BadDate { row: 1, .. })));
    }

    #[test]
    fn enters_day_after_catalyst_and_exits_after_hold() {
        let entries = vec![CalendarEntry {
            symbol: "BIO".into(),
            date: day(2).date(),
            direction: SignalDirection::Long,
        }];
        let mut strategy = CatalystCalendar::new(3, 1, entries);
        let closes: Vec<f64> = (0..40).map(|i| 10.0 + i as f64).collect();
        let mut bars = cursor("BIO", &closes);

        let mut signals = Vec::new();
        while bars.advance().unwrap() {
            let mut queue = EventQueue::new();
            let mut sink = SignalSink::new(&mut queue);
            strategy.calculate_signals(&bars, &mut sink).unwrap();
            while let Some(Event::Signal(s)) = queue.pop() {
                signals.push((s.timestamp, s.direction));
            }
        }

        assert_eq!(signals.len(), 2);
        assert_eq!(signals[0], (day(3), SignalDirection::Long));
        // Entered 2024-01-04, one month later is 2024-02-04 (day 34).
        assert_eq!(signals[1], (day(34), SignalDirection::Exit));
    }
}
