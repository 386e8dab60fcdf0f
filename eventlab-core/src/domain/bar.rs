//! Bar: the fundamental market data unit.

use serde::{Deserialize, Serialize};

use super::{Symbol, Timestamp};

/// OHLCV (+ adjusted close) observation for a single symbol at a timestamp.
///
/// Bars are immutable once released by the cursor. Valuation and default
/// fill pricing use `adj_close`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub symbol: Symbol,
    pub timestamp: Timestamp,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub adj_close: f64,
    pub volume: u64,
}

impl Bar {
    /// Read one field through the selector enum.
    pub fn value(&self, field: BarField) -> f64 {
        match field {
            BarField::Open => self.open,
            BarField::High => self.high,
            BarField::Low => self.low,
            BarField::Close => self.close,
            BarField::AdjustedClose => self.adj_close,
            BarField::Volume => self.volume as f64,
        }
    }

    /// Copy of this bar carried forward to a later timestamp.
    ///
    /// Used by alignment when a symbol has no record at a timestamp present
    /// in the union index.
    pub fn restamped(&self, timestamp: Timestamp) -> Self {
        Self {
            timestamp,
            ..self.clone()
        }
    }

    /// Returns true if any price field is NaN or infinite.
    pub fn is_void(&self) -> bool {
        [self.open, self.high, self.low, self.close, self.adj_close]
            .iter()
            .any(|p| !p.is_finite())
    }

    /// Basic OHLC sanity check: high >= low, high >= open, high >= close, etc.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.open > 0.0
            && self.close > 0.0
            && self.adj_close > 0.0
    }
}

/// Field selector for bar reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BarField {
    Open,
    High,
    Low,
    Close,
    AdjustedClose,
    Volume,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_bar() -> Bar {
        Bar {
            symbol: "SPY".into(),
            timestamp: NaiveDate::from_ymd_opt(2024, 1, 2)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            open: 100.0,
            high: 105.0,
            low: 98.0,
            close: 103.0,
            adj_close: 102.5,
            volume: 50_000,
        }
    }

    #[test]
    fn bar_is_sane() {
        assert!(sample_bar().is_sane());
    }

    #[test]
    fn bar_detects_void() {
        let mut bar = sample_bar();
        bar.open = f64::NAN;
        assert!(bar.is_void());
        assert!(!bar.is_sane());
    }

    #[test]
    fn infinite_adjusted_close_is_void() {
        let mut bar = sample_bar();
        bar.adj_close = f64::INFINITY;
        assert!(bar.is_void());
        assert!(!bar.is_sane());
    }

    #[test]
    fn bar_detects_insane_high_low() {
        let mut bar = sample_bar();
        bar.high = 97.0; // below low
        assert!(!bar.is_sane());
    }

    #[test]
    fn field_selector_reads_each_column() {
        let bar = sample_bar();
        assert_eq!(bar.value(BarField::Open), 100.0);
        assert_eq!(bar.value(BarField::High), 105.0);
        assert_eq!(bar.value(BarField::Low), 98.0);
        assert_eq!(bar.value(BarField::Close), 103.0);
        assert_eq!(bar.value(BarField::AdjustedClose), 102.5);
        assert_eq!(bar.value(BarField::Volume), 50_000.0);
    }

    #[test]
    fn restamp_keeps_prices() {
        let bar = sample_bar();
        let later = bar.timestamp + chrono::Duration::days(1);
        let padded = bar.restamped(later);
        assert_eq!(padded.timestamp, later);
        assert_eq!(padded.adj_close, bar.adj_close);
        assert_eq!(padded.symbol, bar.symbol);
    }
}
