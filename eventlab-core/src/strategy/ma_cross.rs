//! Moving-average crossover on adjusted closes.
//!
//! Long when the short SMA rises above the long SMA while out of the market;
//! exit when it falls back below while in. No signals until `long` bars have
//! been released for the symbol.

use std::collections::HashSet;

use super::Strategy;
use crate::cursor::{BarCursor, CursorError};
use crate::domain::{BarField, SignalDirection, SignalEvent, Symbol};
use crate::engine::SignalSink;

#[derive(Debug, Clone)]
pub struct MovingAverageCross {
    strategy_id: u32,
    short: usize,
    long: usize,
    invested: HashSet<Symbol>,
}

impl MovingAverageCross {
    pub fn new(strategy_id: u32, short: usize, long: usize) -> Self {
        assert!(short > 0 && short < long, "windows must satisfy 0 < short < long");
        Self {
            strategy_id,
            short,
            long,
            invested: HashSet::new(),
        }
    }

    pub fn windows(&self) -> (usize, usize) {
        (self.short, self.long)
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

impl Strategy for MovingAverageCross {
    fn name(&self) -> &str {
        "ma_cross"
    }

    fn calculate_signals(
        &mut self,
        bars: &BarCursor,
        sink: &mut SignalSink<'_>,
    ) -> Result<(), CursorError> {
        for symbol in bars.symbols() {
            let closes = bars.latest_values(symbol, BarField::AdjustedClose, self.long)?;
            if closes.len() < self.long {
                continue;
            }
            let short_sma = mean(&closes[closes.len() - self.short..]);
            let long_sma = mean(&closes);
            let timestamp = bars.latest_timestamp(symbol)?;
            let invested = self.invested.contains(symbol);

            let direction = if short_sma > long_sma && !invested {
                self.invested.insert(symbol.clone());
                SignalDirection::Long
            } else if short_sma < long_sma && invested {
                self.invested.remove(symbol);
                SignalDirection::Exit
            } else {
                continue;
            };
            sink.push(SignalEvent::new(
                self.strategy_id,
                symbol.clone(),
                timestamp,
                direction,
                1.0,
            ));
        }
        Ok(())
    }
}
