//! Buy-and-hold: go long each symbol on its first released bar, never exit.

use std::collections::HashSet;

use super::Strategy;
use crate::cursor::{BarCursor, CursorError};
use crate::domain::{SignalDirection, SignalEvent, Symbol};
use crate::engine::SignalSink;

#[derive(Debug, Default)]
pub struct BuyAndHold {
    strategy_id: u32,
    bought: HashSet<Symbol>,
}

impl BuyAndHold {
    pub fn new(strategy_id: u32) -> Self {
        Self {
            strategy_id,
            bought: HashSet::new(),
        }
    }
}

impl Strategy for BuyAndHold {
    fn name(&self) -> &str {
        "buy_and_hold"
    }

    fn calculate_signals(
        &mut self,
        bars: &BarCursor,
        sink: &mut SignalSink<'_>,
    ) -> Result<(), CursorError> {
        for symbol in bars.symbols() {
            if self.bought.contains(symbol) {
                continue;
            }
            // Absent until the symbol's first record.
            let Some(bar) = bars.latest_n(symbol, 1)?.last() else {
                continue;
            };
            sink.push(SignalEvent::new(
                self.strategy_id,
                symbol.clone(),
                bar.timestamp,
                SignalDirection::Long,
                1.0,
            ));
            self.bought.insert(symbol.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Event;
    use crate::engine::EventQueue;
    use crate::strategy::test_support::cursor;

    #[test]
    fn emits_one_long_per_symbol() {
        let mut bars = cursor("SPY", &[1.0, 2.0, 3.0]);
        let mut strategy = BuyAndHold::new(7);
        let mut queue = EventQueue::new();

        for _ in 0..3 {
            bars.advance().unwrap();
            let mut sink = SignalSink::new(&mut queue);
            strategy.calculate_signals(&bars, &mut sink).unwrap();
        }

        assert_eq!(queue.len(), 1);
        match queue.pop() {
            Some(Event::Signal(s)) => {
                assert_eq!(s.direction, SignalDirection::Long);
                assert_eq!(s.strategy_id, 7);
                assert_eq!(s.symbol, "SPY");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn waits_for_first_bar() {
        let bars = cursor("SPY", &[1.0]);
        let mut strategy = BuyAndHold::default();
        let mut queue = EventQueue::new();
        let mut sink = SignalSink::new(&mut queue);
        strategy.calculate_signals(&bars, &mut sink).unwrap();
        assert_eq!(sink.emitted(), 0);
    }
}
