//! Multi-symbol time alignment.
//!
//! Given bars for multiple symbols, align them to the union of their
//! timestamps. A symbol missing a timestamp repeats its last known bar
//! (pad forward). Timestamps before a symbol's first record stay empty.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::domain::{Bar, Symbol, Timestamp};

/// Bar data for multiple symbols on a common timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedData {
    /// The common timestamp axis (sorted ascending).
    pub timestamps: Vec<Timestamp>,
    /// Bars per symbol, aligned to the common timeline.
    /// Each inner Vec has the same length as `timestamps`.
    pub bars: HashMap<Symbol, Vec<Option<Bar>>>,
    /// Symbols included, sorted.
    pub symbols: Vec<Symbol>,
}

impl AlignedData {
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}

/// Align multiple symbols to a common timeline, padding gaps forward.
///
/// Each symbol's input is sorted by timestamp first; if a symbol has two
/// records at the same timestamp the later one wins.
pub fn pad_forward(symbol_bars: HashMap<Symbol, Vec<Bar>>) -> AlignedData {
    let mut all_timestamps = BTreeSet::new();
    for bars in symbol_bars.values() {
        for bar in bars {
            all_timestamps.insert(bar.timestamp);
        }
    }
    let timestamps: Vec<Timestamp> = all_timestamps.into_iter().collect();

    let mut symbols: Vec<Symbol> = symbol_bars.keys().cloned().collect();
    symbols.sort();

    let mut aligned: HashMap<Symbol, Vec<Option<Bar>>> = HashMap::new();
    for (symbol, bars) in symbol_bars {
        let by_time: BTreeMap<Timestamp, Bar> =
            bars.into_iter().map(|b| (b.timestamp, b)).collect();

        let mut last: Option<&Bar> = None;
        let series: Vec<Option<Bar>> = timestamps
            .iter()
            .map(|ts| match by_time.get(ts) {
                Some(bar) => {
                    last = Some(bar);
                    Some(bar.clone())
                }
                None => last.map(|prev| prev.restamped(*ts)),
            })
            .collect();

        aligned.insert(symbol, series);
    }

    AlignedData {
        timestamps,
        bars: aligned,
        symbols,
    }
}
