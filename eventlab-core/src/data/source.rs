//! Data source trait and the in-memory historical implementation.
//!
//! A source hands the cursor one heartbeat of bars at a time. It must keep
//! per-symbol timestamps non-decreasing and report exhaustion truthfully;
//! the cursor checks the first property on every release. Bars with a
//! non-finite price are refused at the source.

use thiserror::Error;

use super::align::{pad_forward, AlignedData};
use crate::domain::{Bar, Symbol};
use std::collections::HashMap;

/// Structured errors from a data source.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("malformed bar: {0}")]
    Malformed(String),
}

/// Supplier of bars for a fixed set of symbols.
///
/// Historical files and live feeds implement the same contract, so the
/// cursor and everything downstream are agnostic to where bars come from.
pub trait DataSource: Send {
    /// Symbols this source produces bars for.
    fn symbols(&self) -> &[Symbol];

    /// Bars for the next heartbeat, at most one per symbol.
    ///
    /// `Ok(None)` means every symbol is exhausted.
    fn next_bars(&mut self) -> Result<Option<Vec<Bar>>, DataError>;
}

/// Replays pre-aligned historical bars one timestamp per call.
#[derive(Debug, Clone)]
pub struct HistoricalSource {
    aligned: AlignedData,
    position: usize,
}

impl HistoricalSource {
    pub fn new(aligned: AlignedData) -> Self {
        Self {
            aligned,
            position: 0,
        }
    }

    /// Align raw per-symbol bars with [`pad_forward`] and wrap them.
    pub fn from_bars(symbol_bars: HashMap<Symbol, Vec<Bar>>) -> Self {
        Self::new(pad_forward(symbol_bars))
    }

    /// Number of heartbeats this source will produce in total.
    pub fn len(&self) -> usize {
        self.aligned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aligned.is_empty()
    }

    /// Heartbeats not yet handed out.
    pub fn remaining(&self) -> usize {
        self.aligned.len() - self.position
    }

    pub fn aligned(&self) -> &AlignedData {
        &self.aligned
    }
}

impl DataSource for HistoricalSource {
    fn symbols(&self) -> &[Symbol] {
        &self.aligned.symbols
    }

    fn next_bars(&mut self) -> Result<Option<Vec<Bar>>, DataError> {
        if self.position >= self.aligned.len() {
            return Ok(None);
        }
        let t = self.position;
        self.position += 1;

        let bars: Vec<Bar> = self
            .aligned
            .symbols
            .iter()
            .filter_map(|symbol| {
                self.aligned
                    .bars
                    .get(symbol)
                    .and_then(|series| series[t].clone())
            })
            .collect();
        if let Some(bad) = bars.iter().find(|b| b.is_void()) {
            return Err(DataError::Malformed(format!(
                "{} at {} has a non-finite price",
                bad.symbol, bad.timestamp
            )));
        }
        Ok(Some(bars))
    }
}
