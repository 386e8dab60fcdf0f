//! Bar cursor: the forward-only view of market data.
//!
//! The cursor owns the data source and one append-only history per tracked
//! symbol. `advance()` is the only way bars become visible, so anything
//! reading through the cursor at "now" can never observe a bar released
//! after the most recent advance.

use std::collections::HashMap;

use thiserror::Error;

use crate::data::{DataError, DataSource};
use crate::domain::{Bar, BarField, Symbol, Timestamp};

/// Errors from cursor reads and advances.
#[derive(Debug, Error)]
pub enum CursorError {
    #[error("symbol '{0}' is not tracked by this cursor")]
    NotFound(Symbol),

    #[error("no bars released yet for '{0}'")]
    NoBarsReleased(Symbol),

    #[error("data source produced a bar for untracked symbol '{0}'")]
    UnknownSymbol(Symbol),

    #[error("non-monotonic timestamp for '{symbol}': {got} after {last}")]
    NonMonotonic {
        symbol: Symbol,
        last: Timestamp,
        got: Timestamp,
    },

    #[error("data source error: {0}")]
    Source(#[from] DataError),
}

/// Forward-only, append-only view over a [`DataSource`].
pub struct BarCursor {
    source: Box<dyn DataSource>,
    symbols: Vec<Symbol>,
    released: HashMap<Symbol, Vec<Bar>>,
    advances: usize,
    exhausted: bool,
}

impl BarCursor {
    pub fn new(source: Box<dyn DataSource>) -> Self {
        let symbols = source.symbols().to_vec();
        let released = symbols.iter().map(|s| (s.clone(), Vec::new())).collect();
        Self {
            source,
            symbols,
            released,
            advances: 0,
            exhausted: false,
        }
    }

    /// Release the next heartbeat of bars.
    ///
    /// Returns `Ok(false)` once the source is exhausted for every symbol;
    /// further calls keep returning `Ok(false)` without touching the source.
    pub fn advance(&mut self) -> Result<bool, CursorError> {
        if self.exhausted {
            return Ok(false);
        }
        let bars = match self.source.next_bars()? {
            Some(bars) => bars,
            None => {
                self.exhausted = true;
                return Ok(false);
            }
        };

        for bar in bars {
            let history = self
                .released
                .get_mut(&bar.symbol)
                .ok_or_else(|| CursorError::UnknownSymbol(bar.symbol.clone()))?;
            if let Some(last) = history.last() {
                if bar.timestamp < last.timestamp {
                    return Err(CursorError::NonMonotonic {
                        symbol: bar.symbol.clone(),
                        last: last.timestamp,
                        got: bar.timestamp,
                    });
                }
            }
            history.push(bar);
        }
        self.advances += 1;
        Ok(true)
    }

    /// Tracked symbols, in source order.
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Successful advances so far.
    pub fn advances(&self) -> usize {
        self.advances
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    fn history(&self, symbol: &str) -> Result<&[Bar], CursorError> {
        self.released
            .get(symbol)
            .map(Vec::as_slice)
            .ok_or_else(|| CursorError::NotFound(symbol.to_string()))
    }

    /// Most recently released bar.
    pub fn latest(&self, symbol: &str) -> Result<&Bar, CursorError> {
        self.history(symbol)?
            .last()
            .ok_or_else(|| CursorError::NoBarsReleased(symbol.to_string()))
    }

    /// Last `n` released bars, oldest first; fewer if history is shorter.
    pub fn latest_n(&self, symbol: &str, n: usize) -> Result<&[Bar], CursorError> {
        let history = self.history(symbol)?;
        let start = history.len().saturating_sub(n);
        Ok(&history[start..])
    }

    pub fn latest_value(&self, symbol: &str, field: BarField) -> Result<f64, CursorError> {
        Ok(self.latest(symbol)?.value(field))
    }

    /// One field from the last `n` released bars, oldest first.
    pub fn latest_values(
        &self,
        symbol: &str,
        field: BarField,
        n: usize,
    ) -> Result<Vec<f64>, CursorError> {
        Ok(self
            .latest_n(symbol, n)?
            .iter()
            .map(|b| b.value(field))
            .collect())
    }

    pub fn latest_timestamp(&self, symbol: &str) -> Result<Timestamp, CursorError> {
        Ok(self.latest(symbol)?.timestamp)
    }

    /// Latest timestamp across all symbols that have released a bar.
    ///
    /// With a pad-forward source this is the current heartbeat's timestamp.
    pub fn current_timestamp(&self) -> Option<Timestamp> {
        self.released
            .values()
            .filter_map(|h| h.last().map(|b| b.timestamp))
            .max()
    }
}

impl std::fmt::Debug for BarCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BarCursor")
            .field("symbols", &self.symbols)
            .field("advances", &self.advances)
            .field("exhausted", &self.exhausted)
            .finish()
    }
}
