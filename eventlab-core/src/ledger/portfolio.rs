//! Portfolio ledger: positions, holdings and the equity-curve substrate.
//!
//! The ledger is mutated only through the dispatch loop's routing:
//! `on_time_advance` once per Market event, `on_fill` once per Fill.
//! `on_signal` is read-only and turns an intent into at most one order.

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::debug;

use super::equity::EquityCurve;
use super::sizing::{FixedFraction, PositionSizer};
use super::snapshot::{HoldingsSnapshot, PositionSnapshot};
use crate::cursor::{BarCursor, CursorError};
use crate::domain::{
    BarField, FillEvent, OrderEvent, OrderSide, SignalDirection, SignalEvent, Symbol, Timestamp,
};

/// Errors from ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("symbol '{0}' is not tracked by the ledger")]
    NotFound(Symbol),

    #[error("fill for '{symbol}' carries invalid commission {commission}")]
    InvalidCommission { symbol: Symbol, commission: f64 },

    #[error("'{symbol}' has non-finite price {price}")]
    NonFinitePrice { symbol: Symbol, price: f64 },

    #[error(transparent)]
    Cursor(#[from] CursorError),
}

/// Positions, cash and valuation for one run.
pub struct Ledger {
    symbols: Vec<Symbol>,
    initial_capital: f64,
    start: Timestamp,
    sizer: Box<dyn PositionSizer>,
    current_positions: BTreeMap<Symbol, i64>,
    all_positions: Vec<PositionSnapshot>,
    current_holdings: HoldingsSnapshot,
    all_holdings: Vec<HoldingsSnapshot>,
    /// Timestamp → index into `all_holdings` / `all_positions`.
    index: BTreeMap<Timestamp, usize>,
}

impl Ledger {
    /// Ledger with the default fixed-fraction sizer.
    pub fn new(symbols: &[Symbol], start: Timestamp, initial_capital: f64) -> Self {
        Self::with_sizer(
            symbols,
            start,
            initial_capital,
            Box::new(FixedFraction::default()),
        )
    }

    pub fn with_sizer(
        symbols: &[Symbol],
        start: Timestamp,
        initial_capital: f64,
        sizer: Box<dyn PositionSizer>,
    ) -> Self {
        let current_positions: BTreeMap<Symbol, i64> =
            symbols.iter().map(|s| (s.clone(), 0)).collect();
        let seed = HoldingsSnapshot::seed(symbols, start, initial_capital);

        let mut index = BTreeMap::new();
        index.insert(start, 0);

        Self {
            symbols: symbols.to_vec(),
            initial_capital,
            start,
            sizer,
            all_positions: vec![PositionSnapshot {
                timestamp: start,
                positions: current_positions.clone(),
            }],
            current_positions,
            all_holdings: vec![seed.clone()],
            current_holdings: seed,
            index,
        }
    }

    /// Append a position and holdings snapshot for the bars just released.
    ///
    /// Each symbol is valued at `position × latest adjusted close`. Flat
    /// symbols are worth zero and need no bar. Returns the snapshot timestamp.
    pub fn on_time_advance(&mut self, bars: &BarCursor) -> Result<Timestamp, LedgerError> {
        let timestamp = bars
            .current_timestamp()
            .unwrap_or(self.current_holdings.timestamp);

        let mut values = BTreeMap::new();
        let mut market_value = 0.0;
        for symbol in &self.symbols {
            let quantity = self.current_positions[symbol];
            let value = if quantity == 0 {
                0.0
            } else {
                quantity as f64 * mark_price(bars, symbol)?
            };
            market_value += value;
            values.insert(symbol.clone(), value);
        }

        let snapshot = HoldingsSnapshot {
            timestamp,
            values,
            cash: self.current_holdings.cash,
            commission: self.current_holdings.commission,
            total: self.current_holdings.cash + market_value,
        };

        self.all_positions.push(PositionSnapshot {
            timestamp,
            positions: self.current_positions.clone(),
        });
        self.current_holdings.timestamp = timestamp;
        self.all_holdings.push(snapshot);
        self.index.insert(timestamp, self.all_holdings.len() - 1);
        Ok(timestamp)
    }

    /// Map a signal to at most one order.
    ///
    /// Long/Short enter only from a flat position; Exit flattens exactly.
    /// Any other combination yields `None`.
    pub fn on_signal(
        &self,
        signal: &SignalEvent,
        bars: &BarCursor,
    ) -> Result<Option<OrderEvent>, LedgerError> {
        let current = self.position(&signal.symbol)?;

        let order = match (signal.direction, current) {
            (SignalDirection::Long, 0) | (SignalDirection::Short, 0) => {
                let price = mark_price(bars, &signal.symbol)?;
                let quantity = self
                    .sizer
                    .entry_quantity(signal, price, self.initial_capital);
                if quantity == 0 {
                    debug!(
                        symbol = %signal.symbol,
                        price,
                        sizer = self.sizer.name(),
                        "entry sized to zero shares, no order"
                    );
                    return Ok(None);
                }
                let side = if signal.direction == SignalDirection::Long {
                    OrderSide::Buy
                } else {
                    OrderSide::Sell
                };
                debug!(
                    timestamp = %signal.timestamp,
                    symbol = %signal.symbol,
                    quantity,
                    price,
                    %side,
                    "entry order"
                );
                Some(OrderEvent::market(signal.symbol.clone(), quantity, side))
            }
            (SignalDirection::Exit, held) if held != 0 => {
                let side = if held > 0 {
                    OrderSide::Sell
                } else {
                    OrderSide::Buy
                };
                debug!(
                    timestamp = %signal.timestamp,
                    symbol = %signal.symbol,
                    quantity = held.unsigned_abs(),
                    %side,
                    "exit order"
                );
                Some(OrderEvent::market(
                    signal.symbol.clone(),
                    held.unsigned_abs(),
                    side,
                ))
            }
            _ => None,
        };
        Ok(order)
    }

    /// Apply a fill to positions and the current holdings.
    ///
    /// The running total moves by the same cash delta; it is marked to market
    /// again at the next time advance.
    pub fn on_fill(&mut self, fill: &FillEvent, bars: &BarCursor) -> Result<(), LedgerError> {
        if !self.current_positions.contains_key(&fill.symbol) {
            return Err(LedgerError::NotFound(fill.symbol.clone()));
        }
        if !(fill.commission.is_finite() && fill.commission >= 0.0) {
            return Err(LedgerError::InvalidCommission {
                symbol: fill.symbol.clone(),
                commission: fill.commission,
            });
        }

        let price = match fill.fill_cost {
            Some(price) if price.is_finite() => price,
            Some(price) => {
                return Err(LedgerError::NonFinitePrice {
                    symbol: fill.symbol.clone(),
                    price,
                })
            }
            None => mark_price(bars, &fill.symbol)?,
        };
        let cost = fill.side.sign() as f64 * price * fill.quantity as f64;

        if let Some(position) = self.current_positions.get_mut(&fill.symbol) {
            *position += fill.signed_quantity();
        }
        if let Some(value) = self.current_holdings.values.get_mut(&fill.symbol) {
            *value += cost;
        }
        self.current_holdings.commission += fill.commission;
        self.current_holdings.cash -= cost + fill.commission;
        self.current_holdings.total -= cost + fill.commission;

        debug!(
            timestamp = %fill.timestamp,
            symbol = %fill.symbol,
            side = %fill.side,
            quantity = fill.quantity,
            price,
            commission = fill.commission,
            cash = self.current_holdings.cash,
            "fill applied"
        );
        Ok(())
    }

    /// Current share count for a tracked symbol.
    pub fn position(&self, symbol: &str) -> Result<i64, LedgerError> {
        self.current_positions
            .get(symbol)
            .copied()
            .ok_or_else(|| LedgerError::NotFound(symbol.to_string()))
    }

    pub fn positions(&self) -> &BTreeMap<Symbol, i64> {
        &self.current_positions
    }

    /// The in-place holdings record between appends.
    pub fn holdings(&self) -> &HoldingsSnapshot {
        &self.current_holdings
    }

    pub fn position_history(&self) -> &[PositionSnapshot] {
        &self.all_positions
    }

    pub fn holdings_history(&self) -> &[HoldingsSnapshot] {
        &self.all_holdings
    }

    /// Latest appended holdings snapshot at exactly `timestamp`.
    pub fn snapshot_at(&self, timestamp: Timestamp) -> Option<&HoldingsSnapshot> {
        self.index.get(&timestamp).map(|&i| &self.all_holdings[i])
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn initial_capital(&self) -> f64 {
        self.initial_capital
    }

    pub fn start(&self) -> Timestamp {
        self.start
    }

    /// Derive returns and the cumulative equity index from the appended snapshots.
    pub fn equity_curve(&self) -> EquityCurve {
        EquityCurve::from_snapshots(&self.symbols, &self.all_holdings)
    }
}

/// Latest adjusted close, refused when it is not a finite number.
fn mark_price(bars: &BarCursor, symbol: &str) -> Result<f64, LedgerError> {
    let price = bars.latest_value(symbol, BarField::AdjustedClose)?;
    if price.is_finite() {
        Ok(price)
    } else {
        Err(LedgerError::NonFinitePrice {
            symbol: symbol.to_string(),
            price,
        })
    }
}

impl std::fmt::Debug for Ledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ledger")
            .field("symbols", &self.symbols)
            .field("initial_capital", &self.initial_capital)
            .field("sizer", &self.sizer.name())
            .field("positions", &self.current_positions)
            .field("holdings", &self.current_holdings)
            .field("snapshots", &self.all_holdings.len())
            .finish()
    }
}
