//! Position sizing policies: turn an entry intent into a share count.
//!
//! Sizers only answer "how many shares". Whether a signal produces an order
//! at all (entry only when flat, exit only when holding) is the ledger's rule.

use crate::domain::SignalEvent;

/// Default fraction of initial capital committed per entry.
pub const DEFAULT_SIZING_FRACTION: f64 = 0.05;

/// Entry sizing policy.
pub trait PositionSizer: Send + Sync {
    /// Whole shares to trade for an entry signal at `price`.
    ///
    /// Returns 0 when nothing sensible can be bought (bad price, too little capital).
    fn entry_quantity(&self, signal: &SignalEvent, price: f64, initial_capital: f64) -> u64;

    /// Sizer name for logging
    fn name(&self) -> &str;
}

/// Commit a fixed fraction of initial capital, floored to whole shares.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedFraction {
    fraction: f64,
}

impl FixedFraction {
    pub fn new(fraction: f64) -> Self {
        assert!(
            fraction > 0.0 && fraction <= 1.0,
            "sizing fraction must be in (0, 1]"
        );
        Self { fraction }
    }

    pub fn fraction(&self) -> f64 {
        self.fraction
    }
}

impl Default for FixedFraction {
    fn default() -> Self {
        Self::new(DEFAULT_SIZING_FRACTION)
    }
}

impl PositionSizer for FixedFraction {
    fn entry_quantity(&self, _signal: &SignalEvent, price: f64, initial_capital: f64) -> u64 {
        if !(price.is_finite() && price > 0.0) || initial_capital <= 0.0 {
            return 0;
        }
        (initial_capital * self.fraction / price).floor() as u64
    }

    fn name(&self) -> &str {
        "FixedFraction"
    }
}

/// Always trade the same number of shares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedQuantity {
    quantity: u64,
}

impl FixedQuantity {
    pub fn new(quantity: u64) -> Self {
        assert!(quantity > 0, "quantity must be > 0");
        Self { quantity }
    }
}

impl PositionSizer for FixedQuantity {
    fn entry_quantity(&self, _signal: &SignalEvent, _price: f64, _initial_capital: f64) -> u64 {
        self.quantity
    }

    fn name(&self) -> &str {
        "FixedQuantity"
    }
}
