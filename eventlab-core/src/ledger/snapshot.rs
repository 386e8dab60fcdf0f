//! Position and holdings snapshots.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::{Symbol, Timestamp};

/// Share count per tracked symbol at one timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionSnapshot {
    pub timestamp: Timestamp,
    pub positions: BTreeMap<Symbol, i64>,
}

/// Cash, commission and per-symbol market value at one timestamp.
///
/// For appended snapshots `total == cash + Σ values`. The ledger's current
/// snapshot only approximates this between a fill and the next time advance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingsSnapshot {
    pub timestamp: Timestamp,
    pub values: BTreeMap<Symbol, f64>,
    pub cash: f64,
    pub commission: f64,
    pub total: f64,
}

impl HoldingsSnapshot {
    /// Zero-position snapshot holding only cash.
    pub fn seed(symbols: &[Symbol], timestamp: Timestamp, initial_capital: f64) -> Self {
        Self {
            timestamp,
            values: symbols.iter().map(|s| (s.clone(), 0.0)).collect(),
            cash: initial_capital,
            commission: 0.0,
            total: initial_capital,
        }
    }

    /// Sum of per-symbol market values.
    pub fn market_value(&self) -> f64 {
        self.values.values().sum()
    }

    /// `total - (cash + Σ values)`; zero up to rounding for appended snapshots.
    pub fn identity_gap(&self) -> f64 {
        self.total - (self.cash + self.market_value())
    }
}
