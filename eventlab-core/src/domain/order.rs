//! Order events: concrete instructions for an execution venue.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::Symbol;

/// Buy or sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// +1 for buys, -1 for sells.
    pub fn sign(self) -> i64 {
        match self {
            Self::Buy => 1,
            Self::Sell => -1,
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
        })
    }
}

/// Market or limit order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderKind {
    Market,
    Limit,
}

/// Order sent to an execution venue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderEvent {
    pub symbol: Symbol,
    pub kind: OrderKind,
    pub quantity: u64,
    pub side: OrderSide,
}

impl OrderEvent {
    pub fn market(symbol: impl Into<Symbol>, quantity: u64, side: OrderSide) -> Self {
        Self {
            symbol: symbol.into(),
            kind: OrderKind::Market,
            quantity,
            side,
        }
    }
}

impl fmt::Display for OrderEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} ({:?})",
            self.side, self.quantity, self.symbol, self.kind
        )
    }
}
