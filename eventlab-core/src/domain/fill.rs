use serde::{Deserialize, Serialize};

use super::{OrderSide, Symbol, Timestamp};

/// Confirmation that an order executed.
///
/// `fill_cost` is the per-share execution price when the venue reports one.
/// When absent the ledger prices the fill at the symbol's latest adjusted close.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillEvent {
    pub timestamp: Timestamp,
    pub symbol: Symbol,
    pub venue: String,
    pub quantity: u64,
    pub side: OrderSide,
    pub fill_cost: Option<f64>,
    pub commission: f64,
}

impl FillEvent {
    /// Signed share delta this fill applies to a position.
    pub fn signed_quantity(&self) -> i64 {
        self.side.sign() * self.quantity as i64
    }
}
