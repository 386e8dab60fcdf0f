//! Simulated venue: fills every order immediately and in full.
//!
//! No latency, no slippage, no partial fills. The fill carries no price, so
//! the ledger values it at the symbol's latest adjusted close.

use tracing::debug;

use super::commission::{CommissionModel, TieredPerShare};
use super::{ExecutionHandler, VenueError};
use crate::cursor::BarCursor;
use crate::domain::{FillEvent, OrderEvent};

/// Venue name used when none is configured.
pub const DEFAULT_VENUE: &str = "ARCA";

pub struct SimulatedExecution {
    venue: String,
    commission: Box<dyn CommissionModel>,
}

impl SimulatedExecution {
    pub fn new(venue: impl Into<String>, commission: Box<dyn CommissionModel>) -> Self {
        Self {
            venue: venue.into(),
            commission,
        }
    }
}

impl Default for SimulatedExecution {
    fn default() -> Self {
        Self::new(DEFAULT_VENUE, Box::new(TieredPerShare::default()))
    }
}

impl ExecutionHandler for SimulatedExecution {
    fn venue(&self) -> &str {
        &self.venue
    }

    fn execute_order(
        &mut self,
        order: &OrderEvent,
        bars: &BarCursor,
    ) -> Result<FillEvent, VenueError> {
        if order.quantity == 0 {
            return Err(VenueError::Rejected(format!("zero quantity: {order}")));
        }
        let timestamp = bars
            .latest_timestamp(&order.symbol)
            .map_err(|e| VenueError::Rejected(e.to_string()))?;
        let commission = self.commission.commission(order.quantity, None);

        debug!(%order, %timestamp, commission, venue = %self.venue, "simulated fill");
        Ok(FillEvent {
            timestamp,
            symbol: order.symbol.clone(),
            venue: self.venue.clone(),
            quantity: order.quantity,
            side: order.side,
            fill_cost: None,
            commission,
        })
    }
}

impl std::fmt::Debug for SimulatedExecution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulatedExecution")
            .field("venue", &self.venue)
            .field("commission", &self.commission.name())
            .finish()
    }
}
