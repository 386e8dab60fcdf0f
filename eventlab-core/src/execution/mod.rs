//! Execution venues: turn orders into fills.
//!
//! The dispatch loop hands every Order event to exactly one venue and expects
//! exactly one fill back. Simulated and broker-backed venues implement the
//! same trait.

pub mod commission;
pub mod simulated;

pub use commission::{CommissionModel, TieredPerShare, ZeroCommission};
pub use simulated::{SimulatedExecution, DEFAULT_VENUE};

use thiserror::Error;

use crate::cursor::BarCursor;
use crate::domain::{FillEvent, OrderEvent};

/// Venue failures, classified by how the dispatch loop reacts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VenueError {
    /// Retryable (connection hiccup, pacing limit).
    #[error("transient venue failure: {0}")]
    Transient(String),

    /// The venue refused the order. Aborts the run.
    #[error("order rejected: {0}")]
    Rejected(String),

    /// The venue answered with a fill that cannot be applied. Dropped with a warning.
    #[error("malformed fill: {0}")]
    Malformed(String),
}

/// Order execution venue.
pub trait ExecutionHandler: Send {
    /// Venue name stamped on fills.
    fn venue(&self) -> &str;

    /// Execute one order and report its fill.
    fn execute_order(
        &mut self,
        order: &OrderEvent,
        bars: &BarCursor,
    ) -> Result<FillEvent, VenueError>;
}
