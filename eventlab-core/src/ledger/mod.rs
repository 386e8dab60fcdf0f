//! Portfolio ledger: positions, holdings, sizing and the equity curve.

pub mod equity;
pub mod portfolio;
pub mod sizing;
pub mod snapshot;

pub use equity::{EquityCurve, EquityRow};
pub use portfolio::{Ledger, LedgerError};
pub use sizing::{FixedFraction, FixedQuantity, PositionSizer, DEFAULT_SIZING_FRACTION};
pub use snapshot::{HoldingsSnapshot, PositionSnapshot};
