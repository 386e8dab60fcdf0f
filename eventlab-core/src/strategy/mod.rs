//! Strategies: turn released bars into signals.
//!
//! A strategy reads the market only through the cursor and writes only
//! through a [`SignalSink`]. It never sees positions or cash: whether a
//! signal becomes an order is the ledger's decision.

pub mod buy_and_hold;
pub mod catalyst;
pub mod ma_cross;

pub use buy_and_hold::BuyAndHold;
pub use catalyst::{CalendarEntry, CalendarError, CatalystCalendar};
pub use ma_cross::MovingAverageCross;

use crate::cursor::{BarCursor, CursorError};
use crate::engine::SignalSink;

/// Signal generator invoked once per Market event.
pub trait Strategy: Send {
    /// Strategy name for logging
    fn name(&self) -> &str;

    /// Inspect the bars released so far and push zero or more signals.
    fn calculate_signals(
        &mut self,
        bars: &BarCursor,
        sink: &mut SignalSink<'_>,
    ) -> Result<(), CursorError>;
}
