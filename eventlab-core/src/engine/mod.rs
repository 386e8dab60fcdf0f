//! Engine: event queue and dispatch loop.

pub mod dispatch;
pub mod queue;

pub use dispatch::{Backtest, EngineConfig, EngineError, RunCounters, DEFAULT_MAX_VENUE_RETRIES};
pub use queue::{EventQueue, SignalSink};
