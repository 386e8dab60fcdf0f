//! EventLab Core: event model, bar cursor, dispatch loop, portfolio ledger.
//!
//! This crate contains the heart of the event-driven backtester:
//! - Domain types (bars and the Market / Signal / Order / Fill events)
//! - Data sources with pad-forward alignment, read through a forward-only cursor
//! - A single-threaded dispatch loop draining a FIFO event queue
//! - Portfolio ledger with sizing policies and a time-indexed equity curve
//! - Strategy and execution collaborator traits with reference implementations

pub mod cursor;
pub mod data;
pub mod domain;
pub mod engine;
pub mod execution;
pub mod ledger;
pub mod strategy;

pub use cursor::{BarCursor, CursorError};
pub use engine::{Backtest, EngineConfig, EngineError, RunCounters};
