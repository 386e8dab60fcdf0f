//! Domain types: bars and the four event payloads.

pub mod bar;
pub mod event;
pub mod fill;
pub mod order;
pub mod signal;

pub use bar::{Bar, BarField};
pub use event::{Event, EventKind};
pub use fill::FillEvent;
pub use order::{OrderEvent, OrderKind, OrderSide};
pub use signal::{SignalDirection, SignalEvent};

use thiserror::Error;

/// Symbol type alias
pub type Symbol = String;

/// Bar and event timestamps. Daily data uses midnight.
pub type Timestamp = chrono::NaiveDateTime;

/// Errors decoding event fields from text, such as calendar directions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventError {
    #[error("malformed {kind} direction '{value}'")]
    MalformedDirection { kind: &'static str, value: String },
}
