//! The event taxonomy routed by the dispatch loop.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{FillEvent, OrderEvent, SignalEvent};

/// One unit of work on the event queue.
///
/// `Market` carries no payload: it announces that the cursor released a new
/// bar for every symbol that had one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Event {
    Market,
    Signal(SignalEvent),
    Order(OrderEvent),
    Fill(FillEvent),
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Market => EventKind::Market,
            Self::Signal(_) => EventKind::Signal,
            Self::Order(_) => EventKind::Order,
            Self::Fill(_) => EventKind::Fill,
        }
    }

    /// Symbol the event refers to, if any.
    pub fn symbol(&self) -> Option<&str> {
        match self {
            Self::Market => None,
            Self::Signal(s) => Some(&s.symbol),
            Self::Order(o) => Some(&o.symbol),
            Self::Fill(f) => Some(&f.symbol),
        }
    }
}

/// Payload-free tag of an [`Event`], used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    Market,
    Signal,
    Order,
    Fill,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Market => "MARKET",
            Self::Signal => "SIGNAL",
            Self::Order => "ORDER",
            Self::Fill => "FILL",
        })
    }
}
