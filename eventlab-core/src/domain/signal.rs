//! Signal events: directional intents emitted by a strategy.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{EventError, Symbol, Timestamp};

/// Direction of a strategy's intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalDirection {
    Long,
    Short,
    Exit,
}

impl fmt::Display for SignalDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Long => "LONG",
            Self::Short => "SHORT",
            Self::Exit => "EXIT",
        };
        f.write_str(s)
    }
}

impl FromStr for SignalDirection {
    type Err = EventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LONG" => Ok(Self::Long),
            "SHORT" => Ok(Self::Short),
            "EXIT" => Ok(Self::Exit),
            _ => Err(EventError::MalformedDirection {
                kind: "signal",
                value: s.to_string(),
            }),
        }
    }
}

/// A strategy's request to enter or leave a position.
///
/// `strength` is an advisory sizing weight; the default sizing policies
/// ignore it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalEvent {
    pub strategy_id: u32,
    pub symbol: Symbol,
    pub timestamp: Timestamp,
    pub direction: SignalDirection,
    pub strength: f64,
}

impl SignalEvent {
    pub fn new(
        strategy_id: u32,
        symbol: impl Into<Symbol>,
        timestamp: Timestamp,
        direction: SignalDirection,
        strength: f64,
    ) -> Self {
        Self {
            strategy_id,
            symbol: symbol.into(),
            timestamp,
            direction,
            strength,
        }
    }
}
