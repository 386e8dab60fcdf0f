//! The dispatch loop: the heart of the backtest.
//!
//! Two nested loops:
//! 1. Outer: advance the cursor one heartbeat and enqueue a Market event.
//!    Stop when the source is exhausted.
//! 2. Inner: drain the queue to empty, routing each event to its handler.
//!    - Market → strategy, then ledger time-advance
//!    - Signal → ledger (at most one order)
//!    - Order  → execution venue (exactly one fill)
//!    - Fill   → ledger
//!
//! Every event created during a heartbeat is handled before the next advance,
//! so no handler ever sees a bar newer than the heartbeat that triggered it.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::queue::{EventQueue, SignalSink};
use crate::cursor::{BarCursor, CursorError};
use crate::domain::{Event, EventKind, FillEvent, OrderEvent, SignalEvent, Symbol, Timestamp};
use crate::execution::{ExecutionHandler, VenueError};
use crate::ledger::{Ledger, LedgerError};
use crate::strategy::Strategy;

/// Default number of retries for a transient venue failure.
pub const DEFAULT_MAX_VENUE_RETRIES: u32 = 3;

/// Loop pacing and failure policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Pause between heartbeats. Pacing only, no effect on results.
    pub heartbeat: Duration,
    /// Retries after the first transient venue failure for a single order.
    pub max_venue_retries: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            heartbeat: Duration::ZERO,
            max_venue_retries: DEFAULT_MAX_VENUE_RETRIES,
        }
    }
}

/// Run counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunCounters {
    /// Successful cursor advances.
    pub heartbeats: u64,
    pub signals: u64,
    pub orders: u64,
    /// Fills applied to the ledger.
    pub fills: u64,
    /// Malformed events logged and dropped.
    pub malformed: u64,
    pub venue_retries: u64,
}

/// Fatal dispatch failures, with the context the failure happened in.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("cursor failure after {timestamp:?}: {source}")]
    Cursor {
        timestamp: Option<Timestamp>,
        #[source]
        source: CursorError,
    },

    #[error("strategy '{strategy}' failed at {timestamp:?}: {source}")]
    Strategy {
        strategy: String,
        timestamp: Option<Timestamp>,
        #[source]
        source: CursorError,
    },

    #[error("ledger failure handling {kind} for {symbol:?} at {timestamp:?}: {source}")]
    Ledger {
        kind: EventKind,
        symbol: Option<Symbol>,
        timestamp: Option<Timestamp>,
        #[source]
        source: LedgerError,
    },

    #[error("venue failure handling {kind} for {symbol} at {timestamp:?} after {attempts} attempt(s): {source}")]
    VenueFailure {
        kind: EventKind,
        symbol: Symbol,
        timestamp: Option<Timestamp>,
        attempts: u32,
        #[source]
        source: VenueError,
    },
}

/// One backtest run: cursor, strategy, ledger and venue wired by a queue.
pub struct Backtest {
    cursor: BarCursor,
    strategy: Box<dyn Strategy>,
    ledger: Ledger,
    venue: Box<dyn ExecutionHandler>,
    queue: EventQueue,
    config: EngineConfig,
    counters: RunCounters,
}

impl Backtest {
    pub fn new(
        cursor: BarCursor,
        strategy: Box<dyn Strategy>,
        ledger: Ledger,
        venue: Box<dyn ExecutionHandler>,
        config: EngineConfig,
    ) -> Self {
        Self {
            cursor,
            strategy,
            ledger,
            venue,
            queue: EventQueue::new(),
            config,
            counters: RunCounters::default(),
        }
    }

    /// Run until the cursor is exhausted.
    pub fn run(&mut self) -> Result<RunCounters, EngineError> {
        info!(
            strategy = self.strategy.name(),
            venue = self.venue.venue(),
            symbols = self.cursor.symbols().len(),
            "backtest started"
        );
        while self.step()? {
            if !self.config.heartbeat.is_zero() {
                std::thread::sleep(self.config.heartbeat);
            }
        }
        info!(
            heartbeats = self.counters.heartbeats,
            signals = self.counters.signals,
            orders = self.counters.orders,
            fills = self.counters.fills,
            malformed = self.counters.malformed,
            "backtest finished"
        );
        Ok(self.counters)
    }

    /// One heartbeat: advance, then drain the queue.
    ///
    /// Returns `Ok(false)` once the data source is exhausted.
    pub fn step(&mut self) -> Result<bool, EngineError> {
        let advanced = self.cursor.advance().map_err(|source| EngineError::Cursor {
            timestamp: self.cursor.current_timestamp(),
            source,
        })?;
        if !advanced {
            return Ok(false);
        }
        self.counters.heartbeats += 1;
        self.queue.push(Event::Market);
        self.drain()?;
        Ok(true)
    }

    fn drain(&mut self) -> Result<(), EngineError> {
        while let Some(event) = self.queue.pop() {
            match event {
                Event::Market => self.on_market()?,
                Event::Signal(signal) => self.on_signal(&signal)?,
                Event::Order(order) => self.on_order(&order)?,
                Event::Fill(fill) => self.on_fill(&fill)?,
            }
        }
        Ok(())
    }

    fn on_market(&mut self) -> Result<(), EngineError> {
        let mut sink = SignalSink::new(&mut self.queue);
        self.strategy
            .calculate_signals(&self.cursor, &mut sink)
            .map_err(|source| EngineError::Strategy {
                strategy: self.strategy.name().to_string(),
                timestamp: self.cursor.current_timestamp(),
                source,
            })?;
        self.counters.signals += sink.emitted() as u64;

        self.ledger
            .on_time_advance(&self.cursor)
            .map_err(|source| EngineError::Ledger {
                kind: EventKind::Market,
                symbol: None,
                timestamp: self.cursor.current_timestamp(),
                source,
            })?;
        Ok(())
    }

    fn on_signal(&mut self, signal: &SignalEvent) -> Result<(), EngineError> {
        let order = self
            .ledger
            .on_signal(signal, &self.cursor)
            .map_err(|source| EngineError::Ledger {
                kind: EventKind::Signal,
                symbol: Some(signal.symbol.clone()),
                timestamp: Some(signal.timestamp),
                source,
            })?;
        if let Some(order) = order {
            self.counters.orders += 1;
            self.queue.push(Event::Order(order));
        }
        Ok(())
    }

    fn on_order(&mut self, order: &OrderEvent) -> Result<(), EngineError> {
        let mut attempts = 0;
        loop {
            attempts += 1;
            match self.venue.execute_order(order, &self.cursor) {
                Ok(fill) => {
                    self.queue.push(Event::Fill(fill));
                    return Ok(());
                }
                Err(VenueError::Transient(reason)) if attempts <= self.config.max_venue_retries => {
                    self.counters.venue_retries += 1;
                    debug!(%order, attempts, %reason, "transient venue failure, retrying");
                }
                Err(VenueError::Malformed(reason)) => {
                    self.counters.malformed += 1;
                    warn!(%order, %reason, "malformed fill from venue, dropped");
                    return Ok(());
                }
                Err(source) => {
                    return Err(EngineError::VenueFailure {
                        kind: EventKind::Order,
                        symbol: order.symbol.clone(),
                        timestamp: self.cursor.latest_timestamp(&order.symbol).ok(),
                        attempts,
                        source,
                    });
                }
            }
        }
    }

    fn on_fill(&mut self, fill: &FillEvent) -> Result<(), EngineError> {
        match self.ledger.on_fill(fill, &self.cursor) {
            Ok(()) => {
                self.counters.fills += 1;
                Ok(())
            }
            Err(LedgerError::InvalidCommission { symbol, commission }) => {
                self.counters.malformed += 1;
                warn!(%symbol, commission, venue = %fill.venue, "fill with invalid commission, dropped");
                Ok(())
            }
            Err(source) => Err(EngineError::Ledger {
                kind: EventKind::Fill,
                symbol: Some(fill.symbol.clone()),
                timestamp: Some(fill.timestamp),
                source,
            }),
        }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn cursor(&self) -> &BarCursor {
        &self.cursor
    }

    pub fn counters(&self) -> RunCounters {
        self.counters
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Consume the run and keep the ledger for reporting.
    pub fn into_ledger(self) -> Ledger {
        self.ledger
    }
}

impl std::fmt::Debug for Backtest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backtest")
            .field("cursor", &self.cursor)
            .field("strategy", &self.strategy.name())
            .field("venue", &self.venue.venue())
            .field("ledger", &self.ledger)
            .field("config", &self.config)
            .field("counters", &self.counters)
            .finish()
    }
}
