//! FIFO event queue owned by the dispatch loop.

use std::collections::VecDeque;

use crate::domain::{Event, SignalEvent};

/// First-in, first-out event queue.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: VecDeque<Event>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: Event) {
        self.events.push_back(event);
    }

    pub fn pop(&mut self) -> Option<Event> {
        self.events.pop_front()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Enqueue-only handle given to strategies.
///
/// Strategies can append signals and nothing else: they never see orders,
/// fills, or events already waiting on the queue.
pub struct SignalSink<'a> {
    queue: &'a mut EventQueue,
    emitted: usize,
}

impl<'a> SignalSink<'a> {
    pub fn new(queue: &'a mut EventQueue) -> Self {
        Self { queue, emitted: 0 }
    }

    pub fn push(&mut self, signal: SignalEvent) {
        self.queue.push(Event::Signal(signal));
        self.emitted += 1;
    }

    /// Signals pushed through this sink.
    pub fn emitted(&self) -> usize {
        self.emitted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OrderEvent, OrderSide, SignalDirection};
    use chrono::NaiveDate;

    #[test]
    fn queue_is_fifo() {
        let mut queue = EventQueue::new();
        queue.push(Event::Market);
        queue.push(Event::Order(OrderEvent::market("A", 1, OrderSide::Buy)));
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.pop(), Some(Event::Market));
        assert!(matches!(queue.pop(), Some(Event::Order(_))));
        assert!(queue.pop().is_none());
        assert!(queue.is_empty());
    }

    #[test]
    fn sink_appends_signals_behind_pending_events() {
        let ts = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let mut queue = EventQueue::new();
        queue.push(Event::Market);
        {
            let mut sink = SignalSink::new(&mut queue);
            sink.push(SignalEvent::new(1, "A", ts, SignalDirection::Long, 1.0));
            sink.push(SignalEvent::new(1, "B", ts, SignalDirection::Exit, 1.0));
            assert_eq!(sink.emitted(), 2);
        }
        assert_eq!(queue.pop(), Some(Event::Market));
        match queue.pop() {
            Some(Event::Signal(s)) => assert_eq!(s.symbol, "A"),
            other => panic!("expected signal, got {other:?}"),
        }
    }
}
