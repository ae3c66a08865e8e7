//! Sample events and topics.
//!
//! The hierarchy is:
//!
//! ```text
//! OrderPlaced ──┐
//!               ├─> OrderEvents ─> Auditable ─> AllEvents
//! OrderCancelled┘
//! PingEvent ─────────────────────────────────> AllEvents
//! ```

use herald_events::{Event, EventType, Topic};

/// Events that should be written to an audit trail.
#[derive(Debug)]
pub struct Auditable;

impl Topic for Auditable {}

/// Every order lifecycle event.
#[derive(Debug)]
pub struct OrderEvents;

impl Topic for OrderEvents {
    fn supertopics() -> Vec<EventType> {
        vec![EventType::topic::<Auditable>()]
    }
}

/// An order was placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderPlaced {
    /// Order number.
    pub id: u64,
}

impl OrderPlaced {
    /// Order `id` was placed.
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self { id }
    }
}

impl Event for OrderPlaced {
    fn topics() -> Vec<EventType> {
        vec![EventType::topic::<OrderEvents>()]
    }
}

/// An order was cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderCancelled {
    /// Order number.
    pub id: u64,
}

impl Event for OrderCancelled {
    fn topics() -> Vec<EventType> {
        vec![EventType::topic::<OrderEvents>()]
    }
}

/// An event that belongs to no topic besides `AllEvents`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PingEvent;

impl Event for PingEvent {}
