//! Wrapper for events that reached no subscriber.

use std::fmt;

use crate::bus::{EventBus, WeakEventBus};
use crate::event::{Event, SharedEvent};

/// Posted in place of an event that had no subscribers.
///
/// Subscribe to `DeadEvent` to find events that are posted but never handled,
/// which usually means a listener was never registered. A `DeadEvent` that
/// itself finds no subscriber is dropped.
#[derive(Clone)]
pub struct DeadEvent {
    source: WeakEventBus,
    source_identifier: String,
    event: SharedEvent,
}

impl DeadEvent {
    /// Wrap `event`, which `source` failed to deliver.
    #[must_use]
    pub fn new(source: &EventBus, event: SharedEvent) -> Self {
        Self {
            source: source.downgrade(),
            source_identifier: source.identifier().to_string(),
            event,
        }
    }

    /// The bus the event was posted to, if it is still alive.
    #[must_use]
    pub fn source(&self) -> Option<EventBus> {
        self.source.upgrade()
    }

    /// Identifier of the bus the event was posted to.
    #[must_use]
    pub fn source_identifier(&self) -> &str {
        &self.source_identifier
    }

    /// The undelivered event.
    #[must_use]
    pub fn event(&self) -> &SharedEvent {
        &self.event
    }
}

impl fmt::Debug for DeadEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeadEvent")
            .field("source", &self.source_identifier)
            .field("event", &self.event)
            .finish()
    }
}

impl Event for DeadEvent {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[derive(Debug)]
    struct Orphan(u8);
    impl Event for Orphan {}

    #[test]
    fn test_accessors() {
        let bus = EventBus::with_identifier("orphanage");
        let dead = DeadEvent::new(&bus, Arc::new(Orphan(7)));

        assert_eq!(dead.source_identifier(), "orphanage");
        assert_eq!(dead.source().unwrap().identifier(), "orphanage");
        assert_eq!(dead.event().downcast_ref::<Orphan>().unwrap().0, 7);
    }

    #[test]
    fn test_source_does_not_keep_bus_alive() {
        let bus = EventBus::new();
        let dead = DeadEvent::new(&bus, Arc::new(Orphan(1)));
        drop(bus);

        assert!(dead.source().is_none());
        assert_eq!(dead.source_identifier(), "default");
    }

    #[test]
    fn test_debug_names_source_and_event() {
        let bus = EventBus::with_identifier("audit");
        let dead = DeadEvent::new(&bus, Arc::new(Orphan(3)));

        let rendered = format!("{dead:?}");
        assert!(rendered.contains("audit"));
        assert!(rendered.contains("Orphan(3)"));
    }
}
