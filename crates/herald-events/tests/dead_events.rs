//! Events nobody subscribed to.

use std::sync::{Arc, Mutex};

use herald_events::prelude::*;
use herald_test::prelude::*;

#[derive(Default)]
struct Morgue {
    received: Mutex<Vec<DeadEvent>>,
}

impl Morgue {
    fn received(&self) -> Vec<DeadEvent> {
        self.received.lock().unwrap().clone()
    }
}

impl Listener for Morgue {
    fn declare_handlers(handlers: &mut Handlers<Self>) {
        handlers.on::<DeadEvent, _>("collect", |morgue: &Self, dead: &DeadEvent| -> HandlerResult {
            morgue.received.lock().unwrap().push(dead.clone());
            Ok(())
        });
    }
}

struct OrdersOnly;

impl Listener for OrdersOnly {
    fn declare_handlers(handlers: &mut Handlers<Self>) {
        handlers.on::<OrderPlaced, _>(
            "placed",
            |_: &Self, _: &OrderPlaced| -> HandlerResult { Ok(()) },
        );
    }
}

struct CatchAll {
    log: DeliveryLog,
}

impl Listener for CatchAll {
    fn declare_handlers(handlers: &mut Handlers<Self>) {
        handlers.on_topic::<AllEvents, _>(
            "any",
            |catch_all: &Self, event: &dyn AnyEvent| -> HandlerResult {
                catch_all.log.record(event.event_type().short_name());
                Ok(())
            },
        );
    }
}

#[test]
fn test_unhandled_event_becomes_one_dead_event() {
    init_test_tracing();
    let bus = EventBus::with_identifier("pings");
    let morgue = Arc::new(Morgue::default());
    bus.register(&morgue);

    bus.post(PingEvent);

    let received = morgue.received();
    assert_eq!(received.len(), 1);
    let dead = &received[0];
    assert!(dead.event().is::<PingEvent>());
    assert_eq!(dead.event().downcast_ref::<PingEvent>(), Some(&PingEvent));
    assert_eq!(dead.source_identifier(), "pings");
    assert_eq!(dead.source().map(|bus| bus.to_string()).as_deref(), Some("EventBus{pings}"));
}

#[test]
fn test_unhandled_dead_event_is_dropped() {
    let executor = CountingExecutor::new();
    let bus = EventBus::builder().with_executor(executor.clone()).build();
    bus.register(&Arc::new(OrdersOnly));

    bus.post(PingEvent);

    assert_eq!(executor.jobs(), 0);
}

#[test]
fn test_dead_event_for_every_unhandled_post() {
    let bus = EventBus::new();
    let morgue = Arc::new(Morgue::default());
    bus.register(&morgue);
    bus.register(&Arc::new(OrdersOnly));

    bus.post(PingEvent);
    bus.post(OrderPlaced::new(1));
    bus.post(OrderCancelled { id: 2 });

    let wrapped: Vec<&str> = morgue
        .received()
        .iter()
        .map(|dead| dead.event().event_type().short_name())
        .collect();
    assert_eq!(wrapped, vec!["PingEvent", "OrderCancelled"]);
}

#[test]
fn test_catch_all_prevents_dead_events() {
    let bus = EventBus::new();
    let morgue = Arc::new(Morgue::default());
    let catch_all = Arc::new(CatchAll {
        log: DeliveryLog::new(),
    });
    bus.register(&morgue);
    bus.register(&catch_all);

    bus.post(PingEvent);

    assert_eq!(catch_all.log.entries(), vec!["PingEvent"]);
    assert!(morgue.received().is_empty());
}

#[test]
fn test_dead_event_does_not_keep_bus_alive() {
    let morgue = Arc::new(Morgue::default());
    {
        let bus = EventBus::new();
        bus.register(&morgue);
        bus.post(PingEvent);
    }

    let received = morgue.received();
    assert_eq!(received.len(), 1);
    assert!(received[0].source().is_none());
    assert_eq!(received[0].source_identifier(), DEFAULT_IDENTIFIER);
}
