//! Delivery through the event type hierarchy.

use std::sync::Arc;

use herald_events::prelude::*;
use herald_test::prelude::*;

struct OrderDesk {
    log: DeliveryLog,
}

impl Listener for OrderDesk {
    fn declare_handlers(handlers: &mut Handlers<Self>) {
        handlers.on::<OrderPlaced, _>(
            "placed",
            |desk: &Self, event: &OrderPlaced| -> HandlerResult {
                desk.log.record(format!("placed:{}", event.id));
                Ok(())
            },
        );
    }
}

struct Auditor {
    log: DeliveryLog,
}

impl Listener for Auditor {
    fn declare_handlers(handlers: &mut Handlers<Self>) {
        handlers.on_topic_concurrent::<AllEvents, _>(
            "audit",
            |auditor: &Self, event: &dyn AnyEvent| -> HandlerResult {
                auditor
                    .log
                    .record(format!("all:{}", event.event_type().short_name()));
                Ok(())
            },
        );
    }
}

struct Morgue {
    log: DeliveryLog,
}

impl Listener for Morgue {
    fn declare_handlers(handlers: &mut Handlers<Self>) {
        handlers.on::<DeadEvent, _>("dead", |morgue: &Self, dead: &DeadEvent| -> HandlerResult {
            morgue
                .log
                .record(format!("dead:{}", dead.event().event_type().short_name()));
            Ok(())
        });
    }
}

/// Subscribes once at every level of the order hierarchy.
struct HierarchyWatcher {
    log: DeliveryLog,
}

impl Listener for HierarchyWatcher {
    fn declare_handlers(handlers: &mut Handlers<Self>) {
        handlers
            .on::<OrderPlaced, _>("exact", |watcher: &Self, _: &OrderPlaced| -> HandlerResult {
                watcher.log.record("exact");
                Ok(())
            })
            .on_topic::<OrderEvents, _>(
                "orders",
                |watcher: &Self, _: &dyn AnyEvent| -> HandlerResult {
                    watcher.log.record("orders");
                    Ok(())
                },
            )
            .on_topic::<Auditable, _>(
                "auditable",
                |watcher: &Self, _: &dyn AnyEvent| -> HandlerResult {
                    watcher.log.record("auditable");
                    Ok(())
                },
            )
            .on_topic::<AllEvents, _>("all", |watcher: &Self, _: &dyn AnyEvent| -> HandlerResult {
                watcher.log.record("all");
                Ok(())
            });
    }
}

#[test]
fn test_order_placed_reaches_typed_and_catch_all_handlers() {
    init_test_tracing();
    let bus = EventBus::new();
    let desk = Arc::new(OrderDesk {
        log: DeliveryLog::new(),
    });
    let auditor = Arc::new(Auditor {
        log: DeliveryLog::new(),
    });
    let morgue = Arc::new(Morgue {
        log: DeliveryLog::new(),
    });
    bus.register(&desk);
    bus.register(&auditor);
    bus.register(&morgue);

    bus.post(OrderPlaced::new(42));

    assert_eq!(desk.log.entries(), vec!["placed:42"]);
    assert_eq!(auditor.log.entries(), vec!["all:OrderPlaced"]);
    assert!(morgue.log.is_empty());
}

#[test]
fn test_every_hierarchy_level_receives_event_once() {
    let bus = EventBus::new();
    let watcher = Arc::new(HierarchyWatcher {
        log: DeliveryLog::new(),
    });
    bus.register(&watcher);

    bus.post(OrderPlaced::new(1));

    assert_eq!(watcher.log.entries(), vec!["exact", "orders", "auditable", "all"]);
}

#[test]
fn test_sibling_event_reaches_shared_topics_only() {
    let bus = EventBus::new();
    let watcher = Arc::new(HierarchyWatcher {
        log: DeliveryLog::new(),
    });
    bus.register(&watcher);

    bus.post(OrderCancelled { id: 7 });

    assert_eq!(watcher.log.count("exact"), 0);
    assert_eq!(watcher.log.count("orders"), 1);
    assert_eq!(watcher.log.count("auditable"), 1);
    assert_eq!(watcher.log.count("all"), 1);
}

#[test]
fn test_event_without_topics_reaches_root_only() {
    let bus = EventBus::new();
    let watcher = Arc::new(HierarchyWatcher {
        log: DeliveryLog::new(),
    });
    bus.register(&watcher);

    bus.post(PingEvent);

    assert_eq!(watcher.log.entries(), vec!["all"]);
}

#[test]
fn test_same_instance_registered_twice_delivers_once() {
    let bus = EventBus::new();
    let desk = Arc::new(OrderDesk {
        log: DeliveryLog::new(),
    });

    bus.register(&desk);
    bus.register(&desk);
    bus.post(OrderPlaced::new(3));

    assert_eq!(desk.log.entries(), vec!["placed:3"]);
    assert_eq!(bus.subscriber_count::<OrderPlaced>(), 1);
}

#[test]
fn test_distinct_instances_each_receive() {
    let bus = EventBus::new();
    let log = DeliveryLog::new();
    let first = Arc::new(OrderDesk { log: log.clone() });
    let second = Arc::new(OrderDesk { log: log.clone() });

    bus.register(&first);
    bus.register(&second);
    bus.post(OrderPlaced::new(5));

    assert_eq!(log.count("placed:5"), 2);
    assert_eq!(bus.subscriber_count::<OrderPlaced>(), 2);
}

#[test]
fn test_buses_are_independent() {
    let billing = EventBus::with_identifier("billing");
    let shipping = EventBus::with_identifier("shipping");
    let billing_desk = Arc::new(OrderDesk {
        log: DeliveryLog::new(),
    });
    let shipping_desk = Arc::new(OrderDesk {
        log: DeliveryLog::new(),
    });
    billing.register(&billing_desk);
    shipping.register(&shipping_desk);

    billing.post(OrderPlaced::new(10));

    assert_eq!(billing_desk.log.entries(), vec!["placed:10"]);
    assert!(shipping_desk.log.is_empty());
    assert_eq!(shipping.subscriber_count::<OrderPlaced>(), 1);
}

#[test]
fn test_post_shared_delivers_the_same_value() {
    let bus = EventBus::new();
    let desk = Arc::new(OrderDesk {
        log: DeliveryLog::new(),
    });
    bus.register(&desk);

    let event: SharedEvent = Arc::new(OrderPlaced::new(11));
    bus.post_shared(Arc::clone(&event));
    bus.post_shared(event);

    assert_eq!(desk.log.entries(), vec!["placed:11", "placed:11"]);
}

#[test]
fn test_introspection() {
    let bus = EventBus::with_identifier("introspect");
    let watcher = Arc::new(HierarchyWatcher {
        log: DeliveryLog::new(),
    });
    assert!(bus.registered_types().is_empty());

    bus.register(&watcher);

    assert_eq!(bus.subscriber_count::<OrderPlaced>(), 1);
    assert_eq!(bus.subscriber_count::<OrderCancelled>(), 0);
    assert_eq!(bus.subscriber_count_for(EventType::topic::<AllEvents>()), 1);
    assert_eq!(bus.registered_types().len(), 4);
    assert_eq!(bus.to_string(), "EventBus{introspect}");
}
