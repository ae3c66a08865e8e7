//! The event bus façade.

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Weak};

use tracing::{debug, error, trace};

use crate::dead_event::DeadEvent;
use crate::dispatcher::{DispatchStrategy, Dispatcher};
use crate::error::BusResult;
use crate::event::{Event, EventType, SharedEvent};
use crate::executor::{DirectExecutor, Executor};
use crate::failure::{FailureContext, FailureHandler, LoggingFailureHandler, SubscriberFailure};
use crate::handler::Listener;
use crate::registry::SubscriberRegistry;

/// Identifier given to buses created without one.
pub const DEFAULT_IDENTIFIER: &str = "default";

/// State shared by every handle to one bus.
pub(crate) struct BusInner {
    identifier: String,
    executor: Arc<dyn Executor>,
    failure_handler: Arc<dyn FailureHandler>,
    registry: SubscriberRegistry,
    dispatcher: Dispatcher,
}

impl BusInner {
    pub(crate) fn identifier(&self) -> &str {
        &self.identifier
    }

    pub(crate) fn executor(&self) -> &Arc<dyn Executor> {
        &self.executor
    }

    /// Forward a handler failure to the configured sink, containing any panic it raises.
    pub(crate) fn handle_subscriber_failure(
        &self,
        failure: &SubscriberFailure,
        context: &FailureContext,
    ) {
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            self.failure_handler.handle_failure(failure, context);
        }));

        if let Err(payload) = outcome {
            let sink_failure = SubscriberFailure::from_panic(payload);
            error!(
                bus = %self.identifier,
                handler = %context.handler(),
                "Exception {} thrown while handling exception: {}",
                sink_failure,
                failure,
            );
        }
    }
}

/// Typed in-process publish/subscribe event bus.
///
/// Listeners register their declared handlers with [`register`](Self::register);
/// events are delivered with [`post`](Self::post) to every handler subscribed
/// to the event's type or to any topic the type belongs to. An event nobody
/// handles is re-posted once wrapped in a [`DeadEvent`].
///
/// Cloning the bus is cheap and every clone shares the same registry.
///
/// **WARNING:** A listener that keeps a clone of the bus it is registered
/// with creates an `Arc` reference cycle and is never freed. Listeners that
/// post reentrantly should hold a [`WeakEventBus`] from
/// [`downgrade`](Self::downgrade) instead.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicU64, Ordering};
///
/// use herald_events::{Event, EventBus, HandlerResult, Handlers, Listener};
///
/// #[derive(Debug)]
/// struct Deposit {
///     cents: u64,
/// }
/// impl Event for Deposit {}
///
/// #[derive(Default)]
/// struct Ledger {
///     balance: AtomicU64,
/// }
///
/// impl Listener for Ledger {
///     fn declare_handlers(handlers: &mut Handlers<Self>) {
///         handlers.on::<Deposit, _>(
///             "credit",
///             |ledger: &Self, deposit: &Deposit| -> HandlerResult {
///                 ledger.balance.fetch_add(deposit.cents, Ordering::SeqCst);
///                 Ok(())
///             },
///         );
///     }
/// }
///
/// let bus = EventBus::new();
/// let ledger = Arc::new(Ledger::default());
/// bus.register(&ledger);
///
/// bus.post(Deposit { cents: 250 });
/// assert_eq!(ledger.balance.load(Ordering::SeqCst), 250);
/// ```
#[derive(Clone)]
pub struct EventBus {
    inner: Arc<BusInner>,
}

impl EventBus {
    /// Bus named [`DEFAULT_IDENTIFIER`] delivering synchronously on the posting thread.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Bus with the given identifier and otherwise default settings.
    #[must_use]
    pub fn with_identifier(identifier: impl Into<String>) -> Self {
        Self::builder().with_identifier(identifier).build()
    }

    /// Bus reporting handler failures to `handler` instead of the log.
    #[must_use]
    pub fn with_failure_handler(handler: impl FailureHandler + 'static) -> Self {
        Self::builder().with_failure_handler(handler).build()
    }

    /// Bus that hands every invocation to `executor` and orders deliveries
    /// through one queue shared by all posting threads.
    #[must_use]
    pub fn asynchronous(
        identifier: impl Into<String>,
        executor: impl Executor + 'static,
    ) -> Self {
        Self::builder()
            .with_identifier(identifier)
            .with_executor(executor)
            .with_dispatch(DispatchStrategy::LegacyGlobalQueue)
            .build()
    }

    /// Start configuring a bus.
    #[must_use]
    pub fn builder() -> EventBusBuilder {
        EventBusBuilder::default()
    }

    /// Register every handler declared by `listener`.
    ///
    /// Registering the same instance again has no effect; distinct instances
    /// of the same type are registered independently.
    pub fn register<L: Listener>(&self, listener: &Arc<L>) {
        let added = self.inner.registry.register(&self.inner, listener);
        debug!(
            bus = %self.inner.identifier,
            listener = std::any::type_name::<L>(),
            subscribers_added = added,
            "Listener registered"
        );
    }

    /// Remove every handler registered for `listener`.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::UnregisteredListener`](crate::BusError::UnregisteredListener)
    /// if `listener` is not currently registered. The registry is left unchanged.
    pub fn unregister<L: Listener>(&self, listener: &Arc<L>) -> BusResult<()> {
        self.inner.registry.unregister(listener)
    }

    /// Deliver `event` to every subscribed handler.
    ///
    /// Handler failures never reach the caller; they go to the bus failure
    /// handler.
    pub fn post<E: Event>(&self, event: E) {
        self.post_shared(Arc::new(event));
    }

    /// Deliver an already shared event to every subscribed handler.
    pub fn post_shared(&self, event: SharedEvent) {
        let subscribers = self.inner.registry.subscribers_for(&*event);

        if !subscribers.is_empty() {
            trace!(
                bus = %self.inner.identifier,
                event_type = %event.event_type(),
                "Dispatching event"
            );
            self.inner.dispatcher.dispatch(event, subscribers);
        } else if !event.is::<DeadEvent>() {
            debug!(
                bus = %self.inner.identifier,
                event_type = %event.event_type(),
                "No subscribers for event, posting DeadEvent"
            );
            self.post(DeadEvent::new(self, event));
        } else {
            trace!(bus = %self.inner.identifier, "Dropping unhandled DeadEvent");
        }
    }

    /// Number of handlers subscribed directly to event type `E`.
    ///
    /// Handlers subscribed to a topic of `E` are not counted.
    #[must_use]
    pub fn subscriber_count<E: Event>(&self) -> usize {
        self.subscriber_count_for(EventType::of::<E>())
    }

    /// Number of handlers subscribed directly to `event_type`.
    #[must_use]
    pub fn subscriber_count_for(&self, event_type: EventType) -> usize {
        self.inner.registry.subscriber_count(event_type)
    }

    /// Event types and topics that currently have at least one subscriber.
    #[must_use]
    pub fn registered_types(&self) -> Vec<EventType> {
        self.inner.registry.registered_types()
    }

    /// Identifier of this bus.
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.inner.identifier
    }

    /// Delivery ordering strategy this bus was built with.
    #[must_use]
    pub fn dispatch_strategy(&self) -> DispatchStrategy {
        self.inner.dispatcher.strategy()
    }

    /// Handle that does not keep the bus alive.
    #[must_use]
    pub fn downgrade(&self) -> WeakEventBus {
        WeakEventBus {
            inner: Arc::downgrade(&self.inner),
        }
    }

    #[cfg(test)]
    pub(crate) fn inner(&self) -> &Arc<BusInner> {
        &self.inner
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventBus{{{}}}", self.inner.identifier)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("identifier", &self.inner.identifier)
            .field("dispatch", &self.inner.dispatcher.strategy())
            .field("registry", &self.inner.registry)
            .finish_non_exhaustive()
    }
}

/// Non-owning handle to an [`EventBus`].
#[derive(Clone, Default)]
pub struct WeakEventBus {
    inner: Weak<BusInner>,
}

impl WeakEventBus {
    /// The bus, if any strong handle to it is still alive.
    #[must_use]
    pub fn upgrade(&self) -> Option<EventBus> {
        self.inner.upgrade().map(|inner| EventBus { inner })
    }
}

impl fmt::Debug for WeakEventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakEventBus")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}

/// Builder for an [`EventBus`].
pub struct EventBusBuilder {
    identifier: String,
    executor: Arc<dyn Executor>,
    dispatch: DispatchStrategy,
    failure_handler: Arc<dyn FailureHandler>,
}

impl Default for EventBusBuilder {
    fn default() -> Self {
        Self {
            identifier: DEFAULT_IDENTIFIER.to_string(),
            executor: Arc::new(DirectExecutor),
            dispatch: DispatchStrategy::default(),
            failure_handler: Arc::new(LoggingFailureHandler),
        }
    }
}

impl EventBusBuilder {
    /// Set the bus identifier used in logs and failure contexts.
    #[must_use]
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = identifier.into();
        self
    }

    /// Run handler invocations on `executor`.
    #[must_use]
    pub fn with_executor(self, executor: impl Executor + 'static) -> Self {
        self.with_shared_executor(Arc::new(executor))
    }

    /// Run handler invocations on an executor shared with other buses.
    #[must_use]
    pub fn with_shared_executor(mut self, executor: Arc<dyn Executor>) -> Self {
        self.executor = executor;
        self
    }

    /// Choose the delivery ordering strategy.
    #[must_use]
    pub fn with_dispatch(mut self, dispatch: DispatchStrategy) -> Self {
        self.dispatch = dispatch;
        self
    }

    /// Report handler failures to `handler`.
    #[must_use]
    pub fn with_failure_handler(mut self, handler: impl FailureHandler + 'static) -> Self {
        self.failure_handler = Arc::new(handler);
        self
    }

    /// Build the bus.
    #[must_use]
    pub fn build(self) -> EventBus {
        debug!(
            bus = %self.identifier,
            dispatch = ?self.dispatch,
            "Event bus created"
        );
        EventBus {
            inner: Arc::new(BusInner {
                identifier: self.identifier,
                executor: self.executor,
                failure_handler: self.failure_handler,
                registry: SubscriberRegistry::new(),
                dispatcher: Dispatcher::new(self.dispatch),
            }),
        }
    }
}

impl fmt::Debug for EventBusBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBusBuilder")
            .field("identifier", &self.identifier)
            .field("dispatch", &self.dispatch)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{HandlerResult, Handlers};
    use std::sync::Mutex;

    #[derive(Debug)]
    struct Beep(u32);
    impl Event for Beep {}

    #[derive(Default)]
    struct Counter {
        beeps: Mutex<Vec<u32>>,
    }

    impl Listener for Counter {
        fn declare_handlers(handlers: &mut Handlers<Self>) {
            handlers.on::<Beep, _>("count", |counter: &Self, beep: &Beep| -> HandlerResult {
                counter.beeps.lock().unwrap().push(beep.0);
                Ok(())
            });
        }
    }

    #[test]
    fn test_defaults() {
        let bus = EventBus::new();
        assert_eq!(bus.identifier(), DEFAULT_IDENTIFIER);
        assert_eq!(bus.dispatch_strategy(), DispatchStrategy::PerThreadQueue);
        assert_eq!(bus.to_string(), "EventBus{default}");
    }

    #[test]
    fn test_asynchronous_uses_legacy_queue() {
        let bus = EventBus::asynchronous("jobs", DirectExecutor);
        assert_eq!(bus.identifier(), "jobs");
        assert_eq!(bus.dispatch_strategy(), DispatchStrategy::LegacyGlobalQueue);
    }

    #[test]
    fn test_clones_share_registry() {
        let bus = EventBus::new();
        let clone = bus.clone();
        let counter = Arc::new(Counter::default());

        clone.register(&counter);
        bus.post(Beep(1));

        assert_eq!(*counter.beeps.lock().unwrap(), vec![1]);
        assert_eq!(bus.subscriber_count::<Beep>(), 1);
    }

    #[test]
    fn test_weak_handle_does_not_keep_bus_alive() {
        let bus = EventBus::new();
        let weak = bus.downgrade();
        assert!(weak.upgrade().is_some());

        drop(bus);
        assert!(weak.upgrade().is_none());
        assert!(WeakEventBus::default().upgrade().is_none());
    }

    fn exploding_sink(_: &SubscriberFailure, _: &FailureContext) {
        panic!("sink exploded");
    }

    #[test]
    fn test_sink_panic_is_contained() {
        let bus = EventBus::with_failure_handler(exploding_sink);

        struct Faulty;
        impl Listener for Faulty {
            fn declare_handlers(handlers: &mut Handlers<Self>) {
                handlers.on::<Beep, _>("fail", |_: &Self, _: &Beep| -> HandlerResult {
                    Err("nope".into())
                });
            }
        }

        let faulty = Arc::new(Faulty);
        let counter = Arc::new(Counter::default());
        bus.register(&faulty);
        bus.register(&counter);

        bus.post(Beep(9));
        assert_eq!(*counter.beeps.lock().unwrap(), vec![9]);
    }
}
