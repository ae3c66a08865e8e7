//! A handler bound to one listener instance.

use std::any::Any;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Weak};

use parking_lot::ReentrantMutex;
use tracing::{trace, warn};

use crate::bus::BusInner;
use crate::event::SharedEvent;
use crate::executor::Executor;
use crate::failure::{FailureContext, SubscriberFailure};
use crate::handler::{Concurrency, HandlerId, HandlerMethod};

/// Identity of a subscriber: the listener instance plus the handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct SubscriberKey {
    listener: usize,
    handler: HandlerId,
}

impl SubscriberKey {
    pub(crate) fn new<L: ?Sized>(listener: &Arc<L>, handler: HandlerId) -> Self {
        Self {
            listener: Arc::as_ptr(listener).cast::<()>().addr(),
            handler,
        }
    }
}

pub(crate) struct Subscriber {
    key: SubscriberKey,
    bus: Weak<BusInner>,
    listener: Arc<dyn Any + Send + Sync>,
    listener_type: &'static str,
    method: HandlerMethod,
    executor: Arc<dyn Executor>,
    /// Held for the duration of each call when the handler is serialized.
    /// Reentrant, so a handler may receive events it posts itself.
    guard: Option<ReentrantMutex<()>>,
}

impl Subscriber {
    pub(crate) fn new(
        bus: &Arc<BusInner>,
        listener: Arc<dyn Any + Send + Sync>,
        listener_type: &'static str,
        method: HandlerMethod,
    ) -> Self {
        let key = SubscriberKey::new(&listener, method.id());
        let guard = match method.concurrency() {
            Concurrency::Serialized => Some(ReentrantMutex::new(())),
            Concurrency::Concurrent => None,
        };

        Self {
            key,
            bus: Arc::downgrade(bus),
            listener,
            listener_type,
            executor: Arc::clone(bus.executor()),
            method,
            guard,
        }
    }

    pub(crate) fn key(&self) -> SubscriberKey {
        self.key
    }

    #[cfg(test)]
    pub(crate) fn handler(&self) -> HandlerId {
        self.method.id()
    }

    /// Submit one invocation of this subscriber for `event` to the bus executor.
    pub(crate) fn dispatch(self: &Arc<Self>, event: SharedEvent) {
        let subscriber = Arc::clone(self);
        self.executor.execute(Box::new(move || subscriber.invoke(&event)));
    }

    fn invoke(&self, event: &SharedEvent) {
        trace!(
            listener = self.listener_type,
            handler = %self.method.id(),
            "Invoking handler"
        );

        let outcome = {
            let _serial = self.guard.as_ref().map(|guard| guard.lock());

            catch_unwind(AssertUnwindSafe(|| {
                self.method.invoke(&*self.listener, &**event)
            }))
        };

        let failure = match outcome {
            Ok(Ok(())) => return,
            Ok(Err(error)) => SubscriberFailure::Returned(error),
            Err(payload) => SubscriberFailure::from_panic(payload),
        };
        self.report(&failure, event);
    }

    fn report(&self, failure: &SubscriberFailure, event: &SharedEvent) {
        let Some(bus) = self.bus.upgrade() else {
            warn!(
                listener = self.listener_type,
                handler = %self.method.id(),
                error = %failure,
                "Handler failed after its bus was dropped"
            );
            return;
        };

        let context = FailureContext {
            bus_identifier: bus.identifier().to_string(),
            event: Arc::clone(event),
            listener: Arc::clone(&self.listener),
            listener_type: self.listener_type,
            handler: self.method.id(),
        };
        bus.handle_subscriber_failure(failure, &context);
    }
}

impl fmt::Debug for Subscriber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscriber")
            .field("listener_type", &self.listener_type)
            .field("handler", &self.method.id())
            .field("concurrency", &self.method.concurrency())
            .finish_non_exhaustive()
    }
}
