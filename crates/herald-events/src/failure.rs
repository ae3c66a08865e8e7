//! Handler failure reporting.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tracing::error;

use crate::event::SharedEvent;
use crate::handler::{HandlerError, HandlerId};

/// Why a handler invocation failed.
#[derive(Debug, Error)]
pub enum SubscriberFailure {
    /// The handler returned an error.
    #[error("{0}")]
    Returned(#[source] HandlerError),

    /// The handler panicked; the payload message is kept when it is a string.
    #[error("handler panicked: {0}")]
    Panicked(String),
}

impl SubscriberFailure {
    /// Build a failure from a `catch_unwind` payload.
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(message) = payload.downcast_ref::<&str>() {
            (*message).to_string()
        } else if let Some(message) = payload.downcast_ref::<String>() {
            message.clone()
        } else {
            "non-string panic payload".to_string()
        };
        Self::Panicked(message)
    }

    /// Whether the handler panicked rather than returning an error.
    #[must_use]
    pub fn is_panic(&self) -> bool {
        matches!(self, Self::Panicked(_))
    }
}

/// Everything known about a failed delivery.
#[derive(Clone)]
pub struct FailureContext {
    pub(crate) bus_identifier: String,
    pub(crate) event: SharedEvent,
    pub(crate) listener: Arc<dyn Any + Send + Sync>,
    pub(crate) listener_type: &'static str,
    pub(crate) handler: HandlerId,
}

impl FailureContext {
    /// Identifier of the bus that dispatched the event.
    #[must_use]
    pub fn bus_identifier(&self) -> &str {
        &self.bus_identifier
    }

    /// The event being delivered.
    #[must_use]
    pub fn event(&self) -> &SharedEvent {
        &self.event
    }

    /// The listener instance whose handler failed.
    #[must_use]
    pub fn listener(&self) -> &Arc<dyn Any + Send + Sync> {
        &self.listener
    }

    /// Type name of the listener.
    #[must_use]
    pub fn listener_type(&self) -> &'static str {
        self.listener_type
    }

    /// Whether the failing listener is exactly `listener` (same instance).
    #[must_use]
    pub fn is_listener<L: Send + Sync + 'static>(&self, listener: &Arc<L>) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.listener), Arc::as_ptr(listener))
    }

    /// The handler that failed.
    #[must_use]
    pub fn handler(&self) -> HandlerId {
        self.handler
    }
}

impl fmt::Debug for FailureContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FailureContext")
            .field("bus_identifier", &self.bus_identifier)
            .field("event", &self.event)
            .field("listener_type", &self.listener_type)
            .field("handler", &self.handler)
            .finish_non_exhaustive()
    }
}

/// Receives every handler failure of a bus.
///
/// Any `Fn(&SubscriberFailure, &FailureContext)` closure is a failure handler.
pub trait FailureHandler: Send + Sync {
    /// Called once per failed handler invocation.
    fn handle_failure(&self, failure: &SubscriberFailure, context: &FailureContext);
}

impl<F> FailureHandler for F
where
    F: Fn(&SubscriberFailure, &FailureContext) + Send + Sync,
{
    fn handle_failure(&self, failure: &SubscriberFailure, context: &FailureContext) {
        self(failure, context);
    }
}

/// Default failure handler: logs each failure at error level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingFailureHandler;

impl FailureHandler for LoggingFailureHandler {
    fn handle_failure(&self, failure: &SubscriberFailure, context: &FailureContext) {
        error!(
            bus = %context.bus_identifier(),
            listener = context.listener_type(),
            handler = %context.handler(),
            event_type = %context.event().event_type(),
            event = ?context.event(),
            panicked = failure.is_panic(),
            error = %failure,
            "Exception thrown by subscriber method {} on subscriber {} \
             when dispatching event: {:?}",
            context.handler(),
            context.listener_type(),
            context.event(),
        );
    }
}
