//! Prelude module - commonly used types for convenient import.
//!
//! Use `use herald_events::prelude::*;` to import all essential types.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use herald_events::prelude::*;
//!
//! #[derive(Debug)]
//! struct Heartbeat;
//! impl Event for Heartbeat {}
//!
//! struct Monitor;
//!
//! impl Listener for Monitor {
//!     fn declare_handlers(handlers: &mut Handlers<Self>) {
//!         handlers.on_topic_concurrent::<AllEvents, _>(
//!             "observe",
//!             |_: &Self, event: &dyn AnyEvent| -> HandlerResult {
//!                 tracing::info!(event = ?event, "observed");
//!                 Ok(())
//!             },
//!         );
//!     }
//! }
//!
//! let bus = EventBus::new();
//! bus.register(&Arc::new(Monitor));
//! bus.post(Heartbeat);
//! ```

// Event bus
pub use crate::{DEFAULT_IDENTIFIER, EventBus, EventBusBuilder, WeakEventBus};

// Events and topics
pub use crate::{AllEvents, AnyEvent, DeadEvent, Event, EventType, SharedEvent, Topic};

// Handler declaration
pub use crate::{Concurrency, HandlerError, HandlerResult, Handlers, Listener};

// Delivery
pub use crate::{DirectExecutor, DispatchStrategy, Executor};
#[cfg(feature = "tokio")]
pub use crate::TokioExecutor;

// Failures
pub use crate::{
    BusError, BusResult, FailureContext, FailureHandler, LoggingFailureHandler, SubscriberFailure,
};
