//! Herald Events - typed in-process publish/subscribe event bus.
//!
//! This crate provides:
//! - An [`EventBus`] that delivers posted events to every interested handler
//! - Topic hierarchies, so one handler can observe a whole family of events
//! - Dead-event detection for events nobody handles
//! - Per-handler serialization unless a handler is declared concurrency-safe
//! - Pluggable executors and failure handlers
//!
//! # Architecture
//!
//! A listener type implements [`Listener`] and declares its handlers once.
//! Registering a listener instance creates one subscriber per declared
//! handler, indexed by the event type or [`Topic`] it listens for. Posting an
//! event flattens the event's type hierarchy (the type itself, its topics,
//! then [`AllEvents`]) and hands the matching subscribers to the bus
//! dispatcher, which decides delivery order:
//!
//! 1. [`DispatchStrategy::PerThreadQueue`] (default): events posted from a
//!    handler are queued and delivered after the current event, breadth-first.
//! 2. [`DispatchStrategy::Immediate`]: nested posts are delivered depth-first.
//! 3. [`DispatchStrategy::LegacyGlobalQueue`]: one queue per bus shared by all
//!    posting threads, with no ordering guarantee across threads.
//!
//! Handler errors and panics never reach the poster. They are reported to the
//! bus [`FailureHandler`], which logs them by default.
//!
//! # Example
//!
//! ```rust
//! use std::sync::{Arc, Mutex};
//!
//! use herald_events::prelude::*;
//!
//! #[derive(Debug)]
//! struct OrderShipped {
//!     order_id: u64,
//! }
//! impl Event for OrderShipped {}
//!
//! #[derive(Default)]
//! struct Notifier {
//!     sent: Mutex<Vec<u64>>,
//! }
//!
//! impl Notifier {
//!     fn on_shipped(&self, event: &OrderShipped) -> HandlerResult {
//!         self.sent.lock().map_err(|e| e.to_string())?.push(event.order_id);
//!         Ok(())
//!     }
//! }
//!
//! impl Listener for Notifier {
//!     fn declare_handlers(handlers: &mut Handlers<Self>) {
//!         handlers.on::<OrderShipped, _>("on_shipped", Self::on_shipped);
//!     }
//! }
//!
//! let bus = EventBus::with_identifier("orders");
//! let notifier = Arc::new(Notifier::default());
//! bus.register(&notifier);
//!
//! bus.post(OrderShipped { order_id: 42 });
//! assert_eq!(*notifier.sent.lock().unwrap(), vec![42]);
//!
//! bus.unregister(&notifier).unwrap();
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod bus;
mod cache;
#[cfg(feature = "config")]
mod config;
mod dead_event;
mod dispatcher;
mod error;
mod event;
mod executor;
mod failure;
mod handler;
mod hierarchy;
mod registry;
mod subscriber;

pub use bus::{DEFAULT_IDENTIFIER, EventBus, EventBusBuilder, WeakEventBus};
pub use dead_event::DeadEvent;
pub use dispatcher::DispatchStrategy;
pub use error::{BusError, BusResult, DeliveryError};
pub use event::{AllEvents, AnyEvent, Event, EventType, SharedEvent, Topic};
#[cfg(feature = "tokio")]
pub use executor::TokioExecutor;
pub use executor::{DirectExecutor, Executor, Job};
pub use failure::{FailureContext, FailureHandler, LoggingFailureHandler, SubscriberFailure};
pub use handler::{Concurrency, HandlerError, HandlerId, HandlerResult, Handlers, Listener};
pub use hierarchy::flatten_hierarchy;
