//! Herald Test - shared test utilities for Herald event buses.
//!
//! Sample events and topics, recording mocks, and tracing setup, used by the
//! integration tests of other Herald crates as a dev-dependency.
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! herald-test.workspace = true
//! ```
//!
//! ```rust,ignore
//! use herald_events::EventBus;
//! use herald_test::{OrderPlaced, RecordingFailureHandler};
//!
//! #[test]
//! fn test_failures_are_recorded() {
//!     let failures = RecordingFailureHandler::new();
//!     let bus = EventBus::with_failure_handler(failures.clone());
//!     bus.post(OrderPlaced::new(1));
//!     assert!(failures.is_empty());
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod prelude;

pub mod fixtures;
pub mod harness;
pub mod mocks;

pub use fixtures::*;
pub use harness::*;
pub use mocks::*;
