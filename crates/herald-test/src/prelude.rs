//! Convenience re-exports for tests.
//!
//! ```rust,ignore
//! use herald_test::prelude::*;
//! ```

// Sample events and topics
pub use crate::fixtures::{Auditable, OrderCancelled, OrderEvents, OrderPlaced, PingEvent};

// Mocks
pub use crate::mocks::{CountingExecutor, DeliveryLog, RecordedFailure, RecordingFailureHandler};

// Harness
pub use crate::harness::{init_test_tracing, wait_until};
