//! Event bus error types.

use thiserror::Error;

/// Errors reported synchronously by bus operations.
#[derive(Debug, Error)]
pub enum BusError {
    /// `unregister` found no matching live registration for the listener.
    #[error("missing event subscriber for a declared handler; is {listener} registered?")]
    UnregisteredListener {
        /// Type name of the listener.
        listener: &'static str,
    },

    /// A worker pool executor was requested outside of a tokio runtime.
    #[error("no tokio runtime is available for the worker pool executor")]
    NoRuntime,

    /// The bus could not be built from the supplied configuration.
    #[error("invalid bus configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for bus operations.
pub type BusResult<T> = Result<T, BusError>;

/// Type-erasure mismatch detected while invoking a handler.
///
/// Surfaces to the failure handler like any other handler error.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The registered listener is not of the type the handler was declared on.
    #[error("listener is not a {expected}")]
    ListenerMismatch {
        /// Listener type the handler expects.
        expected: &'static str,
    },

    /// The event is not of the type the handler was declared for.
    #[error("handler expects {expected} but received {actual}")]
    EventMismatch {
        /// Event type the handler expects.
        expected: &'static str,
        /// Event type actually delivered.
        actual: &'static str,
    },
}
