//! Convenience re-exports for logging setup.
//!
//! ```rust,no_run
//! use herald_telemetry::prelude::*;
//!
//! setup_logging(&LogConfig::new("debug")).unwrap();
//! ```

// Errors
pub use crate::{TelemetryError, TelemetryResult};

// Configuration
pub use crate::{FileLogConfig, FileRotation, LogConfig, LogFormat, LogTarget};

// Setup
pub use crate::{setup_default_logging, setup_logging};
