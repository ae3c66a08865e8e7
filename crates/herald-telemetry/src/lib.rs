#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
//! Logging setup for Herald event buses.
//!
//! The bus itself only emits `tracing` records: subscriber failures at
//! `error`, teardown races at `warn`, registration and dead events at
//! `debug`. This crate installs a subscriber that renders them.
//!
//! # Example
//!
//! ```rust,no_run
//! use herald_telemetry::{LogConfig, LogFormat, setup_logging};
//!
//! let config = LogConfig::new("info")
//!     .with_format(LogFormat::Compact)
//!     .with_directive("herald_events=debug");
//! setup_logging(&config).unwrap();
//! ```
//!
//! With the `config` feature, a [`LogConfig`] converts from the `[logging]`
//! section of a loaded `herald_config::Config`.

pub mod prelude;

mod error;
mod logging;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{
    FileLogConfig, FileRotation, LogConfig, LogFormat, LogTarget, setup_default_logging,
    setup_logging,
};
