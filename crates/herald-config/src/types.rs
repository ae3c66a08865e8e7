//! Configuration struct definitions.

use serde::{Deserialize, Serialize};

/// Top-level Herald configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Event bus construction settings.
    pub bus: BusSection,
    /// Logging level, format, and per-crate directives.
    pub logging: LoggingSection,
}

// ---------------------------------------------------------------------------
// BusSection
// ---------------------------------------------------------------------------

/// Event bus configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusSection {
    /// Bus identifier used in logs, failure contexts and dead events.
    pub identifier: String,
    /// Delivery ordering strategy.
    pub dispatcher: DispatcherKind,
    /// Where handler invocations run.
    pub executor: ExecutorKind,
}

impl Default for BusSection {
    fn default() -> Self {
        Self {
            identifier: "default".to_owned(),
            dispatcher: DispatcherKind::default(),
            executor: ExecutorKind::default(),
        }
    }
}

/// Delivery ordering strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatcherKind {
    /// Breadth-first per posting thread.
    #[default]
    PerThread,
    /// One queue shared by every posting thread.
    LegacyGlobal,
    /// Depth-first, no queue.
    Immediate,
}

/// Execution context for handler invocations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutorKind {
    /// Run handlers on the posting thread.
    #[default]
    Direct,
    /// Run handlers on the ambient tokio runtime's blocking pool.
    WorkerPool,
}

// ---------------------------------------------------------------------------
// LoggingSection
// ---------------------------------------------------------------------------

/// Logging and tracing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Global log level filter (`"trace"`, `"debug"`, `"info"`, `"warn"`,
    /// `"error"`, `"off"`).
    pub level: String,
    /// Output format: `"pretty"`, `"compact"`, `"json"`, or `"full"`.
    pub format: String,
    /// Per-crate tracing directives (e.g. `["herald_events=debug"]`).
    pub directives: Vec<String>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: "pretty".to_owned(),
            directives: Vec::new(),
        }
    }
}
