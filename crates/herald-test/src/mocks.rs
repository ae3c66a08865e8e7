//! Mock implementations for testing.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use herald_events::{
    DirectExecutor, Executor, FailureContext, FailureHandler, Job, SubscriberFailure,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One failure captured by a [`RecordingFailureHandler`].
#[derive(Debug, Clone)]
pub struct RecordedFailure {
    /// Rendered failure message.
    pub message: String,
    /// Whether the handler panicked.
    pub panicked: bool,
    /// Context the bus reported with the failure.
    pub context: FailureContext,
}

/// Failure handler that keeps every failure it receives.
///
/// Clones share the same storage, so keep one clone for assertions and give
/// the other to the bus.
#[derive(Debug, Clone, Default)]
pub struct RecordingFailureHandler {
    failures: Arc<Mutex<Vec<RecordedFailure>>>,
}

impl RecordingFailureHandler {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the failures received so far.
    #[must_use]
    pub fn failures(&self) -> Vec<RecordedFailure> {
        lock(&self.failures).clone()
    }

    /// Number of failures received so far.
    #[must_use]
    pub fn len(&self) -> usize {
        lock(&self.failures).len()
    }

    /// Whether no failure has been received.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        lock(&self.failures).is_empty()
    }
}

impl FailureHandler for RecordingFailureHandler {
    fn handle_failure(&self, failure: &SubscriberFailure, context: &FailureContext) {
        lock(&self.failures).push(RecordedFailure {
            message: failure.to_string(),
            panicked: failure.is_panic(),
            context: context.clone(),
        });
    }
}

/// Ordered, thread-safe log of deliveries.
///
/// Listeners push a short label per invocation; tests compare the sequence.
#[derive(Debug, Clone, Default)]
pub struct DeliveryLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl DeliveryLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry.
    pub fn record(&self, entry: impl Into<String>) {
        lock(&self.entries).push(entry.into());
    }

    /// Snapshot of the entries in order.
    #[must_use]
    pub fn entries(&self) -> Vec<String> {
        lock(&self.entries).clone()
    }

    /// Number of entries equal to `entry`.
    #[must_use]
    pub fn count(&self, entry: &str) -> usize {
        lock(&self.entries).iter().filter(|e| *e == entry).count()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    /// Whether nothing was logged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        lock(&self.entries).is_empty()
    }
}

/// Executor that runs jobs on the caller and counts them.
#[derive(Debug, Clone, Default)]
pub struct CountingExecutor {
    jobs: Arc<AtomicUsize>,
}

impl CountingExecutor {
    /// Create an executor with a zero count.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Jobs executed so far.
    #[must_use]
    pub fn jobs(&self) -> usize {
        self.jobs.load(Ordering::SeqCst)
    }
}

impl Executor for CountingExecutor {
    fn execute(&self, job: Job) {
        self.jobs.fetch_add(1, Ordering::SeqCst);
        DirectExecutor.execute(job);
    }
}
