//! Executors that run handler invocations.

#[cfg(feature = "tokio")]
use std::fmt;

#[cfg(feature = "tokio")]
use crate::error::{BusError, BusResult};

/// A unit of work submitted to an [`Executor`].
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Runs handler invocations on behalf of an [`EventBus`](crate::EventBus).
///
/// An executor may run the job inline on the submitting thread or hand it to
/// another thread. Any `Fn(Job)` closure is an executor.
pub trait Executor: Send + Sync {
    /// Run `job`, now or later.
    fn execute(&self, job: Job);
}

impl<F> Executor for F
where
    F: Fn(Job) + Send + Sync,
{
    fn execute(&self, job: Job) {
        self(job);
    }
}

/// Runs every job immediately on the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectExecutor;

impl Executor for DirectExecutor {
    fn execute(&self, job: Job) {
        job();
    }
}

/// Hands every job to a tokio runtime's blocking pool.
///
/// Handlers are synchronous, so they run on blocking threads rather than the
/// async workers.
#[cfg(feature = "tokio")]
#[derive(Clone)]
pub struct TokioExecutor {
    handle: tokio::runtime::Handle,
}

#[cfg(feature = "tokio")]
impl TokioExecutor {
    /// Executor bound to the given runtime.
    #[must_use]
    pub fn new(handle: tokio::runtime::Handle) -> Self {
        Self { handle }
    }

    /// Executor bound to the runtime the caller is running inside.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::NoRuntime`] when called outside a tokio runtime.
    pub fn current() -> BusResult<Self> {
        tokio::runtime::Handle::try_current()
            .map(Self::new)
            .map_err(|_| BusError::NoRuntime)
    }

    /// The runtime handle jobs are spawned on.
    #[must_use]
    pub fn handle(&self) -> &tokio::runtime::Handle {
        &self.handle
    }
}

#[cfg(feature = "tokio")]
impl Executor for TokioExecutor {
    fn execute(&self, job: Job) {
        // Completion is observed through the handler itself, not the join handle.
        drop(self.handle.spawn_blocking(job));
    }
}

#[cfg(feature = "tokio")]
impl fmt::Debug for TokioExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokioExecutor")
            .field("runtime", &self.handle.runtime_flavor())
            .finish()
    }
}
