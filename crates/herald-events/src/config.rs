//! Building buses from `herald-config` settings.

use herald_config::{BusSection, DispatcherKind, ExecutorKind};

use crate::bus::EventBus;
use crate::dispatcher::DispatchStrategy;
use crate::error::BusResult;
use crate::executor::DirectExecutor;

impl From<DispatcherKind> for DispatchStrategy {
    fn from(kind: DispatcherKind) -> Self {
        match kind {
            DispatcherKind::PerThread => Self::PerThreadQueue,
            DispatcherKind::LegacyGlobal => Self::LegacyGlobalQueue,
            DispatcherKind::Immediate => Self::Immediate,
        }
    }
}

impl EventBus {
    /// Build a bus from a `[bus]` configuration section.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::NoRuntime`] when the worker pool executor is
    /// requested outside a tokio runtime, or [`BusError::InvalidConfig`] when
    /// this build has no worker pool support.
    pub fn from_config(section: &BusSection) -> BusResult<Self> {
        let builder = Self::builder()
            .with_identifier(section.identifier.clone())
            .with_dispatch(section.dispatcher.into());

        let builder = match section.executor {
            ExecutorKind::Direct => builder.with_executor(DirectExecutor),
            ExecutorKind::WorkerPool => builder.with_executor(worker_pool()?),
        };

        Ok(builder.build())
    }
}

#[cfg(feature = "tokio")]
fn worker_pool() -> BusResult<crate::executor::TokioExecutor> {
    crate::executor::TokioExecutor::current()
}

#[cfg(not(feature = "tokio"))]
fn worker_pool() -> BusResult<DirectExecutor> {
    Err(crate::error::BusError::InvalidConfig(
        "executor \"worker_pool\" requires the tokio feature".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BusError;

    fn section(dispatcher: DispatcherKind, executor: ExecutorKind) -> BusSection {
        BusSection {
            identifier: "configured".to_string(),
            dispatcher,
            executor,
        }
    }

    #[test]
    fn test_direct_executor_from_config() {
        let bus =
            EventBus::from_config(&section(DispatcherKind::Immediate, ExecutorKind::Direct))
                .unwrap();

        assert_eq!(bus.identifier(), "configured");
        assert_eq!(bus.dispatch_strategy(), DispatchStrategy::Immediate);
    }

    #[test]
    fn test_dispatcher_kind_mapping() {
        assert_eq!(
            DispatchStrategy::from(DispatcherKind::PerThread),
            DispatchStrategy::PerThreadQueue
        );
        assert_eq!(
            DispatchStrategy::from(DispatcherKind::LegacyGlobal),
            DispatchStrategy::LegacyGlobalQueue
        );
    }

    #[cfg(feature = "tokio")]
    #[test]
    fn test_worker_pool_outside_runtime_fails() {
        let error = EventBus::from_config(&section(
            DispatcherKind::PerThread,
            ExecutorKind::WorkerPool,
        ))
        .unwrap_err();

        assert!(matches!(error, BusError::NoRuntime));
    }

    #[cfg(feature = "tokio")]
    #[tokio::test]
    async fn test_worker_pool_inside_runtime() {
        let bus = EventBus::from_config(&section(
            DispatcherKind::LegacyGlobal,
            ExecutorKind::WorkerPool,
        ))
        .unwrap();

        assert_eq!(bus.dispatch_strategy(), DispatchStrategy::LegacyGlobalQueue);
    }
}
