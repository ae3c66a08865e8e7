//! Delivery ordering strategies.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::trace;

use crate::event::SharedEvent;
use crate::registry::Subscribers;
use crate::subscriber::Subscriber;

/// How a bus orders deliveries when handlers post further events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DispatchStrategy {
    /// Events posted from inside a handler are queued on the posting thread
    /// and delivered after the current event has reached all its subscribers.
    ///
    /// Events posted by one thread reach each subscriber in posting order.
    #[default]
    PerThreadQueue,

    /// A single queue shared by every thread posting to the bus.
    ///
    /// Gives no ordering guarantee across threads. Kept for buses driven by an
    /// asynchronous executor.
    LegacyGlobalQueue,

    /// Deliver to every subscriber right away, depth-first.
    Immediate,
}

static NEXT_DISPATCHER_ID: AtomicU64 = AtomicU64::new(0);

struct PendingDelivery {
    event: SharedEvent,
    subscribers: Subscribers,
}

#[derive(Default)]
struct ThreadQueue {
    pending: VecDeque<PendingDelivery>,
    dispatching: bool,
}

thread_local! {
    /// Per-thread queues, one per per-thread dispatcher currently draining on this thread.
    static THREAD_QUEUES: RefCell<HashMap<u64, ThreadQueue>> = RefCell::new(HashMap::new());
}

/// Clears this thread's queue for a dispatcher once its drain ends, even by unwinding.
struct DrainReset {
    id: u64,
}

impl Drop for DrainReset {
    fn drop(&mut self) {
        let leftovers = THREAD_QUEUES
            .try_with(|queues| {
                queues
                    .try_borrow_mut()
                    .ok()
                    .and_then(|mut queues| queues.remove(&self.id))
            })
            .ok()
            .flatten();
        // Dropped outside the borrow: releasing a listener may post again.
        drop(leftovers);
    }
}

pub(crate) enum Dispatcher {
    PerThread {
        id: u64,
    },
    LegacyGlobal {
        queue: Mutex<VecDeque<(SharedEvent, Arc<Subscriber>)>>,
    },
    Immediate,
}

impl Dispatcher {
    pub(crate) fn new(strategy: DispatchStrategy) -> Self {
        match strategy {
            DispatchStrategy::PerThreadQueue => Self::PerThread {
                id: NEXT_DISPATCHER_ID.fetch_add(1, Ordering::Relaxed),
            },
            DispatchStrategy::LegacyGlobalQueue => Self::LegacyGlobal {
                queue: Mutex::new(VecDeque::new()),
            },
            DispatchStrategy::Immediate => Self::Immediate,
        }
    }

    pub(crate) fn strategy(&self) -> DispatchStrategy {
        match self {
            Self::PerThread { .. } => DispatchStrategy::PerThreadQueue,
            Self::LegacyGlobal { .. } => DispatchStrategy::LegacyGlobalQueue,
            Self::Immediate => DispatchStrategy::Immediate,
        }
    }

    /// Hand `event` to each of `subscribers` according to the strategy.
    pub(crate) fn dispatch(&self, event: SharedEvent, subscribers: Subscribers) {
        match self {
            Self::PerThread { id } => dispatch_per_thread(*id, event, subscribers),
            Self::LegacyGlobal { queue } => dispatch_legacy(queue, &event, subscribers),
            Self::Immediate => {
                for subscriber in subscribers {
                    subscriber.dispatch(Arc::clone(&event));
                }
            },
        }
    }
}

fn dispatch_per_thread(id: u64, event: SharedEvent, subscribers: Subscribers) {
    let start_draining = THREAD_QUEUES.with(|queues| {
        let mut queues = queues.borrow_mut();
        let queue = queues.entry(id).or_default();
        queue.pending.push_back(PendingDelivery { event, subscribers });
        !std::mem::replace(&mut queue.dispatching, true)
    });

    if !start_draining {
        trace!(dispatcher = id, "Reentrant post queued");
        return;
    }

    let _reset = DrainReset { id };
    while let Some(delivery) = next_pending(id) {
        let PendingDelivery { event, subscribers } = delivery;
        for subscriber in subscribers {
            subscriber.dispatch(Arc::clone(&event));
        }
    }
}

fn next_pending(id: u64) -> Option<PendingDelivery> {
    THREAD_QUEUES.with(|queues| {
        queues
            .borrow_mut()
            .get_mut(&id)
            .and_then(|queue| queue.pending.pop_front())
    })
}

fn dispatch_legacy(
    queue: &Mutex<VecDeque<(SharedEvent, Arc<Subscriber>)>>,
    event: &SharedEvent,
    subscribers: Subscribers,
) {
    {
        let mut pending = queue.lock().unwrap_or_else(PoisonError::into_inner);
        pending.extend(subscribers.map(|subscriber| (Arc::clone(event), subscriber)));
    }

    loop {
        let next = queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        let Some((event, subscriber)) = next else {
            break;
        };
        subscriber.dispatch(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Event;
    use crate::registry::SubscriberRegistry;

    #[derive(Debug)]
    struct Nothing;
    impl Event for Nothing {}

    #[test]
    fn test_strategy_round_trips_through_dispatcher() {
        for strategy in [
            DispatchStrategy::PerThreadQueue,
            DispatchStrategy::LegacyGlobalQueue,
            DispatchStrategy::Immediate,
        ] {
            assert_eq!(Dispatcher::new(strategy).strategy(), strategy);
        }
        assert_eq!(DispatchStrategy::default(), DispatchStrategy::PerThreadQueue);
    }

    #[test]
    fn test_per_thread_dispatchers_get_distinct_ids() {
        let (Dispatcher::PerThread { id: first }, Dispatcher::PerThread { id: second }) = (
            Dispatcher::new(DispatchStrategy::PerThreadQueue),
            Dispatcher::new(DispatchStrategy::PerThreadQueue),
        ) else {
            panic!("expected per-thread dispatchers");
        };
        assert_ne!(first, second);
    }

    #[test]
    fn test_thread_queue_is_released_after_drain() {
        let dispatcher = Dispatcher::new(DispatchStrategy::PerThreadQueue);
        let Dispatcher::PerThread { id } = dispatcher else {
            panic!("expected a per-thread dispatcher");
        };

        let registry = SubscriberRegistry::new();
        dispatcher.dispatch(Arc::new(Nothing), registry.subscribers_for(&Nothing));

        let lingering = THREAD_QUEUES.with(|queues| queues.borrow().contains_key(&id));
        assert!(!lingering);
    }
}
