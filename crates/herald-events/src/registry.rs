//! Registry of subscribers, indexed by the event type they listen for.

use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use std::vec;

use arc_swap::ArcSwap;
use dashmap::DashMap;
use tracing::debug;

use crate::bus::BusInner;
use crate::error::{BusError, BusResult};
use crate::event::{AnyEvent, EventType};
use crate::handler::{Listener, handler_methods};
use crate::hierarchy::flatten_hierarchy;
use crate::subscriber::{Subscriber, SubscriberKey};

type Members = Arc<Vec<Arc<Subscriber>>>;

/// Subscribers of one event type.
///
/// Readers take a snapshot without locking; writers publish a new copy.
struct SubscriberSet {
    members: ArcSwap<Vec<Arc<Subscriber>>>,
}

impl SubscriberSet {
    fn new() -> Self {
        Self {
            members: ArcSwap::from_pointee(Vec::new()),
        }
    }

    /// Add every subscriber not already present. Returns how many were added.
    fn add_all(&self, incoming: &[Arc<Subscriber>]) -> usize {
        let mut added = 0;
        self.members.rcu(|current| {
            let mut next = Vec::clone(current);
            let fresh: Vec<Arc<Subscriber>> = incoming
                .iter()
                .filter(|candidate| !next.iter().any(|m| m.key() == candidate.key()))
                .cloned()
                .collect();
            added = fresh.len();
            next.extend(fresh);
            next
        });
        added
    }

    fn remove_all(&self, keys: &HashSet<SubscriberKey>) {
        self.members.rcu(|current| {
            current
                .iter()
                .filter(|member| !keys.contains(&member.key()))
                .cloned()
                .collect::<Vec<_>>()
        });
    }

    fn contains_any(&self, keys: &HashSet<SubscriberKey>) -> bool {
        self.members
            .load()
            .iter()
            .any(|member| keys.contains(&member.key()))
    }

    fn snapshot(&self) -> Members {
        self.members.load_full()
    }

    fn len(&self) -> usize {
        self.members.load().len()
    }
}

/// All live subscribers of a bus.
pub(crate) struct SubscriberRegistry {
    subscribers: DashMap<EventType, Arc<SubscriberSet>>,
}

impl SubscriberRegistry {
    pub(crate) fn new() -> Self {
        Self {
            subscribers: DashMap::new(),
        }
    }

    /// Register every handler of `listener`. Returns the number of new subscribers.
    ///
    /// Registering the same instance twice adds nothing the second time.
    pub(crate) fn register<L: Listener>(&self, bus: &Arc<BusInner>, listener: &Arc<L>) -> usize {
        let listener_type = std::any::type_name::<L>();
        let erased: Arc<dyn Any + Send + Sync> = listener.clone();

        let mut by_type: HashMap<EventType, Vec<Arc<Subscriber>>> = HashMap::new();
        for method in handler_methods::<L>().iter() {
            let subscriber =
                Subscriber::new(bus, Arc::clone(&erased), listener_type, method.clone());
            by_type
                .entry(method.id().event_type())
                .or_default()
                .push(Arc::new(subscriber));
        }

        let mut added = 0_usize;
        for (event_type, incoming) in by_type {
            // Clone the set out so the shard lock is released before merging.
            let set = Arc::clone(
                self.subscribers
                    .entry(event_type)
                    .or_insert_with(|| Arc::new(SubscriberSet::new()))
                    .value(),
            );
            added = added.saturating_add(set.add_all(&incoming));
        }
        added
    }

    /// Remove every subscriber created for `listener`.
    ///
    /// Nothing is removed unless each of the listener's handler types still
    /// holds at least one of its subscribers.
    pub(crate) fn unregister<L: Listener>(&self, listener: &Arc<L>) -> BusResult<()> {
        let mut by_type: HashMap<EventType, HashSet<SubscriberKey>> = HashMap::new();
        for method in handler_methods::<L>().iter() {
            by_type
                .entry(method.id().event_type())
                .or_default()
                .insert(SubscriberKey::new(listener, method.id()));
        }

        let mut targets = Vec::with_capacity(by_type.len());
        for (event_type, keys) in by_type {
            let set = self
                .subscribers
                .get(&event_type)
                .map(|entry| Arc::clone(entry.value()));
            match set {
                Some(set) if set.contains_any(&keys) => targets.push((set, keys)),
                _ => {
                    return Err(BusError::UnregisteredListener {
                        listener: std::any::type_name::<L>(),
                    });
                },
            }
        }

        for (set, keys) in &targets {
            set.remove_all(keys);
        }
        debug!(
            listener = std::any::type_name::<L>(),
            event_types = targets.len(),
            "Listener unregistered"
        );
        Ok(())
    }

    /// Subscribers for `event` and every topic it belongs to, most specific first.
    pub(crate) fn subscribers_for(&self, event: &dyn AnyEvent) -> Subscribers {
        let sets: Vec<Members> = flatten_hierarchy(event.event_type())
            .iter()
            .filter_map(|event_type| {
                self.subscribers
                    .get(event_type)
                    .map(|entry| entry.value().snapshot())
            })
            .filter(|members| !members.is_empty())
            .collect();

        Subscribers {
            sets: sets.into_iter(),
            current: None,
            position: 0,
        }
    }

    /// Subscribers registered directly for `event_type`.
    pub(crate) fn subscriber_count(&self, event_type: EventType) -> usize {
        self.subscribers
            .get(&event_type)
            .map_or(0, |entry| entry.value().len())
    }

    /// Event types and topics with at least one subscriber.
    pub(crate) fn registered_types(&self) -> Vec<EventType> {
        self.subscribers
            .iter()
            .filter(|entry| entry.value().len() > 0)
            .map(|entry| *entry.key())
            .collect()
    }
}

impl fmt::Debug for SubscriberRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriberRegistry")
            .field("event_types", &self.subscribers.len())
            .finish()
    }
}

/// Snapshot of the subscribers for one post, yielded lazily in order.
pub(crate) struct Subscribers {
    sets: vec::IntoIter<Members>,
    current: Option<Members>,
    position: usize,
}

impl Subscribers {
    pub(crate) fn is_empty(&self) -> bool {
        self.sets.as_slice().is_empty()
            && self
                .current
                .as_ref()
                .is_none_or(|current| self.position >= current.len())
    }
}

impl Iterator for Subscribers {
    type Item = Arc<Subscriber>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(current) = &self.current
                && let Some(subscriber) = current.get(self.position)
            {
                self.position = self.position.saturating_add(1);
                return Some(Arc::clone(subscriber));
            }
            self.current = Some(self.sets.next()?);
            self.position = 0;
        }
    }
}
