//! Flattened type hierarchies.

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, LazyLock};

use crate::cache::TypeCache;
use crate::event::{AllEvents, EventType};

static HIERARCHIES: LazyLock<TypeCache<Arc<[EventType]>>> = LazyLock::new(TypeCache::new);

/// Flatten `event_type` into itself plus every topic it belongs to, transitively.
///
/// The order is: the type itself, then its parents breadth-first in
/// declaration order (each type listed once), then [`AllEvents`]. Results are
/// memoized per type for the lifetime of the process.
#[must_use]
pub fn flatten_hierarchy(event_type: EventType) -> Arc<[EventType]> {
    HIERARCHIES.get_or_load(event_type.id(), || flatten_uncached(event_type))
}

fn flatten_uncached(root: EventType) -> Arc<[EventType]> {
    let mut ordered = vec![root];
    let mut seen = HashSet::from([root]);
    let mut frontier = VecDeque::from([root]);

    while let Some(current) = frontier.pop_front() {
        for parent in current.parents() {
            if seen.insert(parent) {
                ordered.push(parent);
                frontier.push_back(parent);
            }
        }
    }

    let all = EventType::topic::<AllEvents>();
    if seen.insert(all) {
        ordered.push(all);
    }

    ordered.into()
}
