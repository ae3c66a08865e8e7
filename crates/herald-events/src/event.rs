//! Event values, topics, and their runtime type identity.
//!
//! Rust has no class inheritance, so the bus models an event's "supertypes"
//! explicitly:
//!
//! - A concrete event type implements [`Event`] and may list the capability
//!   [`Topic`]s it belongs to.
//! - A topic is a marker type implementing [`Topic`]; it may list its own
//!   super-topics.
//! - [`AllEvents`] is the root topic. Every flattened hierarchy ends with it,
//!   so a handler subscribed to `AllEvents` sees every posted event.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A value that can be posted to an [`EventBus`](crate::EventBus).
///
/// # Example
///
/// ```rust
/// use herald_events::{Event, EventType, Topic};
///
/// struct Billing;
/// impl Topic for Billing {}
///
/// #[derive(Debug)]
/// struct InvoicePaid {
///     invoice_id: u64,
/// }
///
/// impl Event for InvoicePaid {
///     fn topics() -> Vec<EventType> {
///         vec![EventType::topic::<Billing>()]
///     }
/// }
/// ```
pub trait Event: Any + Send + Sync + fmt::Debug {
    /// Capability topics this event type belongs to directly.
    ///
    /// [`AllEvents`] is implied and does not need to be listed.
    #[must_use]
    fn topics() -> Vec<EventType>
    where
        Self: Sized,
    {
        Vec::new()
    }
}

/// A capability category that handlers can subscribe to.
///
/// Topics are never posted themselves. Handlers subscribed to a topic receive
/// the type-erased [`AnyEvent`] and may downcast it.
pub trait Topic: 'static {
    /// Topics this topic extends.
    #[must_use]
    fn supertopics() -> Vec<EventType> {
        Vec::new()
    }
}

/// The root topic every event belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct AllEvents;

impl Topic for AllEvents {}

/// Runtime identity of an event type or topic.
///
/// Equality and hashing use the [`TypeId`] only.
#[derive(Clone, Copy)]
pub struct EventType {
    id: TypeId,
    name: &'static str,
    parents: fn() -> Vec<EventType>,
}

impl EventType {
    /// Identity of the concrete event type `E`.
    #[must_use]
    pub fn of<E: Event>() -> Self {
        Self {
            id: TypeId::of::<E>(),
            name: std::any::type_name::<E>(),
            parents: E::topics,
        }
    }

    /// Identity of the topic `T`.
    #[must_use]
    pub fn topic<T: Topic>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
            parents: T::supertopics,
        }
    }

    /// The underlying type id.
    #[must_use]
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified type name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Type name without its module path.
    #[must_use]
    pub fn short_name(&self) -> &'static str {
        let base = self.name.split('<').next().unwrap_or(self.name);
        match base.rfind("::") {
            Some(at) => &self.name[at.saturating_add(2)..],
            None => self.name,
        }
    }

    /// Whether this is the [`AllEvents`] root topic.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.id == TypeId::of::<AllEvents>()
    }

    /// Direct parents (topics or super-topics) as declared by the type.
    pub(crate) fn parents(&self) -> Vec<EventType> {
        (self.parents)()
    }
}

impl PartialEq for EventType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for EventType {}

impl Hash for EventType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EventType").field(&self.name).finish()
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Object-safe view of a posted [`Event`].
///
/// Implemented for every `Event`; use [`downcast_ref`](Self::downcast_ref)
/// to get back the concrete value.
pub trait AnyEvent: Any + Send + Sync + fmt::Debug + 'static {
    /// Runtime type of the event value.
    fn event_type(&self) -> EventType;

    /// The value as [`Any`].
    fn as_any(&self) -> &dyn Any;
}

impl<E: Event> AnyEvent for E {
    fn event_type(&self) -> EventType {
        EventType::of::<E>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl dyn AnyEvent {
    /// Whether the event is an `E`.
    #[must_use]
    pub fn is<E: Event>(&self) -> bool {
        self.as_any().is::<E>()
    }

    /// The event as an `E`, if it is one.
    #[must_use]
    pub fn downcast_ref<E: Event>(&self) -> Option<&E> {
        self.as_any().downcast_ref::<E>()
    }
}

/// A posted event, shared between every subscriber that receives it.
pub type SharedEvent = Arc<dyn AnyEvent>;

#[cfg(test)]
mod tests {
    use super::*;

    struct Shipping;
    impl Topic for Shipping {}

    #[derive(Debug)]
    struct ParcelSent {
        weight: u32,
    }

    impl Event for ParcelSent {
        fn topics() -> Vec<EventType> {
            vec![EventType::topic::<Shipping>()]
        }
    }

    #[derive(Debug)]
    struct Plain;
    impl Event for Plain {}

    #[test]
    fn test_event_type_equality_uses_type_id() {
        assert_eq!(EventType::of::<ParcelSent>(), EventType::of::<ParcelSent>());
        assert_ne!(EventType::of::<ParcelSent>(), EventType::of::<Plain>());
        assert_ne!(
            EventType::of::<ParcelSent>(),
            EventType::topic::<Shipping>()
        );
    }

    #[test]
    fn test_event_type_parents() {
        let parents = EventType::of::<ParcelSent>().parents();
        assert_eq!(parents, vec![EventType::topic::<Shipping>()]);
        assert!(EventType::of::<Plain>().parents().is_empty());
    }

    #[test]
    fn test_short_name() {
        assert_eq!(EventType::of::<ParcelSent>().short_name(), "ParcelSent");
        assert_eq!(EventType::topic::<AllEvents>().short_name(), "AllEvents");
    }

    #[test]
    fn test_root_topic() {
        assert!(EventType::topic::<AllEvents>().is_root());
        assert!(!EventType::topic::<Shipping>().is_root());
    }

    #[test]
    fn test_downcast_shared_event() {
        let event: SharedEvent = Arc::new(ParcelSent { weight: 12 });

        assert!(event.is::<ParcelSent>());
        assert!(!event.is::<Plain>());
        assert_eq!(event.event_type(), EventType::of::<ParcelSent>());

        let parcel = event.downcast_ref::<ParcelSent>().unwrap();
        assert_eq!(parcel.weight, 12);
    }
}
