//! Handler declaration and discovery.
//!
//! A listener type declares its handlers once, through [`Listener::declare_handlers`].
//! The declaration is a pure function of the listener *type*: it is evaluated
//! the first time a listener of that type is registered with any bus and the
//! resulting catalog is reused for every later registration.

use std::any::{Any, TypeId};
use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, LazyLock};

use tracing::debug;

use crate::cache::TypeCache;
use crate::error::DeliveryError;
use crate::event::{AnyEvent, Event, EventType, Topic};

/// Error returned by a handler.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Result returned by a handler.
pub type HandlerResult = Result<(), HandlerError>;

/// Whether a handler may be entered by several threads at once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Concurrency {
    /// At most one invocation of the handler runs at a time (per listener instance).
    #[default]
    Serialized,
    /// The handler is safe to enter concurrently.
    Concurrent,
}

/// Identity of a handler within its listener type.
///
/// Two declarations with the same name and event type are the same handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId {
    name: &'static str,
    event_type: EventType,
}

impl HandlerId {
    pub(crate) fn new(name: &'static str, event_type: EventType) -> Self {
        Self { name, event_type }
    }

    /// Declared handler name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Event type or topic the handler subscribes to.
    #[must_use]
    pub fn event_type(&self) -> EventType {
        self.event_type
    }
}

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.event_type.short_name())
    }
}

type Invoker =
    Arc<dyn Fn(&(dyn Any + Send + Sync), &dyn AnyEvent) -> HandlerResult + Send + Sync>;

/// One declared handler of a listener type, not yet bound to an instance.
#[derive(Clone)]
pub(crate) struct HandlerMethod {
    id: HandlerId,
    concurrency: Concurrency,
    invoker: Invoker,
}

impl HandlerMethod {
    pub(crate) fn id(&self) -> HandlerId {
        self.id
    }

    pub(crate) fn concurrency(&self) -> Concurrency {
        self.concurrency
    }

    pub(crate) fn invoke(
        &self,
        listener: &(dyn Any + Send + Sync),
        event: &dyn AnyEvent,
    ) -> HandlerResult {
        (self.invoker)(listener, event)
    }
}

impl fmt::Debug for HandlerMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerMethod")
            .field("id", &self.id)
            .field("concurrency", &self.concurrency)
            .finish_non_exhaustive()
    }
}

/// A type whose instances can be registered with an [`EventBus`](crate::EventBus).
///
/// # Example
///
/// ```rust
/// use herald_events::{AllEvents, AnyEvent, Event, HandlerResult, Handlers, Listener};
///
/// #[derive(Debug)]
/// struct UserSignedUp {
///     email: String,
/// }
/// impl Event for UserSignedUp {}
///
/// struct Mailer;
///
/// impl Mailer {
///     fn welcome(&self, event: &UserSignedUp) -> HandlerResult {
///         println!("welcome {}", event.email);
///         Ok(())
///     }
///
///     fn trace(&self, event: &dyn AnyEvent) -> HandlerResult {
///         println!("saw {event:?}");
///         Ok(())
///     }
/// }
///
/// impl Listener for Mailer {
///     fn declare_handlers(handlers: &mut Handlers<Self>) {
///         handlers
///             .on::<UserSignedUp, _>("welcome", Self::welcome)
///             .on_topic_concurrent::<AllEvents, _>("trace", Self::trace);
///     }
/// }
/// ```
pub trait Listener: Send + Sync + 'static {
    /// Declare every handler of this listener type.
    fn declare_handlers(handlers: &mut Handlers<Self>)
    where
        Self: Sized;
}

/// Builder collecting the handlers of listener type `L`.
pub struct Handlers<L> {
    methods: Vec<HandlerMethod>,
    _listener: PhantomData<fn(&L)>,
}

impl<L: Listener> Handlers<L> {
    fn new() -> Self {
        Self {
            methods: Vec::new(),
            _listener: PhantomData,
        }
    }

    /// Subscribe a serialized handler to the concrete event type `E`.
    pub fn on<E, F>(&mut self, name: &'static str, handler: F) -> &mut Self
    where
        E: Event,
        F: Fn(&L, &E) -> HandlerResult + Send + Sync + 'static,
    {
        self.typed::<E, F>(name, Concurrency::Serialized, handler)
    }

    /// Subscribe a concurrency-safe handler to the concrete event type `E`.
    pub fn on_concurrent<E, F>(&mut self, name: &'static str, handler: F) -> &mut Self
    where
        E: Event,
        F: Fn(&L, &E) -> HandlerResult + Send + Sync + 'static,
    {
        self.typed::<E, F>(name, Concurrency::Concurrent, handler)
    }

    /// Subscribe a serialized handler to every event belonging to topic `T`.
    pub fn on_topic<T, F>(&mut self, name: &'static str, handler: F) -> &mut Self
    where
        T: Topic,
        F: Fn(&L, &dyn AnyEvent) -> HandlerResult + Send + Sync + 'static,
    {
        self.erased(name, EventType::topic::<T>(), Concurrency::Serialized, handler)
    }

    /// Subscribe a concurrency-safe handler to every event belonging to topic `T`.
    pub fn on_topic_concurrent<T, F>(&mut self, name: &'static str, handler: F) -> &mut Self
    where
        T: Topic,
        F: Fn(&L, &dyn AnyEvent) -> HandlerResult + Send + Sync + 'static,
    {
        self.erased(name, EventType::topic::<T>(), Concurrency::Concurrent, handler)
    }

    /// Number of distinct handlers declared so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    /// Whether no handler has been declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    fn typed<E, F>(&mut self, name: &'static str, concurrency: Concurrency, handler: F) -> &mut Self
    where
        E: Event,
        F: Fn(&L, &E) -> HandlerResult + Send + Sync + 'static,
    {
        let invoker: Invoker = Arc::new(
            move |listener: &(dyn Any + Send + Sync), event: &dyn AnyEvent| -> HandlerResult {
                let listener = downcast_listener::<L>(listener)?;
                let event = event
                    .downcast_ref::<E>()
                    .ok_or_else(|| DeliveryError::EventMismatch {
                        expected: std::any::type_name::<E>(),
                        actual: event.event_type().name(),
                    })?;
                handler(listener, event)
            },
        );
        self.push(HandlerId::new(name, EventType::of::<E>()), concurrency, invoker)
    }

    fn erased<F>(
        &mut self,
        name: &'static str,
        event_type: EventType,
        concurrency: Concurrency,
        handler: F,
    ) -> &mut Self
    where
        F: Fn(&L, &dyn AnyEvent) -> HandlerResult + Send + Sync + 'static,
    {
        let invoker: Invoker = Arc::new(
            move |listener: &(dyn Any + Send + Sync), event: &dyn AnyEvent| -> HandlerResult {
                handler(downcast_listener::<L>(listener)?, event)
            },
        );
        self.push(HandlerId::new(name, event_type), concurrency, invoker)
    }

    fn push(&mut self, id: HandlerId, concurrency: Concurrency, invoker: Invoker) -> &mut Self {
        if self.methods.iter().any(|method| method.id == id) {
            debug!(
                listener = std::any::type_name::<L>(),
                handler = %id,
                "Duplicate handler declaration ignored"
            );
            return self;
        }

        self.methods.push(HandlerMethod {
            id,
            concurrency,
            invoker,
        });
        self
    }
}

fn downcast_listener<L: Listener>(listener: &(dyn Any + Send + Sync)) -> Result<&L, DeliveryError> {
    listener
        .downcast_ref::<L>()
        .ok_or(DeliveryError::ListenerMismatch {
            expected: std::any::type_name::<L>(),
        })
}

static CATALOG: LazyLock<TypeCache<Arc<[HandlerMethod]>>> = LazyLock::new(TypeCache::new);

/// Every handler declared by listener type `L`, memoized per type.
pub(crate) fn handler_methods<L: Listener>() -> Arc<[HandlerMethod]> {
    CATALOG.get_or_load(TypeId::of::<L>(), || {
        let mut handlers = Handlers::<L>::new();
        L::declare_handlers(&mut handlers);
        debug!(
            listener = std::any::type_name::<L>(),
            handlers = handlers.len(),
            "Handler catalog built"
        );
        handlers.methods.into()
    })
}
