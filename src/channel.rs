//! Selection channel: an in-process, typed publish/subscribe bus.
//!
//! Publishing delivers synchronously to every handler subscribed to the topic
//! at that moment. Nothing is persisted or replayed. A `Subscription` guard
//! unsubscribes when dropped.
//!
//! The bus is an explicit object: create it at application start, hand
//! clones (which share one topic table) to publishers and subscribers.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::simulation::SimulationId;

/// Topic carrying the user's simulation choice.
pub const DEBUG_TOOLS_TOPIC: &str = "debug-tools";

/// Payload published on the selection topic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionMessage {
    /// Chosen simulation; `None` disables the active one.
    #[serde(default)]
    pub simulation: Option<String>,
}

impl SelectionMessage {
    /// Choose `id`.
    #[must_use]
    pub fn select(id: impl Into<String>) -> Self {
        Self {
            simulation: Some(id.into()),
        }
    }

    /// Disable the active simulation.
    #[must_use]
    pub const fn disable() -> Self {
        Self { simulation: None }
    }
}

impl From<Option<&SimulationId>> for SelectionMessage {
    fn from(choice: Option<&SimulationId>) -> Self {
        Self {
            simulation: choice.map(|id| id.as_str().to_string()),
        }
    }
}

/// Unique identifier for a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    /// Create a new random subscription id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

type Handler<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Topics<T> {
    by_name: HashMap<String, Vec<(SubscriptionId, Handler<T>)>>,
}

impl<T> Topics<T> {
    fn remove(&mut self, topic: &str, id: SubscriptionId) -> bool {
        let Some(handlers) = self.by_name.get_mut(topic) else {
            return false;
        };
        let before = handlers.len();
        handlers.retain(|(sid, _)| *sid != id);
        let removed = handlers.len() != before;
        if handlers.is_empty() {
            self.by_name.remove(topic);
        }
        removed
    }
}

fn lock<T>(topics: &Mutex<Topics<T>>) -> MutexGuard<'_, Topics<T>> {
    topics.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Typed topic bus.
pub struct EventBus<T> {
    topics: Arc<Mutex<Topics<T>>>,
}

/// Bus carrying `SelectionMessage`s.
pub type SelectionBus = EventBus<SelectionMessage>;

impl<T> Clone for EventBus<T> {
    fn clone(&self) -> Self {
        Self {
            topics: Arc::clone(&self.topics),
        }
    }
}

impl<T> Default for EventBus<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for EventBus<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let topics = lock(&self.topics);
        let mut map = f.debug_map();
        for (name, handlers) in &topics.by_name {
            map.entry(name, &handlers.len());
        }
        map.finish()
    }
}

impl<T> EventBus<T> {
    /// Create an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self {
            topics: Arc::new(Mutex::new(Topics { by_name: HashMap::new() })),
        }
    }

    /// Deliver `payload` to every current subscriber of `topic`.
    ///
    /// Returns the number of handlers invoked. Handlers run after the topic
    /// table is unlocked, so they may publish or (un)subscribe themselves.
    pub fn publish(&self, topic: &str, payload: &T) -> usize {
        let handlers: Vec<Handler<T>> = match lock(&self.topics).by_name.get(topic) {
            Some(handlers) => handlers.iter().map(|(_, h)| Arc::clone(h)).collect(),
            None => return 0,
        };
        for handler in &handlers {
            handler(payload);
        }
        handlers.len()
    }

    /// Subscribe `handler` to `topic`.
    pub fn subscribe<F>(&self, topic: impl Into<String>, handler: F) -> Subscription<T>
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let topic = topic.into();
        let id = SubscriptionId::new();
        lock(&self.topics)
            .by_name
            .entry(topic.clone())
            .or_default()
            .push((id, Arc::new(handler)));
        Subscription {
            id,
            topic,
            topics: Arc::downgrade(&self.topics),
        }
    }

    /// Remove a subscription. Returns false if it was not subscribed.
    pub fn unsubscribe(&self, topic: &str, id: SubscriptionId) -> bool {
        lock(&self.topics).remove(topic, id)
    }

    /// Number of live subscriptions on `topic`.
    #[must_use]
    pub fn subscriber_count(&self, topic: &str) -> usize {
        lock(&self.topics).by_name.get(topic).map_or(0, Vec::len)
    }
}

/// Scoped subscription; dropping it unsubscribes.
pub struct Subscription<T> {
    id: SubscriptionId,
    topic: String,
    topics: Weak<Mutex<Topics<T>>>,
}

impl<T> Subscription<T> {
    /// This subscription's id.
    #[must_use]
    pub const fn id(&self) -> SubscriptionId {
        self.id
    }

    /// The subscribed topic.
    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Explicit unsubscription. Idempotent; also a no-op once the bus is gone.
    pub fn unsubscribe(&self) {
        if let Some(topics) = self.topics.upgrade() {
            lock(&topics).remove(&self.topic, self.id);
        }
    }
}

impl<T> fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("topic", &self.topic)
            .finish()
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
