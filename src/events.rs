//! Typed publish/subscribe channel
//!
//! Decouples the simulation from presentation: score HUD, hit flashes and
//! audio subscribe to topics and receive payloads synchronously, in
//! subscription order, on the tick thread.

use std::collections::HashMap;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::sim::EntityId;

/// An event type that can be routed by topic
pub trait Topic {
    type Key: Copy + Eq + Hash;

    fn topic(&self) -> Self::Key;
}

/// Domain events emitted by the interaction rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Score changed by `delta`, now `total`
    Score { delta: u64, total: u64 },
    /// Player took contact damage, hit points are now `hp`
    Hit { hp: i32 },
    /// A pickup was collected
    Pickup { id: EntityId },
}

/// Topic keys for [`GameEvent`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameEventKind {
    Score,
    Hit,
    Pickup,
}

impl Topic for GameEvent {
    type Key = GameEventKind;

    fn topic(&self) -> GameEventKind {
        match self {
            GameEvent::Score { .. } => GameEventKind::Score,
            GameEvent::Hit { .. } => GameEventKind::Hit,
            GameEvent::Pickup { .. } => GameEventKind::Pickup,
        }
    }
}

/// Token returned by [`EventBus::subscribe`], used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

type Handler<E> = Box<dyn FnMut(&E)>;

/// Synchronous, single-threaded event bus
pub struct EventBus<E: Topic = GameEvent> {
    handlers: HashMap<E::Key, Vec<(Subscription, Handler<E>)>>,
    next_subscription: u64,
}

impl<E: Topic> Default for EventBus<E> {
    fn default() -> Self {
        Self {
            handlers: HashMap::new(),
            next_subscription: 1,
        }
    }
}

impl<E: Topic> EventBus<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for one topic
    pub fn subscribe<F>(&mut self, topic: E::Key, handler: F) -> Subscription
    where
        F: FnMut(&E) + 'static,
    {
        let sub = Subscription(self.next_subscription);
        self.next_subscription += 1;
        self.handlers
            .entry(topic)
            .or_default()
            .push((sub, Box::new(handler)));
        sub
    }

    /// Remove a handler. Unknown subscriptions are ignored.
    pub fn unsubscribe(&mut self, sub: Subscription) {
        for list in self.handlers.values_mut() {
            list.retain(|(s, _)| *s != sub);
        }
    }

    /// Deliver an event to every current subscriber of its topic
    pub fn emit(&mut self, event: E) {
        if let Some(list) = self.handlers.get_mut(&event.topic()) {
            for (_, handler) in list.iter_mut() {
                handler(&event);
            }
        }
    }

    /// Number of handlers registered for a topic
    pub fn subscriber_count(&self, topic: E::Key) -> usize {
        self.handlers.get(&topic).map(Vec::len).unwrap_or(0)
    }
}

impl<E: Topic> std::fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let total: usize = self.handlers.values().map(Vec::len).sum();
        f.debug_struct("EventBus")
            .field("subscribers", &total)
            .finish()
    }
}
