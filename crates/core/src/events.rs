//! Fire lifecycle events and a session-scoped event bus.
//!
//! A bus belongs to one `FireSimulation`; subscribers are dropped with it or
//! on `clear`, so nothing outlives the session that registered it.

use crate::core_types::FireId;
use crate::fire::{ExtinguishReason, FireState, FireType};
use std::fmt;

/// Something that happened to a fire during a tick or command
#[derive(Debug, Clone, PartialEq)]
pub enum FireEvent {
    Spawned {
        fire: FireId,
        fire_type: FireType,
    },
    Ignited {
        fire: FireId,
    },
    FuelAdded {
        fire: FireId,
        item_id: String,
        accepted: f32,
        fuel_amount: f32,
    },
    StateChanged {
        fire: FireId,
        from: FireState,
        to: FireState,
    },
    NeedsFuel {
        fire: FireId,
    },
    Extinguished {
        fire: FireId,
        reason: ExtinguishReason,
    },
    /// Extinguished fire taken out of the world
    Removed {
        fire: FireId,
    },
}

impl FireEvent {
    pub fn fire(&self) -> &FireId {
        match self {
            FireEvent::Spawned { fire, .. }
            | FireEvent::Ignited { fire }
            | FireEvent::FuelAdded { fire, .. }
            | FireEvent::StateChanged { fire, .. }
            | FireEvent::NeedsFuel { fire }
            | FireEvent::Extinguished { fire, .. }
            | FireEvent::Removed { fire } => fire,
        }
    }
}

/// Handle returned by `EventBus::subscribe`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Handler<E> = Box<dyn FnMut(&E) + Send>;

/// Publish/subscribe bus that also buffers events for polling hosts
pub struct EventBus<E> {
    subscribers: Vec<(SubscriptionId, Handler<E>)>,
    pending: Vec<E>,
    next_id: u64,
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self {
            subscribers: Vec::new(),
            pending: Vec::new(),
            next_id: 0,
        }
    }
}

impl<E> EventBus<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&E) + Send + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(handler)));
        id
    }

    /// Returns `false` if the subscription was not registered
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }

    /// Drop every subscriber and pending event
    pub fn clear(&mut self) {
        self.subscribers.clear();
        self.pending.clear();
    }

    pub fn publish(&mut self, event: E) {
        for (_, handler) in &mut self.subscribers {
            handler(&event);
        }
        self.pending.push(event);
    }

    /// Take the events published since the last drain
    pub fn drain(&mut self) -> Vec<E> {
        std::mem::take(&mut self.pending)
    }

    pub fn pending(&self) -> &[E] {
        &self.pending
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl<E: fmt::Debug> fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .field("pending", &self.pending)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_subscribers_see_published_events() {
        let mut bus = EventBus::new();
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = seen.clone();
        let id = bus.subscribe(move |_: &FireEvent| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        bus.publish(FireEvent::Ignited {
            fire: FireId::new("fire-0001"),
        });
        assert_eq!(seen.load(Ordering::SeqCst), 1);

        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.publish(FireEvent::NeedsFuel {
            fire: FireId::new("fire-0001"),
        });
        assert_eq!(seen.load(Ordering::SeqCst), 1);
        assert_eq!(bus.drain().len(), 2);
        assert!(bus.pending().is_empty());
    }

    #[test]
    fn test_clear_tears_down_session() {
        let mut bus: EventBus<FireEvent> = EventBus::new();
        bus.subscribe(|_| {});
        bus.publish(FireEvent::Removed {
            fire: FireId::new("fire-0002"),
        });
        bus.clear();
        assert_eq!(bus.subscriber_count(), 0);
        assert!(bus.pending().is_empty());
    }
}
