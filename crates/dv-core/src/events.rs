//! Notifications from the level core to whatever displays it
//!
//! The core never waits on a consumer; it pushes events into an
//! [`EventSink`] and carries on.

use std::collections::VecDeque;

use hashbrown::HashSet;

use crate::dungeon::Loc;

/// Events published by grid and visibility code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameEvent {
    /// A map grid needs redrawing
    Map(Loc),
    /// The visible item list may have changed
    ItemList,
    /// Enough feeling squares have been walked over to reveal the level feeling
    FeelingReady,
}

/// Receiver of game events
pub trait EventSink {
    fn publish(&mut self, event: GameEvent);
}

/// Ordered queue of events, drained by the consumer
///
/// An event already waiting in the queue is not queued again, so an
/// undrained queue holds at most one entry per grid plus one of each other
/// event.
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    events: VecDeque<GameEvent>,
    pending: HashSet<GameEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn pop(&mut self) -> Option<GameEvent> {
        let event = self.events.pop_front()?;
        self.pending.remove(&event);
        Some(event)
    }

    /// Take every pending event
    pub fn drain(&mut self) -> impl Iterator<Item = GameEvent> + '_ {
        self.pending.clear();
        self.events.drain(..)
    }

    pub fn contains(&self, event: GameEvent) -> bool {
        self.pending.contains(&event)
    }
}

impl EventSink for EventQueue {
    fn publish(&mut self, event: GameEvent) {
        if self.pending.insert(event) {
            self.events.push_back(event);
        }
    }
}

impl EventSink for Vec<GameEvent> {
    fn publish(&mut self, event: GameEvent) {
        self.push(event);
    }
}

/// Discards everything (used while a level is still being built)
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn publish(&mut self, _event: GameEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_order() {
        let mut q = EventQueue::new();
        q.publish(GameEvent::Map(Loc::new(1, 2)));
        q.publish(GameEvent::FeelingReady);
        assert_eq!(q.len(), 2);
        assert!(q.contains(GameEvent::FeelingReady));
        assert_eq!(q.pop(), Some(GameEvent::Map(Loc::new(1, 2))));
        let rest: Vec<_> = q.drain().collect();
        assert_eq!(rest, vec![GameEvent::FeelingReady]);
        assert!(q.is_empty());
    }

    #[test]
    fn test_repeated_events_are_coalesced() {
        let mut q = EventQueue::new();
        for _ in 0..3 {
            q.publish(GameEvent::Map(Loc::new(1, 2)));
            q.publish(GameEvent::ItemList);
        }
        q.publish(GameEvent::Map(Loc::new(2, 2)));
        assert_eq!(q.len(), 3);
        assert_eq!(q.pop(), Some(GameEvent::Map(Loc::new(1, 2))));
        // Queued again once the first one was taken
        q.publish(GameEvent::Map(Loc::new(1, 2)));
        let rest: Vec<_> = q.drain().collect();
        assert_eq!(
            rest,
            vec![GameEvent::ItemList, GameEvent::Map(Loc::new(2, 2)), GameEvent::Map(Loc::new(1, 2))]
        );
        q.publish(GameEvent::ItemList);
        assert_eq!(q.len(), 1);
    }
}
