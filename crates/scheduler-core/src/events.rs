//! Typed events emitted by the scheduler for front-ends to observe.

use srs_domain::{CardId, NoteId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerEvent {
    /// A card crossed the leech threshold while lapsing.
    LeechDetected { card_id: CardId, note_id: NoteId },
    /// A queued card no longer matched storage and was dropped.
    CardReverted { card_id: CardId },
    /// The in-memory queues were rebuilt.
    QueuesReset,
    /// An answer is about to mutate the card.
    BeforeStateChange { card_id: CardId },
    /// An answer finished mutating the card.
    AfterStateChange { card_id: CardId },
}

/// Subscriber list. Dispatch is synchronous and in registration order.
#[derive(Default)]
pub(crate) struct EventRegistry {
    subscribers: Vec<Box<dyn FnMut(&SchedulerEvent)>>,
}

impl EventRegistry {
    pub(crate) fn subscribe(&mut self, subscriber: Box<dyn FnMut(&SchedulerEvent)>) {
        self.subscribers.push(subscriber);
    }

    pub(crate) fn emit(&mut self, event: &SchedulerEvent) {
        for subscriber in &mut self.subscribers {
            subscriber(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn emit_reaches_every_subscriber_in_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut registry = EventRegistry::default();
        for tag in ["a", "b"] {
            let seen = Rc::clone(&seen);
            registry.subscribe(Box::new(move |event| {
                if matches!(event, SchedulerEvent::QueuesReset) {
                    seen.borrow_mut().push(tag);
                }
            }));
        }
        registry.emit(&SchedulerEvent::QueuesReset);
        assert_eq!(*seen.borrow(), vec!["a", "b"]);
    }
}
