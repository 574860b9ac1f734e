//! The three in-memory queues served during study, and how they refill.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::warn;

use srs_domain::{Card, CardId, CardQueue, DeckId, NewCardOrder};

use crate::errors::Result;
use crate::events::SchedulerEvent;
use crate::scheduler::Scheduler;
use crate::store::CollectionStore;
use crate::{QUEUE_LIMIT, REPORT_LIMIT};

/// Heap entry for sub-day learning cards. The insertion order breaks due
/// ties so the heap pops deterministically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct LearnEntry {
    pub due_secs: i64,
    pub order: u64,
    pub id: CardId,
}

#[derive(Default)]
pub(crate) struct CardQueues {
    pub learning: BinaryHeap<Reverse<LearnEntry>>,
    next_learn_order: u64,
    pub day_learning: Vec<CardId>,
    pub review: Vec<CardId>,
    pub new: Vec<CardId>,
    pub review_decks: VecDeque<DeckId>,
    pub new_decks: VecDeque<DeckId>,
    pub day_learn_decks: VecDeque<DeckId>,
}

impl CardQueues {
    /// Drop all queued ids and point the per-deck cursors at `active`.
    pub fn clear(&mut self, active: &[DeckId]) {
        self.learning.clear();
        self.next_learn_order = 0;
        self.day_learning.clear();
        self.review.clear();
        self.new.clear();
        self.review_decks = active.iter().copied().collect();
        self.new_decks = active.iter().copied().collect();
        self.day_learn_decks = active.iter().copied().collect();
    }

    pub fn push_learning(&mut self, due_secs: i64, id: CardId) {
        let order = self.next_learn_order;
        self.next_learn_order += 1;
        self.learning.push(Reverse(LearnEntry {
            due_secs,
            order,
            id,
        }));
    }

    /// Due of the next learning card, if any.
    pub fn peek_learning_due(&self) -> Option<i64> {
        self.learning.peek().map(|Reverse(entry)| entry.due_secs)
    }

    /// Drop an id from the review and new queues (sibling spacing).
    pub fn discard(&mut self, id: CardId) {
        self.review.retain(|queued| *queued != id);
        self.new.retain(|queued| *queued != id);
    }
}

/// A shuffle that only depends on the day index, so re-entering the queue
/// mid-day reproduces the same ordering.
fn day_seeded_shuffle<T>(items: &mut [T], today: u32) {
    let mut rng = StdRng::seed_from_u64(u64::from(today));
    items.shuffle(&mut rng);
}

impl<S: CollectionStore> Scheduler<S> {
    /// Fetch a popped id, dropping it when storage no longer agrees with the
    /// queue it came from.
    fn take_queued_card(
        &mut self,
        id: CardId,
        expected: impl Fn(CardQueue) -> bool,
    ) -> Result<Option<Card>> {
        match self.store.get_card(id)? {
            Some(card) if expected(card.queue) => Ok(Some(card)),
            Some(card) => {
                warn!(card_id = %id, queue = ?card.queue, "queued card changed under us; skipping");
                self.emit(&SchedulerEvent::CardReverted { card_id: id });
                Ok(None)
            }
            None => {
                warn!(card_id = %id, "queued card vanished from storage; skipping");
                self.emit(&SchedulerEvent::CardReverted { card_id: id });
                Ok(None)
            }
        }
    }

    pub(crate) fn fill_learning(&mut self) -> Result<bool> {
        if self.counts.learning == 0 {
            return Ok(false);
        }
        if !self.queues.learning.is_empty() {
            return Ok(true);
        }
        let active = self.store.active_decks();
        let rows = self.store.learning_cards_due_before(
            &active,
            self.timing.day_cutoff_secs,
            REPORT_LIMIT,
        )?;
        for (due, id) in rows {
            self.queues.push_learning(due, id);
        }
        Ok(!self.queues.learning.is_empty())
    }

    pub(crate) fn pop_learning_card(&mut self, collapse: bool) -> Result<Option<Card>> {
        if !self.fill_learning()? {
            return Ok(None);
        }
        let collapse_window = if collapse {
            i64::from(self.options.collapse_time_secs)
        } else {
            0
        };
        let cutoff = self.clock.now_secs() + collapse_window;
        while let Some(due) = self.queues.peek_learning_due() {
            if due >= cutoff {
                return Ok(None);
            }
            let Reverse(entry) = self.queues.learning.pop().expect("peeked entry");
            if let Some(card) =
                self.take_queued_card(entry.id, |queue| queue == CardQueue::Learning)?
            {
                self.counts.learning = self
                    .counts
                    .learning
                    .saturating_sub(u32::from(card.steps.remaining_today));
                return Ok(Some(card));
            }
        }
        Ok(None)
    }

    fn fill_day_learning(&mut self) -> Result<bool> {
        if self.counts.learning == 0 {
            return Ok(false);
        }
        if !self.queues.day_learning.is_empty() {
            return Ok(true);
        }
        while let Some(&deck) = self.queues.day_learn_decks.front() {
            let mut ids =
                self.store
                    .day_learning_cards(deck, self.timing.today, QUEUE_LIMIT)?;
            if !ids.is_empty() {
                day_seeded_shuffle(&mut ids, self.timing.today);
                if ids.len() < QUEUE_LIMIT {
                    self.queues.day_learn_decks.pop_front();
                }
                self.queues.day_learning = ids;
                return Ok(true);
            }
            self.queues.day_learn_decks.pop_front();
        }
        Ok(false)
    }

    pub(crate) fn pop_day_learning_card(&mut self) -> Result<Option<Card>> {
        while self.fill_day_learning()? {
            let Some(id) = self.queues.day_learning.pop() else {
                continue;
            };
            if let Some(card) =
                self.take_queued_card(id, |queue| queue == CardQueue::DayLearning)?
            {
                self.counts.learning = self.counts.learning.saturating_sub(1);
                return Ok(Some(card));
            }
        }
        Ok(None)
    }

    fn fill_review(&mut self, allow_recount: bool) -> Result<bool> {
        if !self.queues.review.is_empty() {
            return Ok(true);
        }
        if self.counts.review == 0 {
            return Ok(false);
        }
        while let Some(&deck_id) = self.queues.review_decks.front() {
            let limit = QUEUE_LIMIT.min(self.deck_review_limit(deck_id)? as usize);
            if limit > 0 {
                let mut ids = self
                    .store
                    .review_cards_due(deck_id, self.timing.today, limit)?;
                if !ids.is_empty() {
                    let filtered = self
                        .store
                        .get_deck(deck_id)?
                        .is_some_and(|deck| deck.is_filtered());
                    if filtered {
                        // preserve stored due order; the queue pops from the
                        // back
                        ids.reverse();
                    } else {
                        day_seeded_shuffle(&mut ids, self.timing.today);
                    }
                    if ids.len() < limit {
                        self.queues.review_decks.pop_front();
                    }
                    self.queues.review = ids;
                    return Ok(true);
                }
            }
            self.queues.review_decks.pop_front();
        }
        // the count said there was something left; it may live in a deck we
        // already passed, so recount and walk the decks once more
        if allow_recount && self.counts.review > 0 {
            self.reset_review_state()?;
            return self.fill_review(false);
        }
        Ok(false)
    }

    pub(crate) fn pop_review_card(&mut self) -> Result<Option<Card>> {
        while self.fill_review(true)? {
            let Some(id) = self.queues.review.pop() else {
                continue;
            };
            if let Some(card) = self.take_queued_card(id, |queue| queue == CardQueue::Review)? {
                self.counts.review = self.counts.review.saturating_sub(1);
                return Ok(Some(card));
            }
        }
        Ok(None)
    }

    fn fill_new(&mut self, allow_recount: bool) -> Result<bool> {
        if !self.queues.new.is_empty() {
            return Ok(true);
        }
        if self.counts.new == 0 {
            return Ok(false);
        }
        while let Some(&deck_id) = self.queues.new_decks.front() {
            let limit = QUEUE_LIMIT.min(self.deck_new_limit(deck_id)? as usize);
            if limit > 0 {
                let mut ids = self.store.new_cards(deck_id, limit)?;
                if !ids.is_empty() {
                    match self.new_card_order(deck_id)? {
                        NewCardOrder::Random => day_seeded_shuffle(&mut ids, self.timing.today),
                        // lowest position first; the queue pops from the back
                        NewCardOrder::Due => ids.reverse(),
                    }
                    if ids.len() < limit {
                        self.queues.new_decks.pop_front();
                    }
                    self.queues.new = ids;
                    return Ok(true);
                }
            }
            self.queues.new_decks.pop_front();
        }
        if allow_recount && self.counts.new > 0 {
            self.reset_new_state()?;
            return self.fill_new(false);
        }
        Ok(false)
    }

    pub(crate) fn pop_new_card(&mut self) -> Result<Option<Card>> {
        while self.fill_new(true)? {
            let Some(id) = self.queues.new.pop() else {
                continue;
            };
            if let Some(card) = self.take_queued_card(id, |queue| {
                matches!(queue, CardQueue::New | CardQueue::CramNew)
            })? {
                self.counts.new = self.counts.new.saturating_sub(1);
                return Ok(Some(card));
            }
        }
        Ok(None)
    }

    fn new_card_order(&self, deck_id: DeckId) -> Result<NewCardOrder> {
        let Some(deck) = self.store.get_deck(deck_id)? else {
            return Ok(NewCardOrder::Due);
        };
        match deck.config_id() {
            Some(config_id) => Ok(self
                .store
                .deck_config(config_id)?
                .map_or(NewCardOrder::Due, |config| config.new.order)),
            // filtered decks keep their gathered order
            None => Ok(NewCardOrder::Due),
        }
    }
}
