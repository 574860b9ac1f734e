//! Administrative state changes: suspending, burying, and their undo.

use tracing::{info, warn};

use srs_domain::{Card, CardId, CardQueue, CardType, DeckId};

use crate::errors::Result;
use crate::scheduler::Scheduler;
use crate::store::CollectionStore;

/// Why a card is being buried; decides which bury queue it lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuryKind {
    /// Buried by hand; stays hidden until manually unburied.
    User,
    /// Buried as a sibling of an answered card; day rollover unburies it.
    Sibling,
}

impl BuryKind {
    fn queue(self) -> CardQueue {
        match self {
            BuryKind::User => CardQueue::UserBuried,
            BuryKind::Sibling => CardQueue::SchedBuried,
        }
    }
}

impl<S: CollectionStore> Scheduler<S> {
    /// Suspend cards so they are never served, first unwinding any
    /// filtered-deck hosting and learning state.
    pub fn suspend_cards(&mut self, ids: &[CardId]) -> Result<()> {
        self.for_each_card(ids, |scheduler, card| {
            scheduler.remove_card_from_learning(card)?;
            if card.is_in_filtered_deck() {
                scheduler.unwind_filtered_card(card);
            }
            card.queue = CardQueue::Suspended;
            Ok(true)
        })?;
        self.invalidate_queues();
        Ok(())
    }

    /// Reverse a suspension; the queue is re-derived from the card type.
    pub fn unsuspend_cards(&mut self, ids: &[CardId]) -> Result<()> {
        self.for_each_card(ids, |_, card| {
            if card.queue == CardQueue::Suspended {
                card.restore_queue_from_type();
                Ok(true)
            } else {
                Ok(false)
            }
        })?;
        self.invalidate_queues();
        Ok(())
    }

    /// Hide cards until unburied, unwinding filtered/learning state first.
    pub fn bury_cards(&mut self, ids: &[CardId], kind: BuryKind) -> Result<()> {
        self.bury_cards_inner(ids, kind)?;
        self.invalidate_queues();
        Ok(())
    }

    fn bury_cards_inner(&mut self, ids: &[CardId], kind: BuryKind) -> Result<()> {
        let queue = kind.queue();
        self.for_each_card(ids, |scheduler, card| {
            scheduler.remove_card_from_learning(card)?;
            if card.is_in_filtered_deck() {
                scheduler.unwind_filtered_card(card);
            }
            card.queue = queue;
            Ok(true)
        })
    }

    /// Flip manually buried cards back to their type, collection-wide.
    pub fn unbury_cards(&mut self) -> Result<()> {
        self.unbury_matching(|card| card.queue == CardQueue::UserBuried, None)?;
        self.invalidate_queues();
        Ok(())
    }

    /// Like [`Self::unbury_cards`], restricted to the active decks.
    pub fn unbury_cards_for_deck(&mut self) -> Result<()> {
        let active = self.store.active_decks();
        self.unbury_matching(|card| card.queue == CardQueue::UserBuried, Some(&active))?;
        self.invalidate_queues();
        Ok(())
    }

    /// Day-rollover unbury: only sibling-buried cards come back, and without
    /// being marked modified.
    pub(crate) fn unbury_scheduled_cards(&mut self) -> Result<()> {
        let mut count = 0usize;
        for deck in self.store.all_decks()? {
            for card_id in self.store.cards_in_deck(deck.id)? {
                let Some(mut card) = self.store.get_card(card_id)? else {
                    continue;
                };
                if card.queue == CardQueue::SchedBuried {
                    card.restore_queue_from_type();
                    self.store.update_card(&card)?;
                    count += 1;
                }
            }
        }
        if count > 0 {
            info!(count, "unburied sibling-buried cards at day rollover");
        }
        Ok(())
    }

    fn unbury_matching(
        &mut self,
        matches: impl Fn(&Card) -> bool,
        decks: Option<&[DeckId]>,
    ) -> Result<()> {
        let deck_ids = match decks {
            Some(ids) => ids.to_vec(),
            None => self.store.all_decks()?.into_iter().map(|deck| deck.id).collect(),
        };
        for deck_id in deck_ids {
            for card_id in self.store.cards_in_deck(deck_id)? {
                let Some(mut card) = self.store.get_card(card_id)? else {
                    continue;
                };
                if matches(&card) {
                    card.restore_queue_from_type();
                    card.mtime_secs = self.clock.now_secs();
                    card.usn = self.store.usn();
                    self.store.update_card(&card)?;
                }
            }
        }
        Ok(())
    }

    /// Take cards out of the learning queues: relearning reviews return to
    /// the review queue at their parked due date, learning new cards are
    /// reset to the end of the new queue.
    pub fn remove_from_learning(&mut self, ids: &[CardId]) -> Result<()> {
        self.for_each_card(ids, |scheduler, card| {
            if !card.queue.is_learning() {
                return Ok(false);
            }
            scheduler.remove_card_from_learning(card)?;
            Ok(true)
        })?;
        self.invalidate_queues();
        Ok(())
    }

    pub(crate) fn remove_card_from_learning(&mut self, card: &mut Card) -> Result<()> {
        if !card.queue.is_learning() {
            return Ok(());
        }
        if card.ctype == CardType::Review {
            card.due = card.original_due;
            card.original_due = 0;
            card.queue = CardQueue::Review;
        } else {
            let position = self.store.next_card_position();
            card.schedule_as_new(position);
        }
        Ok(())
    }

    /// Reset cards to brand new at the end of the new queue.
    pub fn reschedule_as_new(&mut self, ids: &[CardId]) -> Result<()> {
        self.for_each_card(ids, |scheduler, card| {
            let position = scheduler.store.next_card_position();
            card.schedule_as_new(position);
            Ok(true)
        })?;
        self.invalidate_queues();
        Ok(())
    }

    /// Bury the answered note's other new/due-review cards so only one card
    /// of the note is studied per day. Cards are dropped from the in-memory
    /// queues even when burying is disabled for their kind.
    pub(crate) fn bury_siblings_of(&mut self, card: &Card) -> Result<()> {
        let bury_new = self.new_config(card)?.bury;
        let bury_review = self.review_config(card)?.bury;
        let today = i64::from(self.timing.today);
        let mut to_bury = Vec::new();
        for sibling in self.store.sibling_cards(card.note_id, card.id)? {
            match sibling.queue {
                CardQueue::Review if sibling.due <= today => {
                    self.queues.discard(sibling.id);
                    if bury_review {
                        to_bury.push(sibling.id);
                    }
                }
                CardQueue::New | CardQueue::CramNew => {
                    self.queues.discard(sibling.id);
                    if bury_new {
                        to_bury.push(sibling.id);
                    }
                }
                _ => {}
            }
        }
        if !to_bury.is_empty() {
            // the queues were already pruned; no full rebuild needed
            self.bury_cards_inner(&to_bury, BuryKind::Sibling)?;
        }
        Ok(())
    }

    /// Load, transform, and write back each card; missing ids are skipped.
    fn for_each_card(
        &mut self,
        ids: &[CardId],
        mut apply: impl FnMut(&mut Self, &mut Card) -> Result<bool>,
    ) -> Result<()> {
        for id in ids {
            let Some(mut card) = self.store.get_card(*id)? else {
                warn!(card_id = %id, "skipping missing card");
                continue;
            };
            if apply(self, &mut card)? {
                card.mtime_secs = self.clock.now_secs();
                card.usn = self.store.usn();
                self.store.update_card(&card)?;
            }
        }
        Ok(())
    }
}
