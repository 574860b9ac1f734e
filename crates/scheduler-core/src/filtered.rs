//! Building and emptying filtered (cram) decks.

use rand::seq::SliceRandom;
use tracing::{info, warn};

use srs_domain::{
    Card, CardId, CardQueue, CardType, DeckId, FilteredSearchOrder, FilteredSearchTerm,
};

use crate::FILTERED_DUE_ORIGIN;
use crate::errors::{Result, SchedulerError};
use crate::scheduler::Scheduler;
use crate::store::{CollectionStore, StoreError};

impl<S: CollectionStore> Scheduler<S> {
    /// Empty the deck, re-run its first search term, and pull the matching
    /// cards in. Returns the ids that were gathered.
    pub fn rebuild_filtered_deck(&mut self, deck_id: DeckId) -> Result<Vec<CardId>> {
        self.check_day()?;
        let deck = self
            .store
            .get_deck(deck_id)?
            .ok_or(SchedulerError::DeckNotFound(deck_id))?;
        let Some(filtered) = deck.filtered().cloned() else {
            return Err(SchedulerError::NotFiltered(deck_id));
        };
        self.empty_filtered_deck(deck_id)?;
        let Some(term) = filtered.search_terms.first() else {
            return Ok(Vec::new());
        };
        let candidates = match self
            .store
            .filtered_deck_candidates(&term.search, self.timing.today)
        {
            Ok(candidates) => candidates,
            Err(StoreError::InvalidSearch(token)) => {
                warn!(deck_id = %deck_id, token, "filtered deck search failed");
                return Ok(Vec::new());
            }
            Err(error) => return Err(error.into()),
        };
        let ids = self.order_candidates(candidates, term);
        info!(deck_id = %deck_id, count = ids.len(), "rebuilt filtered deck");
        self.move_to_filtered(deck_id, &ids)?;
        self.invalidate_queues();
        Ok(ids)
    }

    /// Send every hosted card home, restoring the parked due value. Cards
    /// caught mid-learning are reset to new.
    pub fn empty_filtered_deck(&mut self, deck_id: DeckId) -> Result<()> {
        let deck = self
            .store
            .get_deck(deck_id)?
            .ok_or(SchedulerError::DeckNotFound(deck_id))?;
        if !deck.is_filtered() {
            return Err(SchedulerError::NotFiltered(deck_id));
        }
        for card_id in self.store.cards_in_deck(deck_id)? {
            let Some(mut card) = self.store.get_card(card_id)? else {
                continue;
            };
            if !card.is_in_filtered_deck() {
                continue;
            }
            self.unwind_filtered_card(&mut card);
            card.mtime_secs = self.clock.now_secs();
            card.usn = self.store.usn();
            self.store.update_card(&card)?;
        }
        self.invalidate_queues();
        Ok(())
    }

    /// Restore a hosted card's home deck and due value.
    pub(crate) fn unwind_filtered_card(&self, card: &mut Card) {
        card.remove_from_filtered_deck();
        if card.ctype == CardType::Learning {
            card.ctype = CardType::New;
            card.queue = CardQueue::CramNew;
        } else {
            card.restore_queue_from_type();
        }
    }

    fn order_candidates(&mut self, mut candidates: Vec<Card>, term: &FilteredSearchTerm) -> Vec<CardId> {
        match term.order {
            // the last-touched stamp stands in for the last review time
            FilteredSearchOrder::OldestReviewedFirst => {
                candidates.sort_by_key(|card| (card.mtime_secs, card.id));
            }
            FilteredSearchOrder::Random => candidates.shuffle(&mut self.rng),
            FilteredSearchOrder::IntervalsAscending => {
                candidates.sort_by_key(|card| (card.interval, card.id));
            }
            FilteredSearchOrder::IntervalsDescending => {
                candidates.sort_by_key(|card| (std::cmp::Reverse(card.interval), card.id));
            }
            FilteredSearchOrder::Lapses => {
                candidates.sort_by_key(|card| (std::cmp::Reverse(card.lapses), card.id));
            }
            FilteredSearchOrder::Added => candidates.sort_by_key(|card| card.id),
            FilteredSearchOrder::Due => candidates.sort_by_key(|card| (card.due, card.id)),
        }
        candidates.truncate(term.limit as usize);
        candidates.into_iter().map(|card| card.id).collect()
    }

    fn move_to_filtered(&mut self, deck_id: DeckId, ids: &[CardId]) -> Result<()> {
        let today = i64::from(self.timing.today);
        for (index, card_id) in ids.iter().enumerate() {
            let Some(mut card) = self.store.get_card(*card_id)? else {
                continue;
            };
            // overdue reviews keep their queue; everything else studies as
            // cram-new. Decided on the values before the move.
            let reference_due = if card.original_due != 0 {
                card.original_due
            } else {
                card.due
            };
            let queue = if card.ctype == CardType::Review && reference_due <= today {
                CardQueue::Review
            } else {
                CardQueue::CramNew
            };
            if card.original_deck_id.get() == 0 {
                card.original_deck_id = card.deck_id;
            }
            if card.original_due == 0 {
                card.original_due = card.due;
            }
            card.deck_id = deck_id;
            card.due = FILTERED_DUE_ORIGIN + index as i64;
            card.queue = queue;
            card.mtime_secs = self.clock.now_secs();
            card.usn = self.store.usn();
            self.store.update_card(&card)?;
        }
        Ok(())
    }

    /// Interval for a review card first answered inside a rescheduling
    /// filtered deck: credit the time elapsed since its last review.
    pub(crate) fn dynamic_interval_boost(&self, card: &Card) -> Result<u32> {
        if !card.is_in_filtered_deck() || card.ctype != CardType::Review || card.ease_factor == 0 {
            warn!(card_id = %card.id, "interval boost requested for ineligible card");
            return Ok(card.interval.max(1));
        }
        let last_review = card.original_due - i64::from(card.interval);
        let elapsed = i64::from(self.timing.today) - last_review;
        let factor = (f64::from(card.ease_factor) / 1000.0 + 1.2) / 2.0;
        let boosted = (elapsed as f64 * factor) as i64;
        let interval = boosted.max(i64::from(card.interval)).max(1) as u32;
        Ok(interval.min(self.review_config(card)?.max_interval))
    }
}
