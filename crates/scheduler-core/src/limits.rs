//! Per-deck daily limits and how they cascade down the deck tree.

use std::collections::HashMap;

use srs_domain::{Deck, DeckId, immediate_parent_name};

use crate::REPORT_LIMIT;
use crate::errors::{Result, SchedulerError};
use crate::scheduler::Scheduler;
use crate::store::CollectionStore;

/// Which daily cap is being evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LimitKind {
    New,
    Review,
}

impl<S: CollectionStore> Scheduler<S> {
    /// A deck's own remaining budget for today, ignoring ancestors.
    /// Filtered decks are never capped.
    pub(crate) fn deck_limit_single(&self, deck: &Deck, kind: LimitKind) -> Result<u32> {
        if deck.is_filtered() {
            return Ok(REPORT_LIMIT as u32);
        }
        let config = self.config_for_deck(deck.id)?;
        let today = self.timing.today;
        let done_new = deck.common.new_today.for_day(today);
        let done_rev = deck.common.review_today.for_day(today);
        let remaining = match kind {
            LimitKind::New => i64::from(config.new.per_day) - i64::from(done_new),
            LimitKind::Review => i64::from(config.review.per_day) - i64::from(done_rev),
        };
        let remaining = if self.options.limit_all_cards {
            let combined =
                i64::from(config.per_day_total) - i64::from(done_rev) - i64::from(done_new);
            remaining.min(combined)
        } else {
            remaining
        };
        Ok(remaining.max(0) as u32)
    }

    /// Remaining budget for a deck after its ancestors' budgets are applied.
    pub(crate) fn deck_limit_with_parents(
        &self,
        deck_id: DeckId,
        kind: LimitKind,
    ) -> Result<u32> {
        let deck = self
            .store
            .get_deck(deck_id)?
            .ok_or(SchedulerError::DeckNotFound(deck_id))?;
        let mut limit = self.deck_limit_single(&deck, kind)?;
        for parent in self.parent_decks(&deck)? {
            limit = limit.min(self.deck_limit_single(&parent, kind)?);
        }
        Ok(limit)
    }

    pub(crate) fn deck_new_limit(&self, deck_id: DeckId) -> Result<u32> {
        self.deck_limit_with_parents(deck_id, LimitKind::New)
    }

    pub(crate) fn deck_review_limit(&self, deck_id: DeckId) -> Result<u32> {
        self.deck_limit_with_parents(deck_id, LimitKind::Review)
    }

    /// Ancestor decks, nearest first, resolved through the `::` name chain.
    pub(crate) fn parent_decks(&self, deck: &Deck) -> Result<Vec<Deck>> {
        let by_name: HashMap<String, Deck> = self
            .store
            .all_decks()?
            .into_iter()
            .map(|deck| (deck.name.clone(), deck))
            .collect();
        let mut parents = Vec::new();
        let mut name = deck.name.as_str();
        while let Some(parent_name) = immediate_parent_name(name) {
            match by_name.get(parent_name) {
                Some(parent) => parents.push(parent.clone()),
                None => break,
            }
            name = parent_name;
        }
        Ok(parents)
    }

    /// Sum a capped count over the active decks. Children consume their
    /// parents' remaining budget as they are visited.
    pub(crate) fn walking_count(&self, kind: LimitKind) -> Result<u32> {
        let mut total: u32 = 0;
        let mut parent_budgets: HashMap<DeckId, i64> = HashMap::new();
        for deck_id in self.store.active_decks() {
            let Some(deck) = self.store.get_deck(deck_id)? else {
                continue;
            };
            let mut limit = i64::from(self.deck_limit_single(&deck, kind)?);
            if limit == 0 {
                continue;
            }
            let parents = self.parent_decks(&deck)?;
            for parent in &parents {
                if !parent_budgets.contains_key(&parent.id) {
                    let budget = i64::from(self.deck_limit_single(parent, kind)?);
                    parent_budgets.insert(parent.id, budget);
                }
                limit = limit.min(parent_budgets[&parent.id]);
            }
            let count = self.count_for_deck(deck_id, limit.max(0) as usize, kind)?;
            for parent in &parents {
                if let Some(budget) = parent_budgets.get_mut(&parent.id) {
                    *budget -= i64::from(count);
                }
            }
            total += count;
        }
        Ok(total)
    }

    fn count_for_deck(&self, deck_id: DeckId, limit: usize, kind: LimitKind) -> Result<u32> {
        Ok(match kind {
            LimitKind::New => self.store.new_card_count(deck_id, limit)?,
            LimitKind::Review => {
                self.store
                    .review_count_due(deck_id, self.timing.today, limit)?
            }
        })
    }
}
