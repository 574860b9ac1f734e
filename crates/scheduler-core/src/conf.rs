//! Resolving the configuration that applies to a particular card.
//!
//! Cards inside a filtered deck keep most behaviour from their home deck;
//! only the step delays may be overridden by the filtered deck itself, and
//! daily caps stop applying.

use srs_domain::{Card, DeckConfig, DeckConfigId, DeckId, DeckKind, LeechAction};

use crate::errors::{Result, SchedulerError};
use crate::scheduler::Scheduler;
use crate::store::CollectionStore;

/// New-card behaviour after filtered-deck merging.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ResolvedNew {
    pub delays: Vec<f32>,
    pub intervals: [u32; 3],
    pub initial_factor: u16,
    pub bury: bool,
}

/// Lapse behaviour after filtered-deck merging.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ResolvedLapse {
    pub delays: Vec<f32>,
    pub multiplier: f32,
    pub min_interval: u32,
    pub leech_fails: u32,
    pub leech_action: LeechAction,
}

/// Review behaviour; always taken from the home deck.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ResolvedReview {
    pub easy_multiplier: f32,
    pub interval_multiplier: f32,
    pub max_interval: u32,
    pub bury: bool,
}

impl<S: CollectionStore> Scheduler<S> {
    /// Configuration of the deck the card belongs to long-term: the original
    /// deck while the card is in a filtered deck, its own deck otherwise.
    pub(crate) fn home_config(&self, card: &Card) -> Result<DeckConfig> {
        let home = if card.is_in_filtered_deck() {
            card.original_deck_id
        } else {
            card.deck_id
        };
        self.config_for_deck(home)
    }

    pub(crate) fn config_for_deck(&self, deck_id: DeckId) -> Result<DeckConfig> {
        let deck = self
            .store
            .get_deck(deck_id)?
            .ok_or(SchedulerError::DeckNotFound(deck_id))?;
        let config_id = deck
            .config_id()
            .ok_or(SchedulerError::DeckConfigNotFound(DeckConfigId(0)))?;
        self.store
            .deck_config(config_id)?
            .ok_or(SchedulerError::DeckConfigNotFound(config_id))
    }

    /// Step delays a filtered deck imposes, if the card is in one.
    fn filtered_delay_override(&self, card: &Card) -> Result<Option<Vec<f32>>> {
        if !card.is_in_filtered_deck() {
            return Ok(None);
        }
        Ok(self
            .store
            .get_deck(card.deck_id)?
            .and_then(|deck| match deck.kind {
                DeckKind::Filtered(filtered) => filtered.delays,
                DeckKind::Normal(_) => None,
            }))
    }

    pub(crate) fn new_config(&self, card: &Card) -> Result<ResolvedNew> {
        let home = self.home_config(card)?;
        let delays = if card.is_in_filtered_deck() {
            self.filtered_delay_override(card)?
                .unwrap_or_else(|| home.new.delays.clone())
        } else {
            home.new.delays
        };
        Ok(ResolvedNew {
            delays,
            intervals: home.new.intervals,
            initial_factor: home.new.initial_factor,
            bury: home.new.bury,
        })
    }

    pub(crate) fn lapse_config(&self, card: &Card) -> Result<ResolvedLapse> {
        let home = self.home_config(card)?;
        let delays = if card.is_in_filtered_deck() {
            self.filtered_delay_override(card)?
                .unwrap_or_else(|| home.lapse.delays.clone())
        } else {
            home.lapse.delays
        };
        Ok(ResolvedLapse {
            delays,
            multiplier: home.lapse.multiplier,
            min_interval: home.lapse.min_interval,
            leech_fails: home.lapse.leech_fails,
            leech_action: home.lapse.leech_action,
        })
    }

    pub(crate) fn review_config(&self, card: &Card) -> Result<ResolvedReview> {
        let home = self.home_config(card)?;
        Ok(ResolvedReview {
            easy_multiplier: home.review.easy_multiplier,
            interval_multiplier: home.review.interval_multiplier,
            max_interval: home.review.max_interval,
            bury: home.review.bury,
        })
    }

    /// Whether answers should reschedule this card: always for normal decks,
    /// per the deck's setting in a filtered deck.
    pub(crate) fn reschedule_enabled(&self, card: &Card) -> Result<bool> {
        let deck = self
            .store
            .get_deck(card.deck_id)?
            .ok_or(SchedulerError::DeckNotFound(card.deck_id))?;
        Ok(match deck.kind {
            DeckKind::Normal(_) => true,
            DeckKind::Filtered(filtered) => filtered.reschedule,
        })
    }
}
