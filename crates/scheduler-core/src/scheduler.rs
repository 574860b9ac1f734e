//! The scheduler facade: owns the store handle, the queues, and the working
//! counts, and decides which card to serve next.

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;

use srs_domain::{Card, CardQueue};

use crate::clock::Clock;
use crate::errors::Result;
use crate::events::{EventRegistry, SchedulerEvent};
use crate::options::{NewSpread, SchedulerOptions};
use crate::queues::CardQueues;
use crate::store::CollectionStore;
use crate::timing::{Timing, timing_for};

/// The (new, learning, review) workload remaining in the active decks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counts {
    pub new: u32,
    pub learning: u32,
    pub review: u32,
}

pub struct Scheduler<S: CollectionStore> {
    pub(crate) store: S,
    pub(crate) clock: Clock,
    pub(crate) options: SchedulerOptions,
    pub(crate) timing: Timing,
    pub(crate) queues: CardQueues,
    pub(crate) counts: Counts,
    pub(crate) rng: StdRng,
    pub(crate) events: EventRegistry,
    new_card_modulus: u32,
    reps: u32,
    have_queues: bool,
}

impl<S: CollectionStore> Scheduler<S> {
    pub fn new(store: S, options: SchedulerOptions) -> Self {
        Self::with_clock(store, options, Clock::System)
    }

    pub fn with_clock(store: S, options: SchedulerOptions, clock: Clock) -> Self {
        let timing = timing_for(store.creation_stamp(), clock.now_secs());
        Self {
            store,
            clock,
            options,
            timing,
            queues: CardQueues::default(),
            counts: Counts::default(),
            rng: StdRng::seed_from_u64(u64::from(timing.today)),
            events: EventRegistry::default(),
            new_card_modulus: 0,
            reps: 0,
            have_queues: false,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Consume the scheduler and return the underlying store.
    pub fn into_store(self) -> S {
        self.store
    }

    pub fn options(&self) -> &SchedulerOptions {
        &self.options
    }

    pub fn timing(&self) -> Timing {
        self.timing
    }

    /// Workload counters as maintained while cards are served.
    pub fn counts(&self) -> Counts {
        self.counts
    }

    pub fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    /// Register an observer for scheduler events.
    pub fn subscribe(&mut self, subscriber: impl FnMut(&SchedulerEvent) + 'static) {
        self.events.subscribe(Box::new(subscriber));
    }

    pub(crate) fn emit(&mut self, event: &SchedulerEvent) {
        self.events.emit(event);
    }

    /// Force queue rebuilding on the next request.
    pub(crate) fn invalidate_queues(&mut self) {
        self.have_queues = false;
    }

    /// Re-check the day boundary; crossing it rebuilds everything.
    pub(crate) fn check_day(&mut self) -> Result<()> {
        if self.clock.now_secs() >= self.timing.day_cutoff_secs {
            self.reset()?;
        }
        Ok(())
    }

    /// Rebuild timing, daily counters, and all three queues.
    pub fn reset(&mut self) -> Result<()> {
        self.update_cutoff()?;
        self.reset_counts()?;
        let active = self.store.active_decks();
        self.queues.clear(&active);
        self.rng = StdRng::seed_from_u64(u64::from(self.timing.today));
        self.update_new_card_modulus();
        self.reps = 0;
        self.have_queues = true;
        self.emit(&SchedulerEvent::QueuesReset);
        Ok(())
    }

    /// Recompute the review count and deck cursor; used when the queue runs
    /// dry while the count says otherwise.
    pub(crate) fn reset_review_state(&mut self) -> Result<()> {
        self.counts.review = self.walking_count(crate::limits::LimitKind::Review)?;
        self.queues.review_decks = self.store.active_decks().into_iter().collect();
        Ok(())
    }

    /// Same recovery for the new queue.
    pub(crate) fn reset_new_state(&mut self) -> Result<()> {
        self.counts.new = self.walking_count(crate::limits::LimitKind::New)?;
        self.queues.new_decks = self.store.active_decks().into_iter().collect();
        self.update_new_card_modulus();
        Ok(())
    }

    fn update_cutoff(&mut self) -> Result<()> {
        let previous = self.timing;
        self.timing = timing_for(self.store.creation_stamp(), self.clock.now_secs());
        if previous.today != self.timing.today {
            info!(
                today = self.timing.today,
                day_cutoff = self.timing.day_cutoff_secs,
                "day rolled over"
            );
        }
        let today = self.timing.today;
        for mut deck in self.store.all_decks()? {
            if deck.reset_counters_if_day_changed(today) {
                self.store.update_deck(&deck)?;
            }
        }
        let last_unburied = self.store.last_unburied_day();
        if last_unburied < today || today + 7 < last_unburied {
            self.unbury_scheduled_cards()?;
            self.store.set_last_unburied_day(today);
        }
        Ok(())
    }

    fn update_new_card_modulus(&mut self) {
        self.new_card_modulus = 0;
        if self.options.new_spread == NewSpread::Distribute && self.counts.new > 0 {
            let modulus = (self.counts.new + self.counts.review) / self.counts.new;
            self.new_card_modulus = if self.counts.review > 0 {
                modulus.max(2)
            } else {
                modulus
            };
        }
    }

    fn time_for_new_card(&self) -> bool {
        if self.counts.new == 0 {
            return false;
        }
        match self.options.new_spread {
            NewSpread::Last => false,
            NewSpread::First => true,
            NewSpread::Distribute => {
                self.new_card_modulus != 0
                    && self.reps > 0
                    && self.reps % self.new_card_modulus == 0
            }
        }
    }

    /// Serve the next due card, or `None` when the session is finished.
    pub fn next_card(&mut self) -> Result<Option<Card>> {
        self.check_day()?;
        if !self.have_queues {
            self.reset()?;
        }
        let card = self.next_card_inner()?;
        if card.is_some() {
            self.reps += 1;
        }
        Ok(card)
    }

    fn next_card_inner(&mut self) -> Result<Option<Card>> {
        // learning card due right now?
        if let Some(card) = self.pop_learning_card(false)? {
            return Ok(Some(card));
        }
        // new first, or time for one?
        if self.time_for_new_card() {
            if let Some(card) = self.pop_new_card()? {
                return Ok(Some(card));
            }
        }
        // card due for review?
        if let Some(card) = self.pop_review_card()? {
            return Ok(Some(card));
        }
        // day-learning card due?
        if let Some(card) = self.pop_day_learning_card()? {
            return Ok(Some(card));
        }
        // new cards left?
        if let Some(card) = self.pop_new_card()? {
            return Ok(Some(card));
        }
        // collapse: serve a learning card early rather than stalling
        self.pop_learning_card(true)
    }

    /// The workload triple adjusted for a card currently being answered,
    /// which still counts against the column it came from.
    #[must_use]
    pub fn counts_with_card(&self, card: &Card) -> Counts {
        let mut counts = self.counts;
        match card.queue {
            CardQueue::Learning | CardQueue::DayLearning => {
                counts.learning += u32::from(card.steps.remaining_today);
            }
            CardQueue::New | CardQueue::CramNew => counts.new += 1,
            CardQueue::Review => counts.review += 1,
            _ => {}
        }
        counts
    }
}
