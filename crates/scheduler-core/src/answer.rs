//! The answer engine: every card mutation caused by grading goes through
//! here, inside one storage transaction per answer.

use rand::Rng;
use tracing::{debug, warn};

use srs_domain::{
    Card, CardQueue, CardType, DeckId, Ease, LEECH_TAG, LearnProgress, MINIMUM_EASE_FACTOR,
    RevlogEntry, RevlogId, RevlogKind,
};

use crate::conf::{ResolvedLapse, ResolvedNew};
use crate::errors::{Result, SchedulerError};
use crate::events::SchedulerEvent;
use crate::fuzz::{constrained_interval, fuzzed_interval};
use crate::options::SchedulerVersion;
use crate::scheduler::Scheduler;
use crate::store::{CollectionStore, StoreError};

/// Which deck counter an answer feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatKind {
    New,
    Learn,
    Review,
    TimeMs,
}

/// Seconds until the step for `remaining` outstanding steps. Steps are
/// consumed from the front of `delays`, so `remaining` indexes from the
/// back; out-of-range values fall back to the first step.
pub(crate) fn delay_for_grade(delays: &[f32], remaining: u16) -> f64 {
    let remaining = usize::from(remaining) % 1000;
    let minutes = if remaining == 0 || remaining > delays.len() {
        delays.first().copied().unwrap_or(1.0)
    } else {
        delays[delays.len() - remaining]
    };
    f64::from(minutes) * 60.0
}

/// How many of the `remaining` trailing steps still fit before the day
/// cutoff, starting from `now`. Always at least one.
pub(crate) fn steps_completable_today(
    delays: &[f32],
    remaining: usize,
    now_secs: i64,
    day_cutoff_secs: i64,
) -> u16 {
    let start = delays.len().saturating_sub(remaining);
    let mut now = now_secs;
    let mut fitting = 0;
    for (index, minutes) in delays[start..].iter().enumerate() {
        now += (f64::from(*minutes) * 60.0) as i64;
        if now > day_cutoff_secs {
            break;
        }
        fitting = index;
    }
    (fitting + 1) as u16
}

impl<S: CollectionStore> Scheduler<S> {
    /// Apply the user's grade to a card previously served by the picker.
    ///
    /// Mutates the card in place, appends a review log row, updates the
    /// daily counters of the deck and its ancestors, and re-queues the card
    /// when it stays in learning. All writes happen in one transaction.
    pub fn answer_card(&mut self, card: &mut Card, ease: Ease, time_taken_ms: u32) -> Result<()> {
        self.check_day()?;
        if !matches!(
            card.queue,
            CardQueue::New
                | CardQueue::CramNew
                | CardQueue::Learning
                | CardQueue::DayLearning
                | CardQueue::Review
        ) {
            warn!(card_id = %card.id, queue = ?card.queue, "refusing to answer card");
            return Err(SchedulerError::InvalidQueue {
                card_id: card.id,
                queue: card.queue,
            });
        }
        self.emit(&SchedulerEvent::BeforeStateChange { card_id: card.id });
        self.store.begin_transaction();
        match self.answer_card_inner(card, ease, time_taken_ms) {
            Ok(()) => {
                self.store.commit();
                self.emit(&SchedulerEvent::AfterStateChange { card_id: card.id });
                Ok(())
            }
            Err(error) => {
                self.store.rollback();
                warn!(card_id = %card.id, %error, "answer failed; transaction rolled back");
                Err(error)
            }
        }
    }

    fn answer_card_inner(&mut self, card: &mut Card, ease: Ease, time_taken_ms: u32) -> Result<()> {
        if self.options.bury_siblings_on_answer {
            self.bury_siblings_of(card)?;
        }
        card.reps += 1;
        let was_new_type = card.ctype == CardType::New;
        let was_new_queue = matches!(card.queue, CardQueue::New | CardQueue::CramNew);
        if was_new_queue {
            card.queue = CardQueue::Learning;
            if card.ctype == CardType::New {
                card.ctype = CardType::Learning;
            }
            card.steps = self.starting_steps(card)?;
            // a review card first seen inside a rescheduling filtered deck
            // gets its interval boosted
            if card.is_in_filtered_deck()
                && card.ctype == CardType::Review
                && self.reschedule_enabled(card)?
            {
                card.interval = self.dynamic_interval_boost(card)?;
                card.original_due = i64::from(self.timing.today) + i64::from(card.interval);
            }
            self.update_deck_stats(card.deck_id, StatKind::New, 1)?;
        }
        match card.queue {
            CardQueue::Learning | CardQueue::DayLearning => {
                self.answer_learning_card(card, ease, was_new_type, time_taken_ms)?;
                if !was_new_queue {
                    self.update_deck_stats(card.deck_id, StatKind::Learn, 1)?;
                }
            }
            CardQueue::Review => {
                self.answer_review_card(card, ease, time_taken_ms)?;
                self.update_deck_stats(card.deck_id, StatKind::Review, 1)?;
            }
            queue => {
                return Err(SchedulerError::InvalidQueue {
                    card_id: card.id,
                    queue,
                });
            }
        }
        self.update_deck_stats(card.deck_id, StatKind::TimeMs, time_taken_ms as i32)?;
        card.mtime_secs = self.clock.now_secs();
        card.usn = self.store.usn();
        self.store.update_card(card)?;
        Ok(())
    }

    // Learning answers ----------------------------------------------------

    fn answer_learning_card(
        &mut self,
        card: &mut Card,
        ease: Ease,
        was_new: bool,
        time_taken_ms: u32,
    ) -> Result<()> {
        let relearning = card.ctype == CardType::Review;
        let new_conf = self.new_config(card)?;
        let lapse_conf = self.lapse_config(card)?;
        let delays = if relearning {
            lapse_conf.delays.clone()
        } else {
            new_conf.delays.clone()
        };
        let kind = if card.is_in_filtered_deck() && !was_new {
            RevlogKind::Cram
        } else if relearning {
            RevlogKind::Relearning
        } else {
            RevlogKind::Learning
        };
        let last_steps = card.steps;
        let mut leaving = false;
        // learning cards show three buttons: 1 fails, 2 advances one step,
        // 3 graduates immediately
        match ease {
            Ease::Good => {
                self.graduate_card(card, &new_conf, true)?;
                leaving = true;
            }
            Ease::Hard if card.steps.remaining_total <= 1 => {
                self.graduate_card(card, &new_conf, false)?;
                leaving = true;
            }
            Ease::Hard => {
                let remaining = card.steps.remaining_total - 1;
                card.steps = LearnProgress {
                    remaining_today: steps_completable_today(
                        &delays,
                        usize::from(remaining),
                        self.clock.now_secs(),
                        self.timing.day_cutoff_secs,
                    ),
                    remaining_total: remaining,
                };
                self.schedule_learning_step(card, &delays)?;
            }
            _ => {
                // failed: back to the first step
                card.steps = self.starting_steps(card)?;
                if relearning {
                    let reschedule = self.reschedule_enabled(card)?;
                    if reschedule && lapse_conf.multiplier > 0.0 {
                        let shrunk = (card.interval as f32 * lapse_conf.multiplier) as u32;
                        card.interval = shrunk.max(lapse_conf.min_interval).max(1);
                    }
                    if reschedule && card.is_in_filtered_deck() {
                        card.original_due = i64::from(self.timing.today) + 1;
                    }
                }
                self.schedule_learning_step(card, &delays)?;
            }
        }
        self.log_learning_answer(card, ease, &delays, leaving, kind, last_steps, time_taken_ms)
    }

    /// Place a learning card at its next step, in the sub-day heap when the
    /// step lands before the cutoff, otherwise in the day-learning queue.
    fn schedule_learning_step(&mut self, card: &mut Card, delays: &[f32]) -> Result<()> {
        let now = self.clock.now_secs();
        let mut delay = delay_for_grade(delays, card.steps.remaining_total);
        if self.options.version == SchedulerVersion::V1 && card.due < now {
            // overdue steps get spread a little
            delay *= self.rng.gen_range(1.0..1.25);
        }
        card.due = now + delay as i64;
        if self.options.version == SchedulerVersion::V2 && card.due < self.timing.day_cutoff_secs {
            let max_extra = (delay * 0.25).min(300.0) as i64;
            let extra = self.rng.gen_range(0..max_extra.max(1));
            card.due = (card.due + extra).min(self.timing.day_cutoff_secs - 1);
        }
        if card.due < self.timing.day_cutoff_secs {
            self.counts.learning += u32::from(card.steps.remaining_today);
            card.queue = CardQueue::Learning;
            // don't land at the head of an otherwise idle queue, or the same
            // card would be served twice in a row
            if self.counts.review == 0 && self.counts.new == 0 {
                if let Some(head_due) = self.queues.peek_learning_due() {
                    card.due = card.due.max(head_due + 1);
                }
            }
            self.queues.push_learning(card.due, card.id);
        } else {
            let days_ahead = (card.due - self.timing.day_cutoff_secs) / 86_400 + 1;
            card.due = i64::from(self.timing.today) + days_ahead;
            card.queue = CardQueue::DayLearning;
        }
        Ok(())
    }

    /// Move a learning card into the review queue.
    fn graduate_card(&mut self, card: &mut Card, conf: &ResolvedNew, early: bool) -> Result<()> {
        let lapsed = card.ctype == CardType::Review;
        let reschedule = self.reschedule_enabled(card)?;
        if lapsed {
            // relearning finished; the original review date was parked in
            // original_due
            card.due = if reschedule {
                card.original_due.max(i64::from(self.timing.today) + 1)
            } else {
                card.original_due
            };
            card.original_due = 0;
        } else {
            card.interval = self.graduating_interval(card, conf, early, true)?;
            card.due = i64::from(self.timing.today) + i64::from(card.interval);
            card.ease_factor = conf.initial_factor;
        }
        card.queue = CardQueue::Review;
        card.ctype = CardType::Review;
        if card.is_in_filtered_deck() {
            card.deck_id = card.original_deck_id;
            card.original_deck_id = DeckId(0);
            card.original_due = 0;
            if !reschedule && !lapsed {
                card.queue = CardQueue::CramNew;
                card.ctype = CardType::New;
                card.due = i64::from(self.store.next_card_position());
            }
        }
        Ok(())
    }

    pub(crate) fn graduating_interval(
        &mut self,
        card: &Card,
        conf: &ResolvedNew,
        early: bool,
        fuzz: bool,
    ) -> Result<u32> {
        if card.ctype == CardType::Review {
            // lapsed card being relearnt keeps its interval, boosted when it
            // sits in a rescheduling filtered deck
            if card.is_in_filtered_deck() && self.reschedule_enabled(card)? {
                return self.dynamic_interval_boost(card);
            }
            return Ok(card.interval);
        }
        let ideal = if early {
            conf.intervals[1]
        } else {
            conf.intervals[0]
        };
        Ok(if fuzz {
            self.adjusted_review_interval(ideal)
        } else {
            ideal
        })
    }

    /// Fuzz an interval unless spreading is disabled.
    pub(crate) fn adjusted_review_interval(&mut self, ideal: u32) -> u32 {
        if self.options.spread_reviews {
            fuzzed_interval(&mut self.rng, ideal)
        } else {
            ideal
        }
    }

    /// Full step stack for a card entering (re)learning.
    pub(crate) fn starting_steps(&self, card: &Card) -> Result<LearnProgress> {
        let delays = if card.ctype == CardType::Review {
            self.lapse_config(card)?.delays
        } else {
            self.new_config(card)?.delays
        };
        let total = delays.len() as u16;
        let today = steps_completable_today(
            &delays,
            delays.len(),
            self.clock.now_secs(),
            self.timing.day_cutoff_secs,
        );
        Ok(LearnProgress {
            remaining_today: today,
            remaining_total: total,
        })
    }

    // Review answers -------------------------------------------------------

    fn answer_review_card(&mut self, card: &mut Card, ease: Ease, time_taken_ms: u32) -> Result<()> {
        let last_interval = card.interval;
        let delay_secs = if ease == Ease::Again {
            self.reschedule_lapse(card)?
        } else {
            self.reschedule_review(card, ease)?;
            0.0
        };
        self.log_review_answer(card, ease, delay_secs, last_interval, time_taken_ms)
    }

    /// Handle Again on a review card. Returns the relearning delay in
    /// seconds, zero when no relearning step was added.
    fn reschedule_lapse(&mut self, card: &mut Card) -> Result<f64> {
        let conf = self.lapse_config(card)?;
        if self.reschedule_enabled(card)? {
            card.lapses += 1;
            card.interval = next_lapse_interval(card, &conf);
            card.ease_factor = card
                .ease_factor
                .saturating_sub(200)
                .max(MINIMUM_EASE_FACTOR);
            card.due = i64::from(self.timing.today) + i64::from(card.interval);
            if card.is_in_filtered_deck() {
                card.original_due = card.due;
            }
        }
        let leech = leech_threshold_hit(card.lapses, conf.leech_fails);
        if self.options.version == SchedulerVersion::V1 && leech {
            self.apply_leech(card, &conf)?;
            if card.queue == CardQueue::Suspended {
                return Ok(0.0);
            }
        }
        if conf.delays.is_empty() {
            if self.options.version == SchedulerVersion::V2 && leech {
                self.apply_leech(card, &conf)?;
            }
            return Ok(0.0);
        }
        // park the review due date for when relearning finishes
        if card.original_due == 0 {
            card.original_due = card.due;
        }
        let delay = delay_for_grade(&conf.delays, 0);
        let now = self.clock.now_secs();
        card.due = now + delay as i64;
        let total = conf.delays.len() as u16;
        card.steps = LearnProgress {
            remaining_today: steps_completable_today(
                &conf.delays,
                conf.delays.len(),
                now,
                self.timing.day_cutoff_secs,
            ),
            remaining_total: total,
        };
        if card.due < self.timing.day_cutoff_secs {
            card.queue = CardQueue::Learning;
        } else {
            let days_ahead = (card.due - self.timing.day_cutoff_secs) / 86_400 + 1;
            card.due = i64::from(self.timing.today) + days_ahead;
            card.queue = CardQueue::DayLearning;
        }
        if self.options.version == SchedulerVersion::V2 && leech {
            self.apply_leech(card, &conf)?;
        }
        if card.queue == CardQueue::Learning {
            self.counts.learning += u32::from(card.steps.remaining_today);
            self.queues.push_learning(card.due, card.id);
        }
        Ok(delay)
    }

    /// Handle a successful review.
    fn reschedule_review(&mut self, card: &mut Card, ease: Ease) -> Result<()> {
        if self.reschedule_enabled(card)? {
            self.update_review_interval(card, ease)?;
            let adjustment: i32 = match ease {
                Ease::Hard => -150,
                Ease::Good => 0,
                _ => 150,
            };
            card.ease_factor = ((i32::from(card.ease_factor) + adjustment)
                .max(i32::from(MINIMUM_EASE_FACTOR))) as u16;
            card.due = i64::from(self.timing.today) + i64::from(card.interval);
        } else {
            card.due = card.original_due;
        }
        if card.is_in_filtered_deck() {
            card.deck_id = card.original_deck_id;
            card.original_deck_id = DeckId(0);
            card.original_due = 0;
        }
        Ok(())
    }

    /// Next interval for a successfully reviewed card, before fuzz.
    pub(crate) fn next_review_interval(&self, card: &Card, ease: Ease) -> Result<u32> {
        debug_assert!(ease != Ease::Again);
        let conf = self.review_config(card)?;
        let late = i64::from(self.days_late(card));
        let interval = i64::from(card.interval);
        let factor = f64::from(card.ease_factor) / 1000.0;
        let hard = constrained_interval(
            (interval + late / 4) as f64 * 1.2,
            conf.interval_multiplier,
            card.interval,
        );
        let good = constrained_interval(
            (interval + late / 2) as f64 * factor,
            conf.interval_multiplier,
            hard,
        );
        let easy = constrained_interval(
            (interval + late) as f64 * factor * f64::from(conf.easy_multiplier),
            conf.interval_multiplier,
            good,
        );
        let chosen = match ease {
            Ease::Hard => hard,
            Ease::Good => good,
            _ => easy,
        };
        Ok(chosen.min(conf.max_interval))
    }

    fn update_review_interval(&mut self, card: &mut Card, ease: Ease) -> Result<()> {
        let ideal = self.next_review_interval(card, ease)?;
        let fuzzed = self.adjusted_review_interval(ideal);
        let grown = fuzzed.max(card.interval + 1);
        card.interval = grown.min(self.review_config(card)?.max_interval);
        Ok(())
    }

    /// Days the card is overdue, never negative.
    pub(crate) fn days_late(&self, card: &Card) -> u32 {
        let due = if card.is_in_filtered_deck() {
            card.original_due
        } else {
            card.due
        };
        (i64::from(self.timing.today) - due).max(0) as u32
    }

    // Leeches --------------------------------------------------------------

    /// Tag the note, notify observers, and apply the configured action.
    fn apply_leech(&mut self, card: &mut Card, conf: &ResolvedLapse) -> Result<()> {
        let mut note = self
            .store
            .get_note(card.note_id)?
            .ok_or(SchedulerError::NoteNotFound(card.note_id))?;
        if note.add_tag(LEECH_TAG) {
            note.mtime_secs = self.clock.now_secs();
            note.usn = self.store.usn();
            self.store.update_note(&note)?;
        }
        if conf.leech_action == srs_domain::LeechAction::Suspend {
            if card.original_due != 0 {
                card.due = card.original_due;
            }
            if card.original_deck_id.get() != 0 {
                card.deck_id = card.original_deck_id;
            }
            card.original_due = 0;
            card.original_deck_id = DeckId(0);
            card.queue = CardQueue::Suspended;
        }
        debug!(card_id = %card.id, lapses = card.lapses, "leech detected");
        self.emit(&SchedulerEvent::LeechDetected {
            card_id: card.id,
            note_id: card.note_id,
        });
        Ok(())
    }

    // Deck statistics ------------------------------------------------------

    /// Add to a daily counter on the deck and all its ancestors.
    fn update_deck_stats(&mut self, deck_id: DeckId, kind: StatKind, amount: i32) -> Result<()> {
        let Some(deck) = self.store.get_deck(deck_id)? else {
            return Err(SchedulerError::DeckNotFound(deck_id));
        };
        let today = self.timing.today;
        let parents = self.parent_decks(&deck)?;
        for mut deck in std::iter::once(deck).chain(parents) {
            let counter = match kind {
                StatKind::New => &mut deck.common.new_today,
                StatKind::Learn => &mut deck.common.learn_today,
                StatKind::Review => &mut deck.common.review_today,
                StatKind::TimeMs => &mut deck.common.time_today_ms,
            };
            counter.add(today, amount);
            self.store.update_deck(&deck)?;
        }
        Ok(())
    }

    // Review log -----------------------------------------------------------

    /// Append a row, retrying once with a fresh timestamp on id collision.
    fn append_revlog(&mut self, build: impl Fn(i64) -> RevlogEntry) -> Result<()> {
        let entry = build(self.clock.now_millis());
        match self.store.add_revlog_entry(entry) {
            Err(StoreError::DuplicateKey) => {
                std::thread::sleep(std::time::Duration::from_millis(10));
                let retry = build(self.clock.now_millis());
                self.store.add_revlog_entry(retry).map_err(|error| {
                    warn!(%error, "review log insert failed twice");
                    error.into()
                })
            }
            other => other.map_err(Into::into),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn log_learning_answer(
        &mut self,
        card: &Card,
        ease: Ease,
        delays: &[f32],
        leaving: bool,
        kind: RevlogKind,
        last_steps: LearnProgress,
        time_taken_ms: u32,
    ) -> Result<()> {
        let last_interval = -(delay_for_grade(delays, last_steps.remaining_total) as i32);
        let interval = if leaving {
            card.interval as i32
        } else {
            -(delay_for_grade(delays, card.steps.remaining_total) as i32)
        };
        let usn = self.store.usn();
        let (card_id, factor) = (card.id, card.ease_factor);
        self.append_revlog(|now_ms| RevlogEntry {
            id: RevlogId(now_ms),
            card_id,
            usn,
            ease,
            interval,
            last_interval,
            ease_factor: factor,
            time_taken_ms,
            kind,
        })
    }

    fn log_review_answer(
        &mut self,
        card: &Card,
        ease: Ease,
        delay_secs: f64,
        last_interval: u32,
        time_taken_ms: u32,
    ) -> Result<()> {
        let interval = if delay_secs > 0.0 {
            -(delay_secs as i32)
        } else {
            card.interval as i32
        };
        let usn = self.store.usn();
        let (card_id, factor) = (card.id, card.ease_factor);
        self.append_revlog(|now_ms| RevlogEntry {
            id: RevlogId(now_ms),
            card_id,
            usn,
            ease,
            interval,
            last_interval: last_interval as i32,
            ease_factor: factor,
            time_taken_ms,
            kind: RevlogKind::Review,
        })
    }

    // Button feedback ------------------------------------------------------

    /// How many grading buttons the UI should show for this card.
    pub fn answer_buttons(&self, card: &Card) -> Result<u8> {
        if card.original_due != 0 {
            if card.is_in_filtered_deck() && card.queue == CardQueue::Review {
                return Ok(4);
            }
            let delays = if card.ctype == CardType::Review {
                self.lapse_config(card)?.delays
            } else {
                self.new_config(card)?.delays
            };
            if matches!(card.ctype, CardType::New | CardType::Learning) || delays.len() > 1 {
                return Ok(3);
            }
            return Ok(2);
        }
        Ok(if card.queue == CardQueue::Review { 4 } else { 3 })
    }

    /// The interval in seconds that answering `card` with `ease` would
    /// produce, without mutating anything. Used for button labels.
    pub fn next_interval_secs(&mut self, card: &Card, ease: Ease) -> Result<i64> {
        if matches!(
            card.queue,
            CardQueue::New | CardQueue::CramNew | CardQueue::Learning | CardQueue::DayLearning
        ) {
            return self.next_learn_interval_secs(card, ease);
        }
        if ease == Ease::Again {
            let conf = self.lapse_config(card)?;
            if !conf.delays.is_empty() {
                return Ok(delay_for_grade(&conf.delays, conf.delays.len() as u16) as i64);
            }
            return Ok(i64::from(next_lapse_interval(card, &conf)) * 86_400);
        }
        Ok(i64::from(self.next_review_interval(card, ease)?) * 86_400)
    }

    fn next_learn_interval_secs(&mut self, card: &Card, ease: Ease) -> Result<i64> {
        let mut card = card.clone();
        if matches!(card.queue, CardQueue::New | CardQueue::CramNew) {
            card.steps = self.starting_steps(&card)?;
        }
        let relearning = card.ctype == CardType::Review;
        let new_conf = self.new_config(&card)?;
        let delays = if relearning {
            self.lapse_config(&card)?.delays
        } else {
            new_conf.delays.clone()
        };
        // same three-button scale as answering a learning card
        match ease {
            Ease::Again => Ok(delay_for_grade(&delays, delays.len() as u16) as i64),
            Ease::Good => {
                if !self.reschedule_enabled(&card)? {
                    Ok(0)
                } else {
                    Ok(i64::from(self.graduating_interval(&card, &new_conf, true, false)?) * 86_400)
                }
            }
            _ => {
                let remaining = card.steps.remaining_total.saturating_sub(1);
                if remaining == 0 {
                    if !self.reschedule_enabled(&card)? {
                        Ok(0)
                    } else {
                        Ok(i64::from(self.graduating_interval(&card, &new_conf, false, false)?)
                            * 86_400)
                    }
                } else {
                    Ok(delay_for_grade(&delays, remaining) as i64)
                }
            }
        }
    }
}

/// Post-lapse interval: the old one shrunk, floored by configuration.
pub(crate) fn next_lapse_interval(card: &Card, conf: &ResolvedLapse) -> u32 {
    ((card.interval as f32 * conf.multiplier) as u32).max(conf.min_interval)
}

/// The leech threshold fires at `leech_fails` lapses and every half
/// threshold after that; zero disables it entirely.
pub(crate) fn leech_threshold_hit(lapses: u32, leech_fails: u32) -> bool {
    if leech_fails == 0 {
        return false;
    }
    lapses >= leech_fails && (lapses - leech_fails) % (leech_fails / 2).max(1) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_indexes_steps_from_the_back() {
        let delays = [1.0, 10.0];
        assert_eq!(delay_for_grade(&delays, 2), 60.0);
        assert_eq!(delay_for_grade(&delays, 1), 600.0);
        // exhausted or out-of-range fall back to the first step
        assert_eq!(delay_for_grade(&delays, 0), 60.0);
        assert_eq!(delay_for_grade(&delays, 9), 60.0);
        assert_eq!(delay_for_grade(&[], 0), 60.0);
    }

    #[test]
    fn steps_completable_counts_until_the_cutoff() {
        let delays = [1.0, 10.0];
        // both steps fit comfortably
        assert_eq!(steps_completable_today(&delays, 2, 0, 86_400), 2);
        // only the first step fits
        assert_eq!(steps_completable_today(&delays, 2, 0, 200), 1);
        // nothing fits, still reported as one
        assert_eq!(steps_completable_today(&delays, 2, 0, 10), 1);
        // a single remaining step looks at the last delay only
        assert_eq!(steps_completable_today(&delays, 1, 0, 86_400), 1);
    }

    #[test]
    fn leech_fires_at_threshold_and_half_steps() {
        assert!(!leech_threshold_hit(7, 8));
        assert!(leech_threshold_hit(8, 8));
        assert!(!leech_threshold_hit(9, 8));
        assert!(leech_threshold_hit(12, 8));
        assert!(leech_threshold_hit(16, 8));
        // disabled
        assert!(!leech_threshold_hit(100, 0));
        // tiny threshold steps by max(lf/2, 1)
        assert!(leech_threshold_hit(1, 1));
        assert!(!leech_threshold_hit(2, 1));
        assert!(leech_threshold_hit(3, 1));
    }

    #[test]
    fn lapse_interval_shrinks_with_floor() {
        let conf = ResolvedLapse {
            delays: vec![],
            multiplier: 0.5,
            min_interval: 2,
            leech_fails: 8,
            leech_action: srs_domain::LeechAction::Suspend,
        };
        let mut card = Card::default();
        card.interval = 10;
        assert_eq!(next_lapse_interval(&card, &conf), 5);
        card.interval = 3;
        assert_eq!(next_lapse_interval(&card, &conf), 2);
        card.interval = 10;
        let zeroed = ResolvedLapse {
            multiplier: 0.0,
            min_interval: 1,
            ..conf
        };
        assert_eq!(next_lapse_interval(&card, &zeroed), 1);
    }
}
