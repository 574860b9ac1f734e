mod support;

use std::cell::RefCell;
use std::rc::Rc;

use scheduler_core::{CollectionStore, SchedulerEvent, SchedulerOptions};
use srs_domain::{CardQueue, CardType, DeckConfig, Ease, LearnProgress, RevlogKind};
use support::{CRT, START_OFFSET, collection, new_card, review_card, scheduler, scheduler_with};

#[test]
fn first_grade_moves_a_new_card_into_learning() {
    let mut store = collection();
    store.add_card(new_card(1, 5)).unwrap();
    let mut scheduler = scheduler(store);

    let mut card = scheduler.next_card().unwrap().expect("new card due");
    assert_eq!(card.id.get(), 1);
    // the second button advances a learning card one step
    let step = Ease::from_u8(2).unwrap();
    scheduler.answer_card(&mut card, step, 2_000).unwrap();

    assert_eq!(card.ctype, CardType::Learning);
    assert_eq!(card.queue, CardQueue::Learning);
    // one of the two steps is done; the 10-minute step remains
    assert_eq!(
        card.steps,
        LearnProgress {
            remaining_today: 1,
            remaining_total: 1,
        }
    );
    let now = CRT + START_OFFSET;
    // the old due (a position) is long past, so the delay picks up 0-25% fuzz
    assert!(card.due >= now + 600, "due was {}", card.due - now);
    assert!(card.due < now + 750, "due was {}", card.due - now);

    let revlog = scheduler.store().revlog_entries();
    assert_eq!(revlog.len(), 1);
    assert_eq!(revlog[0].kind, RevlogKind::Learning);
    assert_eq!(revlog[0].ease.as_u8(), 2);
    assert_eq!(revlog[0].card_id, card.id);
}

#[test]
fn second_good_graduates_to_review() {
    let mut store = collection();
    store.add_card(new_card(1, 5)).unwrap();
    let mut scheduler = scheduler(store);

    let mut card = scheduler.next_card().unwrap().expect("new card due");
    let step = Ease::from_u8(2).unwrap();
    scheduler.answer_card(&mut card, step, 1_000).unwrap();
    assert_eq!(card.steps.remaining_total, 1);

    scheduler.clock_mut().advance_secs(700);
    scheduler.answer_card(&mut card, step, 1_000).unwrap();

    assert_eq!(card.ctype, CardType::Review);
    assert_eq!(card.queue, CardQueue::Review);
    assert_eq!(card.interval, 1);
    assert_eq!(card.ease_factor, 2_500);
    // graduated on day zero with the one-day graduating interval
    assert_eq!(card.due, 1);
}

#[test]
fn easy_on_a_new_card_graduates_immediately() {
    let mut store = collection();
    store.add_card(new_card(1, 5)).unwrap();
    let mut scheduler = scheduler(store);

    let mut card = scheduler.next_card().unwrap().expect("new card due");
    // the third button graduates a learning card on the spot
    scheduler.answer_card(&mut card, Ease::Good, 1_000).unwrap();

    assert_eq!(card.ctype, CardType::Review);
    assert_eq!(card.queue, CardQueue::Review);
    // the easy graduating interval, fuzz window for 4 days is 3..=5
    assert!((3..=5).contains(&card.interval), "ivl {}", card.interval);
}

#[test]
fn good_review_grows_the_interval_with_overdue_credit() {
    let mut store = collection();
    // two days overdue on day two
    store.add_card(review_card(1, 0, 10)).unwrap();
    let options = SchedulerOptions {
        spread_reviews: false,
        ..SchedulerOptions::default()
    };
    let mut scheduler = scheduler_with(store, 2 * 86_400 + 3_600, options);

    let mut card = scheduler.next_card().unwrap().expect("review due");
    scheduler.answer_card(&mut card, Ease::Good, 4_000).unwrap();

    // hard candidate is 12; good = max(ceil((10 + 1) * 2.5), 13) = 28
    assert_eq!(card.interval, 28);
    assert_eq!(card.ease_factor, 2_500);
    assert_eq!(card.due, 2 + 28);
    let revlog = scheduler.store().revlog_entries();
    assert_eq!(revlog.len(), 1);
    assert_eq!(revlog[0].kind, RevlogKind::Review);
    assert_eq!(revlog[0].last_interval, 10);
    assert_eq!(revlog[0].interval, 28);
}

#[test]
fn successful_review_always_grows_and_respects_the_cap() {
    let mut store = collection();
    let mut config = DeckConfig::default();
    config.review.max_interval = 15;
    store.add_deck_config(config);
    store.add_card(review_card(1, 0, 14)).unwrap();
    let mut scheduler = scheduler(store);

    let mut card = scheduler.next_card().unwrap().expect("review due");
    let old_interval = card.interval;
    scheduler.answer_card(&mut card, Ease::Easy, 1_000).unwrap();

    assert!(card.interval > old_interval);
    assert!(card.interval <= 15);
}

#[test]
fn hard_review_lowers_the_factor_with_a_floor() {
    let mut store = collection();
    let mut card = review_card(1, 0, 4);
    card.ease_factor = 1_350;
    store.add_card(card).unwrap();
    let mut scheduler = scheduler(store);

    let mut card = scheduler.next_card().unwrap().expect("review due");
    scheduler.answer_card(&mut card, Ease::Hard, 1_000).unwrap();
    assert_eq!(card.ease_factor, 1_300);
}

#[test]
fn lapse_with_relearning_steps_enters_the_learning_queue() {
    let mut store = collection();
    store.add_card(review_card(1, 0, 10)).unwrap();
    let mut scheduler = scheduler(store);

    let mut card = scheduler.next_card().unwrap().expect("review due");
    scheduler.answer_card(&mut card, Ease::Again, 1_000).unwrap();

    assert_eq!(card.ctype, CardType::Review);
    assert_eq!(card.queue, CardQueue::Learning);
    assert_eq!(card.lapses, 1);
    assert_eq!(card.ease_factor, 2_300);
    // default lapse multiplier is zero, floored at the minimum interval
    assert_eq!(card.interval, 1);
    // review due date parked for graduation
    assert_eq!(card.original_due, 1);
    // the lapse path schedules the first relearning step without fuzz
    assert_eq!(card.due, CRT + START_OFFSET + 600);
}

#[test]
fn lapse_without_steps_keeps_the_review_queue() {
    let mut store = collection();
    let mut config = DeckConfig::default();
    config.lapse.delays = vec![];
    config.lapse.multiplier = 0.5;
    config.lapse.leech_fails = 0;
    store.add_deck_config(config);
    store.add_card(review_card(1, 0, 10)).unwrap();
    let mut scheduler = scheduler(store);

    let mut card = scheduler.next_card().unwrap().expect("review due");
    scheduler.answer_card(&mut card, Ease::Again, 1_000).unwrap();

    assert_eq!(card.queue, CardQueue::Review);
    assert_eq!(card.interval, 5);
    assert_eq!(card.due, 5);
    assert_eq!(card.lapses, 1);
}

#[test]
fn eighth_lapse_suspends_the_leech_and_fires_the_event() {
    let mut store = collection();
    let mut config = DeckConfig::default();
    config.lapse.delays = vec![];
    config.lapse.multiplier = 0.5;
    store.add_deck_config(config);
    let mut card = review_card(1, 0, 10);
    card.lapses = 7;
    store.add_card(card).unwrap();

    let mut scheduler = scheduler(store);
    let leeches = Rc::new(RefCell::new(Vec::new()));
    let seen = Rc::clone(&leeches);
    scheduler.subscribe(move |event| {
        if let SchedulerEvent::LeechDetected { card_id, .. } = event {
            seen.borrow_mut().push(*card_id);
        }
    });

    let mut card = scheduler.next_card().unwrap().expect("review due");
    scheduler.answer_card(&mut card, Ease::Again, 1_000).unwrap();

    assert_eq!(card.lapses, 8);
    assert_eq!(card.interval, 5);
    assert_eq!(card.ease_factor, 2_300);
    assert_eq!(card.queue, CardQueue::Suspended);
    assert_eq!(leeches.borrow().as_slice(), &[card.id]);
    let note = scheduler
        .store()
        .get_note(card.note_id)
        .unwrap()
        .expect("note");
    assert!(note.has_tag("leech"));
}

#[test]
fn answering_a_suspended_card_is_an_invariant_violation() {
    let mut store = collection();
    let mut card = review_card(1, 0, 10);
    card.queue = CardQueue::Suspended;
    store.add_card(card.clone()).unwrap();
    let mut scheduler = scheduler(store);

    let err = scheduler.answer_card(&mut card, Ease::Good, 0).unwrap_err();
    assert!(err.to_string().contains("cannot be answered"));
    // nothing was written
    assert!(scheduler.store().revlog_entries().is_empty());
}

#[test]
fn duplicate_revlog_timestamp_rolls_the_answer_back() {
    let mut store = collection();
    store.add_card(review_card(1, 0, 10)).unwrap();
    // a different note, so answering the first card does not bury this one
    let mut other = new_card(2, 1);
    other.note_id = srs_domain::NoteId(2);
    store.add_card(other).unwrap();
    let mut scheduler = scheduler(store);

    let mut first = scheduler.next_card().unwrap().expect("a card");
    scheduler.answer_card(&mut first, Ease::Good, 1_000).unwrap();

    // the fixed clock has not moved, so the next revlog id collides twice
    let mut second = scheduler
        .store()
        .get_card(srs_domain::CardId(2))
        .unwrap()
        .expect("second card");
    let before = second.clone();
    let err = scheduler
        .answer_card(&mut second, Ease::Good, 1_000)
        .unwrap_err();
    assert!(err.to_string().contains("duplicate"));
    let after = scheduler.store().get_card(before.id).unwrap().unwrap();
    assert_eq!(before, after, "rolled back card must be unchanged");
}

#[test]
fn new_card_progress_stays_within_the_step_count() {
    let mut store = collection();
    store.add_card(new_card(1, 0)).unwrap();
    let mut scheduler = scheduler(store);
    let delays = DeckConfig::default().new.delays.len() as u16;

    let step = Ease::from_u8(2).unwrap();
    let mut card = scheduler.next_card().unwrap().expect("new card");
    for ease in [step, Ease::Again, step] {
        scheduler.answer_card(&mut card, ease, 500).unwrap();
        assert!(card.steps.remaining_total <= delays);
        assert!(card.steps.remaining_today <= delays);
        scheduler.clock_mut().advance_secs(90);
    }
}
