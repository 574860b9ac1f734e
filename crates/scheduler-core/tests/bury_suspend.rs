mod support;

use scheduler_core::{BuryKind, CollectionStore};
use srs_domain::{Card, CardId, CardQueue, CardType, Deck, DeckId, Ease, NoteId};
use support::{collection, new_card, review_card, scheduler};

#[test]
fn answering_one_card_buries_its_siblings() {
    let mut store = collection();
    // three cards of the same note: one new, one due review, one future
    store.add_card(new_card(1, 0)).unwrap();
    store.add_card(review_card(2, 0, 4)).unwrap();
    store.add_card(review_card(3, 30, 4)).unwrap();
    let mut scheduler = scheduler(store);

    let mut card = scheduler.next_card().unwrap().expect("something due");
    scheduler.answer_card(&mut card, Ease::Good, 500).unwrap();

    let mut buried = Vec::new();
    for id in [1, 2, 3] {
        let sibling = scheduler.store().get_card(CardId(id)).unwrap().unwrap();
        if sibling.queue == CardQueue::SchedBuried {
            buried.push(id);
        }
    }
    // the answered card is never buried; the future review is untouched
    assert_eq!(buried.len(), 1);
    assert!(!buried.contains(&card.id.get()));
    assert!(!buried.contains(&3));
}

#[test]
fn manual_unbury_ignores_sibling_buried_cards() {
    let mut store = collection();
    store.add_card(new_card(1, 0)).unwrap();
    store.add_card(new_card(2, 1)).unwrap();
    let mut scheduler = scheduler(store);

    let mut card = scheduler.next_card().unwrap().expect("new card");
    scheduler.answer_card(&mut card, Ease::Good, 500).unwrap();

    let other = CardId(if card.id.get() == 1 { 2 } else { 1 });
    let buried = scheduler.store().get_card(other).unwrap().unwrap();
    assert_eq!(buried.queue, CardQueue::SchedBuried);

    // only user-buried cards respond to a manual unbury
    scheduler.unbury_cards().unwrap();
    let still = scheduler.store().get_card(other).unwrap().unwrap();
    assert_eq!(still.queue, CardQueue::SchedBuried);
}

#[test]
fn day_rollover_unburies_sibling_buried_cards() {
    let mut store = collection();
    store.add_card(new_card(1, 0)).unwrap();
    store.add_card(new_card(2, 1)).unwrap();
    let mut scheduler = scheduler(store);

    let mut card = scheduler.next_card().unwrap().expect("new card");
    scheduler.answer_card(&mut card, Ease::Good, 500).unwrap();
    let other = CardId(if card.id.get() == 1 { 2 } else { 1 });

    // crossing the cutoff rebuilds queues and restores sibling-buried cards
    scheduler.clock_mut().advance_secs(86_400);
    scheduler.next_card().unwrap();
    let restored = scheduler.store().get_card(other).unwrap().unwrap();
    assert_eq!(restored.queue, CardQueue::New);
}

#[test]
fn user_bury_survives_rollover_until_unburied() {
    let mut store = collection();
    store.add_card(new_card(1, 0)).unwrap();
    let mut scheduler = scheduler(store);

    scheduler.bury_cards(&[CardId(1)], BuryKind::User).unwrap();
    let card = scheduler.store().get_card(CardId(1)).unwrap().unwrap();
    assert_eq!(card.queue, CardQueue::UserBuried);

    scheduler.clock_mut().advance_secs(86_400);
    scheduler.next_card().unwrap();
    let card = scheduler.store().get_card(CardId(1)).unwrap().unwrap();
    assert_eq!(card.queue, CardQueue::UserBuried, "rollover leaves it alone");

    scheduler.unbury_cards().unwrap();
    let card = scheduler.store().get_card(CardId(1)).unwrap().unwrap();
    assert_eq!(card.queue, CardQueue::New);
}

#[test]
fn bury_then_unbury_restores_the_type_queue() {
    let mut store = collection();
    store.add_card(review_card(1, 0, 4)).unwrap();
    let mut scheduler = scheduler(store);

    scheduler.bury_cards(&[CardId(1)], BuryKind::User).unwrap();
    scheduler.unbury_cards().unwrap();
    let card = scheduler.store().get_card(CardId(1)).unwrap().unwrap();
    assert_eq!(card.queue, CardQueue::Review);
    assert_eq!(card.ctype, CardType::Review);
}

#[test]
fn suspending_a_relearning_card_parks_it_as_a_review() {
    let mut store = collection();
    store.add_card(review_card(1, 0, 10)).unwrap();
    let mut scheduler = scheduler(store);

    let mut card = scheduler.next_card().unwrap().expect("review due");
    scheduler.answer_card(&mut card, Ease::Again, 500).unwrap();
    assert_eq!(card.queue, CardQueue::Learning);
    let parked_due = card.original_due;

    scheduler.suspend_cards(&[CardId(1)]).unwrap();
    let card = scheduler.store().get_card(CardId(1)).unwrap().unwrap();
    assert_eq!(card.queue, CardQueue::Suspended);
    assert_eq!(card.due, parked_due, "relearning due restored");
    assert_eq!(card.original_due, 0);

    scheduler.unsuspend_cards(&[CardId(1)]).unwrap();
    let card = scheduler.store().get_card(CardId(1)).unwrap().unwrap();
    assert_eq!(card.queue, CardQueue::Review);
}

#[test]
fn suspended_cards_are_never_served() {
    let mut store = collection();
    store.add_card(review_card(1, 0, 4)).unwrap();
    let mut scheduler = scheduler(store);

    scheduler.suspend_cards(&[CardId(1)]).unwrap();
    assert!(scheduler.next_card().unwrap().is_none());
}

#[test]
fn reschedule_as_new_resets_cards_to_the_queue_end() {
    let mut store = collection();
    let mut seen = review_card(1, 0, 10);
    seen.lapses = 2;
    store.add_card(seen).unwrap();
    store.add_card(new_card(2, 4)).unwrap();
    let mut scheduler = scheduler(store);

    scheduler.reschedule_as_new(&[CardId(1)]).unwrap();
    let card = scheduler.store().get_card(CardId(1)).unwrap().unwrap();
    assert_eq!(card.ctype, CardType::New);
    assert_eq!(card.queue, CardQueue::New);
    assert_eq!(card.interval, 0);
    assert_eq!(card.ease_factor, 0);
    // lands behind the existing new card at position four
    assert_eq!(card.due, 5);
}

#[test]
fn unbury_for_deck_skips_inactive_decks() {
    let mut store = collection();
    store.add_deck(Deck::new_normal(DeckId(2), "Other"));
    let buried_active = Card {
        id: CardId(1),
        note_id: NoteId(1),
        deck_id: DeckId(1),
        queue: CardQueue::UserBuried,
        ..Card::default()
    };
    let buried_other = Card {
        id: CardId(2),
        note_id: NoteId(2),
        deck_id: DeckId(2),
        queue: CardQueue::UserBuried,
        ..Card::default()
    };
    store.add_card(buried_active).unwrap();
    store.add_card(buried_other).unwrap();
    store.set_active_decks(DeckId(1), vec![DeckId(1)]);
    let mut scheduler = scheduler(store);

    scheduler.unbury_cards_for_deck().unwrap();
    let active = scheduler.store().get_card(CardId(1)).unwrap().unwrap();
    assert_eq!(active.queue, CardQueue::New);
    let other = scheduler.store().get_card(CardId(2)).unwrap().unwrap();
    assert_eq!(other.queue, CardQueue::UserBuried, "inactive deck untouched");

    // the collection-wide unbury reaches it
    scheduler.unbury_cards().unwrap();
    let other = scheduler.store().get_card(CardId(2)).unwrap().unwrap();
    assert_eq!(other.queue, CardQueue::New);
}

#[test]
fn removing_a_learning_new_card_sends_it_to_the_queue_end() {
    let mut store = collection();
    store.add_card(new_card(1, 0)).unwrap();
    let mut scheduler = scheduler(store);

    let mut card = scheduler.next_card().unwrap().expect("new card");
    scheduler
        .answer_card(&mut card, Ease::from_u8(2).unwrap(), 500)
        .unwrap();
    assert_eq!(card.queue, CardQueue::Learning);

    scheduler.remove_from_learning(&[CardId(1)]).unwrap();
    let card = scheduler.store().get_card(CardId(1)).unwrap().unwrap();
    assert_eq!(card.ctype, CardType::New);
    assert_eq!(card.queue, CardQueue::New);
    assert_eq!(card.interval, 0);
}
