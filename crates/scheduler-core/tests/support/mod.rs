//! Shared fixtures for the scheduler integration tests.
#![allow(dead_code)]

use std::collections::BTreeMap;

use maplit::btreemap;
use scheduler_core::{Clock, InMemoryCollection, Scheduler, SchedulerOptions};
use srs_domain::{
    Card, CardId, CardQueue, CardType, Deck, DeckConfig, DeckConfigId, DeckId, DeckKind, Note,
    NoteId,
};

/// Collection creation stamp used throughout the tests.
pub const CRT: i64 = 1_600_000_000;

/// Seconds into day zero at which most tests run.
pub const START_OFFSET: i64 = 6 * 3600;

pub fn collection() -> InMemoryCollection {
    let mut store = InMemoryCollection::new(CRT);
    store.add_note(Note {
        id: NoteId(1),
        ..Note::default()
    });
    store
}

pub fn scheduler_at(store: InMemoryCollection, offset_secs: i64) -> Scheduler<InMemoryCollection> {
    scheduler_with(store, offset_secs, SchedulerOptions::default())
}

pub fn scheduler_with(
    store: InMemoryCollection,
    offset_secs: i64,
    options: SchedulerOptions,
) -> Scheduler<InMemoryCollection> {
    Scheduler::with_clock(store, options, Clock::fixed_at_secs(CRT + offset_secs))
}

pub fn scheduler(store: InMemoryCollection) -> Scheduler<InMemoryCollection> {
    scheduler_at(store, START_OFFSET)
}

pub fn new_card(id: i64, position: i64) -> Card {
    Card {
        id: CardId(id),
        note_id: NoteId(1),
        deck_id: DeckId(1),
        due: position,
        ..Card::default()
    }
}

pub fn review_card(id: i64, due: i64, interval: u32) -> Card {
    Card {
        id: CardId(id),
        note_id: NoteId(1),
        deck_id: DeckId(1),
        ctype: CardType::Review,
        queue: CardQueue::Review,
        due,
        interval,
        ease_factor: 2_500,
        reps: 5,
        ..Card::default()
    }
}

/// Daily new-card limits for the two-level deck tree fixture: the parent
/// deck is the bottleneck.
pub fn tree_limits() -> BTreeMap<DeckId, u32> {
    btreemap! {
        DeckId(1) => 3,
        DeckId(2) => 20,
    }
}

/// "Default" plus "Default::Sub", each deck carrying its own config with
/// the per-day new limits from [`tree_limits`], both active.
pub fn tree_collection() -> InMemoryCollection {
    let mut store = collection();
    let mut child = Deck::new_normal(DeckId(2), "Default::Sub");
    if let DeckKind::Normal(normal) = &mut child.kind {
        normal.config_id = DeckConfigId(2);
    }
    store.add_deck(child);
    for (deck_id, per_day) in tree_limits() {
        let mut config = DeckConfig {
            id: DeckConfigId(deck_id.get()),
            ..DeckConfig::default()
        };
        config.new.per_day = per_day;
        store.add_deck_config(config);
    }
    store.set_active_decks(DeckId(1), vec![DeckId(1), DeckId(2)]);
    store
}
