//! Reference in-memory implementation of [`CollectionStore`].

use std::collections::BTreeMap;

use srs_domain::{
    Card, CardId, CardQueue, CardType, Deck, DeckConfig, DeckConfigId, DeckId, Note, NoteId,
    RevlogEntry, RevlogId, Usn,
};

use super::{CollectionStore, StoreError};

#[derive(Debug, Clone, Default)]
struct Tables {
    cards: BTreeMap<CardId, Card>,
    decks: BTreeMap<DeckId, Deck>,
    configs: BTreeMap<DeckConfigId, DeckConfig>,
    notes: BTreeMap<NoteId, Note>,
    revlog: BTreeMap<RevlogId, RevlogEntry>,
    next_position: u32,
    last_unburied_day: u32,
}

/// A whole collection held in maps. Transactions snapshot the tables and
/// restore them on rollback.
#[derive(Debug, Default)]
pub struct InMemoryCollection {
    creation_stamp: i64,
    usn: Usn,
    active: Vec<DeckId>,
    current: DeckId,
    tables: Tables,
    snapshot: Option<Box<Tables>>,
}

impl InMemoryCollection {
    /// An empty collection created at `creation_stamp`, seeded with the
    /// default deck and configuration.
    #[must_use]
    pub fn new(creation_stamp: i64) -> Self {
        let mut tables = Tables::default();
        let deck = Deck::new_normal(DeckId(1), "Default");
        tables.decks.insert(deck.id, deck);
        let config = DeckConfig::default();
        tables.configs.insert(config.id, config);
        Self {
            creation_stamp,
            usn: Usn(0),
            active: vec![DeckId(1)],
            current: DeckId(1),
            tables,
            snapshot: None,
        }
    }

    pub fn add_deck(&mut self, deck: Deck) {
        self.tables.decks.insert(deck.id, deck);
    }

    pub fn add_deck_config(&mut self, config: DeckConfig) {
        self.tables.configs.insert(config.id, config);
    }

    pub fn add_note(&mut self, note: Note) {
        self.tables.notes.insert(note.id, note);
    }

    /// Select which decks study operates on.
    pub fn set_active_decks(&mut self, current: DeckId, active: Vec<DeckId>) {
        self.current = current;
        self.active = active;
    }

    /// All review log rows in id order, for assertions.
    #[must_use]
    pub fn revlog_entries(&self) -> Vec<RevlogEntry> {
        self.tables.revlog.values().cloned().collect()
    }

    fn deck_of(&self, card: &Card) -> Option<&Deck> {
        self.tables.decks.get(&card.deck_id)
    }

    fn matches_search(&self, card: &Card, search: &str, today: u32) -> Result<bool, StoreError> {
        for token in search.split_whitespace() {
            let matched = if let Some(name) = token.strip_prefix("deck:") {
                self.deck_of(card).is_some_and(|deck| {
                    deck.name == name || deck.name.starts_with(&format!("{name}::"))
                })
            } else if let Some(tag) = token.strip_prefix("tag:") {
                self.tables
                    .notes
                    .get(&card.note_id)
                    .is_some_and(|note| note.has_tag(tag))
            } else if token == "is:due" {
                card.queue == CardQueue::Review && card.due <= i64::from(today)
            } else if token == "is:new" {
                card.ctype == CardType::New
            } else {
                return Err(StoreError::InvalidSearch(token.to_string()));
            };
            if !matched {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl CollectionStore for InMemoryCollection {
    fn creation_stamp(&self) -> i64 {
        self.creation_stamp
    }

    fn usn(&self) -> Usn {
        self.usn
    }

    fn get_card(&self, id: CardId) -> Result<Option<Card>, StoreError> {
        Ok(self.tables.cards.get(&id).cloned())
    }

    fn add_card(&mut self, card: Card) -> Result<(), StoreError> {
        if self.tables.cards.contains_key(&card.id) {
            return Err(StoreError::DuplicateKey);
        }
        // keep the position allocator ahead of existing new cards
        if card.queue == CardQueue::New && card.due >= 0 {
            self.tables.next_position = self.tables.next_position.max(card.due as u32 + 1);
        }
        self.tables.cards.insert(card.id, card);
        Ok(())
    }

    fn update_card(&mut self, card: &Card) -> Result<(), StoreError> {
        match self.tables.cards.get_mut(&card.id) {
            Some(slot) => {
                *slot = card.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }

    fn all_decks(&self) -> Result<Vec<Deck>, StoreError> {
        Ok(self.tables.decks.values().cloned().collect())
    }

    fn get_deck(&self, id: DeckId) -> Result<Option<Deck>, StoreError> {
        Ok(self.tables.decks.get(&id).cloned())
    }

    fn update_deck(&mut self, deck: &Deck) -> Result<(), StoreError> {
        match self.tables.decks.get_mut(&deck.id) {
            Some(slot) => {
                *slot = deck.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }

    fn deck_config(&self, id: DeckConfigId) -> Result<Option<DeckConfig>, StoreError> {
        Ok(self.tables.configs.get(&id).cloned())
    }

    fn get_note(&self, id: NoteId) -> Result<Option<Note>, StoreError> {
        Ok(self.tables.notes.get(&id).cloned())
    }

    fn update_note(&mut self, note: &Note) -> Result<(), StoreError> {
        match self.tables.notes.get_mut(&note.id) {
            Some(slot) => {
                *slot = note.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }

    fn add_revlog_entry(&mut self, entry: RevlogEntry) -> Result<(), StoreError> {
        if self.tables.revlog.contains_key(&entry.id) {
            return Err(StoreError::DuplicateKey);
        }
        self.tables.revlog.insert(entry.id, entry);
        Ok(())
    }

    fn active_decks(&self) -> Vec<DeckId> {
        self.active.clone()
    }

    fn current_deck(&self) -> DeckId {
        self.current
    }

    fn next_card_position(&mut self) -> u32 {
        let position = self.tables.next_position;
        self.tables.next_position += 1;
        position
    }

    fn last_unburied_day(&self) -> u32 {
        self.tables.last_unburied_day
    }

    fn set_last_unburied_day(&mut self, day: u32) {
        self.tables.last_unburied_day = day;
    }

    fn learning_cards_due_before(
        &self,
        decks: &[DeckId],
        cutoff_secs: i64,
        limit: usize,
    ) -> Result<Vec<(i64, CardId)>, StoreError> {
        let mut rows: Vec<(i64, CardId)> = self
            .tables
            .cards
            .values()
            .filter(|card| {
                card.queue == CardQueue::Learning
                    && card.due < cutoff_secs
                    && decks.contains(&card.deck_id)
            })
            .map(|card| (card.due, card.id))
            .collect();
        rows.sort_unstable();
        rows.truncate(limit);
        Ok(rows)
    }

    fn day_learning_cards(
        &self,
        deck: DeckId,
        today: u32,
        limit: usize,
    ) -> Result<Vec<CardId>, StoreError> {
        let mut rows: Vec<CardId> = self
            .tables
            .cards
            .values()
            .filter(|card| {
                card.queue == CardQueue::DayLearning
                    && card.deck_id == deck
                    && card.due <= i64::from(today)
            })
            .map(|card| card.id)
            .collect();
        rows.sort_unstable();
        rows.truncate(limit);
        Ok(rows)
    }

    fn review_cards_due(
        &self,
        deck: DeckId,
        today: u32,
        limit: usize,
    ) -> Result<Vec<CardId>, StoreError> {
        let mut rows: Vec<(i64, CardId)> = self
            .tables
            .cards
            .values()
            .filter(|card| {
                card.queue == CardQueue::Review
                    && card.deck_id == deck
                    && card.due <= i64::from(today)
            })
            .map(|card| (card.due, card.id))
            .collect();
        rows.sort_unstable();
        rows.truncate(limit);
        Ok(rows.into_iter().map(|(_, id)| id).collect())
    }

    fn new_cards(&self, deck: DeckId, limit: usize) -> Result<Vec<CardId>, StoreError> {
        let mut rows: Vec<(i64, u16, CardId)> = self
            .tables
            .cards
            .values()
            .filter(|card| {
                matches!(card.queue, CardQueue::New | CardQueue::CramNew)
                    && card.deck_id == deck
            })
            .map(|card| (card.due, card.template_ord, card.id))
            .collect();
        rows.sort_unstable();
        rows.truncate(limit);
        Ok(rows.into_iter().map(|(_, _, id)| id).collect())
    }

    fn sibling_cards(&self, note: NoteId, except: CardId) -> Result<Vec<Card>, StoreError> {
        Ok(self
            .tables
            .cards
            .values()
            .filter(|card| card.note_id == note && card.id != except)
            .cloned()
            .collect())
    }

    fn cards_in_deck(&self, deck: DeckId) -> Result<Vec<CardId>, StoreError> {
        Ok(self
            .tables
            .cards
            .values()
            .filter(|card| card.deck_id == deck)
            .map(|card| card.id)
            .collect())
    }

    fn learning_step_reps_before(
        &self,
        decks: &[DeckId],
        cutoff_secs: i64,
        limit: usize,
    ) -> Result<u32, StoreError> {
        Ok(self
            .learning_cards_due_before(decks, cutoff_secs, limit)?
            .iter()
            .filter_map(|(_, id)| self.tables.cards.get(id))
            .map(|card| u32::from(card.steps.remaining_today))
            .sum())
    }

    fn day_learning_count(
        &self,
        deck: DeckId,
        today: u32,
        limit: usize,
    ) -> Result<u32, StoreError> {
        Ok(self.day_learning_cards(deck, today, limit)?.len() as u32)
    }

    fn review_count_due(
        &self,
        deck: DeckId,
        today: u32,
        limit: usize,
    ) -> Result<u32, StoreError> {
        Ok(self.review_cards_due(deck, today, limit)?.len() as u32)
    }

    fn new_card_count(&self, deck: DeckId, limit: usize) -> Result<u32, StoreError> {
        Ok(self.new_cards(deck, limit)?.len() as u32)
    }

    fn filtered_deck_candidates(
        &self,
        search: &str,
        today: u32,
    ) -> Result<Vec<Card>, StoreError> {
        let mut matches = Vec::new();
        for card in self.tables.cards.values() {
            if card.queue.is_hidden()
                || card.queue.is_learning()
                || card.is_in_filtered_deck()
                || self.deck_of(card).is_none_or(Deck::is_filtered)
            {
                continue;
            }
            if self.matches_search(card, search, today)? {
                matches.push(card.clone());
            }
        }
        Ok(matches)
    }

    fn begin_transaction(&mut self) {
        self.snapshot = Some(Box::new(self.tables.clone()));
    }

    fn commit(&mut self) {
        self.snapshot = None;
    }

    fn rollback(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            self.tables = *snapshot;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card_in(deck: DeckId, id: i64) -> Card {
        Card {
            id: CardId(id),
            deck_id: deck,
            ..Card::default()
        }
    }

    #[test]
    fn add_card_rejects_duplicate_ids() {
        let mut store = InMemoryCollection::new(0);
        store.add_card(card_in(DeckId(1), 1)).unwrap();
        assert_eq!(
            store.add_card(card_in(DeckId(1), 1)),
            Err(StoreError::DuplicateKey)
        );
    }

    #[test]
    fn new_cards_order_by_position_and_include_cram_new() {
        let mut store = InMemoryCollection::new(0);
        let mut early = card_in(DeckId(1), 1);
        early.due = 7;
        let mut late = card_in(DeckId(1), 2);
        late.due = 9;
        let mut cram = card_in(DeckId(1), 3);
        cram.queue = CardQueue::CramNew;
        cram.due = 8;
        for card in [late, early, cram] {
            store.add_card(card).unwrap();
        }
        assert_eq!(
            store.new_cards(DeckId(1), 10).unwrap(),
            vec![CardId(1), CardId(3), CardId(2)]
        );
    }

    #[test]
    fn learning_feed_filters_by_cutoff_and_deck() {
        let mut store = InMemoryCollection::new(0);
        let mut due = card_in(DeckId(1), 1);
        due.queue = CardQueue::Learning;
        due.due = 500;
        let mut later = card_in(DeckId(1), 2);
        later.queue = CardQueue::Learning;
        later.due = 2_000;
        let mut elsewhere = card_in(DeckId(9), 3);
        elsewhere.queue = CardQueue::Learning;
        elsewhere.due = 100;
        for card in [due, later, elsewhere] {
            store.add_card(card).unwrap();
        }
        assert_eq!(
            store
                .learning_cards_due_before(&[DeckId(1)], 1_000, 10)
                .unwrap(),
            vec![(500, CardId(1))]
        );
    }

    #[test]
    fn search_supports_deck_tag_and_state_tokens() {
        let mut store = InMemoryCollection::new(0);
        store.add_deck(Deck::new_normal(DeckId(2), "Default::Sub"));
        let mut note = Note::default();
        note.id = NoteId(1);
        note.add_tag("hard");
        store.add_note(note);

        let mut card = card_in(DeckId(2), 1);
        card.note_id = NoteId(1);
        store.add_card(card).unwrap();

        let found = store
            .filtered_deck_candidates("deck:Default tag:hard is:new", 0)
            .unwrap();
        assert_eq!(found.len(), 1);

        let none = store.filtered_deck_candidates("tag:easy", 0).unwrap();
        assert!(none.is_empty());

        assert!(matches!(
            store.filtered_deck_candidates("prop:ivl>2", 0),
            Err(StoreError::InvalidSearch(_))
        ));
    }

    #[test]
    fn candidates_exclude_hidden_learning_and_filtered_cards() {
        let mut store = InMemoryCollection::new(0);
        let mut suspended = card_in(DeckId(1), 1);
        suspended.queue = CardQueue::Suspended;
        let mut learning = card_in(DeckId(1), 2);
        learning.queue = CardQueue::Learning;
        let mut crammed = card_in(DeckId(1), 3);
        crammed.original_deck_id = DeckId(1);
        let plain = card_in(DeckId(1), 4);
        for card in [suspended, learning, crammed, plain] {
            store.add_card(card).unwrap();
        }
        let found = store.filtered_deck_candidates("", 0).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, CardId(4));
    }

    #[test]
    fn rollback_restores_the_snapshot() {
        let mut store = InMemoryCollection::new(0);
        store.add_card(card_in(DeckId(1), 1)).unwrap();
        store.begin_transaction();
        store.add_card(card_in(DeckId(1), 2)).unwrap();
        store.set_last_unburied_day(4);
        store.rollback();
        assert!(store.get_card(CardId(2)).unwrap().is_none());
        assert_eq!(store.last_unburied_day(), 0);

        store.begin_transaction();
        store.add_card(card_in(DeckId(1), 3)).unwrap();
        store.commit();
        assert!(store.get_card(CardId(3)).unwrap().is_some());
    }
}
