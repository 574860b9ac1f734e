//! Persistence abstraction used by the scheduler, with an in-memory
//! reference implementation for tests and embedders without a database.

mod memory;

pub use memory::InMemoryCollection;

use thiserror::Error;

use srs_domain::{
    Card, CardId, Deck, DeckConfig, DeckConfigId, DeckId, Note, NoteId, RevlogEntry, Usn,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A row with the same primary key already exists.
    #[error("duplicate primary key")]
    DuplicateKey,
    /// The targeted row does not exist.
    #[error("row not found")]
    NotFound,
    /// A filtered-deck search used syntax the store cannot evaluate.
    #[error("unsupported search term: {0}")]
    InvalidSearch(String),
}

/// Everything the scheduler needs from the surrounding collection.
///
/// Implementations are expected to be backed by a single synchronous
/// connection; the scheduler issues no concurrent calls. Writes between
/// `begin_transaction` and `commit` must become visible atomically.
pub trait CollectionStore {
    /// Unix second the collection was created; anchors the day grid.
    fn creation_stamp(&self) -> i64;
    /// Current update sequence number to stamp onto mutated rows.
    fn usn(&self) -> Usn;

    fn get_card(&self, id: CardId) -> Result<Option<Card>, StoreError>;
    fn add_card(&mut self, card: Card) -> Result<(), StoreError>;
    fn update_card(&mut self, card: &Card) -> Result<(), StoreError>;

    fn all_decks(&self) -> Result<Vec<Deck>, StoreError>;
    fn get_deck(&self, id: DeckId) -> Result<Option<Deck>, StoreError>;
    fn update_deck(&mut self, deck: &Deck) -> Result<(), StoreError>;
    fn deck_config(&self, id: DeckConfigId) -> Result<Option<DeckConfig>, StoreError>;

    fn get_note(&self, id: NoteId) -> Result<Option<Note>, StoreError>;
    fn update_note(&mut self, note: &Note) -> Result<(), StoreError>;

    /// Append one review log row. Fails with [`StoreError::DuplicateKey`]
    /// when the millisecond id collides with an existing row.
    fn add_revlog_entry(&mut self, entry: RevlogEntry) -> Result<(), StoreError>;

    /// The decks study currently operates on: the selected deck and its
    /// children.
    fn active_decks(&self) -> Vec<DeckId>;
    fn current_deck(&self) -> DeckId;

    /// Allocate the next position for a new card.
    fn next_card_position(&mut self) -> u32;
    fn last_unburied_day(&self) -> u32;
    fn set_last_unburied_day(&mut self, day: u32);

    /// Sub-day learning cards in the given decks with `due < cutoff`,
    /// ordered by due, at most `limit` rows.
    fn learning_cards_due_before(
        &self,
        decks: &[DeckId],
        cutoff_secs: i64,
        limit: usize,
    ) -> Result<Vec<(i64, CardId)>, StoreError>;
    /// Day-learning cards in one deck with `due <= today`.
    fn day_learning_cards(
        &self,
        deck: DeckId,
        today: u32,
        limit: usize,
    ) -> Result<Vec<CardId>, StoreError>;
    /// Review cards in one deck with `due <= today`, ordered by due.
    fn review_cards_due(
        &self,
        deck: DeckId,
        today: u32,
        limit: usize,
    ) -> Result<Vec<CardId>, StoreError>;
    /// New (and cram-new) cards in one deck, ordered by position.
    fn new_cards(&self, deck: DeckId, limit: usize) -> Result<Vec<CardId>, StoreError>;
    /// All other cards of the given note.
    fn sibling_cards(&self, note: NoteId, except: CardId) -> Result<Vec<Card>, StoreError>;
    fn cards_in_deck(&self, deck: DeckId) -> Result<Vec<CardId>, StoreError>;

    /// Sum of same-day step counts over sub-day learning cards due before
    /// the cutoff, over at most `limit` cards.
    fn learning_step_reps_before(
        &self,
        decks: &[DeckId],
        cutoff_secs: i64,
        limit: usize,
    ) -> Result<u32, StoreError>;
    fn day_learning_count(
        &self,
        deck: DeckId,
        today: u32,
        limit: usize,
    ) -> Result<u32, StoreError>;
    fn review_count_due(&self, deck: DeckId, today: u32, limit: usize)
    -> Result<u32, StoreError>;
    fn new_card_count(&self, deck: DeckId, limit: usize) -> Result<u32, StoreError>;

    /// Cards eligible for gathering into a filtered deck: the search must
    /// already exclude suspended, buried, learning, and filtered-deck cards.
    /// Ordering and truncation happen in the scheduler.
    fn filtered_deck_candidates(
        &self,
        search: &str,
        today: u32,
    ) -> Result<Vec<Card>, StoreError>;

    fn begin_transaction(&mut self);
    fn commit(&mut self);
    fn rollback(&mut self);
}
