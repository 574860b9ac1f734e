//! Error types returned by the scheduler.

use thiserror::Error;

use srs_domain::{CardId, CardQueue, DeckConfigId, DeckId, EaseError, NoteId};

use crate::store::StoreError;

pub type Result<T, E = SchedulerError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("card {card_id} cannot be answered from queue {queue:?}")]
    InvalidQueue { card_id: CardId, queue: CardQueue },
    #[error(transparent)]
    InvalidEase(#[from] EaseError),
    #[error("card not found: {0}")]
    CardNotFound(CardId),
    #[error("deck not found: {0}")]
    DeckNotFound(DeckId),
    #[error("deck config not found: {0}")]
    DeckConfigNotFound(DeckConfigId),
    #[error("note not found: {0}")]
    NoteNotFound(NoteId),
    #[error("deck {0} is not filtered")]
    NotFiltered(DeckId),
    #[error("storage: {0}")]
    Storage(#[from] StoreError),
}
