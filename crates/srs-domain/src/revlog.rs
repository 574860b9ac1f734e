//! Append-only review log rows, one per answer.

use serde::{Deserialize, Serialize};

use crate::ease::Ease;
use crate::ids::{CardId, RevlogId, Usn};

/// Which answering path produced the entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RevlogKind {
    Learning,
    Review,
    Relearning,
    Cram,
}

/// One review log row. Positive intervals are days, negative are seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevlogEntry {
    /// Millisecond timestamp of the answer; also the primary key.
    pub id: RevlogId,
    pub card_id: CardId,
    pub usn: Usn,
    pub ease: Ease,
    pub interval: i32,
    pub last_interval: i32,
    pub ease_factor: u16,
    pub time_taken_ms: u32,
    pub kind: RevlogKind,
}
