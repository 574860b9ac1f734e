//! Card state as the scheduler sees it, plus the persisted row form.

use serde::{Deserialize, Serialize};

use crate::MINIMUM_EASE_FACTOR;
use crate::ids::{CardId, DeckId, NoteId, Usn};

/// Long-term classification of a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardType {
    /// Never answered.
    New,
    /// Working through the learning steps for the first time.
    Learning,
    /// Graduated; scheduled in whole days.
    Review,
}

impl CardType {
    /// Storage code for the row form.
    #[must_use]
    pub fn code(self) -> i8 {
        match self {
            CardType::New => 0,
            CardType::Learning => 1,
            CardType::Review => 2,
        }
    }

    /// Decode a stored type code. Unknown codes fall back to `New`.
    #[must_use]
    pub fn from_code(code: i8) -> Self {
        match code {
            1 => CardType::Learning,
            2 => CardType::Review,
            _ => CardType::New,
        }
    }
}

/// Which queue the card currently sits in. May diverge from [`CardType`]:
/// a buried review card keeps `ctype = Review` while `queue = UserBuried`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardQueue {
    /// Waiting to be introduced; `due` is a position.
    New,
    /// Sub-day learning; `due` is a unix timestamp in seconds.
    Learning,
    /// Due for review; `due` is a day index.
    Review,
    /// Learning step crossed a day boundary; `due` is a day index.
    DayLearning,
    /// Pulled into a filtered deck and not yet answered there.
    CramNew,
    /// Hidden by the user until the next manual unbury.
    UserBuried,
    /// Hidden by sibling burying until the next day rollover.
    SchedBuried,
    /// Never shown.
    Suspended,
    /// Unknown or retired queue code; skipped by scheduling.
    Removed,
}

impl CardQueue {
    /// Storage code for the row form.
    #[must_use]
    pub fn code(self) -> i8 {
        match self {
            CardQueue::New => 0,
            CardQueue::Learning => 1,
            CardQueue::Review => 2,
            CardQueue::DayLearning => 3,
            CardQueue::CramNew => 4,
            CardQueue::Suspended => -1,
            CardQueue::SchedBuried => -2,
            CardQueue::UserBuried => -3,
            CardQueue::Removed => -4,
        }
    }

    /// Decode a stored queue code; anything unrecognised becomes `Removed`.
    #[must_use]
    pub fn from_code(code: i8) -> Self {
        match code {
            0 => CardQueue::New,
            1 => CardQueue::Learning,
            2 => CardQueue::Review,
            3 => CardQueue::DayLearning,
            4 => CardQueue::CramNew,
            -1 => CardQueue::Suspended,
            -2 => CardQueue::SchedBuried,
            -3 => CardQueue::UserBuried,
            _ => CardQueue::Removed,
        }
    }

    /// True for either bury flavour.
    #[must_use]
    pub fn is_buried(self) -> bool {
        matches!(self, CardQueue::UserBuried | CardQueue::SchedBuried)
    }

    /// True when the card must never be served.
    #[must_use]
    pub fn is_hidden(self) -> bool {
        self.is_buried() || matches!(self, CardQueue::Suspended | CardQueue::Removed)
    }

    /// True for the sub-day and day-boundary learning queues.
    #[must_use]
    pub fn is_learning(self) -> bool {
        matches!(self, CardQueue::Learning | CardQueue::DayLearning)
    }
}

/// Learning progress, kept unpacked in memory.
///
/// Storage squeezes both counters into one integer
/// (`remaining_today * 1000 + remaining_total`); arithmetic in the scheduler
/// always works on this explicit form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnProgress {
    /// Steps that can still be completed before the day cutoff.
    pub remaining_today: u16,
    /// Steps remaining until graduation.
    pub remaining_total: u16,
}

impl LearnProgress {
    /// Pack into the stored `left` field.
    #[must_use]
    pub fn pack(self) -> u32 {
        u32::from(self.remaining_today) * 1000 + u32::from(self.remaining_total)
    }

    /// Unpack from the stored `left` field.
    #[must_use]
    pub fn unpack(left: u32) -> Self {
        Self {
            remaining_today: (left / 1000) as u16,
            remaining_total: (left % 1000) as u16,
        }
    }
}

/// Persisted card row, columns in table order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredCard {
    pub id: i64,
    pub note_id: i64,
    pub deck_id: i64,
    pub template_ord: u16,
    pub mtime_secs: i64,
    pub usn: i32,
    pub ctype: i8,
    pub queue: i8,
    pub due: i32,
    pub interval: i32,
    pub ease_factor: u16,
    pub reps: u32,
    pub lapses: u32,
    pub left: u32,
    pub original_due: i32,
    pub original_deck_id: i64,
    pub flags: u8,
    pub data: String,
}

/// A materialised card. `due` is interpreted per queue: a position for
/// new/cram-new cards, a day index for review and day-learning cards, and a
/// unix second for sub-day learning cards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub note_id: NoteId,
    pub deck_id: DeckId,
    pub template_ord: u16,
    pub mtime_secs: i64,
    pub usn: Usn,
    pub ctype: CardType,
    pub queue: CardQueue,
    pub due: i64,
    /// Interval in whole days once graduated.
    pub interval: u32,
    /// Ease factor in permille; zero until first graduation.
    pub ease_factor: u16,
    pub reps: u32,
    pub lapses: u32,
    pub steps: LearnProgress,
    /// Original due, non-zero only while the card lives in a filtered deck.
    pub original_due: i64,
    /// Original deck, non-zero only while the card lives in a filtered deck.
    pub original_deck_id: DeckId,
    pub flags: u8,
    pub data: String,
}

impl Default for Card {
    fn default() -> Self {
        Self {
            id: CardId(0),
            note_id: NoteId(0),
            deck_id: DeckId(1),
            template_ord: 0,
            mtime_secs: 0,
            usn: Usn(0),
            ctype: CardType::New,
            queue: CardQueue::New,
            due: 0,
            interval: 0,
            ease_factor: 0,
            reps: 0,
            lapses: 0,
            steps: LearnProgress::default(),
            original_due: 0,
            original_deck_id: DeckId(0),
            flags: 0,
            data: String::new(),
        }
    }
}

impl Card {
    /// Hydrate a row, normalising legacy and out-of-range values: sub-day
    /// intervals stored as negative seconds become whole days, a non-zero
    /// ease factor is clamped to the minimum, and unknown queue codes map to
    /// [`CardQueue::Removed`].
    #[must_use]
    pub fn from_stored(row: StoredCard) -> Self {
        let interval = if row.interval < 0 {
            ((-i64::from(row.interval)) / 86_400).max(1) as u32
        } else {
            row.interval as u32
        };
        let ease_factor = if row.ease_factor == 0 {
            0
        } else {
            row.ease_factor.max(MINIMUM_EASE_FACTOR)
        };
        Self {
            id: CardId(row.id),
            note_id: NoteId(row.note_id),
            deck_id: DeckId(row.deck_id),
            template_ord: row.template_ord,
            mtime_secs: row.mtime_secs,
            usn: Usn(row.usn),
            ctype: CardType::from_code(row.ctype),
            queue: CardQueue::from_code(row.queue),
            due: i64::from(row.due),
            interval,
            ease_factor,
            reps: row.reps,
            lapses: row.lapses,
            steps: LearnProgress::unpack(row.left),
            original_due: i64::from(row.original_due),
            original_deck_id: DeckId(row.original_deck_id),
            flags: row.flags,
            data: row.data,
        }
    }

    /// Flatten back into the row form for persistence.
    #[must_use]
    pub fn to_stored(&self) -> StoredCard {
        StoredCard {
            id: self.id.get(),
            note_id: self.note_id.get(),
            deck_id: self.deck_id.get(),
            template_ord: self.template_ord,
            mtime_secs: self.mtime_secs,
            usn: self.usn.0,
            ctype: self.ctype.code(),
            queue: self.queue.code(),
            due: self.due as i32,
            interval: self.interval as i32,
            ease_factor: self.ease_factor,
            reps: self.reps,
            lapses: self.lapses,
            left: self.steps.pack(),
            original_due: self.original_due as i32,
            original_deck_id: self.original_deck_id.get(),
            flags: self.flags,
            data: self.data.clone(),
        }
    }

    /// True while the card is hosted by a filtered deck.
    #[must_use]
    pub fn is_in_filtered_deck(&self) -> bool {
        self.original_deck_id.get() != 0
    }

    /// Move the card back to its home deck, restoring the saved due value.
    pub fn remove_from_filtered_deck(&mut self) {
        if self.is_in_filtered_deck() {
            self.deck_id = self.original_deck_id;
            self.due = self.original_due;
            self.original_deck_id = DeckId(0);
            self.original_due = 0;
        }
    }

    /// Re-derive the queue from the card type, as unsuspend/unbury do.
    pub fn restore_queue_from_type(&mut self) {
        self.queue = match self.ctype {
            CardType::New => CardQueue::New,
            CardType::Learning => CardQueue::Learning,
            CardType::Review => CardQueue::Review,
        };
    }

    /// Undo a bury or suspension. Returns true if the card was hidden.
    pub fn restore_queue_after_bury_or_suspend(&mut self) -> bool {
        if !matches!(
            self.queue,
            CardQueue::Suspended | CardQueue::SchedBuried | CardQueue::UserBuried
        ) {
            false
        } else {
            self.restore_queue_from_type();
            true
        }
    }

    /// Reset to a brand-new card at the given position.
    pub fn schedule_as_new(&mut self, position: u32) {
        self.remove_from_filtered_deck();
        self.due = i64::from(position);
        self.ctype = CardType::New;
        self.queue = CardQueue::New;
        self.interval = 0;
        self.ease_factor = 0;
        self.steps = LearnProgress::default();
    }
}
