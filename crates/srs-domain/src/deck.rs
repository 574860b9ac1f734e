//! Deck records. Hierarchy is implied by `::` separators in the name.

use serde::{Deserialize, Serialize};

use crate::ids::{DeckConfigId, DeckId, Usn};

/// One daily counter: the day index it was last touched, and the tally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCounter {
    pub day: u32,
    pub count: i32,
}

impl DailyCounter {
    /// Add to the tally, first resetting it if `today` has moved on.
    pub fn add(&mut self, today: u32, amount: i32) {
        if self.day != today {
            self.day = today;
            self.count = 0;
        }
        self.count += amount;
    }

    /// The tally, valid only for `today`; any stale value reads as zero.
    #[must_use]
    pub fn for_day(&self, today: u32) -> i32 {
        if self.day == today { self.count } else { 0 }
    }
}

/// Counters shared by normal and filtered decks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckCommon {
    pub new_today: DailyCounter,
    pub review_today: DailyCounter,
    pub learn_today: DailyCounter,
    pub time_today_ms: DailyCounter,
}

/// Ordering applied when gathering cards into a filtered deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilteredSearchOrder {
    OldestReviewedFirst,
    Random,
    IntervalsAscending,
    IntervalsDescending,
    Lapses,
    Added,
    Due,
}

/// One gathering rule of a filtered deck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilteredSearchTerm {
    pub search: String,
    pub limit: u32,
    pub order: FilteredSearchOrder,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalDeck {
    pub config_id: DeckConfigId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilteredDeck {
    pub search_terms: Vec<FilteredSearchTerm>,
    /// When false, answers inside the deck do not reschedule the card.
    pub reschedule: bool,
    /// Learning step delays in minutes, overriding the home deck's steps.
    pub delays: Option<Vec<f32>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DeckKind {
    Normal(NormalDeck),
    Filtered(FilteredDeck),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    pub id: DeckId,
    pub name: String,
    pub mtime_secs: i64,
    pub usn: Usn,
    pub common: DeckCommon,
    pub kind: DeckKind,
}

impl Deck {
    /// A normal deck with the given name, using the default configuration.
    #[must_use]
    pub fn new_normal(id: DeckId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            mtime_secs: 0,
            usn: Usn(0),
            common: DeckCommon::default(),
            kind: DeckKind::Normal(NormalDeck {
                config_id: DeckConfigId(1),
            }),
        }
    }

    /// A filtered deck hosting cards matched by `term`.
    #[must_use]
    pub fn new_filtered(id: DeckId, name: impl Into<String>, term: FilteredSearchTerm) -> Self {
        Self {
            id,
            name: name.into(),
            mtime_secs: 0,
            usn: Usn(0),
            common: DeckCommon::default(),
            kind: DeckKind::Filtered(FilteredDeck {
                search_terms: vec![term],
                reschedule: true,
                delays: None,
            }),
        }
    }

    #[must_use]
    pub fn is_filtered(&self) -> bool {
        matches!(self.kind, DeckKind::Filtered(_))
    }

    /// Config id if this is a normal deck.
    #[must_use]
    pub fn config_id(&self) -> Option<DeckConfigId> {
        match &self.kind {
            DeckKind::Normal(normal) => Some(normal.config_id),
            DeckKind::Filtered(_) => None,
        }
    }

    #[must_use]
    pub fn filtered(&self) -> Option<&FilteredDeck> {
        match &self.kind {
            DeckKind::Filtered(filtered) => Some(filtered),
            DeckKind::Normal(_) => None,
        }
    }

    /// Zero every stale daily counter. Returns true if anything changed.
    pub fn reset_counters_if_day_changed(&mut self, today: u32) -> bool {
        let c = &mut self.common;
        let mut changed = false;
        for counter in [
            &mut c.new_today,
            &mut c.review_today,
            &mut c.learn_today,
            &mut c.time_today_ms,
        ] {
            if counter.day != today {
                *counter = DailyCounter { day: today, count: 0 };
                changed = true;
            }
        }
        changed
    }
}

/// Name of the parent deck, if the name has one ("a::b::c" → "a::b").
#[must_use]
pub fn immediate_parent_name(name: &str) -> Option<&str> {
    name.rsplit_once("::").map(|(parent, _)| parent)
}
