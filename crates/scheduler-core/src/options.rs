//! Collection-level scheduling options.

/// How new cards are interleaved with reviews.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewSpread {
    /// Mix new cards evenly through the reviews.
    Distribute,
    /// Serve new cards after all reviews.
    Last,
    /// Serve new cards before reviews.
    First,
}

/// Which generation of step/leech behaviour to apply.
///
/// A single scheduler serves both; the tag only switches the sub-day step
/// fuzz and the moment the leech check runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerVersion {
    V1,
    V2,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SchedulerOptions {
    /// How far ahead (seconds) a learning card may be served early when
    /// nothing else is due.
    pub collapse_time_secs: u32,
    pub new_spread: NewSpread,
    /// Cap new+review work per deck by the config's combined daily total.
    pub limit_all_cards: bool,
    /// Apply randomised fuzz to review intervals.
    pub spread_reviews: bool,
    pub version: SchedulerVersion,
    /// Whether front-ends should display due counts; carried here because it
    /// is persisted with the other scheduling options.
    pub show_due_counts: bool,
    /// Bury sibling cards of an answered note.
    pub bury_siblings_on_answer: bool,
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self {
            collapse_time_secs: 1_200,
            new_spread: NewSpread::Distribute,
            limit_all_cards: false,
            spread_reviews: true,
            version: SchedulerVersion::V1,
            show_due_counts: true,
            bury_siblings_on_answer: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_expected_values() {
        let options = SchedulerOptions::default();
        assert_eq!(options.collapse_time_secs, 1_200);
        assert_eq!(options.new_spread, NewSpread::Distribute);
        assert!(options.spread_reviews);
        assert_eq!(options.version, SchedulerVersion::V1);
    }
}
