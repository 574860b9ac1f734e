//! Per-deck scheduling configuration.

use serde::{Deserialize, Serialize};

use crate::INITIAL_EASE_FACTOR;
use crate::ids::DeckConfigId;

/// Order in which new cards leave the new queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NewCardOrder {
    /// By stored position.
    Due,
    /// Shuffled (deterministically per day).
    Random,
}

/// What happens to a card that keeps lapsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeechAction {
    Suspend,
    TagOnly,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCardConfig {
    /// Daily introduction cap.
    pub per_day: u32,
    /// Learning step delays in minutes.
    pub delays: Vec<f32>,
    /// Graduating interval, easy interval, and an unused legacy slot, in days.
    pub intervals: [u32; 3],
    /// Ease factor granted on first graduation, permille.
    pub initial_factor: u16,
    pub order: NewCardOrder,
    /// Bury siblings from the new queue when answering.
    pub bury: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewCardConfig {
    /// Daily review cap.
    pub per_day: u32,
    /// Extra multiplier applied by the Easy button.
    pub easy_multiplier: f32,
    /// Global multiplier applied to every computed review interval.
    pub interval_multiplier: f32,
    /// Ceiling on any interval, in days.
    pub max_interval: u32,
    /// Bury siblings from the review queue when answering.
    pub bury: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LapseConfig {
    /// Relearning step delays in minutes. Empty means no relearning steps.
    pub delays: Vec<f32>,
    /// Multiplier applied to the old interval on lapse.
    pub multiplier: f32,
    /// Floor for the post-lapse interval, in days.
    pub min_interval: u32,
    /// Lapse count at which the card becomes a leech; zero disables.
    pub leech_fails: u32,
    pub leech_action: LeechAction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeckConfig {
    pub id: DeckConfigId,
    pub name: String,
    pub new: NewCardConfig,
    pub review: ReviewCardConfig,
    pub lapse: LapseConfig,
    /// Combined daily cap used by the "limit all cards" option.
    pub per_day_total: u32,
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            id: DeckConfigId(1),
            name: "Default".into(),
            new: NewCardConfig {
                per_day: 20,
                delays: vec![1.0, 10.0],
                intervals: [1, 4, 7],
                initial_factor: INITIAL_EASE_FACTOR,
                order: NewCardOrder::Due,
                bury: true,
            },
            review: ReviewCardConfig {
                per_day: 100,
                easy_multiplier: 1.3,
                interval_multiplier: 1.0,
                max_interval: 36_500,
                bury: true,
            },
            lapse: LapseConfig {
                delays: vec![10.0],
                multiplier: 0.0,
                min_interval: 1,
                leech_fails: 8,
                leech_action: LeechAction::Suspend,
            },
            per_day_total: 1_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_expected_values() {
        let config = DeckConfig::default();
        assert_eq!(config.new.delays, vec![1.0, 10.0]);
        assert_eq!(config.new.intervals, [1, 4, 7]);
        assert_eq!(config.new.initial_factor, 2_500);
        assert_eq!(config.review.max_interval, 36_500);
        assert_eq!(config.lapse.leech_action, LeechAction::Suspend);
        assert_eq!(config.per_day_total, 1_000);
    }
}
