//! Validated answer grades.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The user's grade on an answer, 1 (Again) through 4 (Easy).
///
/// The variant names follow the four-button review scale. Learning cards
/// offer only three buttons, where the raw value 2 advances a step and 3
/// graduates the card immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ease {
    /// Failed to recall; repeat from the first step.
    Again = 1,
    /// Recalled with difficulty.
    Hard = 2,
    /// Recalled correctly.
    Good = 3,
    /// Recalled effortlessly.
    Easy = 4,
}

/// Error raised when a raw button value falls outside 1..=4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("answer ease must be between 1 and 4, got {provided}")]
pub struct EaseError {
    pub provided: u8,
}

impl Ease {
    /// Validate a raw button number.
    ///
    /// # Errors
    ///
    /// Returns [`EaseError`] when the value is outside 1..=4.
    pub fn from_u8(value: u8) -> Result<Self, EaseError> {
        match value {
            1 => Ok(Ease::Again),
            2 => Ok(Ease::Hard),
            3 => Ok(Ease::Good),
            4 => Ok(Ease::Easy),
            _ => Err(EaseError { provided: value }),
        }
    }

    /// The raw button number.
    #[must_use]
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Ease {
    type Error = EaseError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_u8(value)
    }
}
