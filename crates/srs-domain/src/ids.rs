//! Identifier newtypes wrapping the raw `i64` values used in storage.

use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash,
            serde::Serialize, serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// Creates an identifier from the raw stored value.
            #[must_use]
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Returns the underlying value.
            #[must_use]
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

define_id!(
    /// Stable card identifier (millisecond epoch at creation).
    CardId
);
define_id!(
    /// Owning note identifier; a weak relation from the card's point of view.
    NoteId
);
define_id!(
    /// Deck identifier. Zero means "no deck" in the `original_deck_id` slot.
    DeckId
);
define_id!(
    /// Deck configuration identifier.
    DeckConfigId
);
define_id!(
    /// Review log primary key: the answer's millisecond timestamp.
    RevlogId
);

/// Update sequence number attached to every mutated row for sync.
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash,
    serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct Usn(pub i32);
