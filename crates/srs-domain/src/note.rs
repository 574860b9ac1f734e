//! Minimal note record. The scheduler only ever touches tags.

use serde::{Deserialize, Serialize};

use crate::ids::{NoteId, Usn};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub tags: Vec<String>,
    pub mtime_secs: i64,
    pub usn: Usn,
}

impl Note {
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    /// Append a tag unless an equivalent one is already present.
    /// Returns true if the note changed.
    pub fn add_tag(&mut self, tag: &str) -> bool {
        if self.has_tag(tag) {
            false
        } else {
            self.tags.push(tag.to_string());
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_tag_is_idempotent() {
        let mut note = Note::default();
        assert!(note.add_tag("leech"));
        assert!(!note.add_tag("Leech"));
        assert_eq!(note.tags, vec!["leech"]);
    }
}
