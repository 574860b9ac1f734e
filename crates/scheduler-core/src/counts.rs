//! Workload counting: the session counters and the deck-due tree shown in
//! the deck list.

use std::collections::HashMap;

use srs_domain::{DeckId, immediate_parent_name};

use crate::REPORT_LIMIT;
use crate::errors::Result;
use crate::limits::LimitKind;
use crate::scheduler::Scheduler;
use crate::store::CollectionStore;

/// Raw per-deck counts, not including subdecks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckDueEntry {
    pub name: String,
    pub deck_id: DeckId,
    pub review: u32,
    pub learning: u32,
    pub new: u32,
}

/// One node of the deck tree, counts accumulated over the subtree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DueTreeNode {
    /// Name component relative to the parent node.
    pub name: String,
    pub deck_id: DeckId,
    pub review: u32,
    pub learning: u32,
    pub new: u32,
    pub children: Vec<DueTreeNode>,
}

impl<S: CollectionStore> Scheduler<S> {
    /// Recompute the session counters from storage.
    pub(crate) fn reset_counts(&mut self) -> Result<()> {
        let active = self.store.active_decks();
        let mut learning = self.store.learning_step_reps_before(
            &active,
            self.timing.day_cutoff_secs,
            REPORT_LIMIT,
        )?;
        for deck_id in &active {
            learning += self
                .store
                .day_learning_count(*deck_id, self.timing.today, REPORT_LIMIT)?;
        }
        self.counts.learning = learning;
        self.counts.review = self.walking_count(LimitKind::Review)?;
        self.counts.new = self.walking_count(LimitKind::New)?;
        Ok(())
    }

    /// Learning workload of one deck: sub-day steps inside the collapse
    /// window plus day-learning cards due today.
    fn learning_count_for_deck(&self, deck_id: DeckId) -> Result<u32> {
        let cutoff = self.clock.now_secs() + i64::from(self.options.collapse_time_secs);
        let sub_day =
            self.store
                .learning_step_reps_before(&[deck_id], cutoff, REPORT_LIMIT)?;
        let day = self
            .store
            .day_learning_count(deck_id, self.timing.today, REPORT_LIMIT)?;
        Ok(sub_day + day)
    }

    /// Per-deck counts in lexicographic name order, each capped by the
    /// deck's own and its ancestors' remaining limits.
    pub fn deck_due_list(&mut self) -> Result<Vec<DeckDueEntry>> {
        self.check_day()?;
        let mut decks = self.store.all_decks()?;
        decks.sort_by(|a, b| a.name.cmp(&b.name));
        let mut limits: HashMap<String, (u32, u32)> = HashMap::new();
        let mut entries = Vec::with_capacity(decks.len());
        for deck in decks {
            let parent_limits = immediate_parent_name(&deck.name)
                .and_then(|parent| limits.get(parent))
                .copied();
            let mut new_limit = self.deck_limit_single(&deck, LimitKind::New)?;
            let mut review_limit = self.deck_limit_single(&deck, LimitKind::Review)?;
            if let Some((parent_new, parent_review)) = parent_limits {
                new_limit = new_limit.min(parent_new);
                review_limit = review_limit.min(parent_review);
            }
            let new = self
                .store
                .new_card_count(deck.id, (new_limit as usize).min(REPORT_LIMIT))?;
            let learning = self.learning_count_for_deck(deck.id)?;
            let review = self.store.review_count_due(
                deck.id,
                self.timing.today,
                (review_limit as usize).min(REPORT_LIMIT),
            )?;
            entries.push(DeckDueEntry {
                name: deck.name.clone(),
                deck_id: deck.id,
                review,
                learning,
                new,
            });
            limits.insert(deck.name, (new_limit, review_limit));
        }
        Ok(entries)
    }

    /// The deck list as a tree, children folded into their parents and the
    /// subtree totals re-capped by each regular deck's own daily budget.
    pub fn deck_due_tree(&mut self) -> Result<Vec<DueTreeNode>> {
        let entries = self.deck_due_list()?;
        let items: Vec<(Vec<String>, DeckDueEntry)> = entries
            .into_iter()
            .map(|entry| {
                let parts = entry.name.split("::").map(str::to_string).collect();
                (parts, entry)
            })
            .collect();
        self.group_children(items)
    }

    fn group_children(
        &self,
        items: Vec<(Vec<String>, DeckDueEntry)>,
    ) -> Result<Vec<DueTreeNode>> {
        let mut tree = Vec::new();
        let mut iter = items.into_iter().peekable();
        while let Some((parts, entry)) = iter.next() {
            let head = parts[0].clone();
            let mut group = vec![(parts, entry)];
            while iter
                .peek()
                .is_some_and(|(parts, _)| parts[0] == head)
            {
                group.push(iter.next().expect("peeked item"));
            }

            let mut deck_id = DeckId(0);
            let mut review = 0u32;
            let mut learning = 0u32;
            let mut new = 0u32;
            let mut child_items = Vec::new();
            for (mut parts, entry) in group {
                if parts.len() == 1 {
                    deck_id = entry.deck_id;
                    review += entry.review;
                    learning += entry.learning;
                    new += entry.new;
                } else {
                    parts.remove(0);
                    child_items.push((parts, entry));
                }
            }
            let children = self.group_children(child_items)?;
            for child in &children {
                review += child.review;
                learning += child.learning;
                new += child.new;
            }
            // subtree totals are still bounded by this deck's own budget
            if let Some(deck) = self.store.get_deck(deck_id)? {
                if !deck.is_filtered() {
                    let config = self.config_for_deck(deck.id)?;
                    let today = self.timing.today;
                    let review_left = i64::from(config.review.per_day)
                        - i64::from(deck.common.review_today.for_day(today));
                    let new_left = i64::from(config.new.per_day)
                        - i64::from(deck.common.new_today.for_day(today));
                    review = review.min(review_left.max(0) as u32);
                    new = new.min(new_left.max(0) as u32);
                }
            }
            tree.push(DueTreeNode {
                name: head,
                deck_id,
                review,
                learning,
                new,
                children,
            });
        }
        Ok(tree)
    }

    /// Total reviews due today over the active decks, uncapped by per-day
    /// limits.
    pub fn total_review_count(&mut self) -> Result<u32> {
        self.check_day()?;
        let mut total = 0;
        for deck_id in self.store.active_decks() {
            total += self
                .store
                .review_count_due(deck_id, self.timing.today, REPORT_LIMIT)?;
        }
        Ok(total.min(REPORT_LIMIT as u32))
    }
}
