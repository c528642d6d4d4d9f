//! Review-time state of a generation's proposals.
//!
//! Every mutation returns a new store and leaves the receiver untouched, so
//! anything still holding the previous value keeps seeing the previous list.
//! Entries are addressed by position; indices past the end are ignored.

use crate::validation::{validate_back, validate_front};
use crate::{FlashcardProposal, FlashcardSource, ProposalViewEntry};
use std::sync::Arc;

#[derive(Clone, Debug, Default)]
pub struct ProposalStore {
    entries: Arc<Vec<ProposalViewEntry>>,
    version: u64,
}

impl ProposalStore {
    pub fn from_proposals(proposals: impl IntoIterator<Item = FlashcardProposal>) -> Self {
        Self {
            entries: Arc::new(proposals.into_iter().map(ProposalViewEntry::from).collect()),
            version: 0,
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ProposalViewEntry> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[ProposalViewEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProposalViewEntry> {
        self.entries.iter()
    }

    pub fn accepted_count(&self) -> usize {
        self.entries.iter().filter(|e| e.accepted).count()
    }

    /// Positions whose front or back is over its length limit.
    pub fn invalid_indices(&self) -> Vec<usize> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| {
                validate_front(&e.proposal.front).is_some() || validate_back(&e.proposal.back).is_some()
            })
            .map(|(i, _)| i)
            .collect()
    }

    /// True when both values share the same underlying list.
    pub fn same_list(&self, other: &ProposalStore) -> bool {
        Arc::ptr_eq(&self.entries, &other.entries)
    }

    pub fn toggle_accept(&self, index: usize) -> Self {
        self.update(index, |e| e.accepted = !e.accepted)
    }

    /// Lengths are not checked here; saving re-validates.
    pub fn edit(&self, index: usize, front: impl Into<String>, back: impl Into<String>) -> Self {
        let (front, back) = (front.into(), back.into());
        self.update(index, move |e| {
            e.proposal.front = front;
            e.proposal.back = back;
            e.proposal.source = FlashcardSource::AiEdited;
            e.edited = true;
        })
    }

    pub fn remove(&self, index: usize) -> Self {
        if index >= self.entries.len() {
            return self.clone();
        }
        let mut entries = Vec::clone(&self.entries);
        entries.remove(index);
        Self {
            entries: Arc::new(entries),
            version: self.version + 1,
        }
    }

    fn update(&self, index: usize, f: impl FnOnce(&mut ProposalViewEntry)) -> Self {
        if index >= self.entries.len() {
            return self.clone();
        }
        let mut entries = Arc::clone(&self.entries);
        f(&mut Arc::make_mut(&mut entries)[index]);
        Self {
            entries,
            version: self.version + 1,
        }
    }
}
