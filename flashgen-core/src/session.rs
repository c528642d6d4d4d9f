//! Review session: the state a front end keeps between "generate" and
//! "save", with no I/O of its own.
//!
//! Network calls are started with `begin_*`, which hands out a ticket, and
//! finished with `complete_*`. Each ticket carries the epoch it was issued
//! under; a completion whose epoch is no longer the in-flight one is dropped
//! as stale, so a late response never overwrites newer state.

use crate::client::{ClientAction, ClientError};
use crate::proposals::ProposalStore;
use crate::save::{build_batch, rejection_message};
use crate::validation::{char_len, validate_source_text, SourceTextCheck};
use crate::{
    Flashcard, FlashcardsCreateCommand, GenerateFlashcardsCommand, GenerationCreateResponse,
    GenerationId, SOURCE_TEXT_MAX, SOURCE_TEXT_MIN,
};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("a generation is already in progress")]
    GenerationInFlight,
    #[error("a save is already in progress")]
    SaveInFlight,
    #[error("{0}")]
    Rejected(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationTicket {
    epoch: u64,
    pub command: GenerateFlashcardsCommand,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaveTicket {
    epoch: u64,
    pub only_accepted: bool,
    pub command: FlashcardsCreateCommand,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Completion {
    Applied,
    Stale,
}

#[derive(Clone, Debug, Default)]
pub struct ReviewSession {
    source_text: String,
    proposals: ProposalStore,
    generation_id: Option<GenerationId>,
    error: Option<String>,
    save_error: Option<String>,
    save_success: bool,
    epoch: u64,
    generating: Option<u64>,
    saving: Option<u64>,
}

impl ReviewSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source_text(text: impl Into<String>) -> Self {
        Self {
            source_text: text.into(),
            ..Self::default()
        }
    }

    // ===== Source text =====

    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    pub fn set_source_text(&mut self, text: impl Into<String>) {
        self.source_text = text.into();
    }

    pub fn source_check(&self) -> SourceTextCheck {
        validate_source_text(&self.source_text)
    }

    pub fn can_generate(&self) -> bool {
        self.source_check().valid && !self.is_generating()
    }

    // ===== Generation =====

    pub fn begin_generation(&mut self) -> Result<GenerationTicket, SessionError> {
        if self.is_generating() {
            return Err(SessionError::GenerationInFlight);
        }
        let len = char_len(&self.source_text);
        if len < SOURCE_TEXT_MIN || len > SOURCE_TEXT_MAX {
            let msg = if len < SOURCE_TEXT_MIN {
                format!("Text must contain at least {SOURCE_TEXT_MIN} characters. Current length: {len}")
            } else {
                format!("Text cannot exceed {SOURCE_TEXT_MAX} characters. Current length: {len}")
            };
            self.error = Some(msg.clone());
            return Err(SessionError::Rejected(msg));
        }

        self.error = None;
        let epoch = self.next_epoch();
        self.generating = Some(epoch);
        // A save still in flight belongs to the previous generation.
        self.saving = None;
        Ok(GenerationTicket {
            epoch,
            command: GenerateFlashcardsCommand {
                source_text: self.source_text.clone(),
            },
        })
    }

    pub fn complete_generation(
        &mut self,
        ticket: &GenerationTicket,
        result: Result<GenerationCreateResponse, ClientError>,
    ) -> Completion {
        if self.generating != Some(ticket.epoch) {
            return Completion::Stale;
        }
        self.generating = None;
        match result {
            Ok(out) => {
                self.generation_id = Some(out.generation_id);
                self.proposals = ProposalStore::from_proposals(out.flashcards_proposals);
                self.save_error = None;
                self.save_success = false;
            }
            Err(e) => self.error = Some(e.user_message(ClientAction::Generate)),
        }
        Completion::Applied
    }

    pub fn is_generating(&self) -> bool {
        self.generating.is_some()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn generation_id(&self) -> Option<GenerationId> {
        self.generation_id
    }

    // ===== Review =====

    pub fn proposals(&self) -> &ProposalStore {
        &self.proposals
    }

    pub fn toggle_accept(&mut self, index: usize) {
        self.proposals = self.proposals.toggle_accept(index);
    }

    pub fn edit(&mut self, index: usize, front: impl Into<String>, back: impl Into<String>) {
        self.proposals = self.proposals.edit(index, front, back);
    }

    pub fn remove(&mut self, index: usize) {
        self.proposals = self.proposals.remove(index);
    }

    pub fn accepted_count(&self) -> usize {
        self.proposals.accepted_count()
    }

    pub fn total_count(&self) -> usize {
        self.proposals.len()
    }

    // ===== Save =====

    pub fn save_approved_enabled(&self) -> bool {
        !self.is_saving() && self.accepted_count() > 0
    }

    pub fn save_all_enabled(&self) -> bool {
        !self.is_saving() && self.total_count() > 0
    }

    pub fn begin_save(&mut self, only_accepted: bool) -> Result<SaveTicket, SessionError> {
        if self.is_saving() {
            return Err(SessionError::SaveInFlight);
        }
        self.save_success = false;
        let command = match build_batch(self.proposals.entries(), only_accepted, self.generation_id) {
            Ok(cmd) => cmd,
            Err(e) => {
                let msg = rejection_message(&e);
                self.save_error = Some(msg.clone());
                return Err(SessionError::Rejected(msg));
            }
        };

        self.save_error = None;
        let epoch = self.next_epoch();
        self.saving = Some(epoch);
        Ok(SaveTicket {
            epoch,
            only_accepted,
            command,
        })
    }

    pub fn complete_save(
        &mut self,
        ticket: &SaveTicket,
        result: Result<Vec<Flashcard>, ClientError>,
    ) -> Completion {
        if self.saving != Some(ticket.epoch) {
            return Completion::Stale;
        }
        self.saving = None;
        match result {
            Ok(_) => self.save_success = true,
            Err(e) => self.save_error = Some(e.user_message(ClientAction::Save)),
        }
        Completion::Applied
    }

    pub fn is_saving(&self) -> bool {
        self.saving.is_some()
    }

    pub fn save_error(&self) -> Option<&str> {
        self.save_error.as_deref()
    }

    pub fn save_success(&self) -> bool {
        self.save_success
    }

    /// Drops proposals and any outstanding requests; late results become stale.
    pub fn reset(&mut self) {
        let epoch = self.next_epoch();
        *self = Self {
            source_text: std::mem::take(&mut self.source_text),
            epoch,
            ..Self::default()
        };
    }

    fn next_epoch(&mut self) -> u64 {
        self.epoch += 1;
        self.epoch
    }
}
