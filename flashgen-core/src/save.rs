use crate::client::{ClientAction, ClientError, FlashcardApi};
use crate::validation::{validate_back, validate_front, ValidationIssue};
use crate::{CoreError, Flashcard, FlashcardRecord, FlashcardsCreateCommand, GenerationId, ProposalViewEntry};
use thiserror::Error;
use tracing::info;

/// Filters and maps review entries into one batch, refusing to produce a
/// batch that could not be saved.
pub fn build_batch(
    entries: &[ProposalViewEntry],
    only_accepted: bool,
    generation_id: Option<GenerationId>,
) -> Result<FlashcardsCreateCommand, CoreError> {
    let generation_id = generation_id.ok_or(CoreError::MissingGenerationId)?;

    let kept: Vec<(usize, &ProposalViewEntry)> = entries
        .iter()
        .enumerate()
        .filter(|(_, e)| !only_accepted || e.accepted)
        .collect();
    if kept.is_empty() {
        return Err(CoreError::NothingToSave);
    }

    let issues: Vec<ValidationIssue> = kept
        .iter()
        .flat_map(|(i, e)| {
            let path = |field: &str| format!("flashcards[{i}].{field}");
            let front = validate_front(&e.proposal.front)
                .map(|m| ValidationIssue::new(path("front"), "too_big", format!("Flashcard {}: {m}", i + 1)));
            let back = validate_back(&e.proposal.back)
                .map(|m| ValidationIssue::new(path("back"), "too_big", format!("Flashcard {}: {m}", i + 1)));
            front.into_iter().chain(back)
        })
        .collect();
    if !issues.is_empty() {
        return Err(CoreError::Validation(issues));
    }

    Ok(FlashcardsCreateCommand {
        flashcards: kept
            .into_iter()
            .map(|(_, e)| FlashcardRecord {
                front: e.proposal.front.clone(),
                back: e.proposal.back.clone(),
                source: e.proposal.source,
                generation_id: Some(generation_id),
            })
            .collect(),
    })
}

#[derive(Debug, Error)]
pub enum SaveError {
    #[error(transparent)]
    Rejected(#[from] CoreError),
    #[error(transparent)]
    Client(#[from] ClientError),
}

impl SaveError {
    pub fn user_message(&self) -> String {
        match self {
            SaveError::Rejected(e) => rejection_message(e),
            SaveError::Client(e) => e.user_message(ClientAction::Save),
        }
    }
}

pub(crate) fn rejection_message(err: &CoreError) -> String {
    match err {
        CoreError::Validation(issues) => issues
            .iter()
            .map(|i| i.message.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

/// Builds the batch and submits it as a single request. Nothing is sent when
/// the batch is rejected locally.
pub async fn save_batch<A: FlashcardApi + ?Sized>(
    api: &A,
    entries: &[ProposalViewEntry],
    only_accepted: bool,
    generation_id: Option<GenerationId>,
) -> Result<Vec<Flashcard>, SaveError> {
    let cmd = build_batch(entries, only_accepted, generation_id)?;
    let saved = api.save_flashcards(&cmd).await?;
    info!(count = saved.len(), only_accepted, "saved flashcards");
    Ok(saved)
}
