use flashgen_core::{
    source_text_issues, Flashcard, FlashcardsCreateCommand, GenerateFlashcardsCommand,
    ValidationIssue,
};
use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, GENERATION_FAILED};

/// `{flashcards: [...]}`, returned by both flashcard endpoints.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FlashcardsOut {
    pub flashcards: Vec<Flashcard>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub generation_id: Option<i64>,
}

/// Parses and validates a generation request body.
///
/// A body that is not JSON at all is a 500; a JSON body with a bad
/// `source_text` is a 400.
pub fn parse_generate_body(bytes: &[u8]) -> Result<GenerateFlashcardsCommand, ApiError> {
    let value: serde_json::Value =
        serde_json::from_slice(bytes).map_err(|e| ApiError::internal(GENERATION_FAILED, e))?;

    let source_text = match value.get("source_text") {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(_) => return Err(invalid_type("Expected string")),
        None => return Err(invalid_type("Required")),
    };

    let issues = source_text_issues(&source_text);
    if !issues.is_empty() {
        return Err(ApiError::InvalidInput(issues));
    }
    Ok(GenerateFlashcardsCommand { source_text })
}

/// Parses and validates a bulk-save request body.
pub fn parse_flashcards_body(bytes: &[u8]) -> Result<FlashcardsCreateCommand, ApiError> {
    let cmd: FlashcardsCreateCommand = serde_json::from_slice(bytes).map_err(|e| {
        ApiError::InvalidJson(vec![ValidationIssue::new("", "invalid_json", e.to_string())])
    })?;
    validate_flashcards(&cmd)?;
    Ok(cmd)
}

pub fn validate_flashcards(cmd: &FlashcardsCreateCommand) -> Result<(), ApiError> {
    if cmd.flashcards.is_empty() {
        return Err(ApiError::InvalidInput(vec![ValidationIssue::new(
            "flashcards",
            "too_small",
            "At least one flashcard is required",
        )]));
    }
    let issues: Vec<_> = cmd
        .flashcards
        .iter()
        .enumerate()
        .flat_map(|(i, card)| flashgen_core::flashcard_issues(i, card))
        .collect();
    if issues.is_empty() {
        Ok(())
    } else {
        Err(ApiError::InvalidInput(issues))
    }
}

fn invalid_type(message: &str) -> ApiError {
    ApiError::InvalidInput(vec![ValidationIssue::new("source_text", "invalid_type", message)])
}
