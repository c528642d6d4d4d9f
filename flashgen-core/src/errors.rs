use crate::validation::ValidationIssue;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("not found: {0}")]
    NotFound(&'static str),
    #[error("invalid input: {}", join_messages(.0))]
    Validation(Vec<ValidationIssue>),
    #[error("Missing generation ID. Please try again.")]
    MissingGenerationId,
    #[error("No flashcards selected for saving.")]
    NothingToSave,
    #[error("conflict: {0}")]
    Conflict(&'static str),
    #[error("generator error: {0}")]
    Generator(String),
    #[error("storage error: {0}")]
    Storage(String),
}

impl CoreError {
    pub fn storage(context: &str, err: impl std::fmt::Display) -> Self {
        CoreError::Storage(format!("{context}: {err}"))
    }

    /// Code written to the generation error log.
    pub fn error_code(&self) -> &'static str {
        match self {
            CoreError::Storage(_) => "STORAGE_ERROR",
            CoreError::Validation(_) => "VALIDATION_ERROR",
            _ => "AI_SERVICE_ERROR",
        }
    }
}

fn join_messages(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(|i| i.message.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
