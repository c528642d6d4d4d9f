//! Length rules shared by the review session and the HTTP boundary.
//!
//! Lengths are counted in characters, never bytes, so a source text of
//! 1000 multi-byte characters is as valid as 1000 ASCII ones.

use crate::{FlashcardRecord, FlashcardSource, BACK_MAX, FRONT_MAX, SOURCE_TEXT_MAX, SOURCE_TEXT_MIN};
use serde::{Deserialize, Serialize};

/// One violated rule, shaped for the `details` array of a 400 response.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationIssue {
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub code: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(path: impl Into<String>, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            code: code.into(),
            message: message.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceTextCheck {
    pub valid: bool,
    pub error: Option<String>,
}

pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Empty text is "not yet attempted": invalid, but without an error.
pub fn validate_source_text(text: &str) -> SourceTextCheck {
    let len = char_len(text);
    let error = if len == 0 {
        None
    } else if len < SOURCE_TEXT_MIN {
        Some(format!("Text must contain at least {SOURCE_TEXT_MIN} characters"))
    } else if len > SOURCE_TEXT_MAX {
        Some(format!("Text cannot exceed {SOURCE_TEXT_MAX} characters"))
    } else {
        return SourceTextCheck { valid: true, error: None };
    };
    SourceTextCheck { valid: false, error }
}

pub fn validate_field(text: &str, max_len: usize) -> Option<String> {
    (char_len(text) > max_len).then(|| format!("cannot exceed {max_len} characters"))
}

pub fn validate_front(front: &str) -> Option<String> {
    validate_field(front, FRONT_MAX).map(|e| format!("Front {e}"))
}

pub fn validate_back(back: &str) -> Option<String> {
    validate_field(back, BACK_MAX).map(|e| format!("Back {e}"))
}

pub fn source_text_issues(text: &str) -> Vec<ValidationIssue> {
    let len = char_len(text);
    if len < SOURCE_TEXT_MIN {
        vec![ValidationIssue::new(
            "source_text",
            "too_small",
            format!("Source text must contain at least {SOURCE_TEXT_MIN} characters"),
        )]
    } else if len > SOURCE_TEXT_MAX {
        vec![ValidationIssue::new(
            "source_text",
            "too_big",
            format!("Source text cannot exceed {SOURCE_TEXT_MAX} characters"),
        )]
    } else {
        Vec::new()
    }
}

pub fn flashcard_issues(index: usize, card: &FlashcardRecord) -> Vec<ValidationIssue> {
    let path = |field: &str| format!("flashcards[{index}].{field}");
    let mut issues = Vec::new();

    if card.front.trim().is_empty() {
        issues.push(ValidationIssue::new(path("front"), "too_small", "Front is required"));
    } else if let Some(e) = validate_front(&card.front) {
        issues.push(ValidationIssue::new(path("front"), "too_big", e));
    }

    if card.back.trim().is_empty() {
        issues.push(ValidationIssue::new(path("back"), "too_small", "Back is required"));
    } else if let Some(e) = validate_back(&card.back) {
        issues.push(ValidationIssue::new(path("back"), "too_big", e));
    }

    match (card.source, card.generation_id) {
        (FlashcardSource::Manual, Some(_)) => issues.push(ValidationIssue::new(
            path("generation_id"),
            "invalid_generation_id",
            "generation_id must be null for manual flashcards",
        )),
        (source, None) if source.is_generated() => issues.push(ValidationIssue::new(
            path("generation_id"),
            "invalid_generation_id",
            "generation_id is required for AI-generated flashcards",
        )),
        _ => {}
    }

    issues
}
