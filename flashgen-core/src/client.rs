//! What a review front end needs from the server, and how its failures read
//! to a user.

use crate::{
    Flashcard, FlashcardsCreateCommand, GenerateFlashcardsCommand, GenerationCreateResponse,
    ValidationIssue,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const NETWORK_ERROR_MESSAGE: &str =
    "Network error. Please check your internet connection and try again.";
pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred";

/// Error body returned by the API: `{error, details}` for 4xx,
/// `{error, message}` for 5xx.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationIssue>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClientAction {
    Generate,
    Save,
}

impl ClientAction {
    fn fallback_message(&self) -> &'static str {
        match self {
            ClientAction::Generate => "Failed to generate flashcards. Please try again later.",
            ClientAction::Save => "Failed to save flashcards. Please try again later.",
        }
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("transport failure: {0}")]
    Network(String),
    #[error("request failed with status {status}")]
    Api { status: u16, body: ApiErrorBody },
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl ClientError {
    pub fn user_message(&self, action: ClientAction) -> String {
        match self {
            ClientError::Network(_) => NETWORK_ERROR_MESSAGE.to_string(),
            ClientError::Decode(_) => action.fallback_message().to_string(),
            ClientError::Api { body, .. } => match (&body.error, &body.details) {
                (error, Some(details)) => {
                    let joined = details
                        .iter()
                        .map(|d| d.message.as_str())
                        .collect::<Vec<_>>()
                        .join(", ");
                    format!("{}: {joined}", error.as_deref().unwrap_or(UNEXPECTED_ERROR_MESSAGE))
                }
                (Some(error), None) => error.clone(),
                (None, None) => UNEXPECTED_ERROR_MESSAGE.to_string(),
            },
        }
    }
}

/// The two calls a review session makes. Implemented over HTTP and
/// in-process.
#[async_trait]
pub trait FlashcardApi: Send + Sync {
    async fn create_generation(
        &self,
        cmd: &GenerateFlashcardsCommand,
    ) -> Result<GenerationCreateResponse, ClientError>;

    async fn save_flashcards(
        &self,
        cmd: &FlashcardsCreateCommand,
    ) -> Result<Vec<Flashcard>, ClientError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn details_are_joined_after_the_error() {
        let err = ClientError::Api {
            status: 400,
            body: ApiErrorBody {
                error: Some("Invalid input data".into()),
                message: None,
                details: Some(vec![
                    ValidationIssue::new("a", "too_big", "Front cannot exceed 200 characters"),
                    ValidationIssue::new("b", "too_small", "Back is required"),
                ]),
            },
        };
        assert_eq!(
            err.user_message(ClientAction::Save),
            "Invalid input data: Front cannot exceed 200 characters, Back is required"
        );
    }

    #[test]
    fn bare_error_and_empty_body() {
        let err = ClientError::Api {
            status: 500,
            body: ApiErrorBody {
                error: Some("boom".into()),
                ..Default::default()
            },
        };
        assert_eq!(err.user_message(ClientAction::Generate), "boom");

        let empty = ClientError::Api { status: 502, body: ApiErrorBody::default() };
        assert_eq!(empty.user_message(ClientAction::Generate), UNEXPECTED_ERROR_MESSAGE);
    }

    #[test]
    fn transport_errors_hide_the_raw_text() {
        let err = ClientError::Network("connection refused (os error 111)".into());
        assert_eq!(err.user_message(ClientAction::Save), NETWORK_ERROR_MESSAGE);
        let decode = ClientError::Decode("eof".into());
        assert_eq!(
            decode.user_message(ClientAction::Generate),
            "Failed to generate flashcards. Please try again later."
        );
    }
}
