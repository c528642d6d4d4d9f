use async_trait::async_trait;
use axum::http::HeaderMap;
use flashgen_core::{
    source_text_issues, ClientError, Flashcard, FlashcardApi, FlashcardsCreateCommand,
    GenerateFlashcardsCommand, GenerationCreateResponse,
};

use crate::api::error::ApiError;
use crate::api::routes::AppState;

/// Runs requests in-process against the same state the HTTP handlers use,
/// so local and remote sessions see identical validation and errors.
#[derive(Clone)]
pub struct LocalApi {
    state: AppState,
}

impl LocalApi {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    fn user(&self) -> flashgen_core::UserId {
        self.state.identity.resolve(&HeaderMap::new())
    }
}

fn to_client(err: ApiError) -> ClientError {
    ClientError::Api { status: err.status().as_u16(), body: err.body() }
}

#[async_trait]
impl FlashcardApi for LocalApi {
    async fn create_generation(
        &self,
        cmd: &GenerateFlashcardsCommand,
    ) -> Result<GenerationCreateResponse, ClientError> {
        let issues = source_text_issues(&cmd.source_text);
        if !issues.is_empty() {
            return Err(to_client(ApiError::InvalidInput(issues)));
        }
        self.state.generate(self.user(), cmd).await.map_err(to_client)
    }

    async fn save_flashcards(
        &self,
        cmd: &FlashcardsCreateCommand,
    ) -> Result<Vec<Flashcard>, ClientError> {
        self.state.save(self.user(), cmd).await.map_err(to_client)
    }
}
