use crate::{
    CoreError, Flashcard, FlashcardRecord, Generation, GenerationId, NewGeneration,
    NewGenerationErrorLog, UserId,
};
use async_trait::async_trait;

pub mod memory;

#[async_trait]
pub trait Repository: Send + Sync {
    // Generations
    async fn insert_generation(&self, new: &NewGeneration) -> Result<Generation, CoreError>;
    async fn get_generation(&self, id: GenerationId) -> Result<Generation, CoreError>;

    // Audit trail, write-only from the pipeline's point of view
    async fn insert_generation_error(&self, entry: &NewGenerationErrorLog) -> Result<(), CoreError>;

    // Flashcards
    /// Inserts the whole batch or nothing.
    async fn insert_flashcards(
        &self,
        user_id: UserId,
        batch: &[FlashcardRecord],
    ) -> Result<Vec<Flashcard>, CoreError>;
    async fn list_flashcards(
        &self,
        generation_id: Option<GenerationId>,
    ) -> Result<Vec<Flashcard>, CoreError>;
}
