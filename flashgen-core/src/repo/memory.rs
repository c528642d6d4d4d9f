use crate::{
    CoreError, Flashcard, FlashcardRecord, Generation, GenerationErrorLog, GenerationId,
    NewGeneration, NewGenerationErrorLog, UserId,
};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::BTreeMap;

#[derive(Default)]
pub struct MemoryRepo {
    generations: RwLock<BTreeMap<GenerationId, Generation>>,
    generation_errors: RwLock<Vec<GenerationErrorLog>>,
    flashcards: RwLock<Vec<Flashcard>>,
}

impl MemoryRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the audit trail; the pipeline itself never reads it.
    pub fn generation_errors(&self) -> Vec<GenerationErrorLog> {
        self.generation_errors.read().clone()
    }
}

#[async_trait]
impl crate::repo::Repository for MemoryRepo {
    async fn insert_generation(&self, new: &NewGeneration) -> Result<Generation, CoreError> {
        let mut m = self.generations.write();
        let id = m.keys().next_back().copied().unwrap_or(0) + 1;
        let generation = Generation::from_new(id, new);
        m.insert(id, generation.clone());
        Ok(generation)
    }

    async fn get_generation(&self, id: GenerationId) -> Result<Generation, CoreError> {
        self.generations
            .read()
            .get(&id)
            .cloned()
            .ok_or(CoreError::NotFound("generation"))
    }

    async fn insert_generation_error(&self, entry: &NewGenerationErrorLog) -> Result<(), CoreError> {
        let mut v = self.generation_errors.write();
        let id = v.len() as i64 + 1;
        v.push(GenerationErrorLog {
            id,
            user_id: entry.user_id,
            error_code: entry.error_code.clone(),
            error_message: entry.error_message.clone(),
            model: entry.model.clone(),
            source_text_hash: entry.source_text_hash.clone(),
            source_text_length: entry.source_text_length,
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn insert_flashcards(
        &self,
        user_id: UserId,
        batch: &[FlashcardRecord],
    ) -> Result<Vec<Flashcard>, CoreError> {
        {
            let generations = self.generations.read();
            let dangling = batch
                .iter()
                .filter_map(|r| r.generation_id)
                .any(|gid| !generations.contains_key(&gid));
            if dangling {
                return Err(CoreError::NotFound("generation"));
            }
        }

        let mut cards = self.flashcards.write();
        let first_id = cards.last().map(|c| c.id).unwrap_or(0) + 1;
        let inserted: Vec<Flashcard> = batch
            .iter()
            .enumerate()
            .map(|(i, r)| Flashcard::from_record(first_id + i as i64, user_id, r))
            .collect();
        cards.extend(inserted.iter().cloned());
        Ok(inserted)
    }

    async fn list_flashcards(
        &self,
        generation_id: Option<GenerationId>,
    ) -> Result<Vec<Flashcard>, CoreError> {
        let cards = self.flashcards.read();
        let mut v: Vec<Flashcard> = cards.clone();
        if let Some(gid) = generation_id {
            v.retain(|c| c.generation_id == Some(gid));
        }
        Ok(v)
    }
}
