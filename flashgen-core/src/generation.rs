use crate::{
    fingerprint, validation::char_len, CoreError, GenerationCreateResponse, NewGeneration,
    NewGenerationErrorLog, ProposalGenerator, Repository, UserId,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Runs the generator, records the generation and hands back the proposals.
///
/// Failures are written to the generation error log before being returned
/// unchanged. A failing log write is swallowed.
#[derive(Clone)]
pub struct GenerationService {
    repo: Arc<dyn Repository>,
    generator: Arc<dyn ProposalGenerator>,
}

impl GenerationService {
    pub fn new(repo: Arc<dyn Repository>, generator: Arc<dyn ProposalGenerator>) -> Self {
        Self { repo, generator }
    }

    pub fn model(&self) -> &str {
        self.generator.model()
    }

    pub async fn generate_flashcards(
        &self,
        source_text: &str,
        user_id: UserId,
    ) -> Result<GenerationCreateResponse, CoreError> {
        match self.run(source_text, user_id).await {
            Ok(out) => Ok(out),
            Err(err) => {
                self.log_error(source_text, &err, user_id).await;
                Err(err)
            }
        }
    }

    async fn run(
        &self,
        source_text: &str,
        user_id: UserId,
    ) -> Result<GenerationCreateResponse, CoreError> {
        let started = Instant::now();
        let proposals = self.generator.generate(source_text).await?;
        let elapsed = started.elapsed();

        let new = NewGeneration {
            user_id,
            source_text_length: char_len(source_text) as u32,
            source_text_hash: fingerprint::sha256_hex(source_text),
            model: self.generator.model().to_string(),
            generated_count: proposals.len() as u32,
            generation_duration_ms: elapsed.as_millis() as u64,
        };
        let generation = self.repo.insert_generation(&new).await?;

        info!(
            generation_id = generation.id,
            generated_count = proposals.len(),
            duration_ms = new.generation_duration_ms,
            "generated flashcard proposals"
        );

        Ok(GenerationCreateResponse {
            generation_id: generation.id,
            generated_count: proposals.len(),
            flashcards_proposals: proposals,
        })
    }

    async fn log_error(&self, source_text: &str, err: &CoreError, user_id: UserId) {
        let entry = NewGenerationErrorLog {
            user_id,
            error_code: err.error_code().to_string(),
            error_message: err.to_string(),
            model: self.generator.model().to_string(),
            source_text_hash: fingerprint::sha256_hex(source_text),
            source_text_length: char_len(source_text) as u32,
        };
        if let Err(log_err) = self.repo.insert_generation_error(&entry).await {
            warn!(error = %log_err, original = %err, "could not record generation error");
        }
    }
}
