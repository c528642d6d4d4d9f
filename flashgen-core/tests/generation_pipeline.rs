use async_trait::async_trait;
use flashgen_core::repo::memory::MemoryRepo;
use flashgen_core::{
    fingerprint::sha256_hex, CoreError, Flashcard, FlashcardProposal, FlashcardRecord,
    FlashcardSource, Generation, GenerationId, GenerationService, MockGenerator, NewGeneration,
    NewGenerationErrorLog, ProposalGenerator, Repository, UserId, DEFAULT_USER_ID,
};
use std::sync::Arc;

fn text(len: usize) -> String {
    let base = "Mitochondria generate most of the chemical energy needed by cells. ";
    base.repeat(len / base.len() + 1).chars().take(len).collect()
}

struct FailingGenerator;

#[async_trait]
impl ProposalGenerator for FailingGenerator {
    fn model(&self) -> &str {
        "broken-model"
    }

    async fn generate(&self, _source_text: &str) -> Result<Vec<FlashcardProposal>, CoreError> {
        Err(CoreError::Generator("upstream timed out".into()))
    }
}

/// Fails every write; optionally also fails the audit write.
struct BrokenRepo {
    inner: MemoryRepo,
    audit_fails: bool,
}

#[async_trait]
impl Repository for BrokenRepo {
    async fn insert_generation(&self, _new: &NewGeneration) -> Result<Generation, CoreError> {
        Err(CoreError::Storage("insert generation: disk full".into()))
    }

    async fn get_generation(&self, id: GenerationId) -> Result<Generation, CoreError> {
        self.inner.get_generation(id).await
    }

    async fn insert_generation_error(&self, entry: &NewGenerationErrorLog) -> Result<(), CoreError> {
        if self.audit_fails {
            return Err(CoreError::Storage("audit table missing".into()));
        }
        self.inner.insert_generation_error(entry).await
    }

    async fn insert_flashcards(
        &self,
        user_id: UserId,
        batch: &[FlashcardRecord],
    ) -> Result<Vec<Flashcard>, CoreError> {
        self.inner.insert_flashcards(user_id, batch).await
    }

    async fn list_flashcards(
        &self,
        generation_id: Option<GenerationId>,
    ) -> Result<Vec<Flashcard>, CoreError> {
        self.inner.list_flashcards(generation_id).await
    }
}

#[tokio::test]
async fn exactly_1000_chars_yields_three_to_five_ai_full_proposals() {
    let repo = Arc::new(MemoryRepo::new());
    let svc = GenerationService::new(repo.clone(), Arc::new(MockGenerator::default()));
    let source = text(1000);

    let out = svc.generate_flashcards(&source, DEFAULT_USER_ID).await.unwrap();

    assert!((3..=5).contains(&out.generated_count));
    assert_eq!(out.generated_count, out.flashcards_proposals.len());
    assert!(out
        .flashcards_proposals
        .iter()
        .all(|p| p.source == FlashcardSource::AiFull));

    let stored = repo.get_generation(out.generation_id).await.unwrap();
    assert_eq!(stored.source_text_length, 1000);
    assert_eq!(stored.source_text_hash, sha256_hex(&source));
    assert_eq!(stored.model, "gpt-3.5-turbo");
    assert_eq!(stored.generated_count as usize, out.generated_count);
    assert_eq!(stored.user_id, DEFAULT_USER_ID);
    assert!(repo.generation_errors().is_empty());
}

#[tokio::test]
async fn generator_failure_is_logged_and_returned() {
    let repo = Arc::new(MemoryRepo::new());
    let svc = GenerationService::new(repo.clone(), Arc::new(FailingGenerator));
    let source = text(2000);

    let err = svc.generate_flashcards(&source, DEFAULT_USER_ID).await.unwrap_err();
    assert!(matches!(err, CoreError::Generator(ref m) if m == "upstream timed out"));

    let logs = repo.generation_errors();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].error_code, "AI_SERVICE_ERROR");
    assert_eq!(logs[0].model, "broken-model");
    assert_eq!(logs[0].source_text_length, 2000);
    assert!(logs[0].error_message.contains("upstream timed out"));
}

#[tokio::test]
async fn storage_failure_is_logged_with_storage_code() {
    let repo = Arc::new(BrokenRepo { inner: MemoryRepo::new(), audit_fails: false });
    let svc = GenerationService::new(repo.clone(), Arc::new(MockGenerator::default()));

    let err = svc.generate_flashcards(&text(1500), DEFAULT_USER_ID).await.unwrap_err();
    assert!(matches!(err, CoreError::Storage(_)));

    let logs = repo.inner.generation_errors();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].error_code, "STORAGE_ERROR");
}

#[tokio::test]
async fn failed_audit_write_never_masks_the_original_error() {
    let repo = Arc::new(BrokenRepo { inner: MemoryRepo::new(), audit_fails: true });
    let svc = GenerationService::new(repo, Arc::new(MockGenerator::default()));

    let err = svc.generate_flashcards(&text(1500), DEFAULT_USER_ID).await.unwrap_err();
    assert_eq!(err.to_string(), "storage error: insert generation: disk full");
}
