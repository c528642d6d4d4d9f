use crate::{fingerprint, validation::char_len, CoreError, FlashcardProposal, BACK_MAX, FRONT_MAX};
use async_trait::async_trait;
use rand::{rngs::StdRng, Rng, SeedableRng};

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

const SAMPLE_PREFIX_CHARS: usize = 500;
const MIN_WORD_CHARS: usize = 6;
const CHARS_PER_PROPOSAL: usize = 2000;
const MIN_PROPOSALS: usize = 3;
const MAX_PROPOSALS: usize = 5;

/// Turns source text into flashcard proposals. A real LLM client slots in
/// here without the pipeline noticing.
#[async_trait]
pub trait ProposalGenerator: Send + Sync {
    fn model(&self) -> &str;
    async fn generate(&self, source_text: &str) -> Result<Vec<FlashcardProposal>, CoreError>;
}

/// Deterministic stand-in for the AI service.
pub struct MockGenerator {
    model: String,
}

impl MockGenerator {
    pub fn new(model: impl Into<String>) -> Self {
        Self { model: model.into() }
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL)
    }
}

#[async_trait]
impl ProposalGenerator for MockGenerator {
    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, source_text: &str) -> Result<Vec<FlashcardProposal>, CoreError> {
        Ok(mock_proposals(source_text))
    }
}

pub fn proposal_count(text_len: usize) -> usize {
    (text_len / CHARS_PER_PROPOSAL).clamp(MIN_PROPOSALS, MAX_PROPOSALS)
}

pub fn mock_proposals(text: &str) -> Vec<FlashcardProposal> {
    let head: String = text.chars().take(SAMPLE_PREFIX_CHARS).collect();
    let words: Vec<&str> = head
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|w| char_len(w) >= MIN_WORD_CHARS)
        .collect();
    let fallback = text.split_whitespace().next().unwrap_or("this text");

    let mut rng = StdRng::seed_from_u64(fingerprint::seed(text));
    (0..proposal_count(char_len(text)))
        .map(|_| {
            let word = if words.is_empty() {
                fallback
            } else {
                words[rng.random_range(0..words.len())]
            };
            FlashcardProposal::generated(
                clip(format!("What is {word}?"), FRONT_MAX),
                clip(
                    format!("{word} is an important term from the text, which means..."),
                    BACK_MAX,
                ),
            )
        })
        .collect()
}

fn clip(s: String, max: usize) -> String {
    if char_len(&s) <= max {
        s
    } else {
        s.chars().take(max).collect()
    }
}
