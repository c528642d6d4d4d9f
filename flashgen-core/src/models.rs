use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

pub type GenerationId = i64;
pub type FlashcardId = i64;
pub type GenerationErrorId = i64;
pub type UserId = Uuid;

pub const SOURCE_TEXT_MIN: usize = 1000;
pub const SOURCE_TEXT_MAX: usize = 10000;
pub const FRONT_MAX: usize = 200;
pub const BACK_MAX: usize = 500;

/// Stand-in identity used until a real auth collaborator is wired in.
pub const DEFAULT_USER_ID: UserId = Uuid::from_u128(0x6f1c_2d4e_8a7b_4c3d_9e2f_0a1b_2c3d_4e5f);

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum FlashcardSource {
    AiFull,
    AiEdited,
    Manual,
}

impl FlashcardSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlashcardSource::AiFull => "ai-full",
            FlashcardSource::AiEdited => "ai-edited",
            FlashcardSource::Manual => "manual",
        }
    }

    pub fn is_generated(&self) -> bool {
        !matches!(self, FlashcardSource::Manual)
    }
}

impl fmt::Display for FlashcardSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FlashcardSource {
    type Err = crate::CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ai-full" => Ok(FlashcardSource::AiFull),
            "ai-edited" => Ok(FlashcardSource::AiEdited),
            "manual" => Ok(FlashcardSource::Manual),
            _ => Err(crate::CoreError::Storage(format!("unknown flashcard source `{s}`"))),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FlashcardProposal {
    pub front: String,
    pub back: String,
    pub source: FlashcardSource,
}

impl FlashcardProposal {
    pub fn generated(front: impl Into<String>, back: impl Into<String>) -> Self {
        Self {
            front: front.into(),
            back: back.into(),
            source: FlashcardSource::AiFull,
        }
    }
}

/// A proposal as held by a review session. Identity is its position only.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProposalViewEntry {
    #[serde(flatten)]
    pub proposal: FlashcardProposal,
    pub accepted: bool,
    pub edited: bool,
}

impl From<FlashcardProposal> for ProposalViewEntry {
    fn from(proposal: FlashcardProposal) -> Self {
        Self {
            proposal,
            accepted: true,
            edited: false,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenerateFlashcardsCommand {
    pub source_text: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenerationCreateResponse {
    pub generation_id: GenerationId,
    pub flashcards_proposals: Vec<FlashcardProposal>,
    pub generated_count: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewGeneration {
    pub user_id: UserId,
    pub source_text_length: u32,
    pub source_text_hash: String,
    pub model: String,
    pub generated_count: u32,
    pub generation_duration_ms: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Generation {
    pub id: GenerationId,
    pub user_id: UserId,
    pub source_text_length: u32,
    pub source_text_hash: String,
    pub model: String,
    pub generated_count: u32,
    pub generation_duration_ms: u64,
    pub created_at: DateTime<Utc>,
}

impl Generation {
    pub fn from_new(id: GenerationId, new: &NewGeneration) -> Self {
        Self {
            id,
            user_id: new.user_id,
            source_text_length: new.source_text_length,
            source_text_hash: new.source_text_hash.clone(),
            model: new.model.clone(),
            generated_count: new.generated_count,
            generation_duration_ms: new.generation_duration_ms,
            created_at: Utc::now(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewGenerationErrorLog {
    pub user_id: UserId,
    pub error_code: String,
    pub error_message: String,
    pub model: String,
    pub source_text_hash: String,
    pub source_text_length: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenerationErrorLog {
    pub id: GenerationErrorId,
    pub user_id: UserId,
    pub error_code: String,
    pub error_message: String,
    pub model: String,
    pub source_text_hash: String,
    pub source_text_length: u32,
    pub created_at: DateTime<Utc>,
}

/// Persistence-ready flashcard. Review flags never reach this type.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FlashcardRecord {
    pub front: String,
    pub back: String,
    pub source: FlashcardSource,
    pub generation_id: Option<GenerationId>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FlashcardsCreateCommand {
    pub flashcards: Vec<FlashcardRecord>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Flashcard {
    pub id: FlashcardId,
    pub front: String,
    pub back: String,
    pub source: FlashcardSource,
    pub generation_id: Option<GenerationId>,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Flashcard {
    pub fn from_record(id: FlashcardId, user_id: UserId, record: &FlashcardRecord) -> Self {
        let now = Utc::now();
        Self {
            id,
            front: record.front.clone(),
            back: record.back.clone(),
            source: record.source,
            generation_id: record.generation_id,
            user_id,
            created_at: now,
            updated_at: now,
        }
    }
}
