use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use std::sync::Arc;
use tracing::info;

use flashgen_core::{
    Flashcard, FlashcardsCreateCommand, GenerateFlashcardsCommand, Generation,
    GenerationCreateResponse, GenerationId, GenerationService, Repository, UserId,
};

use crate::api::dto::{parse_flashcards_body, parse_generate_body, validate_flashcards, FlashcardsOut, ListQuery};
use crate::api::error::{ApiError, ApiResult, GENERATION_FAILED, LOAD_FAILED, SAVE_FAILED};
use crate::api::identity::IdentityResolver;

#[derive(Clone)]
pub struct AppState {
    pub service: GenerationService,
    pub repo: Arc<dyn Repository>,
    pub identity: Arc<dyn IdentityResolver>,
}

impl AppState {
    /// Runs an already-parsed generation request through the pipeline.
    pub async fn generate(
        &self,
        user_id: UserId,
        cmd: &GenerateFlashcardsCommand,
    ) -> ApiResult<GenerationCreateResponse> {
        self.service
            .generate_flashcards(&cmd.source_text, user_id)
            .await
            .map_err(|e| ApiError::internal(GENERATION_FAILED, e))
    }

    /// Validates and inserts a batch in one go.
    pub async fn save(&self, user_id: UserId, cmd: &FlashcardsCreateCommand) -> ApiResult<Vec<Flashcard>> {
        validate_flashcards(cmd)?;
        let saved = self
            .repo
            .insert_flashcards(user_id, &cmd.flashcards)
            .await
            .map_err(|e| ApiError::from_core(SAVE_FAILED, e))?;
        info!(count = saved.len(), %user_id, "stored flashcards");
        Ok(saved)
    }
}

pub async fn create_generation(
    State(st): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<GenerationCreateResponse>)> {
    let cmd = parse_generate_body(&body)?;
    let user_id = st.identity.resolve(&headers);
    let out = st.generate(user_id, &cmd).await?;
    Ok((StatusCode::CREATED, Json(out)))
}

pub async fn get_generation(
    State(st): State<Arc<AppState>>,
    Path(id): Path<GenerationId>,
) -> ApiResult<Json<Generation>> {
    match st.repo.get_generation(id).await {
        Ok(g) => Ok(Json(g)),
        Err(flashgen_core::CoreError::NotFound(what)) => Err(ApiError::NotFound(what)),
        Err(e) => Err(ApiError::internal(GENERATION_FAILED, e)),
    }
}

pub async fn create_flashcards(
    State(st): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<FlashcardsOut>)> {
    let cmd = parse_flashcards_body(&body)?;
    let user_id = st.identity.resolve(&headers);
    let flashcards = st.save(user_id, &cmd).await?;
    Ok((StatusCode::CREATED, Json(FlashcardsOut { flashcards })))
}

pub async fn list_flashcards(
    State(st): State<Arc<AppState>>,
    Query(q): Query<ListQuery>,
) -> ApiResult<Json<FlashcardsOut>> {
    let flashcards = st
        .repo
        .list_flashcards(q.generation_id)
        .await
        .map_err(|e| ApiError::internal(LOAD_FAILED, e))?;
    Ok(Json(FlashcardsOut { flashcards }))
}
