use async_trait::async_trait;
use flashgen_core::{
    ApiErrorBody, ClientError, Flashcard, FlashcardApi, FlashcardsCreateCommand,
    GenerateFlashcardsCommand, GenerationCreateResponse,
};
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Serialize};

use crate::api::dto::FlashcardsOut;

/// Talks to a running `flashgen serve` over HTTP.
#[derive(Clone, Debug)]
pub struct HttpApi {
    base: String,
    http: Client,
}

impl HttpApi {
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into().trim_end_matches('/').to_string();
        Self { base, http: Client::new() }
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let resp = self
            .http
            .post(format!("{}{path}", self.base))
            .json(body)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        decode(resp).await
    }
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, ClientError> {
    let status = resp.status();
    if status.is_success() {
        return resp.json::<T>().await.map_err(|e| ClientError::Decode(e.to_string()));
    }
    // Error bodies are best effort; an unreadable one still carries the status.
    let body = resp.json::<ApiErrorBody>().await.unwrap_or_default();
    Err(ClientError::Api { status: status.as_u16(), body })
}

#[async_trait]
impl FlashcardApi for HttpApi {
    async fn create_generation(
        &self,
        cmd: &GenerateFlashcardsCommand,
    ) -> Result<GenerationCreateResponse, ClientError> {
        self.post("/api/generations", cmd).await
    }

    async fn save_flashcards(
        &self,
        cmd: &FlashcardsCreateCommand,
    ) -> Result<Vec<Flashcard>, ClientError> {
        let out: FlashcardsOut = self.post("/api/flashcards", cmd).await?;
        Ok(out.flashcards)
    }
}
