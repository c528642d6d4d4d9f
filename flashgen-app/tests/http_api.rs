//! Drives the router end to end against the in-memory repository.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use flashgen_app::api::identity::FixedIdentity;
use flashgen_app::api::routes::AppState;
use flashgen_app::api::server::build_router;
use flashgen_core::repo::memory::MemoryRepo;
use flashgen_core::{
    CoreError, FlashcardProposal, GenerationService, MockGenerator, ProposalGenerator, Repository,
    DEFAULT_USER_ID,
};

struct OfflineGenerator;

#[async_trait]
impl ProposalGenerator for OfflineGenerator {
    fn model(&self) -> &str {
        "offline"
    }

    async fn generate(&self, _source_text: &str) -> Result<Vec<FlashcardProposal>, CoreError> {
        Err(CoreError::Generator("model offline".into()))
    }
}

fn app_with(repo: Arc<MemoryRepo>, generator: Arc<dyn ProposalGenerator>) -> Router {
    let dyn_repo: Arc<dyn Repository> = repo;
    build_router(AppState {
        service: GenerationService::new(dyn_repo.clone(), generator),
        repo: dyn_repo,
        identity: Arc::new(FixedIdentity::default()),
    })
}

fn app() -> (Router, Arc<MemoryRepo>) {
    let repo = Arc::new(MemoryRepo::new());
    (app_with(repo.clone(), Arc::new(MockGenerator::default())), repo)
}

async fn send(app: Router, method: Method, uri: &str, body: impl Into<Body>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, json)
}

async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, body.to_string()).await
}

fn text(len: usize) -> String {
    "Mitochondria produce adenosine triphosphate through oxidative phosphorylation. "
        .chars()
        .cycle()
        .take(len)
        .collect()
}

// ---------------------------------------------------------------------------
// POST /api/generations
// ---------------------------------------------------------------------------

#[tokio::test]
async fn generation_at_lower_bound_is_created() {
    let (app, _) = app();
    let (status, json) = post_json(app, "/api/generations", json!({ "source_text": text(1000) })).await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(json["generation_id"].as_i64().unwrap() > 0);
    let proposals = json["flashcards_proposals"].as_array().unwrap();
    assert_eq!(json["generated_count"].as_u64().unwrap() as usize, proposals.len());
    assert!((3..=5).contains(&proposals.len()));
    assert!(proposals.iter().all(|p| p["source"] == "ai-full"));
}

#[tokio::test]
async fn generation_at_upper_bound_is_created() {
    let (app, _) = app();
    let (status, _) = post_json(app, "/api/generations", json!({ "source_text": text(10_000) })).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn one_character_short_is_rejected() {
    let (app, repo) = app();
    let (status, json) = post_json(app, "/api/generations", json!({ "source_text": text(999) })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Invalid input data");
    assert_eq!(json["details"][0]["path"], "source_text");
    assert_eq!(json["details"][0]["code"], "too_small");
    assert!(repo.list_flashcards(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn one_character_long_is_rejected() {
    let (app, _) = app();
    let (status, json) = post_json(app, "/api/generations", json!({ "source_text": text(10_001) })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["details"][0]["code"], "too_big");
}

#[tokio::test]
async fn missing_source_text_is_invalid_type() {
    let (app, _) = app();
    let (status, json) = post_json(app, "/api/generations", json!({ "text": "nope" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["details"][0]["code"], "invalid_type");
}

#[tokio::test]
async fn malformed_generation_body_is_a_server_error() {
    let (app, _) = app();
    let (status, json) = send(app, Method::POST, "/api/generations", "{\"source_text\": ").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "An error occurred while generating flashcards");
    assert!(json["message"].is_string());
}

#[tokio::test]
async fn generator_failure_is_logged_and_reported() {
    let repo = Arc::new(MemoryRepo::new());
    let app = app_with(repo.clone(), Arc::new(OfflineGenerator));

    let (status, json) = post_json(app, "/api/generations", json!({ "source_text": text(1500) })).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "An error occurred while generating flashcards");
    assert_eq!(json["message"], "generator error: model offline");

    let logged = repo.generation_errors();
    assert_eq!(logged.len(), 1);
    assert_eq!(logged[0].error_code, "AI_SERVICE_ERROR");
    assert_eq!(logged[0].source_text_length, 1500);
    assert_eq!(logged[0].model, "offline");
}

#[tokio::test]
async fn generation_can_be_read_back() {
    let (app, _) = app();
    let (_, created) = post_json(app.clone(), "/api/generations", json!({ "source_text": text(2400) })).await;
    let id = created["generation_id"].as_i64().unwrap();

    let (status, json) = send(app.clone(), Method::GET, &format!("/api/generations/{id}"), Body::empty()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["source_text_length"], 2400);
    assert_eq!(json["user_id"], DEFAULT_USER_ID.to_string());

    let (status, _) = send(app, Method::GET, "/api/generations/9999", Body::empty()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// POST /api/flashcards
// ---------------------------------------------------------------------------

async fn generation_id(app: &Router) -> i64 {
    let (_, created) = post_json(app.clone(), "/api/generations", json!({ "source_text": text(1200) })).await;
    created["generation_id"].as_i64().unwrap()
}

#[tokio::test]
async fn bulk_save_inserts_the_whole_batch() {
    let (app, repo) = app();
    let gid = generation_id(&app).await;

    let body = json!({ "flashcards": [
        { "front": "What is ATP?", "back": "Energy currency", "source": "ai-full", "generation_id": gid },
        { "front": "What is NADH?", "back": "Electron carrier", "source": "ai-edited", "generation_id": gid },
        { "front": "Own question", "back": "Own answer", "source": "manual", "generation_id": null },
    ]});
    let (status, json) = post_json(app.clone(), "/api/flashcards", body).await;

    assert_eq!(status, StatusCode::CREATED);
    let saved = json["flashcards"].as_array().unwrap();
    assert_eq!(saved.len(), 3);
    assert_eq!(saved[1]["source"], "ai-edited");
    assert!(saved[2]["generation_id"].is_null());
    assert_eq!(repo.list_flashcards(Some(gid)).await.unwrap().len(), 2);

    let (status, listed) = send(app, Method::GET, &format!("/api/flashcards?generation_id={gid}"), Body::empty()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["flashcards"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn oversized_front_is_rejected_at_the_boundary() {
    let (app, repo) = app();
    let gid = generation_id(&app).await;

    let body = json!({ "flashcards": [
        { "front": "ok", "back": "ok", "source": "ai-full", "generation_id": gid },
        { "front": "x".repeat(800), "back": "fine", "source": "ai-edited", "generation_id": gid },
    ]});
    let (status, json) = post_json(app, "/api/flashcards", body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Invalid input data");
    assert_eq!(json["details"][0]["path"], "flashcards[1].front");
    assert_eq!(json["details"][0]["code"], "too_big");
    assert!(repo.list_flashcards(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn generated_card_without_generation_is_rejected() {
    let (app, _) = app();
    let body = json!({ "flashcards": [
        { "front": "q", "back": "a", "source": "ai-full", "generation_id": null },
    ]});
    let (status, json) = post_json(app, "/api/flashcards", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["details"][0]["path"], "flashcards[0].generation_id");
}

#[tokio::test]
async fn unknown_generation_inserts_nothing() {
    let (app, repo) = app();
    let body = json!({ "flashcards": [
        { "front": "q", "back": "a", "source": "ai-full", "generation_id": 404 },
    ]});
    let (status, json) = post_json(app, "/api/flashcards", body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["details"][0]["code"], "invalid_generation_id");
    assert!(repo.list_flashcards(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn malformed_save_body_is_invalid_json() {
    let (app, _) = app();
    let (status, json) = send(app, Method::POST, "/api/flashcards", "[1, 2").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Invalid JSON");
    assert!(json["details"].is_array());
}

#[tokio::test]
async fn empty_batch_is_invalid_input() {
    let (app, _) = app();
    let (status, json) = post_json(app, "/api/flashcards", json!({ "flashcards": [] })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Invalid input data");
}
