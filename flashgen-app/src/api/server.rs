use axum::{routing::{get, post}, Router};
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::routes::{create_flashcards, create_generation, get_generation, list_flashcards, AppState};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/generations", post(create_generation))
        .route("/api/generations/:id", get(get_generation))
        .route("/api/flashcards", post(create_flashcards).get(list_flashcards))
        .with_state(Arc::new(state))
        .layer(TraceLayer::new_for_http())
}

pub async fn run(state: AppState, addr: SocketAddr) -> anyhow::Result<()> {
    let app = build_router(state);

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "listening");
    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
