use std::sync::Arc;

use axum::{routing::get, Json, Router};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;
use service::{SongRepository, SongService};

use crate::openapi::ApiDoc;

pub mod songs;

/// Shared handler state: the song service over a long-lived repository.
#[derive(Clone)]
pub struct AppState {
    pub songs: Arc<SongService>,
}

impl AppState {
    pub fn new(repo: Arc<dyn SongRepository>) -> Self {
        Self { songs: Arc::new(SongService::new(repo)) }
    }
}

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "Service is up", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health::ok())
}

/// Build the full application router: song CRUD, health and API docs.
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    let song_routes = Router::new()
        .route("/songs/", get(songs::list).post(songs::create))
        .route("/songs", get(songs::list).post(songs::create))
        .route("/songs/:song_id", get(songs::get).put(songs::update));

    Router::new()
        .route("/health", get(health))
        .merge(song_routes)
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                // 5xx
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
