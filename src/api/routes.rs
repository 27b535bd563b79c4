use axum::{
    http::{header, HeaderName, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use super::handlers;
use crate::tts::TtsService;

pub struct AppState {
    pub tts: TtsService,
}

pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(handlers::TTS_KEY_HEADER),
        ]);

    let api_routes = Router::new()
        .route("/tts/voices", get(handlers::list_voices))
        .route("/tts", post(handlers::api_style_tts))
        .route("/batch-synthesize", post(handlers::batch_synthesize))
        .route("/health", get(handlers::health));

    let audio_dir = state.tts.audio_dir().to_path_buf();

    Router::new()
        .nest("/api", api_routes)
        .route("/synthesize", post(handlers::synthesize))
        .nest_service("/audio", ServeDir::new(audio_dir))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
