use std::sync::Arc;

use tracing_subscriber::EnvFilter;

mod api;
mod config;
mod error;
mod lipsync;
mod storage;
mod tts;

#[cfg(test)]
mod test_support;

use api::routes::{create_router, AppState};
use config::Config;
use lipsync::LipSync;
use storage::AudioStore;
use tts::{KokoroClient, TtsService};

#[tokio::main]
async fn main() {
    // Pick up a local .env before anything reads the environment
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env().expect("Invalid configuration");
    let addr = config.listen_addr().expect("Invalid address");

    tracing::info!("Lip sync TTS server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Starting server on http://{}", addr);
    tracing::info!("Audio directory: {}", config.audio_dir.display());

    let client = KokoroClient::new(config.tts_url.clone(), config.tts_api_key.clone())
        .expect("Failed to create TTS client");
    tracing::info!("Kokoro backend: {}", client.endpoint());
    let store = AudioStore::new(config.audio_dir.clone(), &config.audio_base_url())
        .expect("Invalid public audio URL");
    let lip_sync = LipSync::new(config.rhubarb_binaries.clone());

    match lip_sync.binary() {
        Ok(path) => tracing::info!("Rhubarb binary: {}", path.display()),
        Err(e) => tracing::warn!("{}; /synthesize will fail", e),
    }

    let tts = TtsService::new(client, store, lip_sync);

    // Create app state
    let state = Arc::new(AppState { tts });

    // Create router
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .await
        .expect("Server error");
}
