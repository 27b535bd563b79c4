use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    Json,
};
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use std::sync::Arc;
use std::time::Instant;

use super::{
    ApiTtsRequest, ApiTtsResponse, BatchRequest, BatchResponse, HealthResponse, Segment,
    SegmentResult, SynthesizeRequest, SynthesizeResponse, VoicesResponse,
};
use crate::api::routes::AppState;
use crate::error::AppError;
use crate::tts::SynthesisRequest;

pub const TTS_KEY_HEADER: &str = "x-tts-key";

pub async fn list_voices(State(state): State<Arc<AppState>>) -> Json<VoicesResponse> {
    Json(VoicesResponse {
        voices: state.tts.list_voices().to_vec(),
    })
}

pub async fn batch_synthesize(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<BatchRequest>, JsonRejection>,
) -> Result<Json<BatchResponse>, AppError> {
    let Json(request) = payload?;

    let segments = match request.segments {
        Some(segments) if !segments.is_empty() => segments,
        _ => return Err(AppError::BadRequest("No segments provided".into())),
    };

    tracing::info!("Batch TTS: processing {} segments", segments.len());

    state
        .tts
        .prepare_storage()
        .await
        .map_err(|e| e.with_public_message("Error in batch synthesis"))?;

    let mut results = Vec::with_capacity(segments.len());
    for (index, raw) in segments.iter().enumerate() {
        let segment = match Segment::from_value(raw) {
            Ok(segment) => segment,
            Err(e) => {
                let id = Segment::raw_id(raw);
                tracing::warn!("Batch TTS: segment {} is malformed: {}", id, e);
                results.push(SegmentResult::failed(id, format!("Invalid segment: {}", e)));
                continue;
            }
        };
        let id = segment.segment_id.as_str();
        tracing::debug!(
            "Batch TTS: segment {}/{} (ID: {})",
            index + 1,
            segments.len(),
            id
        );

        let (text, settings) = match (&segment.text, &segment.voice_settings) {
            (Some(text), Some(settings)) if !text.is_empty() => (text, settings),
            _ => {
                tracing::warn!("Batch TTS: segment {} missing text or voice settings", id);
                results.push(SegmentResult::failed(id, "Missing text or voice settings"));
                continue;
            }
        };

        let started = Instant::now();
        let request = settings.to_request(text, "en-US");
        match state.tts.speak_segment(id, &request).await {
            Ok(saved) => {
                tracing::info!(
                    "Batch TTS: segment {} done in {}ms: {}",
                    id,
                    started.elapsed().as_millis(),
                    saved.public_url
                );
                results.push(SegmentResult::ok(id, saved.public_url));
            }
            Err(e) => {
                tracing::error!("Batch TTS: error processing segment {}: {}", id, e);
                results.push(SegmentResult::failed(id, e.to_string()));
            }
        }
    }

    let total_success = results.iter().filter(|r| r.success).count();
    let total_failed = results.len() - total_success;
    tracing::info!(
        "Batch TTS: complete. Success: {}, Failed: {}",
        total_success,
        total_failed
    );

    Ok(Json(BatchResponse {
        results,
        total_success,
        total_failed,
    }))
}

pub async fn api_style_tts(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<ApiTtsRequest>, JsonRejection>,
) -> Result<Json<ApiTtsResponse>, AppError> {
    let Json(request) = payload?;

    let (input, voice) = match (request.input, request.voice) {
        (Some(input), Some(voice)) => (input, voice),
        _ => return Err(AppError::BadRequest("Missing required fields".into())),
    };

    tracing::info!("API TTS: request with voice {}", voice.name);

    let synthesis = SynthesisRequest {
        text: input.text().to_string(),
        voice,
        speaking_rate: request.audio_config.speaking_rate,
        pitch: request.audio_config.pitch,
    }
    .validated()?;

    let api_key = headers
        .get(TTS_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty());

    let audio = state
        .tts
        .speak(&synthesis, api_key)
        .await
        .map_err(|e| e.with_public_message("Error processing TTS request"))?;

    Ok(Json(ApiTtsResponse {
        audio_content: BASE64_STANDARD.encode(&audio),
        timepoints: Vec::new(),
    }))
}

pub async fn synthesize(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SynthesizeRequest>, JsonRejection>,
) -> Result<Json<SynthesizeResponse>, AppError> {
    let Json(request) = payload?;

    let settings = request
        .voice_settings
        .filter(|s| s.name.as_deref().is_some_and(|n| !n.is_empty()))
        .ok_or_else(|| AppError::BadRequest("voiceSettings.name is required".into()))?;

    // This route always synthesizes at normal speed
    let synthesis = SynthesisRequest {
        speaking_rate: None,
        pitch: None,
        ..settings.to_request(request.text.as_deref().unwrap_or_default(), "")
    }
    .validated()?;

    let result = state
        .tts
        .speak_with_lip_sync(&synthesis)
        .await
        .map_err(|e| {
            let message = if matches!(e, AppError::LipSync(_) | AppError::UnsupportedPlatform(_)) {
                "Error generating lip sync data"
            } else {
                "Error synthesizing speech"
            };
            e.with_public_message(message)
        })?;

    Ok(Json(SynthesizeResponse {
        audio_url: result.audio_url,
        json_url: result.json_url,
    }))
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
