use std::time::{Duration, Instant};

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::tts::voice::{map_voice, VoiceDescriptor};

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
pub const API_KEY_HEADER: &str = "x-api-key";

const MIN_SPEED: f64 = 0.5;
const MAX_SPEED: f64 = 2.0;

#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    pub text: String,
    pub voice: VoiceDescriptor,
    pub speaking_rate: Option<f64>,
    pub pitch: Option<f64>,
}

impl SynthesisRequest {
    /// Reject requests with nothing to say before any I/O happens.
    pub fn validated(self) -> Result<Self, AppError> {
        require_text(&self.text)?;
        Ok(self)
    }
}

fn require_text(text: &str) -> Result<(), AppError> {
    if text.trim().is_empty() {
        return Err(AppError::BadRequest("No text provided for TTS".into()));
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct KokoroRequest<'a> {
    text: &'a str,
    voice: &'a str,
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct KokoroResponse {
    audio_wav_base64: Option<serde_json::Value>,
}

/// Client for the Kokoro FastAPI synthesis service.
pub struct KokoroClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl KokoroClient {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::Backend(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
            api_key,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Synthesize `request.text` and return the decoded WAV bytes.
    ///
    /// `api_key` overrides the key the client was built with for this call only.
    pub async fn synthesize(
        &self,
        request: &SynthesisRequest,
        api_key: Option<&str>,
    ) -> Result<Vec<u8>, AppError> {
        require_text(&request.text)?;

        let voice = map_voice(&request.voice);
        let speed = effective_speed(request.speaking_rate, request.pitch);

        tracing::debug!(
            voice = %voice,
            requested = %request.voice.name,
            speed,
            chars = request.text.len(),
            "Calling Kokoro backend"
        );

        let mut call = self.http.post(&self.endpoint).json(&KokoroRequest {
            text: &request.text,
            voice: &voice,
            speed,
        });
        if let Some(key) = api_key.or(self.api_key.as_deref()) {
            call = call.header(API_KEY_HEADER, key);
        }

        let started = Instant::now();
        let response = call
            .send()
            .await
            .map_err(|e| AppError::Backend(format!("Request to TTS backend failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Backend(format!(
                "TTS backend returned status: {}",
                status
            )));
        }

        let body: KokoroResponse = response
            .json()
            .await
            .map_err(|e| AppError::Backend(format!("Invalid response from TTS backend: {}", e)))?;

        let encoded = match body.audio_wav_base64 {
            Some(serde_json::Value::String(s)) => s,
            _ => {
                return Err(AppError::Backend(
                    "Invalid response from TTS backend: missing audio_wav_base64".into(),
                ))
            }
        };

        let audio = BASE64_STANDARD
            .decode(encoded.as_bytes())
            .map_err(|e| AppError::Backend(format!("Failed to decode backend audio: {}", e)))?;

        tracing::info!(
            "Kokoro synthesis done: voice={} bytes={} took={}ms",
            voice,
            audio.len(),
            started.elapsed().as_millis()
        );

        Ok(audio)
    }
}

/// Playback speed sent to Kokoro, folding pitch into speed since the
/// backend has no pitch control.
pub fn effective_speed(speaking_rate: Option<f64>, pitch: Option<f64>) -> f64 {
    let mut speed = match speaking_rate {
        Some(rate) if rate.is_finite() && rate > 0.0 => rate,
        _ => 1.0,
    };

    if let Some(pitch) = pitch {
        if pitch.is_finite() && pitch != 0.0 {
            speed *= 1.0 + pitch / 20.0;
        }
    }

    speed.clamp(MIN_SPEED, MAX_SPEED)
}
