pub mod handlers;
pub mod routes;

use serde::{Deserialize, Deserializer, Serialize};

use crate::tts::{SynthesisRequest, VoiceDescriptor, VoiceInfo};

/// Voice fields as sent by the editor front end.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceSettings {
    pub name: Option<String>,
    pub language_code: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub rate: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub pitch: Option<f64>,
}

/// Accept numbers and numeric strings; anything else reads as unset so the
/// speed falls back to its default instead of rejecting the body.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

impl VoiceSettings {
    pub fn to_request(&self, text: &str, default_language: &str) -> SynthesisRequest {
        SynthesisRequest {
            text: text.to_string(),
            voice: VoiceDescriptor::new(
                self.name.clone().unwrap_or_default(),
                self.language_code
                    .clone()
                    .unwrap_or_else(|| default_language.to_string()),
            ),
            speaking_rate: self.rate,
            pitch: self.pitch,
        }
    }
}

/// Segments stay raw here so one malformed entry only fails itself.
#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub segments: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    #[serde(default)]
    pub segment_id: String,
    pub text: Option<String>,
    pub voice_settings: Option<VoiceSettings>,
}

impl Segment {
    pub fn from_value(raw: &serde_json::Value) -> Result<Self, serde_json::Error> {
        Segment::deserialize(raw)
    }

    /// Best-effort id for reporting a segment that failed to decode.
    pub fn raw_id(raw: &serde_json::Value) -> &str {
        raw.get("segmentId")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SegmentResult {
    pub segment_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub success: bool,
}

impl SegmentResult {
    pub fn ok(segment_id: &str, audio_url: String) -> Self {
        Self {
            segment_id: segment_id.to_string(),
            audio_url: Some(audio_url),
            error: None,
            success: true,
        }
    }

    pub fn failed(segment_id: &str, error: impl Into<String>) -> Self {
        Self {
            segment_id: segment_id.to_string(),
            audio_url: None,
            error: Some(error.into()),
            success: false,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResponse {
    pub results: Vec<SegmentResult>,
    pub total_success: usize,
    pub total_failed: usize,
}

/// Body of the Google Cloud TTS shaped endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiTtsRequest {
    pub input: Option<ApiTtsInput>,
    pub voice: Option<VoiceDescriptor>,
    #[serde(default)]
    pub audio_config: AudioConfig,
    /// Accepted for compatibility; timepoints are never computed.
    #[allow(dead_code)]
    pub enable_time_pointing: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct ApiTtsInput {
    pub text: Option<String>,
    pub ssml: Option<String>,
}

impl ApiTtsInput {
    pub fn text(&self) -> &str {
        [&self.text, &self.ssml]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|t| !t.is_empty())
            .unwrap_or("")
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioConfig {
    #[serde(default, deserialize_with = "lenient_number")]
    pub speaking_rate: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub pitch: Option<f64>,
    #[allow(dead_code)]
    pub audio_encoding: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiTtsResponse {
    pub audio_content: String,
    pub timepoints: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesizeRequest {
    pub text: Option<String>,
    pub voice_settings: Option<VoiceSettings>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesizeResponse {
    pub audio_url: String,
    pub json_url: String,
}

#[derive(Debug, Serialize)]
pub struct VoicesResponse {
    pub voices: Vec<VoiceInfo>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}
