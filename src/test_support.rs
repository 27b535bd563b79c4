//! In-process stand-in for the Kokoro service, served by axum on an
//! ephemeral port.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{extract::State, http::HeaderMap, http::StatusCode, routing::post, Json, Router};
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::tts::kokoro::API_KEY_HEADER;

#[derive(Clone)]
pub enum FakeReply {
    /// Respond with the given bytes base64-encoded in `audio_wav_base64`.
    Audio(Vec<u8>),
    Json(serde_json::Value),
    Status(u16),
}

#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub body: serde_json::Value,
    pub api_key: Option<String>,
}

struct FakeState {
    reply: FakeReply,
    seen: Mutex<Vec<SeenRequest>>,
}

pub struct FakeKokoro {
    addr: SocketAddr,
    state: Arc<FakeState>,
    handle: JoinHandle<()>,
}

impl FakeKokoro {
    pub async fn start(reply: FakeReply) -> Self {
        let state = Arc::new(FakeState {
            reply,
            seen: Mutex::new(Vec::new()),
        });
        let app = Router::new()
            .route("/tts/synthesize", post(synthesize))
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            addr,
            state,
            handle,
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}/tts/synthesize", self.addr)
    }

    pub fn requests(&self) -> Vec<SeenRequest> {
        self.state.seen.lock().unwrap().clone()
    }
}

impl Drop for FakeKokoro {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn synthesize(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> (StatusCode, Json<serde_json::Value>) {
    let api_key = headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.seen.lock().unwrap().push(SeenRequest { body, api_key });

    match &state.reply {
        FakeReply::Audio(bytes) => (
            StatusCode::OK,
            Json(serde_json::json!({ "audio_wav_base64": BASE64_STANDARD.encode(bytes) })),
        ),
        FakeReply::Json(value) => (StatusCode::OK, Json(value.clone())),
        FakeReply::Status(code) => (
            StatusCode::from_u16(*code).unwrap(),
            Json(serde_json::json!({ "detail": "fake failure" })),
        ),
    }
}

/// Write an executable shell script standing in for the Rhubarb binary.
#[cfg(unix)]
pub fn fake_rhubarb(dir: &std::path::Path, body: &str) -> std::path::PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("rhubarb");
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Rhubarb stand-in that writes a minimal cue file to the `-o` argument.
#[cfg(unix)]
pub const RHUBARB_OK: &str = r#"echo "analyzing $3" >&2
echo '{"mouthCues":[{"start":0.0,"end":0.1,"value":"X"}]}' > "$5""#;
