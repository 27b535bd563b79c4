pub mod kokoro;
pub mod voice;

use std::path::Path;

use crate::error::AppError;
use crate::lipsync::LipSync;
use crate::storage::{AudioStore, PersistedAudio};

pub use kokoro::{KokoroClient, SynthesisRequest};
pub use voice::{VoiceDescriptor, VoiceInfo};

/// Audio and mouth cues for one utterance, both as public URLs.
#[derive(Debug, Clone)]
pub struct LipSyncedAudio {
    pub audio_url: String,
    pub json_url: String,
}

pub struct TtsService {
    client: KokoroClient,
    store: AudioStore,
    lip_sync: LipSync,
}

impl TtsService {
    pub fn new(client: KokoroClient, store: AudioStore, lip_sync: LipSync) -> Self {
        Self {
            client,
            store,
            lip_sync,
        }
    }

    pub fn list_voices(&self) -> &'static [VoiceInfo] {
        &voice::CATALOG
    }

    pub fn audio_dir(&self) -> &Path {
        self.store.dir()
    }

    pub async fn prepare_storage(&self) -> Result<(), AppError> {
        self.store.ensure_dir().await
    }

    /// Synthesize and hand the audio back without touching disk.
    pub async fn speak(
        &self,
        request: &SynthesisRequest,
        api_key: Option<&str>,
    ) -> Result<Vec<u8>, AppError> {
        self.client.synthesize(request, api_key).await
    }

    pub async fn speak_segment(
        &self,
        segment_id: &str,
        request: &SynthesisRequest,
    ) -> Result<PersistedAudio, AppError> {
        let audio = self.client.synthesize(request, None).await?;
        self.store.save_segment(segment_id, &audio).await
    }

    pub async fn speak_with_lip_sync(
        &self,
        request: &SynthesisRequest,
    ) -> Result<LipSyncedAudio, AppError> {
        let audio = self.client.synthesize(request, None).await?;
        let saved = self.store.save_named(&request.voice.name, &audio).await?;

        let json_path = self.lip_sync.run(&saved.path).await?;
        let json_name = json_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| AppError::LipSync("Lip sync output has no file name".into()))?;

        Ok(LipSyncedAudio {
            audio_url: saved.public_url,
            json_url: self.store.public_url(&json_name),
        })
    }
}
