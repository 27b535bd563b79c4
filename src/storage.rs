use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Url;

use crate::config::ConfigError;
use crate::error::AppError;

lazy_static! {
    static ref UNSAFE_FILE_CHARS: Regex = Regex::new(r"[^A-Za-z0-9_\-.]").unwrap();
}

#[derive(Debug, Clone, PartialEq)]
pub struct PersistedAudio {
    pub path: PathBuf,
    pub public_url: String,
}

/// Flat directory of generated audio, exposed publicly under `base_url`.
#[derive(Debug, Clone)]
pub struct AudioStore {
    dir: PathBuf,
    base_url: Url,
}

impl AudioStore {
    pub fn new(dir: PathBuf, base_url: &str) -> Result<Self, ConfigError> {
        let base_url = Url::parse(base_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| ConfigError::InvalidBaseUrl(base_url.to_string()))?;
        Ok(Self { dir, base_url })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn ensure_dir(&self) -> Result<(), AppError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    /// Store audio for a batch segment under a name that cannot collide with
    /// other requests for the same segment.
    pub async fn save_segment(
        &self,
        segment_id: &str,
        audio: &[u8],
    ) -> Result<PersistedAudio, AppError> {
        let file_name = format!(
            "segment-{}-{}.wav",
            sanitize_file_part(segment_id),
            uuid::Uuid::new_v4()
        );
        self.write(&file_name, audio).await
    }

    /// Store audio named after the voice and the current time in millis.
    pub async fn save_named(
        &self,
        voice_name: &str,
        audio: &[u8],
    ) -> Result<PersistedAudio, AppError> {
        let file_name = format!(
            "{}-{}.wav",
            sanitize_file_part(voice_name),
            chrono::Utc::now().timestamp_millis()
        );
        self.write(&file_name, audio).await
    }

    async fn write(&self, file_name: &str, audio: &[u8]) -> Result<PersistedAudio, AppError> {
        self.ensure_dir().await?;

        let path = self.dir.join(file_name);
        tokio::fs::write(&path, audio).await?;
        tracing::info!("Audio file saved: {} ({} bytes)", path.display(), audio.len());

        Ok(PersistedAudio {
            public_url: self.public_url(file_name),
            path,
        })
    }

    /// Public URL for a file in the audio directory.
    pub fn public_url(&self, file_name: &str) -> String {
        let mut url = self.base_url.clone();
        // checked in `new`
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(file_name);
        }
        url.to_string()
    }
}

/// Replace everything except ASCII letters, digits, `_`, `-` and `.` with `_`.
pub fn sanitize_file_part(raw: &str) -> String {
    let cleaned = UNSAFE_FILE_CHARS.replace_all(raw, "_");
    // a bare ".." would still walk out of the directory
    if cleaned.chars().all(|c| c == '.') {
        cleaned.replace('.', "_")
    } else {
        cleaned.into_owned()
    }
}
