use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tokio::process::Command;

use crate::error::AppError;

/// Runs Rhubarb Lip Sync against stored audio files.
#[derive(Debug, Clone)]
pub struct LipSync {
    binaries: HashMap<String, PathBuf>,
    platform: String,
}

impl LipSync {
    pub fn new(binaries: HashMap<String, PathBuf>) -> Self {
        Self::for_platform(binaries, std::env::consts::OS)
    }

    pub fn for_platform(binaries: HashMap<String, PathBuf>, platform: impl Into<String>) -> Self {
        Self {
            binaries,
            platform: platform.into(),
        }
    }

    pub fn binary(&self) -> Result<&Path, AppError> {
        self.binaries
            .get(&self.platform)
            .map(PathBuf::as_path)
            .ok_or_else(|| AppError::UnsupportedPlatform(self.platform.clone()))
    }

    /// Produce the mouth-cue JSON next to `audio_path` and return its path.
    ///
    /// Waits for the process without a timeout.
    pub async fn run(&self, audio_path: &Path) -> Result<PathBuf, AppError> {
        let binary = self.binary()?;
        let json_path = cue_path(audio_path);

        tracing::info!(
            "Running lip sync: {} -f json {} -o {}",
            binary.display(),
            audio_path.display(),
            json_path.display()
        );

        let output = Command::new(binary)
            .arg("-f")
            .arg("json")
            .arg(audio_path)
            .arg("-o")
            .arg(&json_path)
            .output()
            .await
            .map_err(|e| {
                AppError::LipSync(format!("Failed to run {}: {}", binary.display(), e))
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stdout.trim().is_empty() {
            tracing::debug!("rhubarb stdout: {}", stdout.trim());
        }
        if !stderr.trim().is_empty() {
            tracing::debug!("rhubarb stderr: {}", stderr.trim());
        }

        if !output.status.success() {
            return Err(AppError::LipSync(format!(
                "rhubarb exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(json_path)
    }
}

/// `foo/bar.wav` -> `foo/bar.json`
pub fn cue_path(audio_path: &Path) -> PathBuf {
    audio_path.with_extension("json")
}
