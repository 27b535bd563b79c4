use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_TTS_URL: &str = "http://localhost:8001/tts/synthesize";
pub const DEFAULT_PUBLIC_AUDIO_BASE_URL: &str = "https://chatlab.3dvar.com/server/audio/";

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("{0} must be a number, got '{1}'")]
    InvalidNumber(&'static str, String),

    #[error("Invalid listen address: {0}")]
    InvalidAddress(String),

    #[error("Invalid public audio base URL: {0}")]
    InvalidBaseUrl(String),
}

/// Server settings, read once at startup and shared read-only afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub development: bool,
    pub audio_dir: PathBuf,
    pub tts_url: String,
    pub tts_api_key: Option<String>,
    pub public_audio_base_url: String,
    /// Lip sync binary per platform, keyed like `std::env::consts::OS`.
    pub rhubarb_binaries: HashMap<String, PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let port_raw = var("PORT", "3000");
        let port: u16 = port_raw
            .parse()
            .map_err(|_| ConfigError::InvalidNumber("PORT", port_raw.clone()))?;

        let mut rhubarb_binaries = default_rhubarb_binaries();
        for (platform, key) in [
            ("macos", "RHUBARB_PATH_MACOS"),
            ("windows", "RHUBARB_PATH_WINDOWS"),
            ("linux", "RHUBARB_PATH_LINUX"),
        ] {
            if let Some(path) = lookup(key) {
                rhubarb_binaries.insert(platform.to_string(), PathBuf::from(path));
            }
        }

        Ok(Self {
            host: var("HOST", "0.0.0.0"),
            port,
            development: var("APP_ENV", "production") == "development",
            audio_dir: PathBuf::from(var("AUDIO_DIR", "./audio")),
            tts_url: var("FASTAPI_TTS_URL", DEFAULT_TTS_URL),
            tts_api_key: lookup("TTS_API_KEY").filter(|k| !k.is_empty()),
            public_audio_base_url: var("PUBLIC_AUDIO_BASE_URL", DEFAULT_PUBLIC_AUDIO_BASE_URL),
            rhubarb_binaries,
        })
    }

    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse().map_err(|_| ConfigError::InvalidAddress(addr))
    }

    /// Base that stored file names are appended to when building public URLs.
    pub fn audio_base_url(&self) -> String {
        if self.development {
            format!("http://localhost:{}/audio/", self.port)
        } else {
            self.public_audio_base_url.clone()
        }
    }
}

fn default_rhubarb_binaries() -> HashMap<String, PathBuf> {
    HashMap::from([
        (
            "macos".to_string(),
            PathBuf::from("Rhubarb-Lip-Mac").join("rhubarb"),
        ),
        (
            "windows".to_string(),
            PathBuf::from("Rhubarb_Lip").join("rhubarb.exe"),
        ),
        (
            "linux".to_string(),
            PathBuf::from("Rhubarb_Lip_Linux").join("rhubarb"),
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.port, 3000);
        assert!(!config.development);
        assert_eq!(config.tts_url, DEFAULT_TTS_URL);
        assert!(config.tts_api_key.is_none());
        assert_eq!(config.audio_base_url(), DEFAULT_PUBLIC_AUDIO_BASE_URL);
        assert_eq!(
            config.rhubarb_binaries.get("linux"),
            Some(&PathBuf::from("Rhubarb_Lip_Linux/rhubarb"))
        );
        assert_eq!(config.rhubarb_binaries.len(), 3);
    }

    #[test]
    fn test_development_uses_local_base_url() {
        let config =
            Config::from_lookup(lookup_from(&[("APP_ENV", "development"), ("PORT", "8080")]))
                .unwrap();
        assert_eq!(config.audio_base_url(), "http://localhost:8080/audio/");
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("FASTAPI_TTS_URL", "http://tts:9000/synth"),
            ("TTS_API_KEY", "secret"),
            ("RHUBARB_PATH_LINUX", "/opt/rhubarb/rhubarb"),
            ("AUDIO_DIR", "/tmp/audio"),
        ]))
        .unwrap();
        assert_eq!(config.tts_url, "http://tts:9000/synth");
        assert_eq!(config.tts_api_key.as_deref(), Some("secret"));
        assert_eq!(config.audio_dir, PathBuf::from("/tmp/audio"));
        assert_eq!(
            config.rhubarb_binaries.get("linux"),
            Some(&PathBuf::from("/opt/rhubarb/rhubarb"))
        );
    }

    #[test]
    fn test_empty_api_key_is_none() {
        let config = Config::from_lookup(lookup_from(&[("TTS_API_KEY", "")])).unwrap();
        assert!(config.tts_api_key.is_none());
    }

    #[test]
    fn test_invalid_port() {
        let err = Config::from_lookup(lookup_from(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidNumber("PORT", _)));
    }

    #[test]
    fn test_listen_addr() {
        let config = Config::from_lookup(lookup_from(&[("HOST", "127.0.0.1")])).unwrap();
        assert_eq!(config.listen_addr().unwrap().to_string(), "127.0.0.1:3000");
    }
}
