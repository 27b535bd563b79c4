use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Voice as named by the caller, usually in Google Cloud TTS terms
/// (e.g. `en-GB-Standard-A`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceDescriptor {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub language_code: String,
}

impl VoiceDescriptor {
    pub fn new(name: impl Into<String>, language_code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            language_code: language_code.into(),
        }
    }
}

pub const FALLBACK_VOICE: &str = "af_heart";

const BRITISH_FEMALE: &str = "bf_emma";
const BRITISH_MALE: &str = "bm_george";
const AMERICAN_FEMALE: &str = "af_bella";
const AMERICAN_MALE: &str = "am_michael";

const ALIASES: [(&str, &str); 6] = [
    ("en-gb-standard-a", "bf_emma"),
    ("en-gb-standard-b", "bm_george"),
    ("en-gb-standard-d", "bm_fable"),
    ("en-us-standard-b", "am_michael"),
    ("en-us-standard-c", "af_bella"),
    ("en-us-neural2-f", "af_bella"),
];

lazy_static! {
    static ref KOKORO_ID: Regex = Regex::new(r"^(af|am|bf|bm)_").unwrap();
}

/// Resolve a caller voice to a Kokoro voice id.
///
/// Rules are tried in order: explicit alias, Kokoro id pass-through, British
/// English, other English, then [`FALLBACK_VOICE`].
pub fn map_voice(voice: &VoiceDescriptor) -> String {
    let name = voice.name.to_lowercase();
    let language = voice.language_code.to_lowercase();

    if let Some((_, id)) = ALIASES.iter().find(|(alias, _)| *alias == name) {
        return id.to_string();
    }

    if KOKORO_ID.is_match(&name) {
        return name;
    }

    if language.starts_with("en-gb") || name.contains("en-gb") {
        return by_gender_suffix(&name, BRITISH_FEMALE, BRITISH_MALE).to_string();
    }

    if language.starts_with("en") || name.contains("en-us") {
        return by_gender_suffix(&name, AMERICAN_FEMALE, AMERICAN_MALE).to_string();
    }

    FALLBACK_VOICE.to_string()
}

fn by_gender_suffix<'a>(name: &str, female: &'a str, male: &'a str) -> &'a str {
    if name.ends_with("-m") {
        male
    } else {
        // "-f" and unmarked names both get the female default
        female
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VoiceInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub language_code: &'static str,
}

const fn info(id: &'static str, name: &'static str, language_code: &'static str) -> VoiceInfo {
    VoiceInfo {
        id,
        name,
        language_code,
    }
}

/// Voices the Kokoro model ships with.
pub static CATALOG: [VoiceInfo; 11] = [
    info("af_heart", "Heart (F)", "en-US"),
    info("af_bella", "Bella (F)", "en-US"),
    info("af_nicole", "Nicole (F)", "en-US"),
    info("af_sarah", "Sarah (F)", "en-US"),
    info("af_sky", "Sky (F)", "en-US"),
    info("am_adam", "Adam (M)", "en-US"),
    info("am_michael", "Michael (M)", "en-US"),
    info("bf_emma", "Emma (F)", "en-GB"),
    info("bf_isabella", "Isabella (F)", "en-GB"),
    info("bm_george", "George (M)", "en-GB"),
    info("bm_lewis", "Lewis (M)", "en-GB"),
];

#[cfg(test)]
mod tests {
    use super::*;

    fn map(name: &str, language: &str) -> String {
        map_voice(&VoiceDescriptor::new(name, language))
    }

    #[test]
    fn test_explicit_aliases() {
        assert_eq!(map("en-GB-Standard-A", "en-GB"), "bf_emma");
        assert_eq!(map("en-GB-Standard-B", "en-GB"), "bm_george");
        assert_eq!(map("en-GB-Standard-D", "en-GB"), "bm_fable");
        assert_eq!(map("en-US-Standard-B", "en-US"), "am_michael");
        assert_eq!(map("en-US-Standard-C", "en-US"), "af_bella");
        assert_eq!(map("en-US-Neural2-F", "en-US"), "af_bella");
    }

    #[test]
    fn test_alias_ignores_language() {
        assert_eq!(map("en-gb-standard-d", "fr-FR"), "bm_fable");
    }

    #[test]
    fn test_kokoro_id_passthrough() {
        assert_eq!(map("af_nicole", ""), "af_nicole");
        assert_eq!(map("BM_Lewis", "de-DE"), "bm_lewis");
    }

    #[test]
    fn test_mapping_is_idempotent() {
        for name in ["en-GB-Standard-A", "en-US-Wavenet-m", "whatever", "af_sky"] {
            let once = map(name, "en-US");
            assert_eq!(map(&once, "en-US"), once);
        }
    }

    #[test]
    fn test_british_heuristics() {
        assert_eq!(map("en-GB-Wavenet-C", "en-GB"), "bf_emma");
        assert_eq!(map("custom-m", "en-GB"), "bm_george");
        assert_eq!(map("custom-f", "en-gb"), "bf_emma");
        assert_eq!(map("my-en-gb-voice-m", ""), "bm_george");
    }

    #[test]
    fn test_american_heuristics() {
        assert_eq!(map("en-US-Wavenet-D", "en-US"), "af_bella");
        assert_eq!(map("narrator-m", "en-AU"), "am_michael");
        assert_eq!(map("narrator-f", "en"), "af_bella");
        assert_eq!(map("en-us-custom-m", ""), "am_michael");
    }

    #[test]
    fn test_fallback() {
        assert_eq!(map("fr-FR-Standard-A", "fr-FR"), FALLBACK_VOICE);
        assert_eq!(map("", ""), FALLBACK_VOICE);
        assert_eq!(map_voice(&VoiceDescriptor::default()), "af_heart");
    }

    #[test]
    fn test_catalog_is_stable() {
        assert_eq!(CATALOG.len(), 11);
        assert_eq!(CATALOG[0].id, "af_heart");
        assert_eq!(CATALOG[10], info("bm_lewis", "Lewis (M)", "en-GB"));
        assert_eq!(CATALOG.iter().filter(|v| v.language_code == "en-GB").count(), 4);
    }
}
