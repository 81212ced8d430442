use crate::error::{SpeechError, SpeechResult};
use serde::Deserialize;
use std::fmt;

pub const DEFAULT_VOICES: [&str; 13] = [
    "Joanna", "Danielle", "Ruth", "Salli", "Kimberly", "Kendra", "Ivy", "Gregory", "Kevin",
    "Matthew", "Justin", "Joey", "Stephen",
];

pub const DEFAULT_VOICE: &str = "Joanna";

/// Name of a voice known to the synthesis service.
///
/// Only obtainable through a [`VoiceCatalog`], so holding one means the
/// voice is supported.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VoiceId(String);

impl VoiceId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone)]
pub struct VoiceCatalog {
    voices: Vec<VoiceId>,
}

impl Default for VoiceCatalog {
    fn default() -> Self {
        Self::new(DEFAULT_VOICES)
    }
}

impl VoiceCatalog {
    pub fn new<I, S>(voices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut catalog: Vec<VoiceId> = Vec::new();
        for voice in voices {
            let voice = VoiceId(voice.into());
            if !catalog.contains(&voice) {
                catalog.push(voice);
            }
        }
        VoiceCatalog { voices: catalog }
    }

    pub fn voices(&self) -> &[VoiceId] {
        &self.voices
    }

    pub fn lookup(&self, name: &str) -> SpeechResult<VoiceId> {
        self.voices
            .iter()
            .find(|voice| voice.0 == name)
            .cloned()
            .ok_or_else(|| SpeechError::UnknownVoice(name.to_owned()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Mp3,
    OggVorbis,
    Pcm,
}

impl OutputFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Mp3 => "audio/mpeg",
            OutputFormat::OggVorbis => "audio/ogg",
            OutputFormat::Pcm => "audio/pcm",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Mp3 => "mp3",
            OutputFormat::OggVorbis => "ogg",
            OutputFormat::Pcm => "pcm",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Engine {
    Standard,
    #[default]
    Neural,
}

impl Engine {
    pub fn as_str(&self) -> &'static str {
        match self {
            Engine::Standard => "standard",
            Engine::Neural => "neural",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_has_default_voice() {
        let catalog = VoiceCatalog::default();
        assert_eq!(catalog.voices().len(), 13);
        assert_eq!(catalog.lookup(DEFAULT_VOICE).unwrap().as_str(), "Joanna");
    }

    #[test]
    fn unknown_voice_is_rejected() {
        let catalog = VoiceCatalog::default();
        assert!(matches!(
            catalog.lookup("Hal"),
            Err(SpeechError::UnknownVoice(name)) if name == "Hal"
        ));
    }

    #[test]
    fn catalog_drops_duplicates() {
        let catalog = VoiceCatalog::new(["Ivy", "Ivy", "Joey"]);
        assert_eq!(catalog.voices().len(), 2);
    }

    #[test]
    fn mp3_is_mpeg() {
        assert_eq!(OutputFormat::Mp3.mime_type(), "audio/mpeg");
    }
}
