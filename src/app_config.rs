use crate::speech::{Engine, Message, OutputFormat, SynthesisOptions, VoiceCatalog, DEFAULT_VOICE, DEFAULT_VOICES};
use config::Config;
use serde::Deserialize;
use std::{path::PathBuf, str};
use tracing::*;

const DEFAULT_REGION: &str = "ap-southeast-1";

/// Use default config if no path is provided
///
/// Environment variables prefixed with `APP_` override file values,
/// nested keys are separated by `__` (`APP_POLLY__REGION`).
pub fn get_configuration(config: Option<PathBuf>) -> Result<AppConfig, anyhow::Error> {
    let builder = if let Some(config) = config {
        info!("Using configuration from {:?}", config);
        Config::builder().add_source(config::File::with_name(
            config
                .to_str()
                .ok_or_else(|| anyhow::anyhow!("Failed to convert path"))?,
        ))
    } else {
        info!("Using dev configuration");
        Config::builder()
            .add_source(config::File::with_name("config/settings"))
            .add_source(config::File::with_name("config/dev_settings").required(false))
    };

    let settings = builder.add_source(environment()).build()?;

    Ok(settings.try_deserialize()?)
}

fn environment() -> config::Environment {
    config::Environment::with_prefix("APP")
        .prefix_separator("_")
        .separator("__")
}

#[derive(Deserialize, Debug, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub polly: PollyConfig,
    #[serde(default)]
    pub voices: VoiceConfig,
    #[serde(default)]
    pub player: PlayerConfig,
    pub cache_dir_path: Option<String>,
    pub messages: Vec<Message>,
}

impl AppConfig {
    pub fn voice_catalog(&self) -> VoiceCatalog {
        VoiceCatalog::new(self.voices.available.iter().cloned())
    }

    pub fn synthesis_options(&self) -> SynthesisOptions {
        SynthesisOptions {
            output_format: self.polly.output_format,
            engine: self.polly.engine,
        }
    }
}

/// Credentials are optional here, the default AWS chain is used without them
#[derive(Deserialize, Debug, Clone)]
pub struct PollyConfig {
    #[serde(default = "default_region")]
    pub region: String,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    #[serde(default)]
    pub engine: Engine,
    #[serde(default)]
    pub output_format: OutputFormat,
}

impl Default for PollyConfig {
    fn default() -> Self {
        Self {
            region: default_region(),
            access_key_id: None,
            secret_access_key: None,
            engine: Engine::default(),
            output_format: OutputFormat::default(),
        }
    }
}

fn default_region() -> String {
    DEFAULT_REGION.to_owned()
}

#[derive(Deserialize, Debug, Clone)]
pub struct VoiceConfig {
    #[serde(default = "default_voice")]
    pub default_voice: String,
    #[serde(default = "default_voices")]
    pub available: Vec<String>,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            default_voice: default_voice(),
            available: default_voices(),
        }
    }
}

fn default_voice() -> String {
    DEFAULT_VOICE.to_owned()
}

fn default_voices() -> Vec<String> {
    DEFAULT_VOICES.iter().map(|voice| voice.to_string()).collect()
}

#[derive(Deserialize, Debug, Clone)]
pub struct PlayerConfig {
    #[serde(default = "default_volume")]
    pub volume: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            volume: default_volume(),
        }
    }
}

fn default_volume() -> f32 {
    1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    static DEFAULT_CONFIG: &str = include_str!("../config/settings.yaml");

    fn parse(contents: &str) -> AppConfig {
        Config::builder()
            .add_source(config::File::from_str(contents, config::FileFormat::Yaml))
            .build()
            .unwrap()
            .try_deserialize::<AppConfig>()
            .unwrap()
    }

    #[test]
    fn test_config() {
        let app_config = parse(DEFAULT_CONFIG);
        assert_eq!(app_config.polly.region, "ap-southeast-1");
        assert_eq!(app_config.polly.engine, Engine::Neural);
        assert_eq!(app_config.polly.output_format, OutputFormat::Mp3);
        assert!(app_config.polly.access_key_id.is_none());
        assert_eq!(app_config.messages.len(), 2);
        assert_eq!(app_config.messages[0].id().as_str(), "msg1");
        assert!(app_config.messages[1].text().contains("Key of Whimsy"));
        assert!(app_config
            .voice_catalog()
            .lookup(&app_config.voices.default_voice)
            .is_ok());
    }

    #[test]
    fn missing_sections_use_defaults() {
        let app_config = parse("messages:\n  - id: a\n    text: hello\n");
        assert_eq!(app_config.polly.region, DEFAULT_REGION);
        assert_eq!(app_config.voices.default_voice, "Joanna");
        assert_eq!(app_config.voice_catalog().voices().len(), 13);
        assert_eq!(app_config.player.volume, 1.0);
        assert!(app_config.cache_dir_path.is_none());
    }

    #[test]
    fn environment_overrides_file_values() {
        std::env::set_var("APP_POLLY__REGION", "eu-west-2");
        let app_config = Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Yaml))
            .add_source(environment())
            .build()
            .unwrap()
            .try_deserialize::<AppConfig>();
        std::env::remove_var("APP_POLLY__REGION");
        assert_eq!(app_config.unwrap().polly.region, "eu-west-2");
    }

    #[test]
    fn empty_message_text_is_rejected() {
        let result = Config::builder()
            .add_source(config::File::from_str(
                "messages:\n  - id: a\n    text: \"\"\n",
                config::FileFormat::Yaml,
            ))
            .build()
            .unwrap()
            .try_deserialize::<AppConfig>();
        assert!(result.is_err());
    }
}
