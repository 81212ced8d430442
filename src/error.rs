use std::fmt;
use std::result::Result;
use thiserror::Error;

pub type SpeechResult<T> = Result<T, SpeechError>;

/// Coarse reason a synthesis request was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynthesisFailureCause {
    Network,
    Auth,
    InvalidParameter,
    Quota,
    Service,
}

impl fmt::Display for SynthesisFailureCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SynthesisFailureCause::Network => "network",
            SynthesisFailureCause::Auth => "auth",
            SynthesisFailureCause::InvalidParameter => "invalid parameter",
            SynthesisFailureCause::Quota => "quota",
            SynthesisFailureCause::Service => "service",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum SpeechError {
    #[error("Synthesis request failed ({cause}): {message}")]
    SynthesisRequestFailed {
        cause: SynthesisFailureCause,
        message: String,
    },
    #[error("Synthesis returned an empty audio stream")]
    EmptyAudioStream,
    #[error("Playback sink unavailable")]
    SinkUnavailable,
    #[error("Unknown voice {0}")]
    UnknownVoice(String),
    #[error("Invalid message: {0}")]
    InvalidMessage(String),
    #[error("Audio cache dir error")]
    AudioCacheDirError,
    #[error("Failed to decode audio")]
    FailedToDecodeAudio,
    #[error("Failed to create audio output stream")]
    FailedToCreateAudioOutputStream,
    #[error("Failed to create audio sink")]
    FailedToCreateAudioSink,
    #[error("IO error")]
    IoError(#[from] std::io::Error),
}

impl SpeechError {
    pub fn synthesis(cause: SynthesisFailureCause, message: impl Into<String>) -> Self {
        SpeechError::SynthesisRequestFailed {
            cause,
            message: message.into(),
        }
    }
}
