// Handle compiling without alsa for cross compilation

mod audio_cache;
mod controller;
mod message;
mod payload;
mod playback_sink;
mod polly_client;
mod session_state;
mod silent_sink;
mod synthesizer;
mod voice;

#[cfg(feature = "audio")]
mod rodio_sink;

pub use audio_cache::CachingSynthesizer;
pub use controller::{PlaybackController, PlaybackPhase, SynthesisOptions, ToggleOutcome};
pub use message::{Message, MessageId};
pub use payload::{AudioPayload, AudioResource};
pub use playback_sink::{CompletionNotifier, PlaybackCompletion, PlaybackSink};
pub use polly_client::PollySynthesizer;
pub use session_state::SessionState;
pub use silent_sink::SilentSink;
pub use synthesizer::{AudioStream, SpeechSynthesizer, SynthesisRequest};
pub use voice::{Engine, OutputFormat, VoiceCatalog, VoiceId, DEFAULT_VOICE, DEFAULT_VOICES};

#[cfg(feature = "audio")]
pub use rodio_sink::RodioSink as AudioSink;

#[cfg(not(feature = "audio"))]
pub use silent_sink::SilentSink as AudioSink;
