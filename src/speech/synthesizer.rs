use super::voice::{Engine, OutputFormat, VoiceId};
use crate::error::SpeechResult;
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;

/// Audio chunks as they arrive from the synthesis service.
pub type AudioStream = BoxStream<'static, SpeechResult<Bytes>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisRequest {
    pub text: String,
    pub voice: VoiceId,
    pub output_format: OutputFormat,
    pub engine: Engine,
}

/// Turns text into a stream of encoded audio.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, request: SynthesisRequest) -> SpeechResult<AudioStream>;
}
