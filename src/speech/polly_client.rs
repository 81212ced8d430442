use super::synthesizer::{AudioStream, SpeechSynthesizer, SynthesisRequest};
use super::voice::{Engine, OutputFormat};
use crate::app_config::PollyConfig;
use crate::error::{SpeechError, SpeechResult, SynthesisFailureCause};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_polly::config::http::HttpResponse;
use aws_sdk_polly::config::{Credentials, Region};
use aws_sdk_polly::operation::synthesize_speech::SynthesizeSpeechError;
use aws_sdk_polly::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_polly::primitives::ByteStream;
use aws_sdk_polly::types as polly;
use aws_sdk_polly::Client;
use futures::StreamExt;
use tracing::*;

const CREDENTIALS_PROVIDER_NAME: &str = "speech_session_config";

/// Amazon Polly backed synthesizer.
#[derive(Debug, Clone)]
pub struct PollySynthesizer {
    client: Client,
}

impl PollySynthesizer {
    /// Static keys from the config win, otherwise the default AWS chain
    /// (environment, profile, ...) provides credentials.
    pub async fn new(config: &PollyConfig) -> Self {
        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(config.region.clone()));
        match (&config.access_key_id, &config.secret_access_key) {
            (Some(access_key_id), Some(secret_access_key)) => {
                info!("Using Polly credentials from configuration");
                loader = loader.credentials_provider(Credentials::new(
                    access_key_id,
                    secret_access_key,
                    None,
                    None,
                    CREDENTIALS_PROVIDER_NAME,
                ));
            }
            _ => info!("Using default AWS credentials chain"),
        }
        let sdk_config = loader.load().await;
        PollySynthesizer {
            client: Client::new(&sdk_config),
        }
    }

    pub fn from_client(client: Client) -> Self {
        PollySynthesizer { client }
    }
}

fn to_polly_format(format: OutputFormat) -> polly::OutputFormat {
    match format {
        OutputFormat::Mp3 => polly::OutputFormat::Mp3,
        OutputFormat::OggVorbis => polly::OutputFormat::OggVorbis,
        OutputFormat::Pcm => polly::OutputFormat::Pcm,
    }
}

fn to_polly_engine(engine: Engine) -> polly::Engine {
    match engine {
        Engine::Standard => polly::Engine::Standard,
        Engine::Neural => polly::Engine::Neural,
    }
}

/// Maps an AWS error code and HTTP status onto a failure cause.
fn classify(code: Option<&str>, status: Option<u16>) -> SynthesisFailureCause {
    match code {
        Some(
            "UnrecognizedClientException"
            | "InvalidSignatureException"
            | "IncompleteSignature"
            | "MissingAuthenticationToken"
            | "AccessDeniedException"
            | "ExpiredTokenException",
        ) => SynthesisFailureCause::Auth,
        Some("ThrottlingException" | "ServiceQuotaExceededException" | "LimitExceededException") => {
            SynthesisFailureCause::Quota
        }
        Some(
            "ValidationException"
            | "InvalidSsmlException"
            | "TextLengthExceededException"
            | "EngineNotSupportedException"
            | "LanguageNotSupportedException"
            | "InvalidSampleRateException"
            | "LexiconNotFoundException"
            | "MarksNotSupportedForFormatException"
            | "SsmlMarksNotSupportedForTextTypeException",
        ) => SynthesisFailureCause::InvalidParameter,
        _ => match status {
            Some(401 | 403) => SynthesisFailureCause::Auth,
            Some(429) => SynthesisFailureCause::Quota,
            Some(400) => SynthesisFailureCause::InvalidParameter,
            _ => SynthesisFailureCause::Service,
        },
    }
}

fn map_sdk_error(err: SdkError<SynthesizeSpeechError, HttpResponse>) -> SpeechError {
    let cause = match &err {
        SdkError::DispatchFailure(_) | SdkError::TimeoutError(_) => SynthesisFailureCause::Network,
        SdkError::ServiceError(service_err) => classify(
            service_err.err().code(),
            Some(service_err.raw().status().as_u16()),
        ),
        _ => SynthesisFailureCause::Service,
    };
    SpeechError::synthesis(cause, DisplayErrorContext(&err).to_string())
}

fn chunk_stream(audio_stream: ByteStream) -> AudioStream {
    futures::stream::unfold(audio_stream, |mut audio_stream| async move {
        let chunk = audio_stream.next().await?;
        let chunk = chunk.map_err(|err| {
            SpeechError::synthesis(SynthesisFailureCause::Network, err.to_string())
        });
        Some((chunk, audio_stream))
    })
    .boxed()
}

#[async_trait]
impl SpeechSynthesizer for PollySynthesizer {
    async fn synthesize(&self, request: SynthesisRequest) -> SpeechResult<AudioStream> {
        debug!(
            voice = %request.voice,
            engine = request.engine.as_str(),
            text_len = request.text.len(),
            "Sending Polly synthesis request"
        );
        let response = self
            .client
            .synthesize_speech()
            .text(request.text)
            .voice_id(polly::VoiceId::from(request.voice.as_str()))
            .engine(to_polly_engine(request.engine))
            .output_format(to_polly_format(request.output_format))
            .send()
            .await
            .map_err(map_sdk_error)?;

        if let Some(content_type) = response.content_type() {
            debug!("Polly responded with {}", content_type);
        }
        Ok(chunk_stream(response.audio_stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_codes_map_to_auth() {
        assert_eq!(
            classify(Some("UnrecognizedClientException"), None),
            SynthesisFailureCause::Auth
        );
        assert_eq!(classify(None, Some(403)), SynthesisFailureCause::Auth);
    }

    #[test]
    fn throttling_maps_to_quota() {
        assert_eq!(
            classify(Some("ThrottlingException"), Some(400)),
            SynthesisFailureCause::Quota
        );
    }

    #[test]
    fn bad_voice_maps_to_invalid_parameter() {
        assert_eq!(
            classify(Some("ValidationException"), None),
            SynthesisFailureCause::InvalidParameter
        );
        assert_eq!(
            classify(Some("EngineNotSupportedException"), None),
            SynthesisFailureCause::InvalidParameter
        );
    }

    #[test]
    fn unknown_codes_are_service_failures() {
        assert_eq!(
            classify(Some("ServiceFailureException"), Some(500)),
            SynthesisFailureCause::Service
        );
    }

    #[test]
    fn formats_and_engines_map_to_polly() {
        assert_eq!(to_polly_format(OutputFormat::Mp3), polly::OutputFormat::Mp3);
        assert_eq!(to_polly_engine(Engine::Neural), polly::Engine::Neural);
    }
}
