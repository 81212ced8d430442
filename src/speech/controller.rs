use super::message::{Message, MessageId};
use super::payload::{AudioPayload, AudioResource};
use super::playback_sink::PlaybackSink;
use super::session_state::SessionState;
use super::synthesizer::{SpeechSynthesizer, SynthesisRequest};
use super::voice::{Engine, OutputFormat, VoiceCatalog, VoiceId};
use crate::error::{SpeechError, SpeechResult, SynthesisFailureCause};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackPhase {
    Idle,
    Requesting,
    Playing,
}

/// Result of a single [`PlaybackController::toggle`] call.
#[derive(Debug)]
pub enum ToggleOutcome {
    /// Audio was synthesized and handed to the sink.
    Playing {
        message_id: MessageId,
        resource_uri: String,
    },
    /// The message was active and has been stopped.
    Stopped { message_id: MessageId },
    /// Synthesis or loading failed, the controller is idle again.
    Failed {
        message_id: MessageId,
        error: SpeechError,
    },
    /// A later toggle cancelled or replaced this request while it was in flight.
    Superseded { message_id: MessageId },
}

impl ToggleOutcome {
    pub fn message_id(&self) -> &MessageId {
        match self {
            ToggleOutcome::Playing { message_id, .. }
            | ToggleOutcome::Stopped { message_id }
            | ToggleOutcome::Failed { message_id, .. }
            | ToggleOutcome::Superseded { message_id } => message_id,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SynthesisOptions {
    pub output_format: OutputFormat,
    pub engine: Engine,
}

struct ControllerState {
    session: SessionState,
    phase: PlaybackPhase,
    /// Bumped every time a session starts or ends. Async work tagged with an
    /// older value is stale.
    generation: u64,
    selected_voice: VoiceId,
    request: Option<AbortHandle>,
    completion_watcher: Option<JoinHandle<()>>,
}

fn log_sink_result(action: &str, result: SpeechResult<()>) {
    if let Err(e) = result {
        warn!("Playback sink failed to {}: {}", action, e);
    }
}

impl ControllerState {
    /// Returns to idle from any phase. Safe to call repeatedly.
    fn teardown(&mut self, sink: &dyn PlaybackSink) {
        if self.phase == PlaybackPhase::Playing {
            log_sink_result("pause", sink.pause());
            log_sink_result("reset position", sink.reset_position());
        }
        log_sink_result("clear source", sink.clear_source());
        self.abandon();
    }

    /// Returns to idle without touching the sink.
    fn abandon(&mut self) {
        self.generation += 1;
        if let Some(request) = self.request.take() {
            request.abort();
        }
        if let Some(watcher) = self.completion_watcher.take() {
            watcher.abort();
        }
        self.session.stop();
        self.phase = PlaybackPhase::Idle;
    }

    fn finish(&mut self, sink: &dyn PlaybackSink) {
        self.generation += 1;
        self.completion_watcher = None;
        log_sink_result("clear source", sink.clear_source());
        self.session.stop();
        self.phase = PlaybackPhase::Idle;
    }
}

/// Drives speech playback of one message at a time.
///
/// Toggling a message that is not active starts it, replacing whatever was
/// active before. Toggling the active message stops it. Every path back to
/// idle clears the sink.
#[derive(Clone)]
pub struct PlaybackController {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    sink: Arc<dyn PlaybackSink>,
    catalog: Arc<VoiceCatalog>,
    options: SynthesisOptions,
    inner: Arc<Mutex<ControllerState>>,
}

impl PlaybackController {
    pub fn new(
        synthesizer: Arc<dyn SpeechSynthesizer>,
        sink: Arc<dyn PlaybackSink>,
        catalog: VoiceCatalog,
        default_voice: &str,
        options: SynthesisOptions,
    ) -> SpeechResult<Self> {
        let selected_voice = catalog.lookup(default_voice)?;
        Ok(PlaybackController {
            synthesizer,
            sink,
            catalog: Arc::new(catalog),
            options,
            inner: Arc::new(Mutex::new(ControllerState {
                session: SessionState::default(),
                phase: PlaybackPhase::Idle,
                generation: 0,
                selected_voice,
                request: None,
                completion_watcher: None,
            })),
        })
    }

    pub fn voices(&self) -> &[VoiceId] {
        self.catalog.voices()
    }

    pub async fn select_voice(&self, name: &str) -> SpeechResult<VoiceId> {
        let voice = self.catalog.lookup(name)?;
        info!("Selected voice {}", voice);
        self.inner.lock().await.selected_voice = voice.clone();
        Ok(voice)
    }

    pub async fn selected_voice(&self) -> VoiceId {
        self.inner.lock().await.selected_voice.clone()
    }

    pub async fn phase(&self) -> PlaybackPhase {
        self.inner.lock().await.phase
    }

    pub async fn session(&self) -> SessionState {
        self.inner.lock().await.session.clone()
    }

    pub async fn is_active(&self, id: &MessageId) -> bool {
        self.inner.lock().await.session.is_active(id)
    }

    /// Starts speaking `message`, or stops it if it is the active one.
    ///
    /// Never fails. Errors are logged, reported in the outcome and leave the
    /// controller idle.
    pub async fn toggle(&self, message: &Message) -> ToggleOutcome {
        let message_id = message.id().clone();
        let (generation, task) = {
            let mut state = self.inner.lock().await;
            if state.session.is_active(&message_id) {
                info!("Stopping playback of {}", message_id);
                state.teardown(self.sink.as_ref());
                return ToggleOutcome::Stopped { message_id };
            }
            if let Some(previous) = state.session.active_message_id().cloned() {
                info!("Replacing {} with {}", previous, message_id);
                state.teardown(self.sink.as_ref());
            }

            state.generation += 1;
            state.session.start(message);
            state.phase = PlaybackPhase::Requesting;
            let generation = state.generation;
            let request = SynthesisRequest {
                text: message.text().to_owned(),
                voice: state.selected_voice.clone(),
                output_format: self.options.output_format,
                engine: self.options.engine,
            };
            info!("Requesting speech for {} with voice {}", message_id, request.voice);

            let controller = self.clone();
            let task_message_id = message_id.clone();
            let task = tokio::spawn(async move {
                controller
                    .run_request(generation, task_message_id, request)
                    .await
            });
            state.request = Some(task.abort_handle());
            (generation, task)
        };

        match task.await {
            Ok(outcome) => outcome,
            Err(join_error) if join_error.is_cancelled() => {
                debug!("Request for {} was cancelled", message_id);
                ToggleOutcome::Superseded { message_id }
            }
            Err(join_error) => {
                error!("Speech request for {} panicked: {}", message_id, join_error);
                let mut state = self.inner.lock().await;
                if state.generation == generation {
                    state.request = None;
                    state.teardown(self.sink.as_ref());
                }
                ToggleOutcome::Failed {
                    message_id,
                    error: SpeechError::synthesis(
                        SynthesisFailureCause::Service,
                        join_error.to_string(),
                    ),
                }
            }
        }
    }

    async fn run_request(
        self,
        generation: u64,
        message_id: MessageId,
        request: SynthesisRequest,
    ) -> ToggleOutcome {
        let mime_type = request.output_format.mime_type();
        let result: SpeechResult<AudioResource> = async {
            let stream = self.synthesizer.synthesize(request).await?;
            let payload = AudioPayload::buffer(stream).await?;
            debug!(
                "Buffered {} bytes in {} chunks for {}",
                payload.byte_len(),
                payload.chunk_count(),
                message_id
            );
            payload.finalize(mime_type)
        }
        .await;

        let mut state = self.inner.lock().await;
        if state.generation != generation {
            debug!("Discarding stale speech for {}", message_id);
            return ToggleOutcome::Superseded { message_id };
        }
        // this task is finishing, nothing left to abort
        state.request = None;

        match result.and_then(|resource| self.start_playback(&mut state, generation, resource)) {
            Ok(resource_uri) => {
                info!("Playing {} from {}", message_id, resource_uri);
                ToggleOutcome::Playing {
                    message_id,
                    resource_uri,
                }
            }
            Err(error) => {
                match &error {
                    SpeechError::EmptyAudioStream => {
                        warn!("No audio returned for {}", message_id);
                        state.teardown(self.sink.as_ref());
                    }
                    SpeechError::SinkUnavailable => {
                        error!("Playback sink unavailable for {}", message_id);
                        state.abandon();
                    }
                    _ => {
                        error!("Error synthesizing speech for {}: {}", message_id, error);
                        state.teardown(self.sink.as_ref());
                    }
                }
                ToggleOutcome::Failed { message_id, error }
            }
        }
    }

    fn start_playback(
        &self,
        state: &mut ControllerState,
        generation: u64,
        resource: AudioResource,
    ) -> SpeechResult<String> {
        let resource_uri = resource.uri();
        let completion = self.sink.set_source(resource)?;

        let inner = self.inner.clone();
        let sink = self.sink.clone();
        state.completion_watcher = Some(tokio::spawn(async move {
            let ended = completion.await;
            let mut state = inner.lock().await;
            if state.generation != generation {
                return;
            }
            if ended {
                info!("Playback finished");
            } else {
                warn!("Playback sink dropped the source");
            }
            state.finish(sink.as_ref());
        }));

        self.sink.play()?;
        state.phase = PlaybackPhase::Playing;
        Ok(resource_uri)
    }

    /// Stops whatever is active. Calling it while idle only clears the sink.
    pub async fn stop(&self) {
        let mut state = self.inner.lock().await;
        if let Some(active) = state.session.active_message_id().cloned() {
            info!("Stopping playback of {}", active);
        }
        state.teardown(self.sink.as_ref());
    }

    /// Returns `false` when nothing is playing.
    pub async fn pause(&self) -> SpeechResult<bool> {
        let state = self.inner.lock().await;
        if state.phase != PlaybackPhase::Playing {
            return Ok(false);
        }
        self.sink.pause()?;
        Ok(true)
    }

    /// Returns `false` when nothing is playing.
    pub async fn resume(&self) -> SpeechResult<bool> {
        let state = self.inner.lock().await;
        if state.phase != PlaybackPhase::Playing {
            return Ok(false);
        }
        self.sink.play()?;
        Ok(true)
    }
}
