use super::payload::AudioResource;
use super::playback_sink::{CompletionNotifier, PlaybackCompletion, PlaybackSink};
use crate::error::{SpeechError, SpeechResult};
use bytes::Bytes;
use std::io::Cursor;
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;
use tracing::*;

const END_POLL_INTERVAL: Duration = Duration::from_millis(50);
const RESTART_DELAY: Duration = Duration::from_secs(1);

type AudioDecoder = rodio::Decoder<Cursor<Bytes>>;

enum SinkCommand {
    SetSource(AudioResource, AudioDecoder, CompletionNotifier),
    Play,
    Pause,
    ResetPosition,
    ClearSource,
    Volume(f32),
    Terminate,
}

struct LoadedSource {
    resource: AudioResource,
    sink: rodio::Sink,
    notifier: Option<CompletionNotifier>,
    /// Paused sources are rewound on the next play.
    rewind_pending: bool,
}

impl LoadedSource {
    fn rewind(
        &mut self,
        output_stream_handle: &rodio::OutputStreamHandle,
        volume: f32,
    ) -> SpeechResult<()> {
        debug!("Rewinding {}", self.resource.uri());
        let paused = self.sink.is_paused();
        let decoder = decode(&self.resource)?;
        self.sink = new_sink(output_stream_handle, decoder, volume, paused)?;
        self.rewind_pending = false;
        Ok(())
    }
}

fn decode(resource: &AudioResource) -> SpeechResult<AudioDecoder> {
    rodio::Decoder::new(Cursor::new(resource.data().clone()))
        .map_err(|_| SpeechError::FailedToDecodeAudio)
}

fn new_sink(
    output_stream_handle: &rodio::OutputStreamHandle,
    decoder: AudioDecoder,
    volume: f32,
    paused: bool,
) -> SpeechResult<rodio::Sink> {
    let sink = rodio::Sink::try_new(output_stream_handle)
        .map_err(|_| SpeechError::FailedToCreateAudioSink)?;
    if paused {
        sink.pause();
    }
    sink.set_volume(volume);
    sink.append(decoder);
    Ok(sink)
}

/// Returns `Ok` when the player was asked to shut down.
fn audio_player_loop(receiver: &Receiver<SinkCommand>, volume: &mut f32) -> SpeechResult<()> {
    let (_output_stream, output_stream_handle) = rodio::OutputStream::try_default()
        .map_err(|_| SpeechError::FailedToCreateAudioOutputStream)?;
    let mut current: Option<LoadedSource> = None;
    loop {
        match receiver.recv_timeout(END_POLL_INTERVAL) {
            Ok(SinkCommand::SetSource(resource, decoder, notifier)) => {
                info!("Loading {} ({} bytes)", resource.uri(), resource.data().len());
                // old source and its notifier are released here
                current = None;
                match new_sink(&output_stream_handle, decoder, *volume, true) {
                    Ok(sink) => {
                        current = Some(LoadedSource {
                            resource,
                            sink,
                            notifier: Some(notifier),
                            rewind_pending: false,
                        })
                    }
                    Err(e) => error!("Failed to load {}: {}", resource.uri(), e),
                }
            }
            Ok(SinkCommand::Play) => {
                if let Some(source) = current.as_mut() {
                    if source.rewind_pending {
                        if let Err(e) = source.rewind(&output_stream_handle, *volume) {
                            error!("Failed to rewind {}: {}", source.resource.uri(), e);
                            current = None;
                            continue;
                        }
                    }
                    info!("Playing audio");
                    source.sink.play();
                }
            }
            Ok(SinkCommand::Pause) => {
                if let Some(source) = &current {
                    info!("Pausing audio");
                    source.sink.pause();
                }
            }
            Ok(SinkCommand::ResetPosition) => {
                if let Some(source) = current.as_mut() {
                    if source.sink.is_paused() {
                        source.rewind_pending = true;
                    } else if let Err(e) = source.rewind(&output_stream_handle, *volume) {
                        error!("Failed to rewind {}: {}", source.resource.uri(), e);
                        current = None;
                    }
                }
            }
            Ok(SinkCommand::ClearSource) => {
                if let Some(source) = current.take() {
                    info!("Releasing {}", source.resource.uri());
                }
            }
            Ok(SinkCommand::Volume(new_volume)) => {
                info!("Setting volume to {}", new_volume);
                *volume = new_volume;
                if let Some(source) = &current {
                    source.sink.set_volume(new_volume);
                }
            }
            Ok(SinkCommand::Terminate) | Err(RecvTimeoutError::Disconnected) => {
                warn!("Audio player loop terminated");
                return Ok(());
            }
            Err(RecvTimeoutError::Timeout) => (),
        }

        if let Some(source) = current.as_mut() {
            if source.sink.empty() {
                if let Some(notifier) = source.notifier.take() {
                    info!("Finished playing {}", source.resource.uri());
                    notifier.ended();
                }
            }
        }
    }
}

fn create_player() -> Sender<SinkCommand> {
    let (sender, receiver) = channel();
    let spawned = thread::Builder::new()
        .name("audio_player".to_owned())
        .spawn(move || {
            let mut volume = 1.0;
            while let Err(e) = audio_player_loop(&receiver, &mut volume) {
                error!("Audio player loop failed with {}", e);
                // pending notifiers are dropped so their completions resolve
                while let Ok(command) = receiver.try_recv() {
                    if matches!(command, SinkCommand::Terminate) {
                        return;
                    }
                }
                thread::sleep(RESTART_DELAY);
            }
        });
    if let Err(e) = spawned {
        error!("Failed to spawn audio player thread: {}", e);
    }
    sender
}

/// Plays audio through the default output device.
///
/// The rodio output stream is not `Send`, so it lives on its own thread and is
/// driven through a command channel.
pub struct RodioSink {
    audio_sender: Sender<SinkCommand>,
}

impl RodioSink {
    pub fn new(volume: f32) -> SpeechResult<RodioSink> {
        let sink = RodioSink {
            audio_sender: create_player(),
        };
        sink.set_volume(volume)?;
        Ok(sink)
    }

    fn send(&self, command: SinkCommand) -> SpeechResult<()> {
        self.audio_sender
            .send(command)
            .map_err(|_| SpeechError::SinkUnavailable)
    }
}

impl PlaybackSink for RodioSink {
    fn set_source(&self, resource: AudioResource) -> SpeechResult<PlaybackCompletion> {
        let decoder = decode(&resource)?;
        let (notifier, completion) = PlaybackCompletion::channel();
        self.send(SinkCommand::SetSource(resource, decoder, notifier))?;
        Ok(completion)
    }

    fn play(&self) -> SpeechResult<()> {
        self.send(SinkCommand::Play)
    }

    fn pause(&self) -> SpeechResult<()> {
        self.send(SinkCommand::Pause)
    }

    fn reset_position(&self) -> SpeechResult<()> {
        self.send(SinkCommand::ResetPosition)
    }

    fn clear_source(&self) -> SpeechResult<()> {
        self.send(SinkCommand::ClearSource)
    }

    fn set_volume(&self, volume: f32) -> SpeechResult<()> {
        self.send(SinkCommand::Volume(volume.max(0.0)))
    }
}

impl Drop for RodioSink {
    fn drop(&mut self) {
        _ = self.audio_sender.send(SinkCommand::Terminate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undecodable_audio_is_rejected() {
        let resource = AudioResource::new(Bytes::from_static(b"not audio"), "audio/mpeg");
        assert!(matches!(
            decode(&resource),
            Err(SpeechError::FailedToDecodeAudio)
        ));
    }
}
