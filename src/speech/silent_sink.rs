use super::payload::AudioResource;
use super::playback_sink::{CompletionNotifier, PlaybackCompletion, PlaybackSink};
use crate::error::SpeechResult;
use std::sync::Mutex;
use tracing::*;

/// Stand-in sink for builds without audio output.
///
/// Every source "plays" instantly and reports completion on `play`.
#[derive(Default)]
pub struct SilentSink {
    notifier: Mutex<Option<CompletionNotifier>>,
}

impl SilentSink {
    pub fn new(_volume: f32) -> SpeechResult<SilentSink> {
        Ok(SilentSink::default())
    }

    fn notifier(&self) -> std::sync::MutexGuard<'_, Option<CompletionNotifier>> {
        self.notifier
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl PlaybackSink for SilentSink {
    fn set_source(&self, resource: AudioResource) -> SpeechResult<PlaybackCompletion> {
        info!("Audio disabled, not rendering {}", resource.uri());
        let (notifier, completion) = PlaybackCompletion::channel();
        *self.notifier() = Some(notifier);
        Ok(completion)
    }

    fn play(&self) -> SpeechResult<()> {
        if let Some(notifier) = self.notifier().take() {
            notifier.ended();
        }
        Ok(())
    }

    fn pause(&self) -> SpeechResult<()> {
        Ok(())
    }

    fn reset_position(&self) -> SpeechResult<()> {
        Ok(())
    }

    fn clear_source(&self) -> SpeechResult<()> {
        self.notifier().take();
        Ok(())
    }

    fn set_volume(&self, _volume: f32) -> SpeechResult<()> {
        Ok(())
    }
}
