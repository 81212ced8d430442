use super::payload::AudioResource;
use crate::error::SpeechResult;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::oneshot;

/// Resolves once for the source it was issued for.
///
/// `true` means the source played to its end. `false` means it was cleared,
/// replaced or the sink went away first.
pub struct PlaybackCompletion {
    receiver: BoxFuture<'static, bool>,
}

impl PlaybackCompletion {
    pub fn channel() -> (CompletionNotifier, PlaybackCompletion) {
        let (sender, receiver) = oneshot::channel();
        let completion = PlaybackCompletion {
            receiver: receiver.map(|result| result.is_ok()).boxed(),
        };
        (CompletionNotifier { sender }, completion)
    }
}

impl Future for PlaybackCompletion {
    type Output = bool;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<bool> {
        self.receiver.as_mut().poll(cx)
    }
}

/// Sending half of a [`PlaybackCompletion`].
///
/// Dropping it without calling `ended` resolves the completion with `false`.
#[derive(Debug)]
pub struct CompletionNotifier {
    sender: oneshot::Sender<()>,
}

impl CompletionNotifier {
    pub fn ended(self) {
        // receiver may have been dropped already
        _ = self.sender.send(());
    }
}

/// Something that can render one audio resource at a time.
pub trait PlaybackSink: Send + Sync {
    /// Loads a new source paused at position zero, releasing the old one.
    fn set_source(&self, resource: AudioResource) -> SpeechResult<PlaybackCompletion>;

    fn play(&self) -> SpeechResult<()>;

    fn pause(&self) -> SpeechResult<()>;

    fn reset_position(&self) -> SpeechResult<()>;

    /// Drops the current source. Clearing an empty sink is a no-op.
    fn clear_source(&self) -> SpeechResult<()>;

    fn set_volume(&self, volume: f32) -> SpeechResult<()>;
}
