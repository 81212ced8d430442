use crate::error::{SpeechError, SpeechResult};
use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_RESOURCE_ID: AtomicU64 = AtomicU64::new(1);

/// Audio chunks in the order they arrived from the synthesis stream.
#[derive(Debug, Default)]
pub struct AudioPayload {
    chunks: Vec<Bytes>,
}

impl AudioPayload {
    pub fn push(&mut self, chunk: Bytes) {
        self.chunks.push(chunk);
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn byte_len(&self) -> usize {
        self.chunks.iter().map(Bytes::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.byte_len() == 0
    }

    /// Reads the stream to its end.
    ///
    /// Any chunk error aborts buffering and is returned as is.
    pub async fn buffer<S>(mut stream: S) -> SpeechResult<Self>
    where
        S: Stream<Item = SpeechResult<Bytes>> + Unpin,
    {
        let mut payload = AudioPayload::default();
        while let Some(chunk) = stream.next().await {
            payload.push(chunk?);
        }
        Ok(payload)
    }

    /// Joins the chunks into a single resource.
    ///
    /// Fails with `EmptyAudioStream` when no bytes were received.
    pub fn finalize(self, mime_type: &'static str) -> SpeechResult<AudioResource> {
        if self.is_empty() {
            return Err(SpeechError::EmptyAudioStream);
        }
        let data = if self.chunks.len() == 1 {
            self.chunks.into_iter().next().unwrap_or_default()
        } else {
            let mut joined = BytesMut::with_capacity(self.byte_len());
            for chunk in &self.chunks {
                joined.extend_from_slice(chunk);
            }
            joined.freeze()
        };
        Ok(AudioResource::new(data, mime_type))
    }
}

/// Finished audio ready to be handed to a playback sink.
///
/// Dropping the last copy releases the audio data.
#[derive(Debug, Clone)]
pub struct AudioResource {
    id: u64,
    mime_type: &'static str,
    data: Bytes,
}

impl AudioResource {
    pub fn new(data: Bytes, mime_type: &'static str) -> Self {
        AudioResource {
            id: NEXT_RESOURCE_ID.fetch_add(1, Ordering::Relaxed),
            mime_type,
            data,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn uri(&self) -> String {
        format!("speech://resource/{}", self.id)
    }

    pub fn mime_type(&self) -> &'static str {
        self.mime_type
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }
}
