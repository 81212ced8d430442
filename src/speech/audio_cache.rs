use super::payload::AudioPayload;
use super::synthesizer::{AudioStream, SpeechSynthesizer, SynthesisRequest};
use crate::error::{SpeechError, SpeechResult};
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::prelude::*;
use std::path::{Path, PathBuf};
use tracing::*;

// Used to invalidate old cache
const CACHE_FORMAT_VERSION: u32 = 1;

fn hash_request(request: &SynthesisRequest) -> String {
    let mut hasher = Sha256::new();
    hasher.update(&request.text);
    hasher.update(request.voice.as_str());
    hasher.update(request.output_format.mime_type());
    hasher.update(request.engine.as_str());
    hasher.update(CACHE_FORMAT_VERSION.to_be_bytes());
    let hashed = hasher.finalize();
    format!("{}-{:x}", request.voice, hashed)
}

pub(crate) struct AudioCache {
    cache_dir_path: PathBuf,
}

impl AudioCache {
    pub(crate) fn new(cache_dir_path: impl Into<PathBuf>) -> SpeechResult<AudioCache> {
        let cache_dir_path = cache_dir_path.into();
        fs::create_dir_all(&cache_dir_path)?;
        if !cache_dir_path.exists() {
            return Err(SpeechError::AudioCacheDirError);
        }
        Ok(AudioCache { cache_dir_path })
    }

    fn file_path(&self, key: &str, extension: &str) -> PathBuf {
        Path::new(&self.cache_dir_path).join(format!("{}.{}", key, extension))
    }

    pub(crate) fn get(&self, key: &str, extension: &str) -> Option<Bytes> {
        fs::read(self.file_path(key, extension)).ok().map(Bytes::from)
    }

    pub(crate) fn set(&self, key: &str, extension: &str, contents: &[u8]) -> SpeechResult<()> {
        let mut file = File::create(self.file_path(key, extension))?;
        file.write_all(contents)?;
        file.flush()?;
        Ok(())
    }
}

/// Serves repeated requests from disk instead of the wrapped synthesizer.
pub struct CachingSynthesizer<S> {
    inner: S,
    audio_cache: AudioCache,
}

impl<S: SpeechSynthesizer> CachingSynthesizer<S> {
    pub fn new(inner: S, cache_dir_path: impl Into<PathBuf>) -> SpeechResult<Self> {
        Ok(CachingSynthesizer {
            inner,
            audio_cache: AudioCache::new(cache_dir_path)?,
        })
    }
}

fn single_chunk(data: Bytes) -> AudioStream {
    futures::stream::once(async move { Ok(data) }).boxed()
}

#[async_trait]
impl<S: SpeechSynthesizer> SpeechSynthesizer for CachingSynthesizer<S> {
    async fn synthesize(&self, request: SynthesisRequest) -> SpeechResult<AudioStream> {
        let file_key = hash_request(&request);
        let extension = request.output_format.extension();
        let mime_type = request.output_format.mime_type();
        if let Some(data) = self.audio_cache.get(&file_key, extension) {
            info!("Using cached value with key {}", file_key);
            return Ok(single_chunk(data));
        }

        let stream = self.inner.synthesize(request).await?;
        let payload = AudioPayload::buffer(stream).await?;
        let resource = payload.finalize(mime_type)?;
        info!("Writing new file with key {}", file_key);
        if let Err(err) = self.audio_cache.set(&file_key, extension, resource.data()) {
            warn!("Failed to write audio cache entry {}: {}", file_key, err);
        }
        Ok(single_chunk(resource.data().clone()))
    }
}
