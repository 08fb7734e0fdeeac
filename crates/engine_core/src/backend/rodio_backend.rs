//! Rodio audio backend implementation
//!
//! Decodes music and sound effects with `rodio::Decoder` at load time, so a
//! corrupt file fails the resource load instead of the first playback.
//! Playback itself belongs to the sound service and is not handled here.

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use rodio::{Decoder, Source};

use super::{AudioBackend, AudioHandle, BackendError};
use crate::assets::AudioFormat;
use crate::foundation::logging::debug;

/// Decoded PCM kept for a handle
#[derive(Debug, Clone)]
pub struct DecodedClip {
    /// Interleaved samples
    pub samples: Vec<i16>,
    /// Channel count
    pub channels: u16,
    /// Samples per second per channel
    pub sample_rate: u32,
}

impl DecodedClip {
    /// Clip length in seconds
    pub fn duration_secs(&self) -> f32 {
        if self.channels == 0 || self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / (self.channels as f32 * self.sample_rate as f32)
    }
}

/// Rodio-based audio backend
#[derive(Debug)]
pub struct RodioAudio {
    next_id: AtomicU32,
    clips: Mutex<HashMap<u32, DecodedClip>>,
}

impl RodioAudio {
    /// Create a new Rodio backend
    pub fn new() -> Self {
        Self {
            next_id: AtomicU32::new(1),
            clips: Mutex::new(HashMap::new()),
        }
    }

    /// Decoded clip behind `handle`
    pub fn clip(&self, handle: AudioHandle) -> Option<DecodedClip> {
        self.clips().get(&handle.0).cloned()
    }

    fn clips(&self) -> MutexGuard<'_, HashMap<u32, DecodedClip>> {
        self.clips.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn decode(&self, bytes: &[u8], format: AudioFormat) -> Result<AudioHandle, BackendError> {
        let cursor = Cursor::new(bytes.to_vec());
        let decoder = Decoder::new(cursor)
            .map_err(|e| BackendError::AudioDecode(format!("{:?} stream: {}", format, e)))?;

        let channels = decoder.channels();
        let sample_rate = decoder.sample_rate();
        let samples: Vec<i16> = decoder.collect();
        let clip = DecodedClip { samples, channels, sample_rate };
        debug!("Decoded {:?} clip: {:.2}s, {} channels", format, clip.duration_secs(), channels);

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.clips().insert(id, clip);
        Ok(AudioHandle(id))
    }
}

impl Default for RodioAudio {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioBackend for RodioAudio {
    fn load_music(&self, bytes: &[u8], format: AudioFormat) -> Result<AudioHandle, BackendError> {
        self.decode(bytes, format)
    }

    fn load_sfx(&self, bytes: &[u8], format: AudioFormat) -> Result<AudioHandle, BackendError> {
        self.decode(bytes, format)
    }

    fn release(&self, handle: AudioHandle) -> Result<(), BackendError> {
        self.clips()
            .remove(&handle.0)
            .map(|_| ())
            .ok_or(BackendError::InvalidHandle(handle.0))
    }
}
