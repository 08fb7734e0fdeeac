//! Music and sound effect loaders

use super::{LoadRequest, ResourceLoader};
use crate::assets::error::read_file;
use crate::assets::{LoadError, MusicResource, Resource, ResourceKind, SfxResource};

/// Supported audio formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioFormat {
    /// WAV uncompressed
    Wav,
    /// OGG Vorbis compressed
    Ogg,
    /// MP3 compressed
    Mp3,
    /// FLAC lossless
    Flac,
    /// Unknown format
    Unknown,
}

impl AudioFormat {
    /// Detect audio format from magic bytes
    pub fn detect(bytes: &[u8]) -> Self {
        match bytes {
            [b'R', b'I', b'F', b'F', ..] => Self::Wav,
            [b'O', b'g', b'g', b'S', ..] => Self::Ogg,
            [b'f', b'L', b'a', b'C', ..] => Self::Flac,
            // MP3 can start with an ID3 tag or a frame sync
            [b'I', b'D', b'3', ..] | [0xFF, 0xFB, ..] | [0xFF, 0xFA, ..] | [0xFF, 0xF3, ..] => Self::Mp3,
            _ => Self::Unknown,
        }
    }
}

/// Loads music or sound effects through the audio backend
#[derive(Debug)]
pub struct AudioLoader {
    kind: ResourceKind,
}

impl AudioLoader {
    /// Loader for streamed music
    pub fn music() -> Self {
        Self { kind: ResourceKind::Music }
    }

    /// Loader for buffered sound effects
    pub fn sfx() -> Self {
        Self { kind: ResourceKind::Sfx }
    }
}

impl ResourceLoader for AudioLoader {
    fn kind(&self) -> ResourceKind {
        self.kind
    }

    fn load(&self, request: &LoadRequest<'_>) -> Result<Resource, LoadError> {
        let bytes = read_file(&request.file_path)?;
        let format = AudioFormat::detect(&bytes);
        if format == AudioFormat::Unknown {
            return Err(LoadError::Decode(format!(
                "{} is not a WAV, OGG, MP3 or FLAC stream",
                request.path
            )));
        }

        if self.kind == ResourceKind::Music {
            let handle = request.audio.load_music(&bytes, format)?;
            Ok(MusicResource::new(handle, format, bytes.len()).into())
        } else {
            let handle = request.audio.load_sfx(&bytes, format)?;
            Ok(SfxResource::new(handle, format, bytes.len()).into())
        }
    }
}
