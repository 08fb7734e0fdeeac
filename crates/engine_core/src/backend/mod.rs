//! Graphics and audio collaborators
//!
//! The resource loaders hand decoded data to these traits and get opaque
//! native handles back. Real bindings live outside the core; the headless
//! implementations allocate deterministic handles and validate input, which
//! is all the cache needs to enforce its invariants.

pub mod headless;
#[cfg(feature = "audio")]
pub mod rodio_backend;

pub use headless::{HeadlessAudio, HeadlessGraphics};
#[cfg(feature = "audio")]
pub use rodio_backend::RodioAudio;

use crate::assets::{AudioFormat, ImageData, MeshData};

/// Backend errors
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// Shader compile or link failure
    #[error("shader compilation failed: {0}")]
    Compile(String),

    /// The backend refused the data it was given
    #[error("rejected by backend: {0}")]
    Rejected(String),

    /// Audio stream could not be decoded
    #[error("audio decode failed: {0}")]
    AudioDecode(String),

    /// Handle was never issued or was already released
    #[error("invalid handle {0}")]
    InvalidHandle(u32),
}

/// GPU texture object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

/// Linked GPU program object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramHandle(pub u32);

/// Native sound engine object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AudioHandle(pub u32);

/// GPU objects backing one mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshBuffers {
    /// Vertex array object
    pub vertex_array: u32,
    /// Vertex buffer object
    pub vertex_buffer: u32,
    /// Element (index) buffer object
    pub element_buffer: u32,
}

/// Vertex and fragment stage sources for one program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSource {
    /// Vertex stage
    pub vertex: String,
    /// Fragment stage
    pub fragment: String,
}

/// Graphics API binding used by mesh, texture and shader loaders
pub trait GraphicsBackend: Send + Sync {
    /// Upload vertex and index data
    fn upload_mesh(&self, mesh: &MeshData) -> Result<MeshBuffers, BackendError>;

    /// Upload RGBA pixels
    fn upload_texture(&self, image: &ImageData) -> Result<TextureHandle, BackendError>;

    /// Compile and link a program
    fn compile_program(&self, source: &ShaderSource) -> Result<ProgramHandle, BackendError>;

    /// Location of a uniform, or -1 when the program does not use it
    fn uniform_location(&self, program: ProgramHandle, name: &str) -> i32;

    /// Free mesh buffers
    fn release_mesh(&self, buffers: MeshBuffers) -> Result<(), BackendError>;

    /// Free a texture
    fn release_texture(&self, texture: TextureHandle) -> Result<(), BackendError>;

    /// Free a program
    fn release_program(&self, program: ProgramHandle) -> Result<(), BackendError>;
}

/// Audio API binding used by the music and sound effect loaders
pub trait AudioBackend: Send + Sync {
    /// Prepare a streamed music track
    fn load_music(&self, bytes: &[u8], format: AudioFormat) -> Result<AudioHandle, BackendError>;

    /// Prepare a fully buffered sound effect
    fn load_sfx(&self, bytes: &[u8], format: AudioFormat) -> Result<AudioHandle, BackendError>;

    /// Free a music or sound effect handle
    fn release(&self, handle: AudioHandle) -> Result<(), BackendError>;
}
