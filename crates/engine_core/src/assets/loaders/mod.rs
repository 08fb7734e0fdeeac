//! Per-kind resource loaders
//!
//! The loading service owns one loader per [`ResourceKind`] and dispatches on
//! the kind resolved from the path. Loaders do the blocking work: file I/O,
//! decoding and backend uploads.

pub mod data_file;
pub mod mesh;
pub mod texture;
pub mod shader;
pub mod audio;

pub use data_file::DataFileLoader;
pub use mesh::MeshLoader;
pub use texture::TextureLoader;
pub use shader::ShaderLoader;
pub use audio::{AudioFormat, AudioLoader};

use std::path::PathBuf;

use super::{LoadError, Resource, ResourceId, ResourceKind, ResourcePath};
use crate::backend::{AudioBackend, GraphicsBackend};
use crate::core::config::ResourceConfig;

/// Everything a loader needs for one load
pub struct LoadRequest<'a> {
    /// Id the result will be cached under
    pub id: ResourceId,
    /// Normalized resource path
    pub path: &'a ResourcePath,
    /// Location on disk
    pub file_path: PathBuf,
    /// Graphics binding for uploads
    pub graphics: &'a dyn GraphicsBackend,
    /// Audio binding for sound handles
    pub audio: &'a dyn AudioBackend,
}

/// Loader for one resource kind
pub trait ResourceLoader: Send + Sync {
    /// Kind this loader produces
    fn kind(&self) -> ResourceKind;

    /// One-time setup when the service is built
    fn initialize(&mut self, _config: &ResourceConfig) {}

    /// Load and upload the resource described by `request`
    fn load(&self, request: &LoadRequest<'_>) -> Result<Resource, LoadError>;
}

/// One loader for every kind
pub fn default_loaders() -> Vec<Box<dyn ResourceLoader>> {
    vec![
        Box::new(DataFileLoader),
        Box::new(MeshLoader),
        Box::new(TextureLoader),
        Box::new(ShaderLoader),
        Box::new(AudioLoader::music()),
        Box::new(AudioLoader::sfx()),
    ]
}
