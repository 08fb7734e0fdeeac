//! # Unified Configuration System
//!
//! Configuration for the engine core and the resource loading service.
//!
//! ## Configuration Categories
//!
//! - **Engine Config**: Logging, frame cap, ECS pre-allocation
//! - **Resource Config**: Resource root, per-kind directories and extensions
//! - **Application Config**: Top-level wrapper loaded from TOML or RON

use serde::{Serialize, Deserialize};
use std::path::{Path, PathBuf};

use crate::assets::ResourceKind;

// Re-export from the config module for compatibility
pub use crate::config::{Config, ConfigError};

/// Initial guess for the number of live entities, so storage does not
/// reallocate during level start.
pub const ANTICIPATED_ENTITY_COUNT: usize = 1000;

/// # Resource Configuration
///
/// Where resources live on disk and how a path selects its resource kind.
/// Directory names double as the directory convention used by the kind
/// resolver: any path with a `music/` segment is music, any with `sfx/` is
/// a sound effect, regardless of extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceConfig {
    /// Base directory that relative resource paths are resolved against
    pub root_dir: PathBuf,
    /// Directory for mesh files
    pub models_dir: String,
    /// Directory for texture images
    pub textures_dir: String,
    /// Directory for shader sources
    pub shaders_dir: String,
    /// Directory for music tracks
    pub music_dir: String,
    /// Directory for sound effects
    pub sfx_dir: String,
    /// Directory for plain data files
    pub data_dir: String,
    /// Extensions loaded as meshes
    pub mesh_extensions: Vec<String>,
    /// Extensions loaded as textures
    pub texture_extensions: Vec<String>,
    /// Extensions loaded as shaders
    pub shader_extensions: Vec<String>,
    /// Extensions loaded as music
    pub music_extensions: Vec<String>,
    /// Extensions loaded as sound effects
    pub sfx_extensions: Vec<String>,
    /// Whether batch preloads may run on worker threads
    pub parallel_preload: bool,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

impl ResourceConfig {
    /// Create a new resource configuration rooted at `resources/`
    pub fn new() -> Self {
        Self {
            root_dir: PathBuf::from("resources"),
            models_dir: "models".to_string(),
            textures_dir: "textures".to_string(),
            shaders_dir: "shaders".to_string(),
            music_dir: "music".to_string(),
            sfx_dir: "sfx".to_string(),
            data_dir: "data".to_string(),
            mesh_extensions: strings(&["obj"]),
            texture_extensions: strings(&["png", "jpg", "jpeg", "bmp"]),
            shader_extensions: strings(&["vs", "fs", "glsl"]),
            music_extensions: strings(&["ogg", "mp3", "flac"]),
            sfx_extensions: strings(&["wav"]),
            parallel_preload: false,
        }
    }

    /// Set the resource root directory
    pub fn with_root_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.root_dir = dir.into();
        self
    }

    /// Enable or disable threaded batch preloads
    pub fn with_parallel_preload(mut self, enabled: bool) -> Self {
        self.parallel_preload = enabled;
        self
    }

    /// Directory name used for a resource kind, if the kind has one
    pub fn dir_for(&self, kind: ResourceKind) -> &str {
        match kind {
            ResourceKind::Data => &self.data_dir,
            ResourceKind::Mesh => &self.models_dir,
            ResourceKind::Texture => &self.textures_dir,
            ResourceKind::Shader => &self.shaders_dir,
            ResourceKind::Music => &self.music_dir,
            ResourceKind::Sfx => &self.sfx_dir,
        }
    }

    /// Extensions mapped to a resource kind
    ///
    /// Data has no list; it is the fallback for everything unmatched.
    pub fn extensions_for(&self, kind: ResourceKind) -> &[String] {
        match kind {
            ResourceKind::Data => &[],
            ResourceKind::Mesh => &self.mesh_extensions,
            ResourceKind::Texture => &self.texture_extensions,
            ResourceKind::Shader => &self.shader_extensions,
            ResourceKind::Music => &self.music_extensions,
            ResourceKind::Sfx => &self.sfx_extensions,
        }
    }

    /// Build the conventional resource path for a named asset
    ///
    /// `resource_path(ResourceKind::Mesh, "crate.obj")` yields `models/crate.obj`.
    pub fn resource_path(&self, kind: ResourceKind, file_name: &str) -> String {
        format!("{}/{}", self.dir_for(kind), file_name)
    }

    /// Resolve a resource path to its location on disk
    pub fn file_path(&self, resource_path: &str) -> PathBuf {
        let path = Path::new(resource_path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root_dir.join(path)
        }
    }
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Engine Configuration
///
/// Core engine behavior configuration including logging and the headless
/// frame cap.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Log level for the engine
    pub log_level: String,
    /// Stop the frame loop after this many frames
    pub target_frames: Option<u64>,
    /// Entity count the ECS world pre-allocates for
    pub anticipated_entity_count: usize,
    /// Resource loading configuration
    pub resources: ResourceConfig,
}

impl EngineConfig {
    /// Create a new engine configuration
    pub fn new() -> Self {
        Self {
            log_level: "info".to_string(),
            target_frames: None,
            anticipated_entity_count: ANTICIPATED_ENTITY_COUNT,
            resources: ResourceConfig::default(),
        }
    }

    /// Set log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Cap the number of frames the engine runs
    pub fn with_target_frames(mut self, frames: u64) -> Self {
        self.target_frames = Some(frames);
        self
    }

    /// Replace the resource configuration
    pub fn with_resources(mut self, resources: ResourceConfig) -> Self {
        self.resources = resources;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Complete Application Configuration
///
/// Top-level configuration applications load from disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationConfig {
    /// Application name, used in logs
    pub name: String,
    /// Engine core configuration
    pub engine: EngineConfig,
}

impl ApplicationConfig {
    /// Create a new application configuration with defaults
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            name: app_name.into(),
            engine: EngineConfig::default(),
        }
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() {
            return Err("Application name cannot be empty".to_string());
        }
        if self.engine.target_frames == Some(0) {
            return Err("Target frames must be at least 1 when set".to_string());
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self::new("Engine Application")
    }
}

impl Config for ApplicationConfig {}
