//! Resource kinds and path-to-kind resolution

use serde::{Serialize, Deserialize};
use std::fmt;
use std::sync::Arc;

use super::ResourcePath;
use crate::core::config::ResourceConfig;

/// The closed set of resource variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceKind {
    /// Raw file contents
    Data,
    /// Vertex and element buffers
    Mesh,
    /// GPU texture
    Texture,
    /// Linked shader program
    Shader,
    /// Streamed music track
    Music,
    /// Buffered sound effect
    Sfx,
}

impl ResourceKind {
    /// Every kind, in declaration order
    pub const ALL: [Self; 6] = [
        Self::Data,
        Self::Mesh,
        Self::Texture,
        Self::Shader,
        Self::Music,
        Self::Sfx,
    ];

    /// Lowercase name used in logs
    pub const fn name(self) -> &'static str {
        match self {
            Self::Data => "data",
            Self::Mesh => "mesh",
            Self::Texture => "texture",
            Self::Shader => "shader",
            Self::Music => "music",
            Self::Sfx => "sfx",
        }
    }

    /// Kind of `path` under the default configuration
    pub fn from_path(path: &ResourcePath) -> Self {
        Self::from_path_with(&ResourceConfig::default(), path)
    }

    /// Kind of `path` under `config`
    ///
    /// Audio directories win over extensions, so `sfx/click.ogg` is a sound
    /// effect while `music/theme.ogg` is music. Anything unrecognized is
    /// plain data.
    pub fn from_path_with(config: &ResourceConfig, path: &ResourcePath) -> Self {
        for directory in path.directories() {
            if directory == config.music_dir {
                return Self::Music;
            }
            if directory == config.sfx_dir {
                return Self::Sfx;
            }
        }

        let Some(extension) = path.extension() else {
            return Self::Data;
        };
        Self::ALL
            .into_iter()
            .find(|kind| {
                config
                    .extensions_for(*kind)
                    .iter()
                    .any(|candidate| candidate.eq_ignore_ascii_case(extension))
            })
            .unwrap_or(Self::Data)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Injectable mapping from path to resource kind
pub type KindResolver = Arc<dyn Fn(&ResourcePath) -> ResourceKind + Send + Sync>;

/// Resolver following the directory and extension rules of `config`
pub fn config_resolver(config: &ResourceConfig) -> KindResolver {
    let config = config.clone();
    Arc::new(move |path: &ResourcePath| ResourceKind::from_path_with(&config, path))
}
