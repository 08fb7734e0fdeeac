//! Resource loading errors

use std::path::{Path, PathBuf};

use super::{ResourceId, ResourceKind};
use crate::backend::BackendError;

/// Why a single load attempt failed
#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    /// The file does not exist
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Reading the file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Bytes could not be decoded (image, text encoding, audio header)
    #[error("decode error: {0}")]
    Decode(String),

    /// Text source is malformed
    #[error("parse error: {0}")]
    Parse(String),

    /// Shader stages failed to compile or link
    #[error("compile error: {0}")]
    Compile(String),

    /// The graphics or audio backend refused the data
    #[error("backend error: {0}")]
    Backend(BackendError),

    /// No loader is registered for the resolved kind
    #[error("no loader registered for {0} resources")]
    UnsupportedKind(ResourceKind),
}

impl LoadError {
    /// Whether the failure was a missing file
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<BackendError> for LoadError {
    fn from(error: BackendError) -> Self {
        match error {
            BackendError::Compile(message) => Self::Compile(message),
            other => Self::Backend(other),
        }
    }
}

/// Read a whole file, reporting a missing file as [`LoadError::NotFound`]
pub(crate) fn read_file(path: &Path) -> Result<Vec<u8>, LoadError> {
    std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => LoadError::NotFound(path.to_path_buf()),
        _ => LoadError::Io(e),
    })
}

/// Read a whole file as UTF-8 text
pub(crate) fn read_text(path: &Path) -> Result<String, LoadError> {
    String::from_utf8(read_file(path)?)
        .map_err(|e| LoadError::Decode(format!("{} is not UTF-8: {}", path.display(), e)))
}

/// Errors returned by the resource cache and loading service
#[derive(thiserror::Error, Debug)]
pub enum ResourceError {
    /// Loading the resource at `path` failed; nothing was cached
    #[error("failed to load resource '{path}': {cause}")]
    LoadFailure {
        /// Normalized resource path
        path: String,
        /// Underlying failure
        #[source]
        cause: LoadError,
    },

    /// The id was never produced by this service
    #[error("unknown resource id {0}")]
    UnknownResourceId(ResourceId),

    /// A second resource was inserted for an already loaded id
    #[error("resource {0} is already loaded")]
    DuplicateInsert(ResourceId),

    /// The resource exists but is a different variant
    #[error("resource {id} is a {found} resource, expected {expected}")]
    WrongKind {
        /// Requested id
        id: ResourceId,
        /// Variant the caller asked for
        expected: ResourceKind,
        /// Variant actually cached
        found: ResourceKind,
    },

    /// Every resource id has been handed out
    #[error("resource id space exhausted")]
    IdSpaceExhausted,

    /// The service was torn down and loads nothing more
    #[error("resource service has been torn down")]
    ShutDown,
}

impl ResourceError {
    /// The load failure cause, if this is a load failure
    pub fn load_cause(&self) -> Option<&LoadError> {
        match self {
            Self::LoadFailure { cause, .. } => Some(cause),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_maps_to_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nothing.txt");
        let err = read_file(&missing).unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("nothing.txt"));
    }

    #[test]
    fn compile_backend_errors_become_compile_failures() {
        let err = LoadError::from(BackendError::Compile("syntax".to_string()));
        assert!(matches!(err, LoadError::Compile(message) if message == "syntax"));

        let err = LoadError::from(BackendError::InvalidHandle(3));
        assert!(matches!(err, LoadError::Backend(BackendError::InvalidHandle(3))));
    }

    #[test]
    fn load_failure_keeps_cause_as_source() {
        use std::error::Error;

        let err = ResourceError::LoadFailure {
            path: "shaders/missing.glsl".to_string(),
            cause: LoadError::NotFound(PathBuf::from("resources/shaders/missing.glsl")),
        };
        assert!(err.source().is_some());
        assert!(err.load_cause().is_some_and(LoadError::is_not_found));
        assert!(err.to_string().starts_with("failed to load resource 'shaders/missing.glsl'"));
    }
}
