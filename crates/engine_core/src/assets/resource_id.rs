//! Resource identity: numeric ids and normalized paths

use serde::{Serialize, Deserialize};
use std::fmt;

/// Stable numeric identity of a resource path
///
/// Assigned the first time a path is resolved and never reused for another
/// path during the cache's lifetime. Zero is reserved for "no resource".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(u32);

impl ResourceId {
    /// Placeholder stored in components that reference nothing
    pub const NONE: Self = Self(0);

    /// Wrap a raw id
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw numeric value
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Whether this is [`ResourceId::NONE`]
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Normalized resource location
///
/// Backslashes become `/`, empty and `.` segments are dropped and `..`
/// removes the previous segment, so `textures\\.\\brick.png` and
/// `textures/brick.png` name the same resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourcePath(String);

impl ResourcePath {
    /// Normalize `raw` into a resource path
    pub fn new(raw: &str) -> Self {
        let raw = raw.replace('\\', "/");
        let absolute = raw.starts_with('/');

        let mut segments: Vec<&str> = Vec::new();
        for segment in raw.split('/') {
            match segment {
                "" | "." => {}
                ".." => match segments.last() {
                    Some(&last) if last != ".." => {
                        segments.pop();
                    }
                    // Nothing above the root
                    _ if absolute => {}
                    _ => segments.push(".."),
                },
                _ => segments.push(segment),
            }
        }

        let joined = segments.join("/");
        if absolute {
            Self(format!("/{}", joined))
        } else {
            Self(joined)
        }
    }

    /// Normalized path text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Final path segment
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Extension of the final segment, without the dot
    pub fn extension(&self) -> Option<&str> {
        let name = self.file_name();
        match name.rfind('.') {
            Some(dot) if dot > 0 => Some(&name[dot + 1..]),
            _ => None,
        }
    }

    /// Directory segments preceding the file name
    pub fn directories(&self) -> impl Iterator<Item = &str> + '_ {
        let mut segments: Vec<&str> = self.0.split('/').filter(|s| !s.is_empty()).collect();
        segments.pop();
        segments.into_iter()
    }
}

impl From<&str> for ResourcePath {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl AsRef<str> for ResourcePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
