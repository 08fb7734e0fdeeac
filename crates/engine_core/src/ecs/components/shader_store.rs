//! Named shader registry singleton

use std::collections::HashMap;

use crate::assets::ResourceId;
use crate::ecs::{Component, SingletonComponent};

/// Maps shader names to shader resource ids
///
/// Requires explicit initialization: install it with
/// `World::set_singleton_component` once the shaders have been resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShaderStoreSingleton {
    shaders: HashMap<String, ResourceId>,
}

impl ShaderStoreSingleton {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a shader under `name`, returning the id it replaced
    pub fn register(&mut self, name: impl Into<String>, id: ResourceId) -> Option<ResourceId> {
        self.shaders.insert(name.into(), id)
    }

    /// Shader id registered under `name`
    pub fn get(&self, name: &str) -> Option<ResourceId> {
        self.shaders.get(name).copied()
    }

    /// Number of registered shaders
    pub fn len(&self) -> usize {
        self.shaders.len()
    }

    /// Whether no shaders are registered
    pub fn is_empty(&self) -> bool {
        self.shaders.is_empty()
    }

    /// Registered `(name, id)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, ResourceId)> + '_ {
        self.shaders.iter().map(|(name, id)| (name.as_str(), *id))
    }
}

impl Component for ShaderStoreSingleton {}

impl SingletonComponent for ShaderStoreSingleton {}
