//! Renderable component for entities that can be rendered
//!
//! Holds resource ids, not resources. Handles are fetched from the resource
//! loading service when a frame is drawn.

use serde::{Serialize, Deserialize};

use crate::assets::ResourceId;
use crate::ecs::Component;

/// Component for entities that can be rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderableComponent {
    /// Mesh resource to draw
    pub mesh: ResourceId,

    /// Texture bound while drawing, or `ResourceId::NONE`
    pub texture: ResourceId,

    /// Shader program used to draw
    pub shader: ResourceId,

    /// Whether this object is visible
    pub visible: bool,

    /// Drawn in screen space after the world pass
    pub is_gui: bool,
}

impl RenderableComponent {
    /// Create a new renderable component
    pub fn new(mesh: ResourceId, texture: ResourceId, shader: ResourceId) -> Self {
        Self {
            mesh,
            texture,
            shader,
            visible: true,
            is_gui: false,
        }
    }

    /// Set visibility
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Check if this component should be rendered
    pub fn should_render(&self) -> bool {
        self.visible && !self.mesh.is_none()
    }

    /// Whether a texture is bound
    pub fn is_textured(&self) -> bool {
        !self.texture.is_none()
    }
}

impl Component for RenderableComponent {}

/// Factory for creating renderable components
pub struct RenderableFactory;

impl RenderableFactory {
    /// Untextured world-space renderable
    pub fn create_untextured(mesh: ResourceId, shader: ResourceId) -> RenderableComponent {
        RenderableComponent::new(mesh, ResourceId::NONE, shader)
    }

    /// Screen-space renderable
    pub fn create_gui(mesh: ResourceId, texture: ResourceId, shader: ResourceId) -> RenderableComponent {
        RenderableComponent {
            is_gui: true,
            ..RenderableComponent::new(mesh, texture, shader)
        }
    }

    /// Create a hidden renderable (useful for pre-loading)
    pub fn create_hidden(mesh: ResourceId, texture: ResourceId, shader: ResourceId) -> RenderableComponent {
        let mut renderable = RenderableComponent::new(mesh, texture, shader);
        renderable.set_visible(false);
        renderable
    }
}
