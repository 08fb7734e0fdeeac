//! Transform component for the ECS system
//!
//! Pure data: position, rotation and scale in Y-up right-handed world space.

use serde::{Serialize, Deserialize};

use crate::ecs::Component;
use crate::foundation::math::{Mat4, Quat, Vec3};

/// Placement of an entity in the world
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformComponent {
    /// World space position
    pub position: Vec3,

    /// Orientation
    pub rotation: Quat,

    /// Per-axis scale factors
    pub scale: Vec3,
}

impl Component for TransformComponent {}

impl Default for TransformComponent {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl TransformComponent {
    /// No translation, rotation or scaling
    pub fn identity() -> Self {
        Self::default()
    }

    /// Unrotated, unscaled transform at `position`
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Model matrix (translation * rotation * scale)
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * self.rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(&self.scale)
    }

    /// Move by `offset` in world space
    pub fn translate(&mut self, offset: Vec3) {
        self.position += offset;
    }

    /// Rotation of `angle` radians about `axis`
    pub fn with_rotation_axis_angle(mut self, axis: Vec3, angle: f32) -> Self {
        self.rotation = Quat::from_axis_angle(&nalgebra::Unit::new_normalize(axis), angle);
        self
    }

    /// Same scale on every axis
    pub fn with_uniform_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::new(scale, scale, scale);
        self
    }

    /// Per-axis scale
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }
}

/// Transform factory for common placements
pub struct TransformFactory;

impl TransformFactory {
    /// Transform sized to fit a mesh's bounding dimensions inside `extent`
    ///
    /// Degenerate axes keep a scale of 1.
    pub fn fitted(position: Vec3, dimensions: Vec3, extent: f32) -> TransformComponent {
        let largest = dimensions.max();
        let scale = if largest > f32::EPSILON { extent / largest } else { 1.0 };
        TransformComponent::from_position(position).with_uniform_scale(scale)
    }

    /// Unit XZ-plane quad stretched to `size` on both horizontal axes
    pub fn ground_tile(position: Vec3, size: f32) -> TransformComponent {
        TransformComponent::from_position(position).with_scale(Vec3::new(size, 1.0, size))
    }

    /// Quad mesh authored in XZ turned to face the camera along -Z
    pub fn billboard(position: Vec3, size: f32) -> TransformComponent {
        TransformComponent::from_position(position)
            .with_rotation_axis_angle(Vec3::x_axis().into_inner(), std::f32::consts::FRAC_PI_2)
            .with_uniform_scale(size)
    }
}
