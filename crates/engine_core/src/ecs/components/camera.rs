//! Camera singleton
//!
//! Scene-wide camera state. It has a sensible default, so the world creates
//! it on first access.

use serde::{Serialize, Deserialize};

use crate::ecs::{Component, SingletonComponent};
use crate::foundation::math::{constants::HALF_PI, Mat4, Point3, Vec3};

/// The scene camera
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraSingleton {
    /// Eye position
    pub position: Point3,
    /// Point the camera looks at
    pub target: Point3,
    /// Up direction used to orient the view
    pub up: Vec3,
    /// Vertical field of view in radians
    pub fov: f32,
    /// Near clip plane distance
    pub znear: f32,
    /// Far clip plane distance
    pub zfar: f32,
}

impl Default for CameraSingleton {
    /// Top-down camera above the origin
    fn default() -> Self {
        Self {
            position: Point3::new(0.0, 18.04, 0.0),
            target: Point3::origin(),
            up: Vec3::new(0.0, 0.0, -1.0),
            fov: HALF_PI,
            znear: 0.1,
            zfar: 100.0,
        }
    }
}

impl CameraSingleton {
    /// World to view transform
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(&self.position, &self.target, &self.up)
    }

    /// Perspective projection for the given aspect ratio
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::new_perspective(aspect, self.fov, self.znear, self.zfar)
    }

    /// Normalized viewing direction
    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize()
    }
}

impl Component for CameraSingleton {}

impl SingletonComponent for CameraSingleton {
    fn lazy_init() -> Option<Self> {
        Some(Self::default())
    }
}
