//! Math utilities and types
//!
//! Thin aliases over nalgebra used by components and mesh resources.

pub use nalgebra::{Matrix4, Quaternion, Unit, Vector2, Vector3};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Axis-aligned extent of a point cloud
///
/// Returns `(min, max)`, or `None` for an empty input.
pub fn bounds<I>(points: I) -> Option<(Vec3, Vec3)>
where
    I: IntoIterator<Item = Vec3>,
{
    let mut points = points.into_iter();
    let first = points.next()?;
    Some(points.fold((first, first), |(min, max), p| {
        (min.inf(&p), max.sup(&p))
    }))
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Pi / 2
    pub const HALF_PI: f32 = PI * 0.5;
}
