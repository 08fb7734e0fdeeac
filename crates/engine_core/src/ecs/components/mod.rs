//! ECS Components module
//!
//! Engine-provided components. Per-entity data stores resource ids rather
//! than resource references, so components stay serializable and never
//! dangle.

pub mod name;
pub mod transform;
pub mod renderable;
pub mod camera;
pub mod shader_store;

pub use name::Name;
pub use transform::{TransformComponent, TransformFactory};
pub use renderable::{RenderableComponent, RenderableFactory};
pub use camera::CameraSingleton;
pub use shader_store::ShaderStoreSingleton;
