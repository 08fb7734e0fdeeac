//! Resource management
//!
//! Paths resolve to stable [`ResourceId`]s in the [`ResourceCache`]; the
//! [`ResourceLoadingService`] loads each id at most once through the loader
//! registered for its [`ResourceKind`] and hands out shared references.

pub mod resource_id;
pub mod kind;
pub mod resource;
pub(crate) mod error;
pub mod cache;
pub mod service;
pub mod mesh_data;
pub mod obj_loader;
pub mod image_loader;
pub mod loaders;

#[cfg(test)]
mod tests;

pub use resource_id::{ResourceId, ResourcePath};
pub use kind::{config_resolver, KindResolver, ResourceKind};
pub use resource::{
    DataFileResource, MeshResource, MusicResource, Resource, ResourceRef, ResourceVariant,
    SfxResource, ShaderResource, TextureResource,
};
pub use error::{LoadError, ResourceError};
pub use cache::{ResourceCache, ResourceState};
pub use service::{ResourceLoadingService, ResourceServiceBuilder};
pub use mesh_data::{MeshData, Vertex};
pub use obj_loader::{ObjError, ObjLoader};
pub use image_loader::ImageData;
pub use loaders::{AudioFormat, LoadRequest, ResourceLoader};
