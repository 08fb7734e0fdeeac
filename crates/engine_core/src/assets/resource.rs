//! Loaded resource variants
//!
//! A [`Resource`] is a closed union over the six kinds. Each variant owns its
//! backing data or native handles; the cache owns every `Resource` and hands
//! out shared references to it.

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::ops::Deref;
use std::sync::Arc;

use super::{AudioFormat, ResourceKind};
use crate::backend::{
    AudioBackend, AudioHandle, BackendError, GraphicsBackend, MeshBuffers, ProgramHandle,
    TextureHandle,
};
use crate::foundation::math::Vec3;

/// Raw bytes of a data file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataFileResource {
    contents: Vec<u8>,
}

impl DataFileResource {
    /// Wrap file contents
    pub fn new(contents: Vec<u8>) -> Self {
        Self { contents }
    }

    /// Raw contents
    pub fn contents(&self) -> &[u8] {
        &self.contents
    }

    /// Contents as text, if they are valid UTF-8
    pub fn contents_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.contents).ok()
    }

    /// Size in bytes
    pub fn len(&self) -> usize {
        self.contents.len()
    }

    /// Whether the file was empty
    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }
}

/// Uploaded mesh
#[derive(Debug, Clone, PartialEq)]
pub struct MeshResource {
    buffers: MeshBuffers,
    element_count: u32,
    vertex_count: u32,
    dimensions: Vec3,
}

impl MeshResource {
    /// Describe an uploaded mesh
    pub fn new(buffers: MeshBuffers, element_count: u32, vertex_count: u32, dimensions: Vec3) -> Self {
        Self {
            buffers,
            element_count,
            vertex_count,
            dimensions,
        }
    }

    /// All GPU objects of the mesh
    pub fn buffers(&self) -> MeshBuffers {
        self.buffers
    }

    /// Vertex array object
    pub fn vertex_array(&self) -> u32 {
        self.buffers.vertex_array
    }

    /// Vertex buffer object
    pub fn vertex_buffer(&self) -> u32 {
        self.buffers.vertex_buffer
    }

    /// Element buffer object
    pub fn element_buffer(&self) -> u32 {
        self.buffers.element_buffer
    }

    /// Number of indices to draw
    pub fn element_count(&self) -> u32 {
        self.element_count
    }

    /// Number of uploaded vertices
    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    /// Extent of the bounding box along each axis
    pub fn dimensions(&self) -> Vec3 {
        self.dimensions
    }
}

/// Uploaded texture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureResource {
    texture: TextureHandle,
    width: u32,
    height: u32,
}

impl TextureResource {
    /// Describe an uploaded texture
    pub fn new(texture: TextureHandle, width: u32, height: u32) -> Self {
        Self { texture, width, height }
    }

    /// GPU texture object
    pub fn texture(&self) -> TextureHandle {
        self.texture
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }
}

/// Linked shader program and its uniform locations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderResource {
    program: ProgramHandle,
    uniforms: HashMap<String, i32>,
}

impl ShaderResource {
    /// Describe a linked program
    pub fn new(program: ProgramHandle, uniforms: HashMap<String, i32>) -> Self {
        Self { program, uniforms }
    }

    /// GPU program object
    pub fn program(&self) -> ProgramHandle {
        self.program
    }

    /// Location of `name`, or -1 if the program has no such active uniform
    pub fn uniform_location(&self, name: &str) -> i32 {
        self.uniforms.get(name).copied().unwrap_or(-1)
    }

    /// Whether the program declares `name`
    pub fn has_uniform(&self, name: &str) -> bool {
        self.uniforms.contains_key(name)
    }

    /// Every declared uniform with its location
    pub fn uniforms(&self) -> &HashMap<String, i32> {
        &self.uniforms
    }
}

/// Music track prepared by the audio backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MusicResource {
    handle: AudioHandle,
    format: AudioFormat,
    byte_len: usize,
}

impl MusicResource {
    /// Describe a prepared track
    pub fn new(handle: AudioHandle, format: AudioFormat, byte_len: usize) -> Self {
        Self { handle, format, byte_len }
    }

    /// Native sound engine handle
    pub fn handle(&self) -> AudioHandle {
        self.handle
    }

    /// Container format of the source file
    pub fn format(&self) -> AudioFormat {
        self.format
    }

    /// Size of the source file
    pub fn byte_len(&self) -> usize {
        self.byte_len
    }
}

/// Sound effect prepared by the audio backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SfxResource {
    handle: AudioHandle,
    format: AudioFormat,
    byte_len: usize,
}

impl SfxResource {
    /// Describe a prepared effect
    pub fn new(handle: AudioHandle, format: AudioFormat, byte_len: usize) -> Self {
        Self { handle, format, byte_len }
    }

    /// Native sound engine handle
    pub fn handle(&self) -> AudioHandle {
        self.handle
    }

    /// Container format of the source file
    pub fn format(&self) -> AudioFormat {
        self.format
    }

    /// Size of the source file
    pub fn byte_len(&self) -> usize {
        self.byte_len
    }
}

/// A loaded resource of any kind
#[derive(Debug, Clone, PartialEq)]
pub enum Resource {
    /// Data file
    Data(DataFileResource),
    /// Mesh
    Mesh(MeshResource),
    /// Texture
    Texture(TextureResource),
    /// Shader program
    Shader(ShaderResource),
    /// Music track
    Music(MusicResource),
    /// Sound effect
    Sfx(SfxResource),
}

impl Resource {
    /// Which variant this is
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Data(_) => ResourceKind::Data,
            Self::Mesh(_) => ResourceKind::Mesh,
            Self::Texture(_) => ResourceKind::Texture,
            Self::Shader(_) => ResourceKind::Shader,
            Self::Music(_) => ResourceKind::Music,
            Self::Sfx(_) => ResourceKind::Sfx,
        }
    }

    /// Typed view of the payload
    pub fn as_variant<T: ResourceVariant>(&self) -> Option<&T> {
        T::from_resource(self)
    }

    /// Return native handles to their backends
    ///
    /// Data files own only memory, which is freed when the last reference
    /// drops.
    pub(crate) fn release(
        &self,
        graphics: &dyn GraphicsBackend,
        audio: &dyn AudioBackend,
    ) -> Result<(), BackendError> {
        match self {
            Self::Data(_) => Ok(()),
            Self::Mesh(mesh) => graphics.release_mesh(mesh.buffers),
            Self::Texture(texture) => graphics.release_texture(texture.texture),
            Self::Shader(shader) => graphics.release_program(shader.program),
            Self::Music(music) => audio.release(music.handle),
            Self::Sfx(sfx) => audio.release(sfx.handle),
        }
    }
}

/// Implemented by each resource payload type
pub trait ResourceVariant: fmt::Debug + Send + Sync + 'static {
    /// Kind this payload belongs to
    const KIND: ResourceKind;

    /// Borrow the payload if `resource` is this variant
    fn from_resource(resource: &Resource) -> Option<&Self>;
}

macro_rules! resource_variant {
    ($ty:ty, $variant:ident) => {
        impl ResourceVariant for $ty {
            const KIND: ResourceKind = ResourceKind::$variant;

            fn from_resource(resource: &Resource) -> Option<&Self> {
                match resource {
                    Resource::$variant(inner) => Some(inner),
                    _ => None,
                }
            }
        }

        impl From<$ty> for Resource {
            fn from(inner: $ty) -> Self {
                Resource::$variant(inner)
            }
        }
    };
}

resource_variant!(DataFileResource, Data);
resource_variant!(MeshResource, Mesh);
resource_variant!(TextureResource, Texture);
resource_variant!(ShaderResource, Shader);
resource_variant!(MusicResource, Music);
resource_variant!(SfxResource, Sfx);

/// Shared, typed reference to a cached resource
///
/// Keeps the cached [`Resource`] alive and dereferences to its payload.
pub struct ResourceRef<T: ResourceVariant> {
    resource: Arc<Resource>,
    _variant: PhantomData<fn() -> T>,
}

impl<T: ResourceVariant> ResourceRef<T> {
    /// Wrap `resource` if it holds a `T`
    pub fn new(resource: Arc<Resource>) -> Result<Self, Arc<Resource>> {
        if T::from_resource(&resource).is_some() {
            Ok(Self {
                resource,
                _variant: PhantomData,
            })
        } else {
            Err(resource)
        }
    }

    /// The untyped shared resource
    pub fn resource(&self) -> &Arc<Resource> {
        &self.resource
    }

    /// Whether both references point at the same cached resource
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.resource, &b.resource)
    }
}

impl<T: ResourceVariant> Deref for ResourceRef<T> {
    type Target = T;

    fn deref(&self) -> &T {
        match T::from_resource(&self.resource) {
            Some(inner) => inner,
            // `new` only wraps matching variants and resources are immutable
            None => unreachable!("resource reference changed variant"),
        }
    }
}

impl<T: ResourceVariant> Clone for ResourceRef<T> {
    fn clone(&self) -> Self {
        Self {
            resource: Arc::clone(&self.resource),
            _variant: PhantomData,
        }
    }
}

impl<T: ResourceVariant> fmt::Debug for ResourceRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}
