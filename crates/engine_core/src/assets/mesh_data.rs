//! CPU-side mesh data handed to the graphics backend

use bytemuck::{Pod, Zeroable};

use crate::foundation::math::{self, Vec3};

/// Interleaved vertex layout uploaded to the vertex buffer
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// Object space position
    pub position: [f32; 3],
    /// Surface normal
    pub normal: [f32; 3],
    /// Texture coordinate
    pub tex_coord: [f32; 2],
}

/// Triangle list ready for upload
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    /// Vertex data
    pub vertices: Vec<Vertex>,
    /// Three indices per triangle
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Vertex data as raw bytes
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Index data as raw bytes
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Size of the axis-aligned bounding box, zero for an empty mesh
    pub fn dimensions(&self) -> Vec3 {
        math::bounds(self.vertices.iter().map(|v| Vec3::from(v.position)))
            .map_or_else(Vec3::zeros, |(min, max)| max - min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_layout_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<Vertex>(), 32);

        let mesh = MeshData {
            vertices: vec![Vertex::zeroed(); 2],
            indices: vec![0, 1, 0],
        };
        assert_eq!(mesh.vertex_bytes().len(), 64);
        assert_eq!(mesh.index_bytes().len(), 12);
    }

    #[test]
    fn dimensions_span_all_vertices() {
        let at = |p: [f32; 3]| Vertex { position: p, ..Vertex::zeroed() };
        let mesh = MeshData {
            vertices: vec![at([-1.0, 0.0, 2.0]), at([1.0, 3.0, -2.0])],
            indices: vec![],
        };
        assert_eq!(mesh.dimensions(), Vec3::new(2.0, 3.0, 4.0));
        assert_eq!(MeshData::default().dimensions(), Vec3::zeros());
    }
}
