//! Mesh loader: OBJ parse and buffer upload

use super::{LoadRequest, ResourceLoader};
use crate::assets::error::read_text;
use crate::assets::{LoadError, MeshResource, ObjLoader, Resource, ResourceKind};

/// Parses Wavefront OBJ and uploads vertex and element buffers
#[derive(Debug, Default)]
pub struct MeshLoader;

impl ResourceLoader for MeshLoader {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Mesh
    }

    fn load(&self, request: &LoadRequest<'_>) -> Result<Resource, LoadError> {
        let source = read_text(&request.file_path)?;
        let mesh = ObjLoader::parse(&source).map_err(|e| LoadError::Parse(e.to_string()))?;
        let buffers = request.graphics.upload_mesh(&mesh)?;

        Ok(MeshResource::new(
            buffers,
            mesh.indices.len() as u32,
            mesh.vertices.len() as u32,
            mesh.dimensions(),
        )
        .into())
    }
}
