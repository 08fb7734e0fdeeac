//! Texture loader: image decode and texture upload

use super::{LoadRequest, ResourceLoader};
use crate::assets::error::read_file;
use crate::assets::{ImageData, LoadError, Resource, ResourceKind, TextureResource};

/// Decodes images to RGBA8 and uploads them
#[derive(Debug, Default)]
pub struct TextureLoader;

impl ResourceLoader for TextureLoader {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Texture
    }

    fn load(&self, request: &LoadRequest<'_>) -> Result<Resource, LoadError> {
        let bytes = read_file(&request.file_path)?;
        let image = ImageData::from_bytes(&bytes)?;
        let texture = request.graphics.upload_texture(&image)?;
        Ok(TextureResource::new(texture, image.width, image.height).into())
    }
}
