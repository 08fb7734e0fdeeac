//! Plain data files

use super::{LoadRequest, ResourceLoader};
use crate::assets::error::read_file;
use crate::assets::{DataFileResource, LoadError, Resource, ResourceKind};

/// Reads the file into memory unchanged
#[derive(Debug, Default)]
pub struct DataFileLoader;

impl ResourceLoader for DataFileLoader {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Data
    }

    fn load(&self, request: &LoadRequest<'_>) -> Result<Resource, LoadError> {
        let contents = read_file(&request.file_path)?;
        Ok(DataFileResource::new(contents).into())
    }
}
