/// FileAssetSource - assets read from a directory on disk

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::assets::{AssetSource, MeshData, MeshLoader};
use crate::error::{Error, Result};

const SOURCE: &str = "ar::FileAssetSource";

/// Assets resolved relative to a root directory
///
/// Mesh parsing is delegated to an injected `MeshLoader`.
pub struct FileAssetSource {
    root: PathBuf,
    mesh_loader: Option<Box<dyn MeshLoader>>,
}

impl FileAssetSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            mesh_loader: None,
        }
    }

    pub fn with_mesh_loader(mut self, loader: impl MeshLoader + 'static) -> Self {
        self.mesh_loader = Some(Box::new(loader));
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetSource for FileAssetSource {
    fn read_bytes(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.root.join(name);
        std::fs::read(&path).map_err(|error| {
            crate::ar_debug!(SOURCE, "Failed to read '{}': {}", path.display(), error);
            match error.kind() {
                ErrorKind::NotFound => Error::ResourceNotFound(name.to_string()),
                _ => Error::AssetReadError {
                    name: name.to_string(),
                    message: error.to_string(),
                },
            }
        })
    }

    fn mesh_data(&self, name: &str) -> Result<MeshData> {
        let loader = self.mesh_loader.as_ref().ok_or_else(|| {
            Error::InvalidArgument(format!("No mesh loader configured to load '{}'", name))
        })?;
        let bytes = self.read_bytes(name)?;
        loader.load(name, &bytes)
    }
}

#[cfg(test)]
#[path = "file_asset_source_tests.rs"]
mod tests;
