/// AssetSource trait and the mesh data it yields

use crate::error::{Error, Result};

/// Vertex and index arrays of one mesh asset
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    /// 3 floats per vertex
    pub positions: Vec<f32>,
    /// 2 floats per vertex
    pub tex_coords: Vec<f32>,
    /// 3 floats per vertex
    pub normals: Vec<f32>,
    /// Triangle list indices
    pub indices: Vec<u32>,
}

/// Named asset lookup
///
/// Missing assets fail with `ResourceNotFound`.
pub trait AssetSource {
    /// Raw bytes of the named asset
    fn read_bytes(&self, name: &str) -> Result<Vec<u8>>;

    /// Vertex and index arrays of the named mesh asset
    fn mesh_data(&self, name: &str) -> Result<MeshData>;

    /// UTF-8 shader source text
    fn shader_source(&self, name: &str) -> Result<String> {
        let bytes = self.read_bytes(name)?;
        String::from_utf8(bytes).map_err(|error| {
            Error::InvalidArgument(format!("Shader source '{}' is not UTF-8: {}", name, error))
        })
    }

    /// Encoded image bytes (PNG, JPEG, ...)
    fn image_bytes(&self, name: &str) -> Result<Vec<u8>> {
        self.read_bytes(name)
    }
}

/// Boundary function turning a model file into mesh arrays
pub trait MeshLoader: Send + Sync {
    fn load(&self, name: &str, bytes: &[u8]) -> Result<MeshData>;
}

impl<F> MeshLoader for F
where
    F: Fn(&str, &[u8]) -> Result<MeshData> + Send + Sync,
{
    fn load(&self, name: &str, bytes: &[u8]) -> Result<MeshData> {
        self(name, bytes)
    }
}
