/// MemoryAssetSource - in-memory assets, including the built-in shaders

use rustc_hash::FxHashMap;

use crate::assets::{AssetSource, MeshData};
use crate::error::{Error, Result};

/// Shaders shipped with the crate, by asset name
const BUILTIN_SHADERS: &[(&str, &str)] = &[
    (
        "shaders/background_show_camera.vert",
        include_str!("../../assets/shaders/background_show_camera.vert"),
    ),
    (
        "shaders/background_show_camera.frag",
        include_str!("../../assets/shaders/background_show_camera.frag"),
    ),
    (
        "shaders/background_show_depth_color_visualization.vert",
        include_str!("../../assets/shaders/background_show_depth_color_visualization.vert"),
    ),
    (
        "shaders/background_show_depth_color_visualization.frag",
        include_str!("../../assets/shaders/background_show_depth_color_visualization.frag"),
    ),
    (
        "shaders/occlusion.vert",
        include_str!("../../assets/shaders/occlusion.vert"),
    ),
    (
        "shaders/occlusion.frag",
        include_str!("../../assets/shaders/occlusion.frag"),
    ),
    (
        "shaders/point_cloud.vert",
        include_str!("../../assets/shaders/point_cloud.vert"),
    ),
    (
        "shaders/point_cloud.frag",
        include_str!("../../assets/shaders/point_cloud.frag"),
    ),
    (
        "shaders/label.vert",
        include_str!("../../assets/shaders/label.vert"),
    ),
    (
        "shaders/label.frag",
        include_str!("../../assets/shaders/label.frag"),
    ),
];

#[derive(Default)]
pub struct MemoryAssetSource {
    files: FxHashMap<String, Vec<u8>>,
    meshes: FxHashMap<String, MeshData>,
}

impl MemoryAssetSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Source preloaded with the built-in GLSL ES 3.0 shaders
    pub fn with_builtin_shaders() -> Self {
        let mut source = Self::new();
        for (name, text) in BUILTIN_SHADERS {
            source.insert(*name, text.as_bytes().to_vec());
        }
        source
    }

    pub fn insert(&mut self, name: impl Into<String>, bytes: Vec<u8>) {
        self.files.insert(name.into(), bytes);
    }

    pub fn insert_text(&mut self, name: impl Into<String>, text: &str) {
        self.insert(name, text.as_bytes().to_vec());
    }

    pub fn insert_mesh(&mut self, name: impl Into<String>, mesh: MeshData) {
        self.meshes.insert(name.into(), mesh);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.files.contains_key(name) || self.meshes.contains_key(name)
    }
}

impl AssetSource for MemoryAssetSource {
    fn read_bytes(&self, name: &str) -> Result<Vec<u8>> {
        self.files
            .get(name)
            .cloned()
            .ok_or_else(|| Error::ResourceNotFound(name.to_string()))
    }

    fn mesh_data(&self, name: &str) -> Result<MeshData> {
        self.meshes
            .get(name)
            .cloned()
            .ok_or_else(|| Error::ResourceNotFound(name.to_string()))
    }
}

#[cfg(test)]
#[path = "memory_asset_source_tests.rs"]
mod tests;
