/// Configuration values for the render context and the compositor

use winit::dpi::PhysicalSize;

/// Size of a render surface in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width / height ratio (0.0 for a zero-height surface)
    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 {
            0.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

impl From<PhysicalSize<u32>> for SurfaceSize {
    fn from(size: PhysicalSize<u32>) -> Self {
        Self::new(size.width, size.height)
    }
}

/// RenderContext configuration
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Color the default framebuffer is cleared to at the start of each frame
    pub clear_color: [f32; 4],
    /// Enable blending when the surface is created
    pub enable_blending: bool,
    /// Window size used until the first surface-changed notification
    pub initial_size: SurfaceSize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            clear_color: [0.0, 0.0, 0.0, 1.0],
            enable_blending: true,
            initial_size: SurfaceSize::new(1, 1),
        }
    }
}

/// Shader asset names used by one compositing pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderAssetNames {
    pub vertex: String,
    pub fragment: String,
}

impl ShaderAssetNames {
    pub fn new(vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self {
            vertex: vertex.into(),
            fragment: fragment.into(),
        }
    }
}

/// BackgroundCompositor configuration
#[derive(Debug, Clone)]
pub struct CompositorConfig {
    /// Plain camera background pass
    pub camera_shader: ShaderAssetNames,
    /// Depth visualization background pass
    pub depth_visualization_shader: ShaderAssetNames,
    /// Virtual scene occlusion pass
    pub occlusion_shader: ShaderAssetNames,
    pub use_occlusion: bool,
    pub use_depth_visualization: bool,
    /// Near clip distance (meters) passed to the occlusion pass
    pub z_near: f32,
    /// Far clip distance (meters) passed to the occlusion pass
    pub z_far: f32,
    /// Color the virtual scene framebuffer is cleared to
    pub virtual_scene_clear_color: [f32; 4],
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            camera_shader: ShaderAssetNames::new(
                "shaders/background_show_camera.vert",
                "shaders/background_show_camera.frag",
            ),
            depth_visualization_shader: ShaderAssetNames::new(
                "shaders/background_show_depth_color_visualization.vert",
                "shaders/background_show_depth_color_visualization.frag",
            ),
            occlusion_shader: ShaderAssetNames::new(
                "shaders/occlusion.vert",
                "shaders/occlusion.frag",
            ),
            use_occlusion: false,
            use_depth_visualization: false,
            z_near: 0.01,
            z_far: 100.0,
            virtual_scene_clear_color: [0.0, 0.0, 0.0, 0.0],
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
