/// BackgroundCompositor - camera background plus occlusion-aware virtual scene
///
/// Both passes draw the same full-screen quad. Its mesh has three streams:
/// - 0: quad corners in normalized device coordinates (fixed)
/// - 1: camera texture coordinates, rewritten when the display geometry changes
/// - 2: virtual scene texture coordinates (fixed unit square)
///
/// The background pass samples the camera color image (or, in depth
/// visualization mode, the camera depth image). The occlusion pass blends
/// the offscreen virtual scene over it, attenuated where real-world depth
/// is closer than the virtual geometry.

use std::collections::BTreeMap;

use glam::Vec2;

use crate::assets::AssetSource;
use crate::config::CompositorConfig;
use crate::error::{Error, Result};
use crate::graphics_api::{BlendFactor, PixelFormat, PrimitiveTopology, TextureTarget, WrapMode};
use crate::render::RenderContext;
use crate::resource::{Framebuffer, Mesh, Shader, Texture, VertexBuffer};
use crate::compositor::{DepthImage, FrameSource};

const SOURCE: &str = "ar::BackgroundCompositor";

/// Triangle strip order: bottom-left, bottom-right, top-left, top-right
const NDC_QUAD_CORNERS: [Vec2; 4] = [
    Vec2::new(-1.0, -1.0),
    Vec2::new(1.0, -1.0),
    Vec2::new(-1.0, 1.0),
    Vec2::new(1.0, 1.0),
];

const NDC_QUAD_COORDS: [f32; 8] = [-1.0, -1.0, 1.0, -1.0, -1.0, 1.0, 1.0, 1.0];

const VIRTUAL_SCENE_TEX_COORDS: [f32; 8] = [0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 1.0];

const CAMERA_TEX_COORDS_STREAM: usize = 1;

pub struct BackgroundCompositor {
    config: CompositorConfig,
    mesh: Mesh,
    camera_color_texture: Texture,
    camera_depth_texture: Texture,
    /// None only after a failed rebuild
    background_shader: Option<Shader>,
    occlusion_shader: Option<Shader>,
    use_depth_visualization: bool,
    use_occlusion: bool,
    depth_aspect_ratio: f32,
}

impl BackgroundCompositor {
    /// Create textures, the quad mesh and both pass shaders
    pub fn new(ctx: &RenderContext, assets: &dyn AssetSource, config: CompositorConfig) -> Result<Self> {
        let camera_color_texture = Texture::new(ctx, TextureTarget::External, WrapMode::ClampToEdge, false)?;
        let camera_depth_texture = Texture::new(ctx, TextureTarget::Texture2D, WrapMode::ClampToEdge, false)?;

        // Camera coordinates stay empty until the first display geometry update
        let vertex_buffers = vec![
            VertexBuffer::new(ctx, 2, Some(&NDC_QUAD_COORDS))?,
            VertexBuffer::new(ctx, 2, None)?,
            VertexBuffer::new(ctx, 2, Some(&VIRTUAL_SCENE_TEX_COORDS))?,
        ];
        let mesh = Mesh::new(ctx, PrimitiveTopology::TriangleStrip, None, vertex_buffers)?;

        let mut compositor = Self {
            use_depth_visualization: config.use_depth_visualization,
            use_occlusion: config.use_occlusion,
            config,
            mesh,
            camera_color_texture,
            camera_depth_texture,
            background_shader: None,
            occlusion_shader: None,
            depth_aspect_ratio: 1.0,
        };
        compositor.background_shader = Some(compositor.build_background_shader(ctx, assets)?);
        compositor.occlusion_shader = Some(compositor.build_occlusion_shader(ctx, assets)?);

        crate::ar_info!(
            SOURCE,
            "Compositor ready (depth visualization: {}, occlusion: {})",
            compositor.use_depth_visualization,
            compositor.use_occlusion
        );
        Ok(compositor)
    }

    fn build_background_shader(&self, ctx: &RenderContext, assets: &dyn AssetSource) -> Result<Shader> {
        let (names, sampler, texture) = if self.use_depth_visualization {
            (&self.config.depth_visualization_shader, "u_CameraDepthTexture", &self.camera_depth_texture)
        } else {
            (&self.config.camera_shader, "u_CameraColorTexture", &self.camera_color_texture)
        };

        let mut shader = Shader::from_assets(ctx, assets, &names.vertex, &names.fragment, &BTreeMap::new())?;
        shader
            .set_texture(sampler, texture)?
            .set_depth_test(false)
            .set_depth_write(false);
        Ok(shader)
    }

    fn build_occlusion_shader(&self, ctx: &RenderContext, assets: &dyn AssetSource) -> Result<Shader> {
        let mut defines = BTreeMap::new();
        let flag = if self.use_occlusion { "1" } else { "0" };
        defines.insert("USE_OCCLUSION".to_string(), flag.to_string());

        let names = &self.config.occlusion_shader;
        let mut shader = Shader::from_assets(ctx, assets, &names.vertex, &names.fragment, &defines)?;
        shader
            .set_depth_test(false)
            .set_depth_write(false)
            .set_blend(BlendFactor::One, BlendFactor::OneMinusSrcAlpha);
        if self.use_occlusion {
            shader
                .set_texture("u_CameraDepthTexture", &self.camera_depth_texture)?
                .set_float("u_DepthAspectRatio", self.depth_aspect_ratio)?;
        }
        Ok(shader)
    }

    // ===== MODES =====

    /// Switch the background pass between camera color and depth visualization
    ///
    /// The shader is rebuilt only when the mode actually changes.
    pub fn set_use_depth_visualization(
        &mut self,
        ctx: &RenderContext,
        assets: &dyn AssetSource,
        enabled: bool,
    ) -> Result<()> {
        if self.background_shader.is_some() && self.use_depth_visualization == enabled {
            return Ok(());
        }
        self.use_depth_visualization = enabled;
        // Old program is released before the new one is built
        self.background_shader = None;
        self.background_shader = Some(self.build_background_shader(ctx, assets)?);
        crate::ar_debug!(SOURCE, "Depth visualization {}", if enabled { "on" } else { "off" });
        Ok(())
    }

    /// Turn depth-based occlusion of the virtual scene on or off
    ///
    /// The shader is rebuilt only when the mode actually changes.
    pub fn set_use_occlusion(&mut self, ctx: &RenderContext, assets: &dyn AssetSource, enabled: bool) -> Result<()> {
        if self.occlusion_shader.is_some() && self.use_occlusion == enabled {
            return Ok(());
        }
        self.use_occlusion = enabled;
        self.occlusion_shader = None;
        self.occlusion_shader = Some(self.build_occlusion_shader(ctx, assets)?);
        crate::ar_debug!(SOURCE, "Occlusion {}", if enabled { "on" } else { "off" });
        Ok(())
    }

    // ===== PER FRAME =====

    /// Rewrite the camera texture coordinates if the display geometry changed
    pub fn update_display_geometry(&mut self, frame: &dyn FrameSource) -> Result<()> {
        if !frame.has_display_geometry_changed() {
            return Ok(());
        }
        let corners = frame.transform_ndc_to_texture(&NDC_QUAD_CORNERS);
        let coords: Vec<f32> = corners.iter().flat_map(|corner| corner.to_array()).collect();
        self.mesh
            .vertex_buffer_mut(CAMERA_TEX_COORDS_STREAM)
            .ok_or_else(|| Error::InvalidArgument("Quad mesh has no camera coordinate stream".to_string()))?
            .set(Some(&coords))
    }

    /// Upload a new camera depth image
    ///
    /// With occlusion on, its aspect ratio is pushed to the occlusion pass.
    pub fn update_camera_depth_texture(&mut self, image: &DepthImage) -> Result<()> {
        self.camera_depth_texture
            .upload(PixelFormat::Rg8, image.width(), image.height(), image.data())?;
        if self.use_occlusion {
            self.depth_aspect_ratio = image.aspect_ratio();
            let shader = live_shader(&mut self.occlusion_shader, "occlusion")?;
            shader.set_float("u_DepthAspectRatio", self.depth_aspect_ratio)?;
        }
        Ok(())
    }

    /// Geometry and depth updates for the current frame
    pub fn prepare_frame(&mut self, frame: &mut dyn FrameSource) -> Result<()> {
        self.update_display_geometry(frame)?;
        if let Some(image) = frame.acquire_depth_image() {
            self.update_camera_depth_texture(&image)?;
        }
        Ok(())
    }

    /// Background pass into the default framebuffer
    pub fn draw_background(&mut self, ctx: &mut RenderContext) -> Result<()> {
        let shader = live_shader(&mut self.background_shader, "background")?;
        ctx.draw(&self.mesh, shader, None)
    }

    /// Occlusion pass: blend `virtual_scene` over the background
    pub fn draw_virtual_scene(
        &mut self,
        ctx: &mut RenderContext,
        virtual_scene: &Framebuffer,
        z_near: f32,
        z_far: f32,
    ) -> Result<()> {
        let shader = live_shader(&mut self.occlusion_shader, "occlusion")?;
        shader.set_texture("u_VirtualSceneColorTexture", virtual_scene.color_texture())?;
        if self.use_occlusion {
            shader
                .set_texture("u_VirtualSceneDepthTexture", virtual_scene.depth_texture())?
                .set_float("u_ZNear", z_near)?
                .set_float("u_ZFar", z_far)?;
        }
        ctx.draw(&self.mesh, shader, None)
    }

    // ===== ACCESSORS =====

    pub fn camera_color_texture(&self) -> &Texture {
        &self.camera_color_texture
    }

    pub fn camera_depth_texture(&self) -> &Texture {
        &self.camera_depth_texture
    }

    pub fn use_depth_visualization(&self) -> bool {
        self.use_depth_visualization
    }

    pub fn use_occlusion(&self) -> bool {
        self.use_occlusion
    }

    /// Aspect ratio of the last depth image received with occlusion on
    pub fn depth_aspect_ratio(&self) -> f32 {
        self.depth_aspect_ratio
    }

    pub fn config(&self) -> &CompositorConfig {
        &self.config
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn background_shader(&self) -> Option<&Shader> {
        self.background_shader.as_ref()
    }

    pub fn occlusion_shader(&self) -> Option<&Shader> {
        self.occlusion_shader.as_ref()
    }
}

fn live_shader<'a>(shader: &'a mut Option<Shader>, pass: &str) -> Result<&'a mut Shader> {
    shader.as_mut().ok_or_else(|| {
        crate::ar_err!(
            SOURCE,
            Error::UseAfterFree(format!("The {} shader failed to rebuild", pass))
        )
    })
}

#[cfg(test)]
#[path = "background_compositor_tests.rs"]
mod tests;
