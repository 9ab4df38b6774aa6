/// LabelRenderer - camera-facing text labels anchored in world space
///
/// Each label is a unit quad billboarded around the world up axis in the
/// vertex shader. Label text is turned into pixels by an injected
/// `TextRasterizer`; the resulting textures are cached per string.

use std::collections::BTreeMap;

use glam::{Mat4, Vec3};
use rustc_hash::FxHashMap;

use crate::assets::{AssetSource, DecodedImage};
use crate::error::Result;
use crate::graphics_api::{BlendFactor, PixelFormat, PrimitiveTopology, TextureTarget, WrapMode};
use crate::render::RenderContext;
use crate::resource::{Framebuffer, Mesh, Shader, Texture, VertexBuffer};

const SOURCE: &str = "ar::LabelRenderer";

const VERTEX_SHADER: &str = "shaders/label.vert";
const FRAGMENT_SHADER: &str = "shaders/label.frag";

/// Quad corners in label space, triangle strip order
const LABEL_QUAD_COORDS: [f32; 8] = [-1.5, -1.5, 1.5, -1.5, -1.5, 1.5, 1.5, 1.5];

const LABEL_TEX_COORDS: [f32; 8] = [0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 1.0];

/// Turns label text into an RGBA8 image
pub trait TextRasterizer {
    fn rasterize(&self, text: &str) -> Result<DecodedImage>;
}

impl<F> TextRasterizer for F
where
    F: Fn(&str) -> Result<DecodedImage>,
{
    fn rasterize(&self, text: &str) -> Result<DecodedImage> {
        self(text)
    }
}

/// One mipmapped texture per distinct label string
pub struct TextTextureCache {
    rasterizer: Box<dyn TextRasterizer>,
    textures: FxHashMap<String, Texture>,
}

impl TextTextureCache {
    pub fn new(rasterizer: Box<dyn TextRasterizer>) -> Self {
        Self {
            rasterizer,
            textures: FxHashMap::default(),
        }
    }

    /// Texture for `text`, rasterized and uploaded on first request
    pub fn get(&mut self, ctx: &RenderContext, text: &str) -> Result<&Texture> {
        if !self.textures.contains_key(text) {
            let texture = self.generate_texture(ctx, text)?;
            self.textures.insert(text.to_string(), texture);
        }
        Ok(&self.textures[text])
    }

    fn generate_texture(&self, ctx: &RenderContext, text: &str) -> Result<Texture> {
        let mut texture = Texture::new(ctx, TextureTarget::Texture2D, WrapMode::ClampToEdge, true)?;
        let image = self.rasterizer.rasterize(text)?;
        let (width, height) = (image.width(), image.height());
        texture.upload(PixelFormat::Rgba8, width, height, image.pixels())?;
        drop(image);
        texture.generate_mipmap()?;
        crate::ar_debug!(SOURCE, "Cached label '{}' ({}x{})", text, width, height);
        Ok(texture)
    }

    /// Cached texture for `text`, if it was requested before
    pub fn texture(&self, text: &str) -> Option<&Texture> {
        self.textures.get(text)
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    /// Release every cached texture
    pub fn clear(&mut self) {
        self.textures.clear();
    }
}

/// Draws text labels that turn to face the camera
pub struct LabelRenderer {
    cache: TextTextureCache,
    mesh: Mesh,
    shader: Shader,
}

impl LabelRenderer {
    pub fn new(ctx: &RenderContext, assets: &dyn AssetSource, rasterizer: Box<dyn TextRasterizer>) -> Result<Self> {
        let mut shader = Shader::from_assets(ctx, assets, VERTEX_SHADER, FRAGMENT_SHADER, &BTreeMap::new())?;
        shader
            .set_blend(BlendFactor::One, BlendFactor::OneMinusSrcAlpha)
            .set_depth_test(false)
            .set_depth_write(false);

        let vertex_buffers = vec![
            VertexBuffer::new(ctx, 2, Some(&LABEL_QUAD_COORDS))?,
            VertexBuffer::new(ctx, 2, Some(&LABEL_TEX_COORDS))?,
        ];
        let mesh = Mesh::new(ctx, PrimitiveTopology::TriangleStrip, None, vertex_buffers)?;

        Ok(Self {
            cache: TextTextureCache::new(rasterizer),
            mesh,
            shader,
        })
    }

    /// Draw `label` at `origin`, facing `camera_position`
    pub fn draw(
        &mut self,
        ctx: &mut RenderContext,
        view_projection: Mat4,
        origin: Vec3,
        camera_position: Vec3,
        label: &str,
        framebuffer: Option<&Framebuffer>,
    ) -> Result<()> {
        let texture = self.cache.get(ctx, label)?;
        self.shader
            .set_mat4("u_ViewProjection", view_projection)?
            .set_vec3("u_LabelOrigin", origin)?
            .set_vec3("u_CameraPos", camera_position)?
            .set_texture("u_LabelTexture", texture)?;
        ctx.draw(&self.mesh, &mut self.shader, framebuffer)
    }

    pub fn cache(&self) -> &TextTextureCache {
        &self.cache
    }

    pub fn shader(&self) -> &Shader {
        &self.shader
    }
}

#[cfg(test)]
#[path = "label_renderer_tests.rs"]
mod tests;
