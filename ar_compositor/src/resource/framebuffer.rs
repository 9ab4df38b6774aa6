/// Framebuffer - offscreen render target with a color and a depth texture
///
/// Both attachments are Textures so the occlusion pass can sample them. The
/// depth attachment uses a shader-readable float depth format with
/// comparison disabled and nearest filtering.

use crate::error::{Error, Result};
use crate::graphics_api::{
    check, lock_api, lock_api_for_release, log_errors, FramebufferAttachment, FramebufferStatus,
    GraphicsApi, PixelFormat, SharedGraphicsApi, TextureFilter, TextureParameter, TextureTarget,
    WrapMode,
};
use crate::render::RenderContext;
use crate::resource::Texture;

const SOURCE: &str = "ar::Framebuffer";

pub struct Framebuffer {
    api: SharedGraphicsApi,
    /// GPU handle, 0 once freed
    framebuffer_id: u32,
    color_texture: Texture,
    depth_texture: Texture,
    width: u32,
    height: u32,
}

impl Framebuffer {
    /// Create a framebuffer of the given size
    pub fn new(ctx: &RenderContext, width: u32, height: u32) -> Result<Self> {
        let mut color_texture =
            Texture::new(ctx, TextureTarget::Texture2D, WrapMode::ClampToEdge, false)?;
        let mut depth_texture =
            Texture::new(ctx, TextureTarget::Texture2D, WrapMode::ClampToEdge, false)?;
        depth_texture.set_parameters(&[
            TextureParameter::CompareModeNone,
            TextureParameter::MinFilter(TextureFilter::Nearest),
            TextureParameter::MagFilter(TextureFilter::Nearest),
        ])?;

        color_texture.resize(width, height, PixelFormat::Rgba8)?;
        depth_texture.resize(width, height, PixelFormat::Depth32F)?;

        let api = ctx.api().clone();
        let framebuffer_id = {
            let mut guard = lock_api(&api)?;
            let id = guard.gen_framebuffer();
            if let Err(error) = check(&mut *guard, "Framebuffer creation failed", "gen_framebuffer") {
                if id != 0 {
                    guard.delete_framebuffer(id);
                    log_errors(&mut *guard, SOURCE, "Failed to free framebuffer", "delete_framebuffer");
                }
                return Err(error);
            }
            id
        };

        // From here on, dropping `framebuffer` releases every handle
        let framebuffer = Self {
            api,
            framebuffer_id,
            color_texture,
            depth_texture,
            width,
            height,
        };
        framebuffer.attach_and_validate()?;

        crate::ar_debug!(SOURCE, "Created {}x{} framebuffer", width, height);
        Ok(framebuffer)
    }

    fn attach_and_validate(&self) -> Result<()> {
        let color_id = self.color_texture.texture_id();
        let depth_id = self.depth_texture.texture_id();
        let mut api = lock_api(&self.api)?;
        api.bind_framebuffer(self.framebuffer_id);
        check(&mut *api, "Failed to bind framebuffer", "bind_framebuffer")?;
        api.framebuffer_texture_2d(FramebufferAttachment::Color0, color_id);
        check(&mut *api, "Failed to bind color texture to framebuffer", "framebuffer_texture_2d")?;
        api.framebuffer_texture_2d(FramebufferAttachment::Depth, depth_id);
        check(&mut *api, "Failed to bind depth texture to framebuffer", "framebuffer_texture_2d")?;
        let result = validate_complete(&mut *api);
        api.bind_framebuffer(0);
        check(&mut *api, "Failed to unbind framebuffer", "bind_framebuffer")?;
        result
    }

    /// Resize both attachments
    ///
    /// Does nothing when the size is unchanged; otherwise reallocates the
    /// attachment storage (not the handles) and re-checks completeness.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        if self.framebuffer_id == 0 {
            return Err(crate::ar_err!(SOURCE, Error::UseAfterFree("Framebuffer".to_string())));
        }
        if self.width == width && self.height == height {
            return Ok(());
        }
        self.color_texture.resize(width, height, PixelFormat::Rgba8)?;
        if let Err(error) = self.depth_texture.resize(width, height, PixelFormat::Depth32F) {
            // Attachments must keep matching the framebuffer size
            if let Err(restore) = self.color_texture.resize(self.width, self.height, PixelFormat::Rgba8) {
                crate::ar_warn!(SOURCE, "Failed to restore color attachment size: {}", restore);
            }
            return Err(error);
        }
        self.width = width;
        self.height = height;

        let mut api = lock_api(&self.api)?;
        api.bind_framebuffer(self.framebuffer_id);
        check(&mut *api, "Failed to bind framebuffer", "bind_framebuffer")?;
        let result = validate_complete(&mut *api);
        api.bind_framebuffer(0);
        check(&mut *api, "Failed to unbind framebuffer", "bind_framebuffer")?;
        result
    }

    /// Release the framebuffer and both attachments (idempotent, never fails)
    pub fn free(&mut self) {
        if self.framebuffer_id != 0 {
            let mut api = lock_api_for_release(&self.api);
            api.delete_framebuffer(self.framebuffer_id);
            log_errors(&mut *api, SOURCE, "Failed to free framebuffer", "delete_framebuffer");
            self.framebuffer_id = 0;
        }
        self.color_texture.free();
        self.depth_texture.free();
    }

    /// GPU handle, 0 once freed
    pub fn framebuffer_id(&self) -> u32 {
        self.framebuffer_id
    }

    pub fn color_texture(&self) -> &Texture {
        &self.color_texture
    }

    pub fn depth_texture(&self) -> &Texture {
        &self.depth_texture
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_freed(&self) -> bool {
        self.framebuffer_id == 0
    }
}

impl Drop for Framebuffer {
    fn drop(&mut self) {
        self.free();
    }
}

fn validate_complete(api: &mut dyn GraphicsApi) -> Result<()> {
    let status = api.check_framebuffer_status();
    check(api, "Failed to check framebuffer status", "check_framebuffer_status")?;
    match status {
        FramebufferStatus::Complete => Ok(()),
        FramebufferStatus::Incomplete(code) => {
            Err(crate::ar_err!(SOURCE, Error::FramebufferIncomplete(code)))
        }
    }
}

#[cfg(test)]
#[path = "framebuffer_tests.rs"]
mod tests;
