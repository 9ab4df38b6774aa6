/// Texture - one GPU texture object
///
/// Construction allocates the handle and configures filtering and wrapping;
/// storage is only allocated by `resize`, `upload` or the asset constructor.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Weak};

use crate::assets::{AssetSource, DecodedImage, ImageDecoder};
use crate::error::{Error, Result};
use crate::graphics_api::{
    check, lock_api, lock_api_for_release, log_errors, ColorFormat, PixelFormat,
    SharedGraphicsApi, TextureFilter, TextureParameter, TextureTarget, WrapMode,
};
use crate::render::RenderContext;

const SOURCE: &str = "ar::Texture";

/// Allocated storage description
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureStorage {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
}

pub struct Texture {
    api: SharedGraphicsApi,
    /// GPU handle shared with bindings so they can detect a released texture
    texture_id: Arc<AtomicU32>,
    target: TextureTarget,
    storage: Option<TextureStorage>,
}

impl Texture {
    /// Allocate a texture handle and configure its sampling parameters
    pub fn new(
        ctx: &RenderContext,
        target: TextureTarget,
        wrap_mode: WrapMode,
        use_mipmaps: bool,
    ) -> Result<Self> {
        let api = ctx.api().clone();
        let texture_id = {
            let mut guard = lock_api(&api)?;
            let id = guard.gen_texture();
            if let Err(error) = check(&mut *guard, "Texture creation failed", "gen_texture") {
                if id != 0 {
                    guard.delete_texture(id);
                    log_errors(&mut *guard, SOURCE, "Failed to free texture", "delete_texture");
                }
                return Err(error);
            }
            id
        };

        // From here on, dropping `texture` releases the handle
        let texture = Self {
            api,
            texture_id: Arc::new(AtomicU32::new(texture_id)),
            target,
            storage: None,
        };

        let min_filter = if use_mipmaps {
            TextureFilter::LinearMipmapLinear
        } else {
            TextureFilter::Linear
        };
        texture.set_parameters(&[
            TextureParameter::MinFilter(min_filter),
            TextureParameter::MagFilter(TextureFilter::Linear),
            TextureParameter::WrapS(wrap_mode),
            TextureParameter::WrapT(wrap_mode),
        ])?;

        Ok(texture)
    }

    /// Create a 2D texture from an image asset
    ///
    /// The decoded image is released exactly once whether the upload
    /// succeeds or fails; on failure the texture handle is released too.
    #[allow(clippy::too_many_arguments)]
    pub fn from_asset(
        ctx: &RenderContext,
        assets: &dyn AssetSource,
        decoder: &dyn ImageDecoder,
        asset_name: &str,
        wrap_mode: WrapMode,
        color_format: ColorFormat,
        use_mipmaps: bool,
    ) -> Result<Self> {
        let mut texture = Texture::new(ctx, TextureTarget::Texture2D, wrap_mode, use_mipmaps)?;
        let bytes = assets.image_bytes(asset_name)?;
        let image: DecodedImage = decoder.decode(&bytes)?;
        let (width, height) = (image.width(), image.height());
        texture.upload(color_format.pixel_format(), width, height, image.pixels())?;
        drop(image);
        if use_mipmaps {
            texture.generate_mipmap()?;
        }
        crate::ar_debug!(SOURCE, "Loaded texture '{}' ({}x{})", asset_name, width, height);
        Ok(texture)
    }

    /// Allocate uninitialized storage, reallocating only when the size or
    /// format changed
    pub fn resize(&mut self, width: u32, height: u32, format: PixelFormat) -> Result<()> {
        let storage = TextureStorage { width, height, format };
        if self.storage == Some(storage) {
            return Ok(());
        }
        self.tex_image(storage, None)
    }

    /// Upload `pixels` as the level-0 image, replacing the storage
    pub fn upload(&mut self, format: PixelFormat, width: u32, height: u32, pixels: &[u8]) -> Result<()> {
        let expected = width as usize * height as usize * format.bytes_per_pixel();
        if pixels.len() != expected {
            return Err(Error::InvalidArgument(format!(
                "Texture upload of {}x{} {:?} needs {} bytes, got {}",
                width,
                height,
                format,
                expected,
                pixels.len()
            )));
        }
        self.tex_image(TextureStorage { width, height, format }, Some(pixels))
    }

    fn tex_image(&mut self, storage: TextureStorage, pixels: Option<&[u8]>) -> Result<()> {
        let texture_id = self.live_id()?;
        let mut api = lock_api(&self.api)?;
        api.bind_texture(self.target, texture_id);
        check(&mut *api, "Failed to bind texture", "bind_texture")?;
        api.tex_image_2d(
            self.target,
            0,
            storage.format,
            storage.width,
            storage.height,
            pixels,
        );
        check(&mut *api, "Failed to populate texture data", "tex_image_2d")?;
        self.storage = Some(storage);
        Ok(())
    }

    /// Build the mip chain from the level-0 image
    pub fn generate_mipmap(&self) -> Result<()> {
        let texture_id = self.live_id()?;
        let mut api = lock_api(&self.api)?;
        api.bind_texture(self.target, texture_id);
        check(&mut *api, "Failed to bind texture", "bind_texture")?;
        api.generate_mipmap(self.target);
        check(&mut *api, "Failed to generate mipmaps", "generate_mipmap")
    }

    /// Apply sampling parameters (bound to this texture's target)
    pub fn set_parameters(&self, parameters: &[TextureParameter]) -> Result<()> {
        let texture_id = self.live_id()?;
        let mut api = lock_api(&self.api)?;
        api.bind_texture(self.target, texture_id);
        check(&mut *api, "Failed to bind texture", "bind_texture")?;
        for parameter in parameters {
            api.tex_parameter(self.target, *parameter);
            check(&mut *api, "Failed to set texture parameter", "tex_parameter")?;
        }
        Ok(())
    }

    /// Release the GPU handle (idempotent, never fails)
    pub fn free(&mut self) {
        let texture_id = self.texture_id.swap(0, Ordering::AcqRel);
        if texture_id == 0 {
            return;
        }
        let mut api = lock_api_for_release(&self.api);
        api.delete_texture(texture_id);
        log_errors(&mut *api, SOURCE, "Failed to free texture", "delete_texture");
        self.storage = None;
    }

    /// GPU handle, 0 once freed
    pub fn texture_id(&self) -> u32 {
        self.texture_id.load(Ordering::Acquire)
    }

    pub fn target(&self) -> TextureTarget {
        self.target
    }

    /// Allocated storage, `None` until the first resize / upload
    pub fn storage(&self) -> Option<TextureStorage> {
        self.storage
    }

    pub fn is_freed(&self) -> bool {
        self.texture_id() == 0
    }

    /// Non-owning reference used by shader texture uniforms
    pub fn binding(&self) -> TextureBinding {
        TextureBinding {
            texture_id: Arc::downgrade(&self.texture_id),
            target: self.target,
        }
    }

    fn live_id(&self) -> Result<u32> {
        match self.texture_id() {
            0 => Err(crate::ar_err!(SOURCE, Error::UseAfterFree("Texture".to_string()))),
            id => Ok(id),
        }
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        self.free();
    }
}

/// Non-owning texture reference
///
/// Resolves to the texture handle while the texture is alive and fails with
/// `UseAfterFree` once it has been freed or dropped.
#[derive(Debug, Clone)]
pub struct TextureBinding {
    texture_id: Weak<AtomicU32>,
    target: TextureTarget,
}

impl TextureBinding {
    pub fn target(&self) -> TextureTarget {
        self.target
    }

    pub fn resolve(&self) -> Result<u32> {
        match self.texture_id.upgrade().map(|id| id.load(Ordering::Acquire)) {
            Some(id) if id != 0 => Ok(id),
            _ => Err(Error::UseAfterFree("Texture bound to a shader uniform".to_string())),
        }
    }
}

#[cfg(test)]
#[path = "texture_tests.rs"]
mod tests;
