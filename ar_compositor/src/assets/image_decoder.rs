/// Image decoding for texture uploads

use crate::error::{Error, Result};

type ReleaseHook = Box<dyn FnOnce() + Send>;

/// Decoded RGBA8 image
///
/// Dropping the image runs its release hook exactly once, which is how
/// decoders that hand out pooled or foreign memory get it back.
pub struct DecodedImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    release: Option<ReleaseHook>,
}

impl DecodedImage {
    /// Wrap tightly packed RGBA8 pixels
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(Error::ImageDecodeError(format!(
                "{}x{} RGBA8 image needs {} bytes, got {}",
                width,
                height,
                expected,
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
            release: None,
        })
    }

    /// Run `hook` when the image is dropped
    pub fn with_release_hook(mut self, hook: impl FnOnce() + Send + 'static) -> Self {
        self.release = Some(Box::new(hook));
        self
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

impl Drop for DecodedImage {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

/// Turns encoded image bytes into RGBA8 pixels
pub trait ImageDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<DecodedImage>;
}

/// Decoder backed by the `image` crate (PNG and JPEG)
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageCrateDecoder;

impl ImageDecoder for ImageCrateDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<DecodedImage> {
        let image = image::load_from_memory(bytes)
            .map_err(|error| Error::ImageDecodeError(error.to_string()))?
            .to_rgba8();
        let (width, height) = image.dimensions();
        DecodedImage::new(width, height, image.into_raw())
    }
}

#[cfg(test)]
#[path = "image_decoder_tests.rs"]
mod tests;
