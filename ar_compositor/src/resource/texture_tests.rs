//! Unit tests for texture.rs
//!
//! The asset path is exercised with a resource-tracking decoder double that
//! counts how often decoded images are released.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::assets::{DecodedImage, ImageDecoder, MemoryAssetSource};
use crate::error::{Error, Result};
use crate::graphics_api::mock_graphics_api::{MockGraphicsApi, ObjectKind};
use crate::graphics_api::{
    ApiErrorCode, ColorFormat, PixelFormat, TextureFilter, TextureParameter, TextureTarget,
    WrapMode,
};
use crate::resource::Texture;

// ============================================================================
// Decoder double
// ============================================================================

/// Hands out 2x2 images and counts decodes / releases
#[derive(Default)]
struct TrackingDecoder {
    decoded: Arc<AtomicUsize>,
    released: Arc<AtomicUsize>,
    fail: bool,
}

impl ImageDecoder for TrackingDecoder {
    fn decode(&self, _bytes: &[u8]) -> Result<DecodedImage> {
        if self.fail {
            return Err(Error::ImageDecodeError("corrupt".to_string()));
        }
        self.decoded.fetch_add(1, Ordering::SeqCst);
        let released = self.released.clone();
        Ok(DecodedImage::new(2, 2, vec![255; 16])?.with_release_hook(move || {
            released.fetch_add(1, Ordering::SeqCst);
        }))
    }
}

fn assets_with_image() -> MemoryAssetSource {
    let mut assets = MemoryAssetSource::new();
    assets.insert("models/texture.png", vec![1, 2, 3]);
    assets
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_new_configures_filters_and_wrap() {
    let (mock, ctx) = MockGraphicsApi::new_context();

    let texture = Texture::new(&ctx, TextureTarget::Texture2D, WrapMode::ClampToEdge, false).unwrap();

    let mock = mock.lock().unwrap();
    let params: Vec<TextureParameter> = mock
        .tex_parameters
        .iter()
        .filter(|(id, _)| *id == texture.texture_id())
        .map(|(_, p)| *p)
        .collect();
    assert_eq!(
        params,
        vec![
            TextureParameter::MinFilter(TextureFilter::Linear),
            TextureParameter::MagFilter(TextureFilter::Linear),
            TextureParameter::WrapS(WrapMode::ClampToEdge),
            TextureParameter::WrapT(WrapMode::ClampToEdge),
        ]
    );
    // No storage until resize / upload
    assert!(mock.tex_images.is_empty());
    assert!(texture.storage().is_none());
}

#[test]
fn test_mipmapped_texture_uses_trilinear_min_filter() {
    let (mock, ctx) = MockGraphicsApi::new_context();

    let _texture = Texture::new(&ctx, TextureTarget::Texture2D, WrapMode::Repeat, true).unwrap();

    let mock = mock.lock().unwrap();
    assert!(mock.tex_parameters.iter().any(|(_, p)| {
        *p == TextureParameter::MinFilter(TextureFilter::LinearMipmapLinear)
    }));
}

#[test]
fn test_new_failure_releases_handle() {
    let (mock, ctx) = MockGraphicsApi::new_context();
    mock.lock().unwrap().fail_next("tex_parameter", ApiErrorCode::InvalidEnum);

    let result = Texture::new(&ctx, TextureTarget::CubeMap, WrapMode::Repeat, false);

    assert!(matches!(result, Err(Error::GraphicsApiError { call: "tex_parameter", .. })));
    assert_eq!(mock.lock().unwrap().live_count(ObjectKind::Texture), 0);
}

// ============================================================================
// Storage
// ============================================================================

#[test]
fn test_resize_reallocates_only_on_change() {
    let (mock, ctx) = MockGraphicsApi::new_context();
    let mut texture =
        Texture::new(&ctx, TextureTarget::Texture2D, WrapMode::ClampToEdge, false).unwrap();

    texture.resize(64, 32, PixelFormat::Rgba8).unwrap();
    texture.resize(64, 32, PixelFormat::Rgba8).unwrap();
    texture.resize(128, 32, PixelFormat::Rgba8).unwrap();

    let mock = mock.lock().unwrap();
    assert_eq!(mock.tex_images.len(), 2);
    assert_eq!(mock.tex_images[1].width, 128);
    assert_eq!(mock.tex_images[1].data_len, None);
}

#[test]
fn test_upload_validates_pixel_length() {
    let (mock, ctx) = MockGraphicsApi::new_context();
    let mut texture =
        Texture::new(&ctx, TextureTarget::Texture2D, WrapMode::ClampToEdge, false).unwrap();
    mock.lock().unwrap().clear_calls();

    // RG8 is 2 bytes per pixel
    let result = texture.upload(PixelFormat::Rg8, 4, 4, &[0; 16]);

    assert!(matches!(result, Err(Error::InvalidArgument(_))));
    assert!(mock.lock().unwrap().calls.is_empty());

    texture.upload(PixelFormat::Rg8, 4, 4, &[0; 32]).unwrap();
    assert_eq!(mock.lock().unwrap().tex_images[0].data_len, Some(32));
}

// ============================================================================
// Asset constructor
// ============================================================================

#[test]
fn test_from_asset_uploads_and_releases_image_once() {
    let (mock, ctx) = MockGraphicsApi::new_context();
    let decoder = TrackingDecoder::default();

    let texture = Texture::from_asset(
        &ctx,
        &assets_with_image(),
        &decoder,
        "models/texture.png",
        WrapMode::ClampToEdge,
        ColorFormat::Srgb,
        true,
    )
    .unwrap();

    assert_eq!(decoder.decoded.load(Ordering::SeqCst), 1);
    assert_eq!(decoder.released.load(Ordering::SeqCst), 1);
    let mock = mock.lock().unwrap();
    assert_eq!(mock.tex_images.len(), 1);
    assert_eq!(mock.tex_images[0].format, PixelFormat::Srgb8Alpha8);
    assert_eq!(mock.tex_images[0].data_len, Some(16));
    assert_eq!(mock.mipmaps_generated, vec![texture.texture_id()]);
}

/// Records how many mipmap generations the driver had seen when the image was released
struct OrderingDecoder {
    mock: Arc<Mutex<MockGraphicsApi>>,
    mipmaps_at_release: Arc<Mutex<Option<usize>>>,
}

impl ImageDecoder for OrderingDecoder {
    fn decode(&self, _bytes: &[u8]) -> Result<DecodedImage> {
        let mock = self.mock.clone();
        let seen = self.mipmaps_at_release.clone();
        Ok(DecodedImage::new(2, 2, vec![255; 16])?.with_release_hook(move || {
            let count = mock.lock().unwrap().call_count("generate_mipmap");
            *seen.lock().unwrap() = Some(count);
        }))
    }
}

#[test]
fn test_from_asset_releases_image_before_mipmaps() {
    let (mock, ctx) = MockGraphicsApi::new_context();
    let decoder = OrderingDecoder {
        mock: mock.clone(),
        mipmaps_at_release: Arc::new(Mutex::new(None)),
    };

    Texture::from_asset(
        &ctx,
        &assets_with_image(),
        &decoder,
        "models/texture.png",
        WrapMode::ClampToEdge,
        ColorFormat::Linear,
        true,
    )
    .unwrap();

    assert_eq!(*decoder.mipmaps_at_release.lock().unwrap(), Some(0));
    assert_eq!(mock.lock().unwrap().call_count("generate_mipmap"), 1);
}

#[test]
fn test_from_asset_upload_failure_releases_image_and_texture() {
    let (mock, ctx) = MockGraphicsApi::new_context();
    mock.lock().unwrap().fail_next("tex_image_2d", ApiErrorCode::OutOfMemory);
    let decoder = TrackingDecoder::default();

    let result = Texture::from_asset(
        &ctx,
        &assets_with_image(),
        &decoder,
        "models/texture.png",
        WrapMode::ClampToEdge,
        ColorFormat::Linear,
        true,
    );

    assert!(matches!(result, Err(Error::GraphicsApiError { call: "tex_image_2d", .. })));
    assert_eq!(decoder.decoded.load(Ordering::SeqCst), 1);
    assert_eq!(decoder.released.load(Ordering::SeqCst), 1);
    assert_eq!(mock.lock().unwrap().live_count(ObjectKind::Texture), 0);
}

#[test]
fn test_from_asset_decode_failure_releases_texture() {
    let (mock, ctx) = MockGraphicsApi::new_context();
    let decoder = TrackingDecoder { fail: true, ..Default::default() };

    let result = Texture::from_asset(
        &ctx,
        &assets_with_image(),
        &decoder,
        "models/texture.png",
        WrapMode::ClampToEdge,
        ColorFormat::Linear,
        false,
    );

    assert!(matches!(result, Err(Error::ImageDecodeError(_))));
    assert_eq!(decoder.released.load(Ordering::SeqCst), 0);
    assert_eq!(mock.lock().unwrap().live_count(ObjectKind::Texture), 0);
}

#[test]
fn test_from_asset_missing_asset() {
    let (_mock, ctx) = MockGraphicsApi::new_context();

    let result = Texture::from_asset(
        &ctx,
        &MemoryAssetSource::new(),
        &TrackingDecoder::default(),
        "models/missing.png",
        WrapMode::ClampToEdge,
        ColorFormat::Linear,
        false,
    );

    assert!(matches!(result, Err(Error::ResourceNotFound(_))));
}

// ============================================================================
// Release
// ============================================================================

#[test]
fn test_free_is_idempotent_and_invalidates_bindings() {
    let (mock, ctx) = MockGraphicsApi::new_context();
    let mut texture =
        Texture::new(&ctx, TextureTarget::External, WrapMode::ClampToEdge, false).unwrap();
    let binding = texture.binding();
    assert_eq!(binding.resolve().unwrap(), texture.texture_id());
    assert_eq!(binding.target(), TextureTarget::External);

    texture.free();
    texture.free();

    assert!(texture.is_freed());
    assert!(matches!(binding.resolve(), Err(Error::UseAfterFree(_))));
    assert!(matches!(
        texture.resize(1, 1, PixelFormat::Rgba8),
        Err(Error::UseAfterFree(_))
    ));
    assert_eq!(mock.lock().unwrap().call_count("delete_texture"), 1);
}

#[test]
fn test_binding_fails_after_drop() {
    let (_mock, ctx) = MockGraphicsApi::new_context();
    let texture =
        Texture::new(&ctx, TextureTarget::Texture2D, WrapMode::ClampToEdge, false).unwrap();
    let binding = texture.binding();

    drop(texture);

    assert!(matches!(binding.resolve(), Err(Error::UseAfterFree(_))));
}
