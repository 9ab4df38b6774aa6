/// GraphicsApi trait - the boundary between the compositor and the driver
///
/// The trait mirrors a stateful, call-then-check graphics API (OpenGL ES 3.0
/// shaped). Every driver enum is modeled as a closed tagged variant; the
/// backend owns the translation table to concrete driver constants, so this
/// crate never sees a native constant.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use bitflags::bitflags;
use crate::error::{Error, Result};

/// Handle shared by every resource so it can release its GPU objects on drop
pub type SharedGraphicsApi = Arc<Mutex<dyn GraphicsApi>>;

/// Lock the shared graphics API, mapping poisoning to an error
pub(crate) fn lock_api(api: &SharedGraphicsApi) -> Result<MutexGuard<'_, dyn GraphicsApi + 'static>> {
    api.lock()
        .map_err(|_| Error::LockPoisoned("GraphicsApi".to_string()))
}

/// Lock for release paths, which must run even after a panic poisoned the lock
pub(crate) fn lock_api_for_release(api: &SharedGraphicsApi) -> MutexGuard<'_, dyn GraphicsApi + 'static> {
    api.lock().unwrap_or_else(PoisonError::into_inner)
}

// ============================================================================
// Tagged variants
// ============================================================================

/// Buffer binding point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    /// Per-vertex attribute data
    Array,
    /// Primitive indices
    ElementArray,
}

/// Allocation usage hint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferUsage {
    /// Uploaded once, drawn many times
    StaticDraw,
    /// Re-uploaded often (per-frame streams)
    DynamicDraw,
}

/// Texture binding point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureTarget {
    /// Regular 2D texture
    Texture2D,
    /// Externally produced image stream (camera feed)
    External,
    /// Cube map
    CubeMap,
}

/// Texture coordinate wrapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapMode {
    ClampToEdge,
    MirroredRepeat,
    Repeat,
}

/// Texture sampling filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureFilter {
    Nearest,
    Linear,
    LinearMipmapLinear,
}

/// One texture parameter assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureParameter {
    MinFilter(TextureFilter),
    MagFilter(TextureFilter),
    WrapS(WrapMode),
    WrapT(WrapMode),
    /// Disable depth comparison so a depth texture can be sampled as a value
    CompareModeNone,
}

/// Storage layout of texture pixels (internal format + upload format/type)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// 8-bit RGBA, linear
    Rgba8,
    /// 8-bit RGBA, gamma-encoded color channels
    Srgb8Alpha8,
    /// Two 8-bit channels (packed 16-bit camera depth)
    Rg8,
    /// Shader-readable 32-bit float depth
    Depth32F,
}

impl PixelFormat {
    /// Bytes per pixel of the upload layout
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            PixelFormat::Rgba8 | PixelFormat::Srgb8Alpha8 | PixelFormat::Depth32F => 4,
            PixelFormat::Rg8 => 2,
        }
    }
}

/// Color-space variant for decoded color textures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorFormat {
    Linear,
    Srgb,
}

impl ColorFormat {
    /// Storage format used for this color space
    pub fn pixel_format(&self) -> PixelFormat {
        match self {
            ColorFormat::Linear => PixelFormat::Rgba8,
            ColorFormat::Srgb => PixelFormat::Srgb8Alpha8,
        }
    }
}

/// Primitive assembly mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveTopology {
    Points,
    LineStrip,
    LineLoop,
    Lines,
    TriangleStrip,
    TriangleFan,
    Triangles,
}

/// Blend equation factor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendFactor {
    Zero,
    One,
    SrcColor,
    OneMinusSrcColor,
    DstColor,
    OneMinusDstColor,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstAlpha,
    OneMinusDstAlpha,
    ConstantColor,
    OneMinusConstantColor,
    ConstantAlpha,
    OneMinusConstantAlpha,
}

/// Shader pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

/// Toggleable fixed-function state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Blend,
    DepthTest,
}

/// Framebuffer attachment point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramebufferAttachment {
    Color0,
    Depth,
}

/// Result of a framebuffer completeness check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramebufferStatus {
    Complete,
    /// Driver status code describing why the combination was rejected
    Incomplete(u32),
}

/// Shape of a float uniform write: component count per element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloatShape {
    Scalar,
    Vec2,
    Vec3,
    Vec4,
    Mat2,
    Mat3,
    Mat4,
}

impl FloatShape {
    /// Number of floats in one element of this shape
    pub fn components(&self) -> usize {
        match self {
            FloatShape::Scalar => 1,
            FloatShape::Vec2 => 2,
            FloatShape::Vec3 => 3,
            FloatShape::Vec4 | FloatShape::Mat2 => 4,
            FloatShape::Mat3 => 9,
            FloatShape::Mat4 => 16,
        }
    }

    /// Human-readable label used in argument errors
    pub fn label(&self) -> &'static str {
        match self {
            FloatShape::Scalar => "float",
            FloatShape::Vec2 => "vec2",
            FloatShape::Vec3 => "vec3",
            FloatShape::Vec4 => "vec4",
            FloatShape::Mat2 => "mat2 (2x2)",
            FloatShape::Mat3 => "mat3 (3x3)",
            FloatShape::Mat4 => "mat4 (4x4)",
        }
    }
}

/// Driver-reported error code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorCode {
    InvalidEnum,
    InvalidValue,
    InvalidOperation,
    InvalidFramebufferOperation,
    OutOfMemory,
    /// Any code the backend has no variant for
    Other(u32),
}

impl fmt::Display for ApiErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiErrorCode::InvalidEnum => write!(f, "invalid enum"),
            ApiErrorCode::InvalidValue => write!(f, "invalid value"),
            ApiErrorCode::InvalidOperation => write!(f, "invalid operation"),
            ApiErrorCode::InvalidFramebufferOperation => write!(f, "invalid framebuffer operation"),
            ApiErrorCode::OutOfMemory => write!(f, "out of memory"),
            ApiErrorCode::Other(code) => write!(f, "unknown error ({:#06x})", code),
        }
    }
}

bitflags! {
    /// Buffers cleared by `GraphicsApi::clear`
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ClearFlags: u32 {
        const COLOR = 1 << 0;
        const DEPTH = 1 << 1;
        const STENCIL = 1 << 2;
    }
}

// ============================================================================
// GraphicsApi trait
// ============================================================================

/// Stateful graphics API boundary
///
/// Calls never return errors directly: as with the underlying driver, errors
/// are queued and drained with `get_error()`. Callers check eagerly after
/// each call (see `graphics_api::check`). Object handles are plain `u32`
/// names, `0` meaning "no object".
pub trait GraphicsApi: Send {
    /// Pop the oldest queued error, `None` when the queue is empty
    fn get_error(&mut self) -> Option<ApiErrorCode>;

    // ===== Buffers =====

    fn gen_buffer(&mut self) -> u32;
    fn bind_buffer(&mut self, target: BufferTarget, buffer: u32);
    /// (Re)allocate the bound buffer with `data` as its full contents
    fn buffer_data(&mut self, target: BufferTarget, data: &[u8], usage: BufferUsage);
    /// Overwrite part of the bound buffer's existing allocation
    fn buffer_sub_data(&mut self, target: BufferTarget, offset: usize, data: &[u8]);
    fn delete_buffer(&mut self, buffer: u32);

    // ===== Vertex arrays =====

    fn gen_vertex_array(&mut self) -> u32;
    fn bind_vertex_array(&mut self, vertex_array: u32);
    /// Tightly packed float attribute sourced from the bound array buffer
    fn vertex_attrib_pointer(&mut self, index: u32, components: u32);
    fn enable_vertex_attrib_array(&mut self, index: u32);
    fn delete_vertex_array(&mut self, vertex_array: u32);

    // ===== Draws =====

    fn draw_arrays(&mut self, topology: PrimitiveTopology, first: u32, count: u32);
    /// Indexed draw with 32-bit unsigned indices from the bound element buffer
    fn draw_elements(&mut self, topology: PrimitiveTopology, count: u32);

    // ===== Textures =====

    fn gen_texture(&mut self) -> u32;
    fn bind_texture(&mut self, target: TextureTarget, texture: u32);
    fn tex_parameter(&mut self, target: TextureTarget, parameter: TextureParameter);
    /// Allocate storage for `level`; `pixels` of `None` leaves contents undefined
    fn tex_image_2d(
        &mut self,
        target: TextureTarget,
        level: u32,
        format: PixelFormat,
        width: u32,
        height: u32,
        pixels: Option<&[u8]>,
    );
    fn generate_mipmap(&mut self, target: TextureTarget);
    fn active_texture(&mut self, unit: u32);
    fn delete_texture(&mut self, texture: u32);

    // ===== Framebuffers =====

    fn gen_framebuffer(&mut self) -> u32;
    /// Bind a framebuffer; `0` is the default (on-screen) framebuffer
    fn bind_framebuffer(&mut self, framebuffer: u32);
    fn framebuffer_texture_2d(&mut self, attachment: FramebufferAttachment, texture: u32);
    fn check_framebuffer_status(&mut self) -> FramebufferStatus;
    fn delete_framebuffer(&mut self, framebuffer: u32);

    // ===== Shaders and programs =====

    fn create_shader(&mut self, stage: ShaderStage) -> u32;
    fn shader_source(&mut self, shader: u32, source: &str);
    fn compile_shader(&mut self, shader: u32);
    fn shader_compile_status(&mut self, shader: u32) -> bool;
    fn shader_info_log(&mut self, shader: u32) -> String;
    fn delete_shader(&mut self, shader: u32);

    fn create_program(&mut self) -> u32;
    fn attach_shader(&mut self, program: u32, shader: u32);
    fn link_program(&mut self, program: u32);
    fn program_link_status(&mut self, program: u32) -> bool;
    fn program_info_log(&mut self, program: u32) -> String;
    fn use_program(&mut self, program: u32);
    fn delete_program(&mut self, program: u32);

    // ===== Uniforms =====

    /// Location of `name` in `program`, `-1` when it does not exist
    fn get_uniform_location(&mut self, program: u32, name: &str) -> i32;
    /// Integer (or sampler / bool) uniform, one int per element
    fn uniform_int(&mut self, location: i32, values: &[i32]);
    /// Float uniform; `values.len()` is a multiple of `shape.components()`
    fn uniform_float(&mut self, location: i32, shape: FloatShape, values: &[f32]);

    // ===== Fixed-function state =====

    fn set_capability(&mut self, capability: Capability, enabled: bool);
    fn depth_mask(&mut self, enabled: bool);
    fn blend_func_separate(
        &mut self,
        src_rgb: BlendFactor,
        dst_rgb: BlendFactor,
        src_alpha: BlendFactor,
        dst_alpha: BlendFactor,
    );
    fn clear_color(&mut self, color: [f32; 4]);
    fn clear(&mut self, flags: ClearFlags);
    fn viewport(&mut self, x: i32, y: i32, width: u32, height: u32);
}
