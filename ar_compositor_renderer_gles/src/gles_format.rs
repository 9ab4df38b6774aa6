/// Translation table between compositor variants and GLES constants
///
/// Pure functions, no context required.

use gl::types::{GLbitfield, GLenum, GLint};

use ar_compositor::ar::graphics_api::{
    ApiErrorCode, BlendFactor, BufferTarget, BufferUsage, Capability, ClearFlags,
    FramebufferAttachment, FramebufferStatus, PixelFormat, PrimitiveTopology, ShaderStage,
    TextureFilter, TextureParameter, TextureTarget, WrapMode,
};

/// GL_TEXTURE_EXTERNAL_OES (OES_EGL_image_external), absent from the core bindings
pub const TEXTURE_EXTERNAL_OES: GLenum = 0x8D65;

/// Internal format plus the upload format/type of a pixel layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelLayout {
    pub internal_format: GLint,
    pub format: GLenum,
    pub data_type: GLenum,
}

pub fn buffer_target(target: BufferTarget) -> GLenum {
    match target {
        BufferTarget::Array => gl::ARRAY_BUFFER,
        BufferTarget::ElementArray => gl::ELEMENT_ARRAY_BUFFER,
    }
}

pub fn buffer_usage(usage: BufferUsage) -> GLenum {
    match usage {
        BufferUsage::StaticDraw => gl::STATIC_DRAW,
        BufferUsage::DynamicDraw => gl::DYNAMIC_DRAW,
    }
}

pub fn texture_target(target: TextureTarget) -> GLenum {
    match target {
        TextureTarget::Texture2D => gl::TEXTURE_2D,
        TextureTarget::External => TEXTURE_EXTERNAL_OES,
        TextureTarget::CubeMap => gl::TEXTURE_CUBE_MAP,
    }
}

pub fn wrap_mode(mode: WrapMode) -> GLenum {
    match mode {
        WrapMode::ClampToEdge => gl::CLAMP_TO_EDGE,
        WrapMode::MirroredRepeat => gl::MIRRORED_REPEAT,
        WrapMode::Repeat => gl::REPEAT,
    }
}

pub fn texture_filter(filter: TextureFilter) -> GLenum {
    match filter {
        TextureFilter::Nearest => gl::NEAREST,
        TextureFilter::Linear => gl::LINEAR,
        TextureFilter::LinearMipmapLinear => gl::LINEAR_MIPMAP_LINEAR,
    }
}

/// `(pname, param)` for `glTexParameteri`
pub fn texture_parameter(parameter: TextureParameter) -> (GLenum, GLint) {
    match parameter {
        TextureParameter::MinFilter(filter) => (gl::TEXTURE_MIN_FILTER, texture_filter(filter) as GLint),
        TextureParameter::MagFilter(filter) => (gl::TEXTURE_MAG_FILTER, texture_filter(filter) as GLint),
        TextureParameter::WrapS(mode) => (gl::TEXTURE_WRAP_S, wrap_mode(mode) as GLint),
        TextureParameter::WrapT(mode) => (gl::TEXTURE_WRAP_T, wrap_mode(mode) as GLint),
        TextureParameter::CompareModeNone => (gl::TEXTURE_COMPARE_MODE, gl::NONE as GLint),
    }
}

pub fn pixel_layout(format: PixelFormat) -> PixelLayout {
    let (internal_format, format, data_type) = match format {
        PixelFormat::Rgba8 => (gl::RGBA8, gl::RGBA, gl::UNSIGNED_BYTE),
        PixelFormat::Srgb8Alpha8 => (gl::SRGB8_ALPHA8, gl::RGBA, gl::UNSIGNED_BYTE),
        PixelFormat::Rg8 => (gl::RG8, gl::RG, gl::UNSIGNED_BYTE),
        PixelFormat::Depth32F => (gl::DEPTH_COMPONENT32F, gl::DEPTH_COMPONENT, gl::FLOAT),
    };
    PixelLayout {
        internal_format: internal_format as GLint,
        format,
        data_type,
    }
}

pub fn primitive_topology(topology: PrimitiveTopology) -> GLenum {
    match topology {
        PrimitiveTopology::Points => gl::POINTS,
        PrimitiveTopology::LineStrip => gl::LINE_STRIP,
        PrimitiveTopology::LineLoop => gl::LINE_LOOP,
        PrimitiveTopology::Lines => gl::LINES,
        PrimitiveTopology::TriangleStrip => gl::TRIANGLE_STRIP,
        PrimitiveTopology::TriangleFan => gl::TRIANGLE_FAN,
        PrimitiveTopology::Triangles => gl::TRIANGLES,
    }
}

pub fn blend_factor(factor: BlendFactor) -> GLenum {
    match factor {
        BlendFactor::Zero => gl::ZERO,
        BlendFactor::One => gl::ONE,
        BlendFactor::SrcColor => gl::SRC_COLOR,
        BlendFactor::OneMinusSrcColor => gl::ONE_MINUS_SRC_COLOR,
        BlendFactor::DstColor => gl::DST_COLOR,
        BlendFactor::OneMinusDstColor => gl::ONE_MINUS_DST_COLOR,
        BlendFactor::SrcAlpha => gl::SRC_ALPHA,
        BlendFactor::OneMinusSrcAlpha => gl::ONE_MINUS_SRC_ALPHA,
        BlendFactor::DstAlpha => gl::DST_ALPHA,
        BlendFactor::OneMinusDstAlpha => gl::ONE_MINUS_DST_ALPHA,
        BlendFactor::ConstantColor => gl::CONSTANT_COLOR,
        BlendFactor::OneMinusConstantColor => gl::ONE_MINUS_CONSTANT_COLOR,
        BlendFactor::ConstantAlpha => gl::CONSTANT_ALPHA,
        BlendFactor::OneMinusConstantAlpha => gl::ONE_MINUS_CONSTANT_ALPHA,
    }
}

pub fn shader_stage(stage: ShaderStage) -> GLenum {
    match stage {
        ShaderStage::Vertex => gl::VERTEX_SHADER,
        ShaderStage::Fragment => gl::FRAGMENT_SHADER,
    }
}

pub fn capability(capability: Capability) -> GLenum {
    match capability {
        Capability::Blend => gl::BLEND,
        Capability::DepthTest => gl::DEPTH_TEST,
    }
}

pub fn framebuffer_attachment(attachment: FramebufferAttachment) -> GLenum {
    match attachment {
        FramebufferAttachment::Color0 => gl::COLOR_ATTACHMENT0,
        FramebufferAttachment::Depth => gl::DEPTH_ATTACHMENT,
    }
}

pub fn clear_mask(flags: ClearFlags) -> GLbitfield {
    let mut mask = 0;
    if flags.contains(ClearFlags::COLOR) {
        mask |= gl::COLOR_BUFFER_BIT;
    }
    if flags.contains(ClearFlags::DEPTH) {
        mask |= gl::DEPTH_BUFFER_BIT;
    }
    if flags.contains(ClearFlags::STENCIL) {
        mask |= gl::STENCIL_BUFFER_BIT;
    }
    mask
}

/// `None` for GL_NO_ERROR
pub fn api_error_code(code: GLenum) -> Option<ApiErrorCode> {
    match code {
        gl::NO_ERROR => None,
        gl::INVALID_ENUM => Some(ApiErrorCode::InvalidEnum),
        gl::INVALID_VALUE => Some(ApiErrorCode::InvalidValue),
        gl::INVALID_OPERATION => Some(ApiErrorCode::InvalidOperation),
        gl::INVALID_FRAMEBUFFER_OPERATION => Some(ApiErrorCode::InvalidFramebufferOperation),
        gl::OUT_OF_MEMORY => Some(ApiErrorCode::OutOfMemory),
        other => Some(ApiErrorCode::Other(other)),
    }
}

pub fn framebuffer_status(status: GLenum) -> FramebufferStatus {
    match status {
        gl::FRAMEBUFFER_COMPLETE => FramebufferStatus::Complete,
        other => FramebufferStatus::Incomplete(other),
    }
}

#[cfg(test)]
#[path = "gles_format_tests.rs"]
mod tests;
