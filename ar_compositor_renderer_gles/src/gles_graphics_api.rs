/// OpenGL ES 3.0 implementation of GraphicsApi
///
/// Every method is a direct driver call; errors stay queued in the driver
/// until the compositor drains them with `get_error`. All calls must be
/// made on the thread whose GL context is current.

use std::ffi::{c_void, CString};
use std::ptr;

use gl::types::{GLboolean, GLchar, GLint, GLsizei, GLsizeiptr, GLintptr, GLuint};

use ar_compositor::ar::graphics_api::{
    ApiErrorCode, BlendFactor, BufferTarget, BufferUsage, Capability, ClearFlags, FloatShape,
    FramebufferAttachment, FramebufferStatus, GraphicsApi, PixelFormat, PrimitiveTopology,
    ShaderStage, TextureParameter, TextureTarget,
};

use crate::gles_format;

const SOURCE: &str = "ar::GlesGraphicsApi";

/// GLES backend
///
/// Function pointers are process-wide, so the struct itself holds no state.
pub struct GlesGraphicsApi {
    _private: (),
}

impl GlesGraphicsApi {
    /// Load GL entry points through `loader` (eglGetProcAddress or the
    /// windowing library's equivalent)
    ///
    /// The context the entry points belong to must be current.
    pub fn load_with<F>(loader: F) -> Self
    where
        F: FnMut(&'static str) -> *const c_void,
    {
        gl::load_with(loader);
        let api = Self { _private: () };
        ar_compositor::ar_info!(SOURCE, "GLES backend loaded: {}", api.version_string());
        api
    }

    /// GL_VERSION of the current context
    pub fn version_string(&self) -> String {
        unsafe {
            let version = gl::GetString(gl::VERSION);
            if version.is_null() {
                return String::from("unknown");
            }
            std::ffi::CStr::from_ptr(version as *const std::ffi::c_char)
                .to_string_lossy()
                .into_owned()
        }
    }
}

fn gen_one(generate: unsafe fn(GLsizei, *mut GLuint)) -> u32 {
    let mut id: GLuint = 0;
    unsafe { generate(1, &mut id) };
    id
}

fn delete_one(delete: unsafe fn(GLsizei, *const GLuint), id: u32) {
    unsafe { delete(1, &id) };
}

fn gl_bool(value: bool) -> GLboolean {
    if value { gl::TRUE } else { gl::FALSE }
}

/// Read an info log whose length is reported by `length_query`
fn info_log(
    object: GLuint,
    get_iv: unsafe fn(GLuint, gl::types::GLenum, *mut GLint),
    get_log: unsafe fn(GLuint, GLsizei, *mut GLsizei, *mut GLchar),
) -> String {
    let mut length: GLint = 0;
    unsafe { get_iv(object, gl::INFO_LOG_LENGTH, &mut length) };
    if length <= 0 {
        return String::new();
    }
    let mut buffer = vec![0u8; length as usize];
    let mut written: GLsizei = 0;
    unsafe { get_log(object, length, &mut written, buffer.as_mut_ptr() as *mut GLchar) };
    buffer.truncate(written.max(0) as usize);
    String::from_utf8_lossy(&buffer).trim_end().to_string()
}

impl GraphicsApi for GlesGraphicsApi {
    fn get_error(&mut self) -> Option<ApiErrorCode> {
        gles_format::api_error_code(unsafe { gl::GetError() })
    }

    // ===== Buffers =====

    fn gen_buffer(&mut self) -> u32 {
        gen_one(gl::GenBuffers)
    }

    fn bind_buffer(&mut self, target: BufferTarget, buffer: u32) {
        unsafe { gl::BindBuffer(gles_format::buffer_target(target), buffer) };
    }

    fn buffer_data(&mut self, target: BufferTarget, data: &[u8], usage: BufferUsage) {
        unsafe {
            gl::BufferData(
                gles_format::buffer_target(target),
                data.len() as GLsizeiptr,
                data.as_ptr() as *const c_void,
                gles_format::buffer_usage(usage),
            )
        };
    }

    fn buffer_sub_data(&mut self, target: BufferTarget, offset: usize, data: &[u8]) {
        unsafe {
            gl::BufferSubData(
                gles_format::buffer_target(target),
                offset as GLintptr,
                data.len() as GLsizeiptr,
                data.as_ptr() as *const c_void,
            )
        };
    }

    fn delete_buffer(&mut self, buffer: u32) {
        delete_one(gl::DeleteBuffers, buffer);
    }

    // ===== Vertex arrays =====

    fn gen_vertex_array(&mut self) -> u32 {
        gen_one(gl::GenVertexArrays)
    }

    fn bind_vertex_array(&mut self, vertex_array: u32) {
        unsafe { gl::BindVertexArray(vertex_array) };
    }

    fn vertex_attrib_pointer(&mut self, index: u32, components: u32) {
        unsafe {
            gl::VertexAttribPointer(index, components as GLint, gl::FLOAT, gl::FALSE, 0, ptr::null())
        };
    }

    fn enable_vertex_attrib_array(&mut self, index: u32) {
        unsafe { gl::EnableVertexAttribArray(index) };
    }

    fn delete_vertex_array(&mut self, vertex_array: u32) {
        delete_one(gl::DeleteVertexArrays, vertex_array);
    }

    // ===== Draws =====

    fn draw_arrays(&mut self, topology: PrimitiveTopology, first: u32, count: u32) {
        unsafe {
            gl::DrawArrays(gles_format::primitive_topology(topology), first as GLint, count as GLsizei)
        };
    }

    fn draw_elements(&mut self, topology: PrimitiveTopology, count: u32) {
        unsafe {
            gl::DrawElements(
                gles_format::primitive_topology(topology),
                count as GLsizei,
                gl::UNSIGNED_INT,
                ptr::null(),
            )
        };
    }

    // ===== Textures =====

    fn gen_texture(&mut self) -> u32 {
        gen_one(gl::GenTextures)
    }

    fn bind_texture(&mut self, target: TextureTarget, texture: u32) {
        unsafe { gl::BindTexture(gles_format::texture_target(target), texture) };
    }

    fn tex_parameter(&mut self, target: TextureTarget, parameter: TextureParameter) {
        let (name, value) = gles_format::texture_parameter(parameter);
        unsafe { gl::TexParameteri(gles_format::texture_target(target), name, value) };
    }

    fn tex_image_2d(
        &mut self,
        target: TextureTarget,
        level: u32,
        format: PixelFormat,
        width: u32,
        height: u32,
        pixels: Option<&[u8]>,
    ) {
        let layout = gles_format::pixel_layout(format);
        let data = pixels.map_or(ptr::null(), |p| p.as_ptr() as *const c_void);
        unsafe {
            // Rows of 2-byte depth texels are not 4-byte aligned in general
            gl::PixelStorei(gl::UNPACK_ALIGNMENT, 1);
            gl::TexImage2D(
                gles_format::texture_target(target),
                level as GLint,
                layout.internal_format,
                width as GLsizei,
                height as GLsizei,
                0,
                layout.format,
                layout.data_type,
                data,
            )
        };
    }

    fn generate_mipmap(&mut self, target: TextureTarget) {
        unsafe { gl::GenerateMipmap(gles_format::texture_target(target)) };
    }

    fn active_texture(&mut self, unit: u32) {
        unsafe { gl::ActiveTexture(gl::TEXTURE0 + unit) };
    }

    fn delete_texture(&mut self, texture: u32) {
        delete_one(gl::DeleteTextures, texture);
    }

    // ===== Framebuffers =====

    fn gen_framebuffer(&mut self) -> u32 {
        gen_one(gl::GenFramebuffers)
    }

    fn bind_framebuffer(&mut self, framebuffer: u32) {
        unsafe { gl::BindFramebuffer(gl::FRAMEBUFFER, framebuffer) };
    }

    fn framebuffer_texture_2d(&mut self, attachment: FramebufferAttachment, texture: u32) {
        unsafe {
            gl::FramebufferTexture2D(
                gl::FRAMEBUFFER,
                gles_format::framebuffer_attachment(attachment),
                gl::TEXTURE_2D,
                texture,
                0,
            )
        };
    }

    fn check_framebuffer_status(&mut self) -> FramebufferStatus {
        gles_format::framebuffer_status(unsafe { gl::CheckFramebufferStatus(gl::FRAMEBUFFER) })
    }

    fn delete_framebuffer(&mut self, framebuffer: u32) {
        delete_one(gl::DeleteFramebuffers, framebuffer);
    }

    // ===== Shaders and programs =====

    fn create_shader(&mut self, stage: ShaderStage) -> u32 {
        unsafe { gl::CreateShader(gles_format::shader_stage(stage)) }
    }

    fn shader_source(&mut self, shader: u32, source: &str) {
        let text = source.as_ptr() as *const GLchar;
        let length = source.len() as GLint;
        unsafe { gl::ShaderSource(shader, 1, &text, &length) };
    }

    fn compile_shader(&mut self, shader: u32) {
        unsafe { gl::CompileShader(shader) };
    }

    fn shader_compile_status(&mut self, shader: u32) -> bool {
        let mut status: GLint = 0;
        unsafe { gl::GetShaderiv(shader, gl::COMPILE_STATUS, &mut status) };
        status == gl::TRUE as GLint
    }

    fn shader_info_log(&mut self, shader: u32) -> String {
        info_log(shader, gl::GetShaderiv, gl::GetShaderInfoLog)
    }

    fn delete_shader(&mut self, shader: u32) {
        unsafe { gl::DeleteShader(shader) };
    }

    fn create_program(&mut self) -> u32 {
        unsafe { gl::CreateProgram() }
    }

    fn attach_shader(&mut self, program: u32, shader: u32) {
        unsafe { gl::AttachShader(program, shader) };
    }

    fn link_program(&mut self, program: u32) {
        unsafe { gl::LinkProgram(program) };
    }

    fn program_link_status(&mut self, program: u32) -> bool {
        let mut status: GLint = 0;
        unsafe { gl::GetProgramiv(program, gl::LINK_STATUS, &mut status) };
        status == gl::TRUE as GLint
    }

    fn program_info_log(&mut self, program: u32) -> String {
        info_log(program, gl::GetProgramiv, gl::GetProgramInfoLog)
    }

    fn use_program(&mut self, program: u32) {
        unsafe { gl::UseProgram(program) };
    }

    fn delete_program(&mut self, program: u32) {
        unsafe { gl::DeleteProgram(program) };
    }

    // ===== Uniforms =====

    fn get_uniform_location(&mut self, program: u32, name: &str) -> i32 {
        match CString::new(name) {
            Ok(name) => unsafe { gl::GetUniformLocation(program, name.as_ptr()) },
            // A name with an interior NUL cannot exist in a program
            Err(_) => -1,
        }
    }

    fn uniform_int(&mut self, location: i32, values: &[i32]) {
        unsafe { gl::Uniform1iv(location, values.len() as GLsizei, values.as_ptr()) };
    }

    fn uniform_float(&mut self, location: i32, shape: FloatShape, values: &[f32]) {
        let count = (values.len() / shape.components()) as GLsizei;
        let data = values.as_ptr();
        unsafe {
            match shape {
                FloatShape::Scalar => gl::Uniform1fv(location, count, data),
                FloatShape::Vec2 => gl::Uniform2fv(location, count, data),
                FloatShape::Vec3 => gl::Uniform3fv(location, count, data),
                FloatShape::Vec4 => gl::Uniform4fv(location, count, data),
                FloatShape::Mat2 => gl::UniformMatrix2fv(location, count, gl::FALSE, data),
                FloatShape::Mat3 => gl::UniformMatrix3fv(location, count, gl::FALSE, data),
                FloatShape::Mat4 => gl::UniformMatrix4fv(location, count, gl::FALSE, data),
            }
        };
    }

    // ===== Fixed-function state =====

    fn set_capability(&mut self, capability: Capability, enabled: bool) {
        let capability = gles_format::capability(capability);
        unsafe {
            if enabled {
                gl::Enable(capability)
            } else {
                gl::Disable(capability)
            }
        };
    }

    fn depth_mask(&mut self, enabled: bool) {
        unsafe { gl::DepthMask(gl_bool(enabled)) };
    }

    fn blend_func_separate(
        &mut self,
        src_rgb: BlendFactor,
        dst_rgb: BlendFactor,
        src_alpha: BlendFactor,
        dst_alpha: BlendFactor,
    ) {
        unsafe {
            gl::BlendFuncSeparate(
                gles_format::blend_factor(src_rgb),
                gles_format::blend_factor(dst_rgb),
                gles_format::blend_factor(src_alpha),
                gles_format::blend_factor(dst_alpha),
            )
        };
    }

    fn clear_color(&mut self, color: [f32; 4]) {
        unsafe { gl::ClearColor(color[0], color[1], color[2], color[3]) };
    }

    fn clear(&mut self, flags: ClearFlags) {
        unsafe { gl::Clear(gles_format::clear_mask(flags)) };
    }

    fn viewport(&mut self, x: i32, y: i32, width: u32, height: u32) {
        unsafe { gl::Viewport(x, y, width as GLsizei, height as GLsizei) };
    }
}
