/// Mock GraphicsApi for unit tests (no GPU required)
///
/// Records every call by name, hands out object handles, tracks which
/// objects are alive, and lets tests inject driver errors, compile/link
/// failures and framebuffer status codes.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use crate::config::RenderConfig;
use crate::render::RenderContext;
use crate::graphics_api::{
    ApiErrorCode, BlendFactor, BufferTarget, BufferUsage, Capability, ClearFlags, FloatShape,
    FramebufferAttachment, FramebufferStatus, GraphicsApi, PixelFormat, PrimitiveTopology,
    SharedGraphicsApi, ShaderStage, TextureParameter, TextureTarget,
};

// ============================================================================
// Recorded values
// ============================================================================

/// One `tex_image_2d` call
#[derive(Debug, Clone, PartialEq)]
pub struct TexImageCall {
    pub texture: u32,
    pub target: TextureTarget,
    pub level: u32,
    pub format: PixelFormat,
    pub width: u32,
    pub height: u32,
    pub data_len: Option<usize>,
}

/// One draw call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawCall {
    Arrays { topology: PrimitiveTopology, count: u32 },
    Elements { topology: PrimitiveTopology, count: u32 },
}

/// Recorded uniform write
#[derive(Debug, Clone, PartialEq)]
pub enum UniformWrite {
    Int { location: i32, values: Vec<i32> },
    Float { location: i32, shape: FloatShape, values: Vec<f32> },
}

impl UniformWrite {
    pub fn location(&self) -> i32 {
        match self {
            UniformWrite::Int { location, .. } | UniformWrite::Float { location, .. } => *location,
        }
    }
}

/// Kinds of GPU objects tracked by the mock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Buffer,
    VertexArray,
    Texture,
    Framebuffer,
    Shader,
    Program,
}

// ============================================================================
// MockGraphicsApi
// ============================================================================

pub struct MockGraphicsApi {
    /// Every call, in order, by method name
    pub calls: Vec<String>,
    next_handle: u32,
    live: HashMap<ObjectKind, HashSet<u32>>,

    /// One-shot error injection: after skipping the given number of calls,
    /// the named call queues the code once
    fail_on: HashMap<String, (usize, ApiErrorCode)>,
    pending_errors: VecDeque<ApiErrorCode>,

    /// Stage whose compilation fails, with its log
    pub fail_compile: Option<(ShaderStage, String)>,
    /// Link log when linking fails
    pub fail_link: Option<String>,
    pub framebuffer_status: FramebufferStatus,

    /// Uniform names every program "declares", with their locations
    pub uniform_locations: HashMap<String, i32>,
    pub uniform_writes: Vec<UniformWrite>,

    pub active_unit: u32,
    /// unit -> (target, texture) currently bound
    pub bound_textures: HashMap<u32, (TextureTarget, u32)>,
    pub tex_parameters: Vec<(u32, TextureParameter)>,
    pub tex_images: Vec<TexImageCall>,
    pub mipmaps_generated: Vec<u32>,

    pub bound_buffers: HashMap<BufferTarget, u32>,
    /// buffer -> allocated byte size
    pub buffer_sizes: HashMap<u32, usize>,
    /// buffer -> last uploaded contents
    pub buffer_contents: HashMap<u32, Vec<u8>>,
    pub bound_vertex_array: u32,
    pub attrib_pointers: Vec<(u32, u32, u32)>,

    pub bound_framebuffer: u32,
    pub framebuffer_attachments: HashMap<(u32, u8), u32>,
    pub viewport: (i32, i32, u32, u32),

    /// shader -> (stage, source)
    pub shader_sources: HashMap<u32, (ShaderStage, String)>,
    pub current_program: u32,

    pub capabilities: HashMap<Capability, bool>,
    pub depth_mask: bool,
    pub blend_func: Option<(BlendFactor, BlendFactor, BlendFactor, BlendFactor)>,
    pub clear_color: [f32; 4],
    pub clears: Vec<ClearFlags>,
    pub draws: Vec<DrawCall>,
}

impl Default for MockGraphicsApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGraphicsApi {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            next_handle: 1,
            live: HashMap::new(),
            fail_on: HashMap::new(),
            pending_errors: VecDeque::new(),
            fail_compile: None,
            fail_link: None,
            framebuffer_status: FramebufferStatus::Complete,
            uniform_locations: HashMap::new(),
            uniform_writes: Vec::new(),
            active_unit: 0,
            bound_textures: HashMap::new(),
            tex_parameters: Vec::new(),
            tex_images: Vec::new(),
            mipmaps_generated: Vec::new(),
            bound_buffers: HashMap::new(),
            buffer_sizes: HashMap::new(),
            buffer_contents: HashMap::new(),
            bound_vertex_array: 0,
            attrib_pointers: Vec::new(),
            bound_framebuffer: 0,
            framebuffer_attachments: HashMap::new(),
            viewport: (0, 0, 0, 0),
            shader_sources: HashMap::new(),
            current_program: 0,
            capabilities: HashMap::new(),
            depth_mask: true,
            blend_func: None,
            clear_color: [0.0; 4],
            clears: Vec::new(),
            draws: Vec::new(),
        }
    }

    /// Mock plus the same object as a shared trait handle
    pub fn new_shared() -> (Arc<Mutex<MockGraphicsApi>>, SharedGraphicsApi) {
        let mock = Arc::new(Mutex::new(MockGraphicsApi::new()));
        let api: SharedGraphicsApi = mock.clone();
        (mock, api)
    }

    /// Mock plus a RenderContext driving it
    pub fn new_context() -> (Arc<Mutex<MockGraphicsApi>>, RenderContext) {
        let (mock, api) = Self::new_shared();
        (mock, RenderContext::new(api, RenderConfig::default()))
    }

    /// Declare uniforms with sequential locations starting at 0
    pub fn declare_uniforms(&mut self, names: &[&str]) {
        for name in names {
            let next = self.uniform_locations.len() as i32;
            self.uniform_locations.entry(name.to_string()).or_insert(next);
        }
    }

    /// Make the next call named `call` queue `code`
    pub fn fail_next(&mut self, call: &str, code: ApiErrorCode) {
        self.fail_nth(call, 1, code);
    }

    /// Make the `n`th upcoming call named `call` (1-based) queue `code`
    pub fn fail_nth(&mut self, call: &str, n: usize, code: ApiErrorCode) {
        self.fail_on.insert(call.to_string(), (n.saturating_sub(1), code));
    }

    /// Queue an error right now, as if an earlier call had failed
    pub fn push_error(&mut self, code: ApiErrorCode) {
        self.pending_errors.push_back(code);
    }

    pub fn call_count(&self, call: &str) -> usize {
        self.calls.iter().filter(|c| c.as_str() == call).count()
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    pub fn live_count(&self, kind: ObjectKind) -> usize {
        self.live.get(&kind).map_or(0, |set| set.len())
    }

    pub fn is_live(&self, kind: ObjectKind, handle: u32) -> bool {
        self.live.get(&kind).is_some_and(|set| set.contains(&handle))
    }

    /// Every live object of every kind
    pub fn total_live(&self) -> usize {
        self.live.values().map(|set| set.len()).sum()
    }

    /// Uniform writes that targeted `name`
    pub fn writes_to(&self, name: &str) -> Vec<UniformWrite> {
        match self.uniform_locations.get(name) {
            Some(&location) => self
                .uniform_writes
                .iter()
                .filter(|w| w.location() == location)
                .cloned()
                .collect(),
            None => Vec::new(),
        }
    }

    fn record(&mut self, call: &str) {
        self.calls.push(call.to_string());
        let fire = match self.fail_on.get_mut(call) {
            Some((0, code)) => Some(*code),
            Some((skip, _)) => {
                *skip -= 1;
                None
            }
            None => None,
        };
        if let Some(code) = fire {
            self.fail_on.remove(call);
            self.pending_errors.push_back(code);
        }
    }

    fn allocate(&mut self, kind: ObjectKind) -> u32 {
        let handle = self.next_handle;
        self.next_handle += 1;
        self.live.entry(kind).or_default().insert(handle);
        handle
    }

    fn release(&mut self, kind: ObjectKind, handle: u32) {
        if let Some(set) = self.live.get_mut(&kind) {
            set.remove(&handle);
        }
    }

    fn bound_texture(&self, target: TextureTarget) -> u32 {
        match self.bound_textures.get(&self.active_unit) {
            Some(&(bound_target, texture)) if bound_target == target => texture,
            _ => 0,
        }
    }
}

impl GraphicsApi for MockGraphicsApi {
    fn get_error(&mut self) -> Option<ApiErrorCode> {
        self.pending_errors.pop_front()
    }

    fn gen_buffer(&mut self) -> u32 {
        self.record("gen_buffer");
        self.allocate(ObjectKind::Buffer)
    }

    fn bind_buffer(&mut self, target: BufferTarget, buffer: u32) {
        self.record("bind_buffer");
        self.bound_buffers.insert(target, buffer);
    }

    fn buffer_data(&mut self, target: BufferTarget, data: &[u8], _usage: BufferUsage) {
        self.record("buffer_data");
        let buffer = self.bound_buffers.get(&target).copied().unwrap_or(0);
        self.buffer_sizes.insert(buffer, data.len());
        self.buffer_contents.insert(buffer, data.to_vec());
    }

    fn buffer_sub_data(&mut self, target: BufferTarget, offset: usize, data: &[u8]) {
        self.record("buffer_sub_data");
        let buffer = self.bound_buffers.get(&target).copied().unwrap_or(0);
        let contents = self.buffer_contents.entry(buffer).or_default();
        let end = offset + data.len();
        if contents.len() < end {
            contents.resize(end, 0);
        }
        contents[offset..end].copy_from_slice(data);
    }

    fn delete_buffer(&mut self, buffer: u32) {
        self.record("delete_buffer");
        self.release(ObjectKind::Buffer, buffer);
    }

    fn gen_vertex_array(&mut self) -> u32 {
        self.record("gen_vertex_array");
        self.allocate(ObjectKind::VertexArray)
    }

    fn bind_vertex_array(&mut self, vertex_array: u32) {
        self.record("bind_vertex_array");
        self.bound_vertex_array = vertex_array;
    }

    fn vertex_attrib_pointer(&mut self, index: u32, components: u32) {
        self.record("vertex_attrib_pointer");
        let buffer = self.bound_buffers.get(&BufferTarget::Array).copied().unwrap_or(0);
        self.attrib_pointers.push((index, components, buffer));
    }

    fn enable_vertex_attrib_array(&mut self, _index: u32) {
        self.record("enable_vertex_attrib_array");
    }

    fn delete_vertex_array(&mut self, vertex_array: u32) {
        self.record("delete_vertex_array");
        self.release(ObjectKind::VertexArray, vertex_array);
    }

    fn draw_arrays(&mut self, topology: PrimitiveTopology, _first: u32, count: u32) {
        self.record("draw_arrays");
        self.draws.push(DrawCall::Arrays { topology, count });
    }

    fn draw_elements(&mut self, topology: PrimitiveTopology, count: u32) {
        self.record("draw_elements");
        self.draws.push(DrawCall::Elements { topology, count });
    }

    fn gen_texture(&mut self) -> u32 {
        self.record("gen_texture");
        self.allocate(ObjectKind::Texture)
    }

    fn bind_texture(&mut self, target: TextureTarget, texture: u32) {
        self.record("bind_texture");
        self.bound_textures.insert(self.active_unit, (target, texture));
    }

    fn tex_parameter(&mut self, target: TextureTarget, parameter: TextureParameter) {
        self.record("tex_parameter");
        let texture = self.bound_texture(target);
        self.tex_parameters.push((texture, parameter));
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
        self.record("tex_image_2d");
        let texture = self.bound_texture(target);
        self.tex_images.push(TexImageCall {
            texture,
            target,
            level,
            format,
            width,
            height,
            data_len: pixels.map(|p| p.len()),
        });
    }

    fn generate_mipmap(&mut self, target: TextureTarget) {
        self.record("generate_mipmap");
        let texture = self.bound_texture(target);
        self.mipmaps_generated.push(texture);
    }

    fn active_texture(&mut self, unit: u32) {
        self.record("active_texture");
        self.active_unit = unit;
    }

    fn delete_texture(&mut self, texture: u32) {
        self.record("delete_texture");
        self.release(ObjectKind::Texture, texture);
    }

    fn gen_framebuffer(&mut self) -> u32 {
        self.record("gen_framebuffer");
        self.allocate(ObjectKind::Framebuffer)
    }

    fn bind_framebuffer(&mut self, framebuffer: u32) {
        self.record("bind_framebuffer");
        self.bound_framebuffer = framebuffer;
    }

    fn framebuffer_texture_2d(&mut self, attachment: FramebufferAttachment, texture: u32) {
        self.record("framebuffer_texture_2d");
        let slot = match attachment {
            FramebufferAttachment::Color0 => 0,
            FramebufferAttachment::Depth => 1,
        };
        self.framebuffer_attachments.insert((self.bound_framebuffer, slot), texture);
    }

    fn check_framebuffer_status(&mut self) -> FramebufferStatus {
        self.record("check_framebuffer_status");
        self.framebuffer_status
    }

    fn delete_framebuffer(&mut self, framebuffer: u32) {
        self.record("delete_framebuffer");
        self.release(ObjectKind::Framebuffer, framebuffer);
    }

    fn create_shader(&mut self, stage: ShaderStage) -> u32 {
        self.record("create_shader");
        let shader = self.allocate(ObjectKind::Shader);
        self.shader_sources.insert(shader, (stage, String::new()));
        shader
    }

    fn shader_source(&mut self, shader: u32, source: &str) {
        self.record("shader_source");
        if let Some(entry) = self.shader_sources.get_mut(&shader) {
            entry.1 = source.to_string();
        }
    }

    fn compile_shader(&mut self, _shader: u32) {
        self.record("compile_shader");
    }

    fn shader_compile_status(&mut self, shader: u32) -> bool {
        self.record("shader_compile_status");
        match (&self.fail_compile, self.shader_sources.get(&shader)) {
            (Some((stage, _)), Some((shader_stage, _))) => stage != shader_stage,
            _ => true,
        }
    }

    fn shader_info_log(&mut self, _shader: u32) -> String {
        self.record("shader_info_log");
        self.fail_compile.as_ref().map(|(_, log)| log.clone()).unwrap_or_default()
    }

    fn delete_shader(&mut self, shader: u32) {
        self.record("delete_shader");
        self.release(ObjectKind::Shader, shader);
    }

    fn create_program(&mut self) -> u32 {
        self.record("create_program");
        self.allocate(ObjectKind::Program)
    }

    fn attach_shader(&mut self, _program: u32, _shader: u32) {
        self.record("attach_shader");
    }

    fn link_program(&mut self, _program: u32) {
        self.record("link_program");
    }

    fn program_link_status(&mut self, _program: u32) -> bool {
        self.record("program_link_status");
        self.fail_link.is_none()
    }

    fn program_info_log(&mut self, _program: u32) -> String {
        self.record("program_info_log");
        self.fail_link.clone().unwrap_or_default()
    }

    fn use_program(&mut self, program: u32) {
        self.record("use_program");
        self.current_program = program;
    }

    fn delete_program(&mut self, program: u32) {
        self.record("delete_program");
        self.release(ObjectKind::Program, program);
    }

    fn get_uniform_location(&mut self, _program: u32, name: &str) -> i32 {
        self.record("get_uniform_location");
        self.uniform_locations.get(name).copied().unwrap_or(-1)
    }

    fn uniform_int(&mut self, location: i32, values: &[i32]) {
        self.record("uniform_int");
        self.uniform_writes.push(UniformWrite::Int { location, values: values.to_vec() });
    }

    fn uniform_float(&mut self, location: i32, shape: FloatShape, values: &[f32]) {
        self.record("uniform_float");
        self.uniform_writes.push(UniformWrite::Float { location, shape, values: values.to_vec() });
    }

    fn set_capability(&mut self, capability: Capability, enabled: bool) {
        self.record("set_capability");
        self.capabilities.insert(capability, enabled);
    }

    fn depth_mask(&mut self, enabled: bool) {
        self.record("depth_mask");
        self.depth_mask = enabled;
    }

    fn blend_func_separate(
        &mut self,
        src_rgb: BlendFactor,
        dst_rgb: BlendFactor,
        src_alpha: BlendFactor,
        dst_alpha: BlendFactor,
    ) {
        self.record("blend_func_separate");
        self.blend_func = Some((src_rgb, dst_rgb, src_alpha, dst_alpha));
    }

    fn clear_color(&mut self, color: [f32; 4]) {
        self.record("clear_color");
        self.clear_color = color;
    }

    fn clear(&mut self, flags: ClearFlags) {
        self.record("clear");
        self.clears.push(flags);
    }

    fn viewport(&mut self, x: i32, y: i32, width: u32, height: u32) {
        self.record("viewport");
        self.viewport = (x, y, width, height);
    }
}
