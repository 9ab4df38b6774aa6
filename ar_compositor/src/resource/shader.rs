/// Shader - one compiled and linked GPU program
///
/// A Shader carries two pieces of state that are applied on `use_program`:
/// - a `PipelineState` value (depth test / depth write / blend factors)
/// - a `UniformSet` of pending uniform values
///
/// Uniform setters validate their input before touching the GPU, resolve the
/// uniform location once per name and only record the value.

use std::collections::BTreeMap;

use glam::{Mat2, Mat3, Mat4, Vec2, Vec3, Vec4};

use crate::assets::AssetSource;
use crate::error::{Error, Result};
use crate::graphics_api::{
    check, lock_api, lock_api_for_release, log_errors, BlendFactor, Capability, FloatShape,
    GraphicsApi, SharedGraphicsApi, ShaderStage,
};
use crate::render::RenderContext;
use crate::resource::{Texture, UniformSet, UniformValue};

const SOURCE: &str = "ar::Shader";

// ============================================================================
// PipelineState
// ============================================================================

/// Fixed-function state applied each time a shader is used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineState {
    pub depth_test: bool,
    pub depth_write: bool,
    pub src_rgb: BlendFactor,
    pub dst_rgb: BlendFactor,
    pub src_alpha: BlendFactor,
    pub dst_alpha: BlendFactor,
}

impl Default for PipelineState {
    fn default() -> Self {
        Self {
            depth_test: true,
            depth_write: true,
            src_rgb: BlendFactor::One,
            dst_rgb: BlendFactor::Zero,
            src_alpha: BlendFactor::One,
            dst_alpha: BlendFactor::Zero,
        }
    }
}

impl PipelineState {
    fn apply(&self, api: &mut dyn GraphicsApi) -> Result<()> {
        api.blend_func_separate(self.src_rgb, self.dst_rgb, self.src_alpha, self.dst_alpha);
        check(api, "Failed to set blend mode", "blend_func_separate")?;
        api.depth_mask(self.depth_write);
        check(api, "Failed to set depth write mask", "depth_mask")?;
        api.set_capability(Capability::DepthTest, self.depth_test);
        check(api, "Failed to set depth test", "set_capability")
    }
}

// ============================================================================
// Shader
// ============================================================================

pub struct Shader {
    api: SharedGraphicsApi,
    /// GPU handle, 0 once freed
    program_id: u32,
    pipeline: PipelineState,
    uniforms: UniformSet,
}

impl Shader {
    /// Compile and link a program from vertex and fragment source text
    ///
    /// Each `defines` entry becomes a `#define KEY VALUE` line inserted right
    /// after the `#version` line (or prepended when there is none).
    pub fn new(
        ctx: &RenderContext,
        vertex_source: &str,
        fragment_source: &str,
        defines: &BTreeMap<String, String>,
    ) -> Result<Self> {
        let api = ctx.api().clone();
        let defines_code = create_defines_code(defines);

        let mut shader = Self {
            api: api.clone(),
            program_id: 0,
            pipeline: PipelineState::default(),
            uniforms: UniformSet::new(),
        };

        // Stage objects are deleted when `stages` drops, success or failure
        let mut stages = StageObjects { api, ids: Vec::new() };
        let vertex_id = stages.compile(
            ShaderStage::Vertex,
            &insert_defines_code(vertex_source, &defines_code),
        )?;
        let fragment_id = stages.compile(
            ShaderStage::Fragment,
            &insert_defines_code(fragment_source, &defines_code),
        )?;

        shader.link(vertex_id, fragment_id)?;
        Ok(shader)
    }

    /// Build a shader from two named assets
    pub fn from_assets(
        ctx: &RenderContext,
        assets: &dyn AssetSource,
        vertex_name: &str,
        fragment_name: &str,
        defines: &BTreeMap<String, String>,
    ) -> Result<Self> {
        let vertex_source = assets.shader_source(vertex_name)?;
        let fragment_source = assets.shader_source(fragment_name)?;
        let shader = Self::new(ctx, &vertex_source, &fragment_source, defines)?;
        crate::ar_debug!(SOURCE, "Built shader {} + {}", vertex_name, fragment_name);
        Ok(shader)
    }

    fn link(&mut self, vertex_id: u32, fragment_id: u32) -> Result<()> {
        let mut api = lock_api(&self.api)?;
        let program_id = api.create_program();
        // Recorded right away so a failure below still releases the program
        self.program_id = program_id;
        check(&mut *api, "Shader program creation failed", "create_program")?;
        api.attach_shader(program_id, vertex_id);
        check(&mut *api, "Failed to attach vertex shader", "attach_shader")?;
        api.attach_shader(program_id, fragment_id);
        check(&mut *api, "Failed to attach fragment shader", "attach_shader")?;
        api.link_program(program_id);
        check(&mut *api, "Failed to link shader program", "link_program")?;

        if !api.program_link_status(program_id) {
            let log = api.program_info_log(program_id);
            log_errors(&mut *api, SOURCE, "Failed to retrieve shader program info log", "program_info_log");
            return Err(crate::ar_err!(SOURCE, Error::ShaderLinkError(log)));
        }
        Ok(())
    }

    // ===== Pipeline state =====

    pub fn pipeline_state(&self) -> PipelineState {
        self.pipeline
    }

    pub fn set_pipeline_state(&mut self, state: PipelineState) -> &mut Self {
        self.pipeline = state;
        self
    }

    pub fn set_depth_test(&mut self, enabled: bool) -> &mut Self {
        self.pipeline.depth_test = enabled;
        self
    }

    pub fn set_depth_write(&mut self, enabled: bool) -> &mut Self {
        self.pipeline.depth_write = enabled;
        self
    }

    /// Same blend factors for color and alpha
    pub fn set_blend(&mut self, src: BlendFactor, dst: BlendFactor) -> &mut Self {
        self.set_blend_separate(src, dst, src, dst)
    }

    pub fn set_blend_separate(
        &mut self,
        src_rgb: BlendFactor,
        dst_rgb: BlendFactor,
        src_alpha: BlendFactor,
        dst_alpha: BlendFactor,
    ) -> &mut Self {
        self.pipeline.src_rgb = src_rgb;
        self.pipeline.dst_rgb = dst_rgb;
        self.pipeline.src_alpha = src_alpha;
        self.pipeline.dst_alpha = dst_alpha;
        self
    }

    // ===== Uniforms =====

    /// Bind `texture` to the sampler uniform `name`
    ///
    /// The first binding of a name assigns it the next free texture unit;
    /// later bindings of the same name reuse that unit.
    pub fn set_texture(&mut self, name: &str, texture: &Texture) -> Result<&mut Self> {
        let location = self.uniform_location(name)?;
        let unit = self.uniforms.texture_unit(name);
        self.uniforms.insert(
            location,
            UniformValue::Texture {
                unit,
                binding: texture.binding(),
            },
        );
        Ok(self)
    }

    pub fn set_bool(&mut self, name: &str, value: bool) -> Result<&mut Self> {
        self.set_int_values(name, vec![value as i32])
    }

    pub fn set_int(&mut self, name: &str, value: i32) -> Result<&mut Self> {
        self.set_int_values(name, vec![value])
    }

    pub fn set_float(&mut self, name: &str, value: f32) -> Result<&mut Self> {
        self.set_float_values(name, FloatShape::Scalar, &[value])
    }

    pub fn set_vec2(&mut self, name: &str, value: Vec2) -> Result<&mut Self> {
        self.set_float_values(name, FloatShape::Vec2, &value.to_array())
    }

    pub fn set_vec3(&mut self, name: &str, value: Vec3) -> Result<&mut Self> {
        self.set_float_values(name, FloatShape::Vec3, &value.to_array())
    }

    pub fn set_vec4(&mut self, name: &str, value: Vec4) -> Result<&mut Self> {
        self.set_float_values(name, FloatShape::Vec4, &value.to_array())
    }

    /// Column-major 2x2 matrix
    pub fn set_mat2(&mut self, name: &str, value: Mat2) -> Result<&mut Self> {
        self.set_float_values(name, FloatShape::Mat2, &value.to_cols_array())
    }

    /// Column-major 3x3 matrix
    pub fn set_mat3(&mut self, name: &str, value: Mat3) -> Result<&mut Self> {
        self.set_float_values(name, FloatShape::Mat3, &value.to_cols_array())
    }

    /// Column-major 4x4 matrix
    pub fn set_mat4(&mut self, name: &str, value: Mat4) -> Result<&mut Self> {
        self.set_float_values(name, FloatShape::Mat4, &value.to_cols_array())
    }

    pub fn set_bool_array(&mut self, name: &str, values: &[bool]) -> Result<&mut Self> {
        self.set_int_values(name, values.iter().map(|v| *v as i32).collect())
    }

    pub fn set_int_array(&mut self, name: &str, values: &[i32]) -> Result<&mut Self> {
        self.set_int_values(name, values.to_vec())
    }

    pub fn set_float_array(&mut self, name: &str, values: &[f32]) -> Result<&mut Self> {
        self.set_float_values(name, FloatShape::Scalar, values)
    }

    /// Flat array, 2 floats per element
    pub fn set_vec2_array(&mut self, name: &str, values: &[f32]) -> Result<&mut Self> {
        self.set_float_values(name, FloatShape::Vec2, values)
    }

    /// Flat array, 3 floats per element
    pub fn set_vec3_array(&mut self, name: &str, values: &[f32]) -> Result<&mut Self> {
        self.set_float_values(name, FloatShape::Vec3, values)
    }

    /// Flat array, 4 floats per element
    pub fn set_vec4_array(&mut self, name: &str, values: &[f32]) -> Result<&mut Self> {
        self.set_float_values(name, FloatShape::Vec4, values)
    }

    pub fn set_mat2_array(&mut self, name: &str, values: &[f32]) -> Result<&mut Self> {
        self.set_float_values(name, FloatShape::Mat2, values)
    }

    pub fn set_mat3_array(&mut self, name: &str, values: &[f32]) -> Result<&mut Self> {
        self.set_float_values(name, FloatShape::Mat3, values)
    }

    pub fn set_mat4_array(&mut self, name: &str, values: &[f32]) -> Result<&mut Self> {
        self.set_float_values(name, FloatShape::Mat4, values)
    }

    fn set_int_values(&mut self, name: &str, values: Vec<i32>) -> Result<&mut Self> {
        let location = self.uniform_location(name)?;
        self.uniforms.insert(location, UniformValue::Int(values));
        Ok(self)
    }

    fn set_float_values(&mut self, name: &str, shape: FloatShape, values: &[f32]) -> Result<&mut Self> {
        if values.len() % shape.components() != 0 {
            return Err(Error::InvalidArgument(format!(
                "Value array length of uniform '{}' must be divisible by {} ({})",
                name,
                shape.components(),
                shape.label()
            )));
        }
        let location = self.uniform_location(name)?;
        self.uniforms.insert(
            location,
            UniformValue::Float {
                shape,
                values: values.to_vec(),
            },
        );
        Ok(self)
    }

    fn uniform_location(&mut self, name: &str) -> Result<i32> {
        let program_id = self.live_program()?;
        if let Some(location) = self.uniforms.cached_location(name) {
            return Ok(location);
        }
        let location = {
            let mut api = lock_api(&self.api)?;
            let location = api.get_uniform_location(program_id, name);
            check(&mut *api, "Failed to find uniform", "get_uniform_location")?;
            location
        };
        if location == -1 {
            return Err(crate::ar_err!(SOURCE, Error::UnknownUniform(name.to_string())));
        }
        self.uniforms.cache_location(name, location);
        Ok(location)
    }

    // ===== Use =====

    /// Bind the program, apply pipeline state and every pending uniform
    ///
    /// Non-texture uniforms are consumed once applied; texture uniforms stay
    /// pending so later uses rebind them on the same units. The active
    /// texture unit is reset to 0 on every exit path.
    pub fn use_program(&mut self) -> Result<()> {
        let program_id = self.live_program()?;
        let mut api = lock_api(&self.api)?;

        let result = bind_program(&mut *api, program_id, &self.pipeline)
            .and_then(|()| self.uniforms.apply(&mut *api));

        api.active_texture(0);
        log_errors(&mut *api, SOURCE, "Failed to set active texture", "active_texture");

        if let Err(error) = &result {
            crate::ar_error!(SOURCE, "{}", error);
        }
        result
    }

    /// Release the program (idempotent, never fails)
    pub fn free(&mut self) {
        if self.program_id == 0 {
            return;
        }
        let mut api = lock_api_for_release(&self.api);
        api.delete_program(self.program_id);
        log_errors(&mut *api, SOURCE, "Failed to free shader program", "delete_program");
        self.program_id = 0;
    }

    /// GPU handle, 0 once freed
    pub fn program_id(&self) -> u32 {
        self.program_id
    }

    pub fn is_freed(&self) -> bool {
        self.program_id == 0
    }

    /// Pending uniforms (introspection)
    pub fn uniforms(&self) -> &UniformSet {
        &self.uniforms
    }

    fn live_program(&self) -> Result<u32> {
        match self.program_id {
            0 => Err(crate::ar_err!(SOURCE, Error::UseAfterFree("Shader".to_string()))),
            id => Ok(id),
        }
    }
}

impl Drop for Shader {
    fn drop(&mut self) {
        self.free();
    }
}

fn bind_program(api: &mut dyn GraphicsApi, program_id: u32, pipeline: &PipelineState) -> Result<()> {
    api.use_program(program_id);
    check(api, "Failed to use shader program", "use_program")?;
    pipeline.apply(api)
}

// ============================================================================
// Stage compilation
// ============================================================================

/// Shader stage objects alive during construction
struct StageObjects {
    api: SharedGraphicsApi,
    ids: Vec<u32>,
}

impl StageObjects {
    fn compile(&mut self, stage: ShaderStage, source: &str) -> Result<u32> {
        let mut api = lock_api(&self.api)?;
        let shader_id = api.create_shader(stage);
        if shader_id != 0 {
            self.ids.push(shader_id);
        }
        check(&mut *api, "Shader creation failed", "create_shader")?;
        api.shader_source(shader_id, source);
        check(&mut *api, "Shader source failed", "shader_source")?;
        api.compile_shader(shader_id);
        check(&mut *api, "Shader compilation failed", "compile_shader")?;

        if !api.shader_compile_status(shader_id) {
            let log = api.shader_info_log(shader_id);
            log_errors(&mut *api, SOURCE, "Failed to retrieve shader info log", "shader_info_log");
            return Err(crate::ar_err!(SOURCE, Error::ShaderCompileError { stage, log }));
        }
        Ok(shader_id)
    }
}

impl Drop for StageObjects {
    fn drop(&mut self) {
        // Stage objects can go as soon as the program is linked
        let mut api = lock_api_for_release(&self.api);
        for shader_id in self.ids.drain(..) {
            api.delete_shader(shader_id);
            log_errors(&mut *api, SOURCE, "Failed to free shader", "delete_shader");
        }
    }
}

// ============================================================================
// Defines injection
// ============================================================================

fn create_defines_code(defines: &BTreeMap<String, String>) -> String {
    defines
        .iter()
        .map(|(key, value)| format!("#define {} {}\n", key, value))
        .collect()
}

/// `#`, optional blanks, `version`, at least one blank, anything
fn is_version_line(line: &str) -> bool {
    let line = line.trim_end_matches(['\n', '\r']);
    let Some(rest) = line.trim_start().strip_prefix('#') else {
        return false;
    };
    let Some(rest) = rest.trim_start().strip_prefix("version") else {
        return false;
    };
    rest.starts_with(|c: char| c.is_whitespace())
}

/// Insert `defines_code` right after the first version line, keeping the
/// source's own line endings, or prepend it when there is no such line
pub(crate) fn insert_defines_code(source: &str, defines_code: &str) -> String {
    if defines_code.is_empty() {
        return source.to_string();
    }
    let mut result = String::with_capacity(source.len() + defines_code.len() + 1);
    let mut inserted = false;
    for line in source.split_inclusive('\n') {
        result.push_str(line);
        if !inserted && is_version_line(line) {
            if !line.ends_with('\n') {
                result.push('\n');
            }
            result.push_str(defines_code);
            inserted = true;
        }
    }
    if inserted {
        result
    } else {
        format!("{}{}", defines_code, source)
    }
}

#[cfg(test)]
#[path = "shader_tests.rs"]
mod tests;
