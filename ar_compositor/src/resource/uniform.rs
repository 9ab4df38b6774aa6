/// Deferred uniform values and the per-shader pending uniform set
///
/// Setters only record values; they reach the GPU when the shader is used.
/// Texture uniforms stay pending across uses (their unit assignment is
/// sticky) while every other kind is dropped once applied, its value baked
/// into the program.

use std::collections::BTreeMap;
use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::graphics_api::{check, FloatShape, GraphicsApi};
use crate::resource::TextureBinding;

/// One uniform value waiting to be applied
#[derive(Debug, Clone)]
pub enum UniformValue {
    /// Texture sampled through `unit`
    Texture { unit: u32, binding: TextureBinding },
    /// int / bool / sampler values, one per element
    Int(Vec<i32>),
    /// Float values, `shape.components()` per element
    Float { shape: FloatShape, values: Vec<f32> },
}

impl UniformValue {
    /// Write this value to `location` of the program currently in use
    pub fn apply(&self, api: &mut dyn GraphicsApi, location: i32) -> Result<()> {
        match self {
            UniformValue::Texture { unit, binding } => {
                let texture_id = binding.resolve()?;
                api.active_texture(*unit);
                check(api, "Failed to set active texture", "active_texture")?;
                api.bind_texture(binding.target(), texture_id);
                check(api, "Failed to bind texture", "bind_texture")?;
                api.uniform_int(location, &[*unit as i32]);
                check(api, "Failed to set shader texture uniform", "uniform_int")
            }
            UniformValue::Int(values) => {
                api.uniform_int(location, values);
                check(api, "Failed to set shader uniform int", "uniform_int")
            }
            UniformValue::Float { shape, values } => {
                api.uniform_float(location, *shape, values);
                check(api, "Failed to set shader uniform float", "uniform_float")
            }
        }
    }

    pub fn is_texture(&self) -> bool {
        matches!(self, UniformValue::Texture { .. })
    }
}

/// Pending uniforms of one shader plus its name / location / unit tables
#[derive(Debug, Default)]
pub struct UniformSet {
    /// Keyed by location; ordered so application order is deterministic
    pending: BTreeMap<i32, UniformValue>,
    locations: FxHashMap<String, i32>,
    names: FxHashMap<i32, String>,
    /// Uniform name -> texture unit, never reassigned
    texture_units: FxHashMap<String, u32>,
    next_texture_unit: u32,
}

impl UniformSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached location of `name`, if it was resolved before
    pub fn cached_location(&self, name: &str) -> Option<i32> {
        self.locations.get(name).copied()
    }

    pub fn cache_location(&mut self, name: &str, location: i32) {
        self.locations.insert(name.to_string(), location);
        self.names.insert(location, name.to_string());
    }

    /// Texture unit for `name`: the one assigned before, or the next free one
    pub fn texture_unit(&mut self, name: &str) -> u32 {
        if let Some(unit) = self.texture_units.get(name) {
            return *unit;
        }
        let unit = self.next_texture_unit;
        self.next_texture_unit += 1;
        self.texture_units.insert(name.to_string(), unit);
        unit
    }

    pub fn insert(&mut self, location: i32, value: UniformValue) {
        self.pending.insert(location, value);
    }

    pub fn pending(&self, location: i32) -> Option<&UniformValue> {
        self.pending.get(&location)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Apply every pending value, then drop the non-texture ones
    ///
    /// A failure names the uniform it happened on; in that case nothing is
    /// dropped so the next use retries the full set.
    pub fn apply(&mut self, api: &mut dyn GraphicsApi) -> Result<()> {
        for (location, value) in &self.pending {
            if let Err(error) = value.apply(api, *location) {
                let name = self.names.get(location).cloned().unwrap_or_default();
                return Err(Error::UniformApplyError {
                    name,
                    source: Box::new(error),
                });
            }
        }
        self.pending.retain(|_, value| value.is_texture());
        Ok(())
    }
}

#[cfg(test)]
#[path = "uniform_tests.rs"]
mod tests;
