/// Typed views over a GpuBuffer: per-vertex float streams and index lists

use crate::error::{Error, Result};
use crate::graphics_api::BufferTarget;
use crate::render::RenderContext;
use crate::resource::GpuBuffer;

// ============================================================================
// VertexBuffer
// ============================================================================

/// Per-vertex float attribute stream
///
/// The total entry count must always be a multiple of `entries_per_vertex`.
pub struct VertexBuffer {
    buffer: GpuBuffer,
    entries_per_vertex: usize,
}

impl VertexBuffer {
    /// Create a vertex buffer with `entries_per_vertex` floats per vertex
    pub fn new(
        ctx: &RenderContext,
        entries_per_vertex: usize,
        entries: Option<&[f32]>,
    ) -> Result<Self> {
        if entries_per_vertex == 0 {
            return Err(Error::InvalidArgument(
                "Vertex buffers need at least one entry per vertex".to_string(),
            ));
        }
        validate_stride(entries_per_vertex, entries)?;

        let buffer = GpuBuffer::new(
            ctx.api(),
            BufferTarget::Array,
            std::mem::size_of::<f32>(),
            entries,
        )?;
        Ok(Self {
            buffer,
            entries_per_vertex,
        })
    }

    /// Replace the contents; the stride is re-validated on every call
    pub fn set(&mut self, entries: Option<&[f32]>) -> Result<()> {
        validate_stride(self.entries_per_vertex, entries)?;
        self.buffer.set(entries)
    }

    pub fn free(&mut self) {
        self.buffer.free();
    }

    pub fn buffer_id(&self) -> u32 {
        self.buffer.buffer_id()
    }

    pub fn entries_per_vertex(&self) -> usize {
        self.entries_per_vertex
    }

    pub fn number_of_vertices(&self) -> usize {
        self.buffer.size() / self.entries_per_vertex
    }

    pub fn is_freed(&self) -> bool {
        self.buffer.is_freed()
    }

    /// Underlying buffer (size / capacity introspection)
    pub fn gpu_buffer(&self) -> &GpuBuffer {
        &self.buffer
    }
}

fn validate_stride(entries_per_vertex: usize, entries: Option<&[f32]>) -> Result<()> {
    if let Some(entries) = entries {
        if entries.len() % entries_per_vertex != 0 {
            return Err(Error::InvalidArgument(format!(
                "If non-null, vertex buffer data must be divisible by the number of data points per vertex ({} entries, {} per vertex)",
                entries.len(),
                entries_per_vertex
            )));
        }
    }
    Ok(())
}

// ============================================================================
// IndexBuffer
// ============================================================================

/// 32-bit unsigned primitive indices
pub struct IndexBuffer {
    buffer: GpuBuffer,
}

impl IndexBuffer {
    pub fn new(ctx: &RenderContext, entries: Option<&[u32]>) -> Result<Self> {
        let buffer = GpuBuffer::new(
            ctx.api(),
            BufferTarget::ElementArray,
            std::mem::size_of::<u32>(),
            entries,
        )?;
        Ok(Self { buffer })
    }

    pub fn set(&mut self, entries: Option<&[u32]>) -> Result<()> {
        self.buffer.set(entries)
    }

    pub fn free(&mut self) {
        self.buffer.free();
    }

    pub fn buffer_id(&self) -> u32 {
        self.buffer.buffer_id()
    }

    /// Number of indices
    pub fn size(&self) -> usize {
        self.buffer.size()
    }

    pub fn is_freed(&self) -> bool {
        self.buffer.is_freed()
    }
}

#[cfg(test)]
#[path = "vertex_buffer_tests.rs"]
mod tests;
