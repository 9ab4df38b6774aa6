/// Mesh - vertex streams plus an optional index buffer drawn as one primitive
///
/// Vertex buffer `i` feeds attribute location `i`.

use crate::assets::AssetSource;
use crate::error::{Error, Result};
use crate::graphics_api::{
    check, lock_api, lock_api_for_release, log_errors, BufferTarget, PrimitiveTopology,
    SharedGraphicsApi,
};
use crate::render::RenderContext;
use crate::resource::{IndexBuffer, VertexBuffer};

const SOURCE: &str = "ar::Mesh";

pub struct Mesh {
    api: SharedGraphicsApi,
    topology: PrimitiveTopology,
    /// Vertex array handle, 0 once freed
    vertex_array_id: u32,
    index_buffer: Option<IndexBuffer>,
    vertex_buffers: Vec<VertexBuffer>,
}

impl Mesh {
    /// Bind the buffers into a new vertex array
    pub fn new(
        ctx: &RenderContext,
        topology: PrimitiveTopology,
        index_buffer: Option<IndexBuffer>,
        vertex_buffers: Vec<VertexBuffer>,
    ) -> Result<Self> {
        if vertex_buffers.is_empty() {
            return Err(Error::InvalidArgument(
                "Must pass at least one vertex buffer".to_string(),
            ));
        }

        let api = ctx.api().clone();
        let vertex_array_id = {
            let mut guard = lock_api(&api)?;
            let id = guard.gen_vertex_array();
            if let Err(error) = check(&mut *guard, "Failed to generate a vertex array", "gen_vertex_array") {
                if id != 0 {
                    guard.delete_vertex_array(id);
                    log_errors(&mut *guard, SOURCE, "Failed to free vertex array object", "delete_vertex_array");
                }
                return Err(error);
            }
            id
        };

        // From here on, dropping `mesh` releases the vertex array and buffers
        let mesh = Self {
            api,
            topology,
            vertex_array_id,
            index_buffer,
            vertex_buffers,
        };
        mesh.bind_buffers()?;
        Ok(mesh)
    }

    /// Build a triangle mesh from a mesh asset
    ///
    /// Attribute 0 is the position (3 floats), 1 the texture coordinate (2)
    /// and 2 the normal (3).
    pub fn from_asset(ctx: &RenderContext, assets: &dyn AssetSource, asset_name: &str) -> Result<Self> {
        let data = assets.mesh_data(asset_name)?;
        let vertex_buffers = vec![
            VertexBuffer::new(ctx, 3, Some(&data.positions))?,
            VertexBuffer::new(ctx, 2, Some(&data.tex_coords))?,
            VertexBuffer::new(ctx, 3, Some(&data.normals))?,
        ];
        let index_buffer = IndexBuffer::new(ctx, Some(&data.indices))?;
        let mesh = Mesh::new(ctx, PrimitiveTopology::Triangles, Some(index_buffer), vertex_buffers)?;
        crate::ar_debug!(
            SOURCE,
            "Loaded mesh '{}' ({} vertices, {} indices)",
            asset_name,
            data.positions.len() / 3,
            data.indices.len()
        );
        Ok(mesh)
    }

    fn bind_buffers(&self) -> Result<()> {
        let mut api = lock_api(&self.api)?;
        api.bind_vertex_array(self.vertex_array_id);
        check(&mut *api, "Failed to bind vertex array object", "bind_vertex_array")?;

        if let Some(index_buffer) = &self.index_buffer {
            api.bind_buffer(BufferTarget::ElementArray, index_buffer.buffer_id());
            check(&mut *api, "Failed to bind index buffer", "bind_buffer")?;
        }

        for (location, vertex_buffer) in self.vertex_buffers.iter().enumerate() {
            let location = location as u32;
            api.bind_buffer(BufferTarget::Array, vertex_buffer.buffer_id());
            check(&mut *api, "Failed to bind vertex buffer", "bind_buffer")?;
            api.vertex_attrib_pointer(location, vertex_buffer.entries_per_vertex() as u32);
            check(&mut *api, "Failed to associate vertex buffer with vertex array", "vertex_attrib_pointer")?;
            api.enable_vertex_attrib_array(location);
            check(&mut *api, "Failed to enable vertex buffer", "enable_vertex_attrib_array")?;
        }

        api.bind_vertex_array(0);
        check(&mut *api, "Failed to unbind vertex array object", "bind_vertex_array")
    }

    /// Issue the draw call for this mesh with whatever program is in use
    ///
    /// Without an index buffer every vertex stream must hold the same
    /// number of vertices.
    pub fn draw(&self) -> Result<()> {
        if self.vertex_array_id == 0 {
            return Err(crate::ar_err!(SOURCE, Error::UseAfterFree("Tried to draw a freed Mesh".to_string())));
        }
        if self.vertex_buffers.iter().any(|b| b.is_freed())
            || self.index_buffer.as_ref().is_some_and(|b| b.is_freed())
        {
            return Err(crate::ar_err!(SOURCE, Error::UseAfterFree("Mesh buffer".to_string())));
        }

        let vertex_count = match &self.index_buffer {
            Some(_) => None,
            None => Some(self.consistent_vertex_count()?),
        };

        let mut api = lock_api(&self.api)?;
        api.bind_vertex_array(self.vertex_array_id);
        check(&mut *api, "Failed to bind vertex array object", "bind_vertex_array")?;
        match (&self.index_buffer, vertex_count) {
            (Some(index_buffer), _) => {
                api.draw_elements(self.topology, index_buffer.size() as u32);
                check(&mut *api, "Failed to draw vertex array object with indices", "draw_elements")
            }
            (None, Some(count)) => {
                api.draw_arrays(self.topology, 0, count as u32);
                check(&mut *api, "Failed to draw vertex array object", "draw_arrays")
            }
            (None, None) => Ok(()),
        }
    }

    fn consistent_vertex_count(&self) -> Result<usize> {
        let mut counts = self.vertex_buffers.iter().map(|b| b.number_of_vertices());
        let expected = counts.next().unwrap_or(0);
        match counts.find(|count| *count != expected) {
            Some(found) => Err(crate::ar_err!(
                SOURCE,
                Error::InconsistentVertexCount { expected, found }
            )),
            None => Ok(expected),
        }
    }

    /// Release the vertex array and every owned buffer (idempotent, never fails)
    pub fn free(&mut self) {
        if self.vertex_array_id != 0 {
            let mut api = lock_api_for_release(&self.api);
            api.delete_vertex_array(self.vertex_array_id);
            log_errors(&mut *api, SOURCE, "Failed to free vertex array object", "delete_vertex_array");
            self.vertex_array_id = 0;
        }
        if let Some(index_buffer) = &mut self.index_buffer {
            index_buffer.free();
        }
        for vertex_buffer in &mut self.vertex_buffers {
            vertex_buffer.free();
        }
    }

    pub fn topology(&self) -> PrimitiveTopology {
        self.topology
    }

    pub fn vertex_array_id(&self) -> u32 {
        self.vertex_array_id
    }

    pub fn index_buffer(&self) -> Option<&IndexBuffer> {
        self.index_buffer.as_ref()
    }

    pub fn vertex_buffers(&self) -> &[VertexBuffer] {
        &self.vertex_buffers
    }

    /// Mutable access to one vertex stream, for per-frame updates
    pub fn vertex_buffer_mut(&mut self, index: usize) -> Option<&mut VertexBuffer> {
        self.vertex_buffers.get_mut(index)
    }

    pub fn is_freed(&self) -> bool {
        self.vertex_array_id == 0
    }
}

impl Drop for Mesh {
    fn drop(&mut self) {
        self.free();
    }
}

#[cfg(test)]
#[path = "mesh_tests.rs"]
mod tests;
