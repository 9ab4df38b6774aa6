/// GpuBuffer - one GPU buffer allocation with grow-or-update semantics
///
/// `size` and `capacity` count entries, not bytes. Updates that fit the
/// current capacity overwrite the existing allocation in place; larger
/// updates reallocate and grow the capacity to exactly the new size.

use bytemuck::Pod;
use crate::error::{Error, Result};
use crate::graphics_api::{
    check, lock_api, lock_api_for_release, log_errors, BufferTarget, BufferUsage,
    SharedGraphicsApi,
};

const SOURCE: &str = "ar::GpuBuffer";

pub struct GpuBuffer {
    api: SharedGraphicsApi,
    target: BufferTarget,
    bytes_per_entry: usize,
    /// GPU handle, 0 once freed
    buffer_id: u32,
    size: usize,
    capacity: usize,
}

impl GpuBuffer {
    /// Create a buffer, optionally populated with `entries`
    ///
    /// `T` must be exactly `bytes_per_entry` bytes wide; this is checked
    /// before any GPU call is issued.
    pub fn new<T: Pod>(
        api: &SharedGraphicsApi,
        target: BufferTarget,
        bytes_per_entry: usize,
        entries: Option<&[T]>,
    ) -> Result<Self> {
        validate_entry_width::<T>(bytes_per_entry)?;

        let buffer_id = {
            let mut api = lock_api(api)?;

            // Element array bindings are vertex-array state: unbind so
            // creating a buffer never rewires someone else's mesh
            api.bind_vertex_array(0);
            check(&mut *api, "Failed to unbind vertex array", "bind_vertex_array")?;

            let buffer_id = api.gen_buffer();
            if let Err(error) = check(&mut *api, "Failed to generate buffers", "gen_buffer") {
                if buffer_id != 0 {
                    api.delete_buffer(buffer_id);
                    log_errors(&mut *api, SOURCE, "Failed to free buffer", "delete_buffer");
                }
                return Err(error);
            }
            buffer_id
        };

        // From here on, dropping `buffer` releases the handle
        let mut buffer = Self {
            api: api.clone(),
            target,
            bytes_per_entry,
            buffer_id,
            size: 0,
            capacity: 0,
        };
        buffer.set(entries)?;
        Ok(buffer)
    }

    /// Replace the buffer contents
    ///
    /// `None` or an empty slice sets the size to 0 without touching the GPU.
    pub fn set<T: Pod>(&mut self, entries: Option<&[T]>) -> Result<()> {
        validate_entry_width::<T>(self.bytes_per_entry)?;
        if self.buffer_id == 0 {
            return Err(crate::ar_err!(SOURCE, Error::UseAfterFree("GpuBuffer".to_string())));
        }

        let entries = match entries {
            Some(entries) if !entries.is_empty() => entries,
            _ => {
                self.size = 0;
                return Ok(());
            }
        };
        let bytes: &[u8] = bytemuck::cast_slice(entries);

        let mut api = lock_api(&self.api)?;
        if self.target == BufferTarget::ElementArray {
            api.bind_vertex_array(0);
            check(&mut *api, "Failed to unbind vertex array", "bind_vertex_array")?;
        }
        api.bind_buffer(self.target, self.buffer_id);
        check(&mut *api, "Failed to bind buffer object", "bind_buffer")?;

        if entries.len() <= self.capacity {
            api.buffer_sub_data(self.target, 0, bytes);
            check(&mut *api, "Failed to populate buffer object", "buffer_sub_data")?;
            self.size = entries.len();
        } else {
            api.buffer_data(self.target, bytes, BufferUsage::DynamicDraw);
            check(&mut *api, "Failed to populate buffer object", "buffer_data")?;
            self.size = entries.len();
            self.capacity = entries.len();
        }
        Ok(())
    }

    /// Release the GPU handle (idempotent, never fails)
    pub fn free(&mut self) {
        if self.buffer_id == 0 {
            return;
        }
        let mut api = lock_api_for_release(&self.api);
        api.delete_buffer(self.buffer_id);
        log_errors(&mut *api, SOURCE, "Failed to free buffer object", "delete_buffer");
        self.buffer_id = 0;
    }

    /// GPU handle, 0 once freed
    pub fn buffer_id(&self) -> u32 {
        self.buffer_id
    }

    pub fn target(&self) -> BufferTarget {
        self.target
    }

    /// Number of entries currently stored
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of entries the current allocation can hold
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_freed(&self) -> bool {
        self.buffer_id == 0
    }
}

impl Drop for GpuBuffer {
    fn drop(&mut self) {
        self.free();
    }
}

fn validate_entry_width<T>(bytes_per_entry: usize) -> Result<()> {
    if std::mem::size_of::<T>() != bytes_per_entry {
        return Err(Error::InvalidArgument(format!(
            "Expected entries of {} bytes, got {} bytes",
            bytes_per_entry,
            std::mem::size_of::<T>()
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "gpu_buffer_tests.rs"]
mod tests;
