//! GPU resource module
//!
//! RAII wrappers around driver objects: buffers, textures, framebuffers,
//! shader programs and meshes. Every wrapper frees its object on drop and
//! rejects use after an explicit `free`.

pub mod gpu_buffer;
pub mod vertex_buffer;
pub mod texture;
pub mod framebuffer;
pub mod uniform;
pub mod shader;
pub mod mesh;

pub use gpu_buffer::GpuBuffer;
pub use vertex_buffer::{VertexBuffer, IndexBuffer};
pub use texture::{Texture, TextureBinding, TextureStorage};
pub use framebuffer::Framebuffer;
pub use uniform::{UniformSet, UniformValue};
pub use shader::{Shader, PipelineState};
pub use mesh::Mesh;
