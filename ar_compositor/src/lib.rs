/*!
# AR Compositor

Core types for rendering an augmented-reality view: a live camera image
with a virtual 3D scene composited over it, occluded by real-world depth.

The crate is graphics-API agnostic. Every driver call goes through the
[`GraphicsApi`](graphics_api::GraphicsApi) trait; backends (OpenGL ES, ...)
live in their own crates.

## Architecture

- **GraphicsApi**: stateful driver boundary, checked after every call
- **Resources**: RAII wrappers (GpuBuffer, VertexBuffer, IndexBuffer,
  Texture, Framebuffer, Shader, Mesh) that free their driver object once
- **RenderContext**: framebuffer/viewport binding and the surface lifecycle
- **BackgroundCompositor**: camera background pass plus occlusion pass
- **CompositingRenderer / PointCloudRenderer / LabelRenderer**: ready-made renderers
*/

// Internal modules
mod error;
pub mod log;
pub mod config;
pub mod graphics_api;
pub mod resource;
pub mod assets;
pub mod render;
pub mod compositor;

// Main ar namespace module
pub mod ar {
    // Error types
    pub use crate::error::{Error, Result};

    // Configuration
    pub use crate::config::*;

    // Logging sub-module (types only, macros stay at the crate root)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger, set_logger, reset_logger};
    }

    // Graphics API boundary
    pub mod graphics_api {
        pub use crate::graphics_api::*;
    }

    // GPU resources
    pub mod resource {
        pub use crate::resource::*;
    }

    // Asset access
    pub mod assets {
        pub use crate::assets::*;
    }

    // Rendering root and lifecycle
    pub mod render {
        pub use crate::render::*;
    }

    // Compositing
    pub mod compositor {
        pub use crate::compositor::*;
    }
}

// Re-export error types at crate root
pub use error::{Error, Result};

// Re-export math library at crate root
pub use glam;
