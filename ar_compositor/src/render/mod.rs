/// Render module - the rendering root and its host-facing lifecycle

// Module declarations
pub mod handoff;
pub mod renderer;
pub mod render_context;

// Re-export the public surface
pub use handoff::*;
pub use renderer::*;
pub use render_context::*;
