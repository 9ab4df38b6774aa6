/// Renderer capability - scene logic driven by the surface lifecycle

use crate::error::Result;
use crate::render::RenderContext;

/// Implemented by whatever draws into the surface
///
/// GPU resources are built and resized inside these callbacks only; they are
/// all invoked on the render thread.
pub trait Renderer {
    /// The rendering surface (and its graphics context) now exists
    fn on_surface_created(&mut self, ctx: &mut RenderContext) -> Result<()>;

    /// The surface was resized; the viewport is already updated
    fn on_surface_changed(&mut self, ctx: &mut RenderContext, width: u32, height: u32) -> Result<()>;

    /// Draw one frame; the default framebuffer is already cleared
    fn on_draw_frame(&mut self, ctx: &mut RenderContext) -> Result<()>;
}
