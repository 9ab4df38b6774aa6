/// RenderContext - rendering root
///
/// Owns the graphics API handle, the window size and the currently bound
/// framebuffer. Framebuffer binding and viewport are global driver state,
/// so both are re-applied before every clear and every draw.

use std::sync::Arc;

use crate::config::{RenderConfig, SurfaceSize};
use crate::error::{Error, Result};
use crate::graphics_api::{check, lock_api, Capability, ClearFlags, SharedGraphicsApi};
use crate::render::{Renderer, SurfaceSignals};
use crate::resource::{Framebuffer, Mesh, Shader};

const SOURCE: &str = "ar::RenderContext";

pub struct RenderContext {
    api: SharedGraphicsApi,
    config: RenderConfig,
    /// Window size, used as the viewport of the default framebuffer
    viewport_size: SurfaceSize,
    bound_framebuffer: u32,
    signals: Arc<SurfaceSignals>,
}

impl RenderContext {
    pub fn new(api: SharedGraphicsApi, config: RenderConfig) -> Self {
        let viewport_size = config.initial_size;
        Self {
            api,
            config,
            viewport_size,
            bound_framebuffer: 0,
            signals: Arc::new(SurfaceSignals::new()),
        }
    }

    pub fn api(&self) -> &SharedGraphicsApi {
        &self.api
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Last reported window size
    pub fn viewport_size(&self) -> SurfaceSize {
        self.viewport_size
    }

    /// Framebuffer bound by the last clear or draw (0 = default)
    pub fn bound_framebuffer(&self) -> u32 {
        self.bound_framebuffer
    }

    /// Handle other threads use to post surface notifications
    pub fn surface_signals(&self) -> Arc<SurfaceSignals> {
        Arc::clone(&self.signals)
    }

    /// Record the window size used for the default framebuffer
    pub fn set_viewport_size(&mut self, width: u32, height: u32) {
        self.viewport_size = SurfaceSize::new(width, height);
    }

    /// Clear `framebuffer` (or the default one) to `color`, depth to 1.0
    pub fn clear(&mut self, framebuffer: Option<&Framebuffer>, color: [f32; 4]) -> Result<()> {
        self.use_framebuffer(framebuffer)?;
        let mut api = lock_api(&self.api)?;
        api.clear_color(color);
        check(&mut *api, "Failed to set clear color", "clear_color")?;
        // Depth writes off would leave the depth buffer untouched
        api.depth_mask(true);
        check(&mut *api, "Failed to enable depth write", "depth_mask")?;
        api.clear(ClearFlags::COLOR | ClearFlags::DEPTH);
        check(&mut *api, "Failed to clear framebuffer", "clear")
    }

    /// Draw `mesh` with `shader` into `framebuffer` (or the default one)
    pub fn draw(&mut self, mesh: &Mesh, shader: &mut Shader, framebuffer: Option<&Framebuffer>) -> Result<()> {
        self.use_framebuffer(framebuffer)?;
        shader.use_program()?;
        mesh.draw()
    }

    fn use_framebuffer(&mut self, framebuffer: Option<&Framebuffer>) -> Result<()> {
        let (framebuffer_id, width, height) = match framebuffer {
            Some(framebuffer) => {
                if framebuffer.is_freed() {
                    return Err(crate::ar_err!(
                        SOURCE,
                        Error::UseAfterFree("Tried to bind a freed Framebuffer".to_string())
                    ));
                }
                (framebuffer.framebuffer_id(), framebuffer.width(), framebuffer.height())
            }
            None => (0, self.viewport_size.width, self.viewport_size.height),
        };

        let mut api = lock_api(&self.api)?;
        api.bind_framebuffer(framebuffer_id);
        check(&mut *api, "Failed to bind framebuffer", "bind_framebuffer")?;
        api.viewport(0, 0, width, height);
        check(&mut *api, "Failed to set viewport", "viewport")?;
        self.bound_framebuffer = framebuffer_id;
        Ok(())
    }

    // ===== SURFACE LIFECYCLE =====

    /// The host surface was created: set global state, then let the renderer build
    pub fn surface_created(&mut self, renderer: &mut dyn Renderer) -> Result<()> {
        {
            let mut api = lock_api(&self.api)?;
            api.set_capability(Capability::Blend, self.config.enable_blending);
            check(&mut *api, "Failed to set blending", "set_capability")?;
        }
        crate::ar_info!(SOURCE, "Surface created");
        renderer.on_surface_created(self)
    }

    /// The host surface was resized
    pub fn surface_changed(&mut self, renderer: &mut dyn Renderer, width: u32, height: u32) -> Result<()> {
        self.set_viewport_size(width, height);
        crate::ar_debug!(SOURCE, "Surface changed to {}x{}", width, height);
        renderer.on_surface_changed(self, width, height)
    }

    /// Draw one frame
    ///
    /// A resize posted through `surface_signals()` is applied first.
    pub fn draw_frame(&mut self, renderer: &mut dyn Renderer) -> Result<()> {
        if let Some(size) = self.signals.take_resize() {
            self.surface_changed(renderer, size.width, size.height)?;
        }
        let clear_color = self.config.clear_color;
        self.clear(None, clear_color)?;
        renderer.on_draw_frame(self)
    }
}

#[cfg(test)]
#[path = "render_context_tests.rs"]
mod tests;
