/// CompositingRenderer - camera background, virtual scene, occlusion pass
///
/// Ready-made `Renderer` for hosts that only need to supply a frame source
/// and a scene. The scene is drawn offscreen, then composited over the
/// camera image by the occlusion pass.

use crate::assets::AssetSource;
use crate::compositor::{BackgroundCompositor, FrameSource};
use crate::config::CompositorConfig;
use crate::error::Result;
use crate::render::{RenderContext, Renderer};
use crate::resource::Framebuffer;

const SOURCE: &str = "ar::CompositingRenderer";

/// Virtual content drawn into the offscreen framebuffer each frame
pub trait VirtualScene {
    /// Build GPU resources; called once the surface exists
    fn on_surface_created(&mut self, _ctx: &mut RenderContext) -> Result<()> {
        Ok(())
    }

    /// Draw the scene into `target` (already cleared)
    fn draw(&mut self, ctx: &mut RenderContext, target: &Framebuffer) -> Result<()>;
}

pub struct CompositingRenderer {
    config: CompositorConfig,
    assets: Box<dyn AssetSource>,
    frame_source: Box<dyn FrameSource>,
    scene: Box<dyn VirtualScene>,
    // Both exist once the surface is created
    compositor: Option<BackgroundCompositor>,
    virtual_scene_framebuffer: Option<Framebuffer>,
}

impl CompositingRenderer {
    pub fn new(
        config: CompositorConfig,
        assets: Box<dyn AssetSource>,
        frame_source: Box<dyn FrameSource>,
        scene: Box<dyn VirtualScene>,
    ) -> Self {
        Self {
            config,
            assets,
            frame_source,
            scene,
            compositor: None,
            virtual_scene_framebuffer: None,
        }
    }

    /// Toggle depth visualization; takes effect immediately if the surface exists
    pub fn set_use_depth_visualization(&mut self, ctx: &RenderContext, enabled: bool) -> Result<()> {
        self.config.use_depth_visualization = enabled;
        match &mut self.compositor {
            Some(compositor) => compositor.set_use_depth_visualization(ctx, &*self.assets, enabled),
            None => Ok(()),
        }
    }

    /// Toggle occlusion; takes effect immediately if the surface exists
    pub fn set_use_occlusion(&mut self, ctx: &RenderContext, enabled: bool) -> Result<()> {
        self.config.use_occlusion = enabled;
        match &mut self.compositor {
            Some(compositor) => compositor.set_use_occlusion(ctx, &*self.assets, enabled),
            None => Ok(()),
        }
    }

    pub fn compositor(&self) -> Option<&BackgroundCompositor> {
        self.compositor.as_ref()
    }

    pub fn virtual_scene_framebuffer(&self) -> Option<&Framebuffer> {
        self.virtual_scene_framebuffer.as_ref()
    }
}

impl Renderer for CompositingRenderer {
    fn on_surface_created(&mut self, ctx: &mut RenderContext) -> Result<()> {
        let compositor = BackgroundCompositor::new(ctx, &*self.assets, self.config.clone())?;
        self.frame_source
            .set_camera_texture(compositor.camera_color_texture().texture_id());
        self.compositor = Some(compositor);
        // Real size arrives with the first surface-changed notification
        self.virtual_scene_framebuffer = Some(Framebuffer::new(ctx, 1, 1)?);
        self.scene.on_surface_created(ctx)
    }

    fn on_surface_changed(&mut self, _ctx: &mut RenderContext, width: u32, height: u32) -> Result<()> {
        match &mut self.virtual_scene_framebuffer {
            Some(framebuffer) => framebuffer.resize(width, height),
            None => Ok(()),
        }
    }

    fn on_draw_frame(&mut self, ctx: &mut RenderContext) -> Result<()> {
        let (Some(compositor), Some(framebuffer)) =
            (self.compositor.as_mut(), self.virtual_scene_framebuffer.as_ref())
        else {
            crate::ar_warn!(SOURCE, "Frame requested before the surface was created");
            return Ok(());
        };

        compositor.prepare_frame(&mut *self.frame_source)?;
        compositor.draw_background(ctx)?;

        ctx.clear(Some(framebuffer), self.config.virtual_scene_clear_color)?;
        self.scene.draw(ctx, framebuffer)?;

        compositor.draw_virtual_scene(ctx, framebuffer, self.config.z_near, self.config.z_far)
    }
}

#[cfg(test)]
#[path = "compositing_renderer_tests.rs"]
mod tests;
