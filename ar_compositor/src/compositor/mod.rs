//! Compositor module
//!
//! Camera background and virtual scene compositing, plus the ready-made
//! renderers built on top of it.

pub mod frame_source;
pub mod background_compositor;
pub mod point_cloud_renderer;
pub mod label_renderer;
pub mod compositing_renderer;

pub use frame_source::{DepthImage, FrameSource};
pub use background_compositor::BackgroundCompositor;
pub use point_cloud_renderer::{PointCloud, PointCloudRenderer};
pub use label_renderer::{LabelRenderer, TextRasterizer, TextTextureCache};
pub use compositing_renderer::{CompositingRenderer, VirtualScene};

// Scripted frame source for tests
#[cfg(test)]
pub mod fake_frame_source;
