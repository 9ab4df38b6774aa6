/// Scripted FrameSource for unit tests

use std::collections::VecDeque;

use glam::Vec2;

use crate::compositor::{DepthImage, FrameSource};

/// Reports a geometry change when `geometry_changed` is set and hands out
/// queued depth images one per frame
///
/// Its transform maps NDC to texture space with the y axis flipped.
#[derive(Default)]
pub struct FakeFrameSource {
    pub geometry_changed: bool,
    pub depth_images: VecDeque<DepthImage>,
    pub camera_texture: Option<u32>,
}

impl FakeFrameSource {
    pub fn new() -> Self {
        Self {
            geometry_changed: true,
            ..Self::default()
        }
    }

    pub fn with_depth_image(mut self, image: DepthImage) -> Self {
        self.depth_images.push_back(image);
        self
    }

    /// Texture coordinates this source produces for `corner`
    pub fn transform(corner: Vec2) -> Vec2 {
        Vec2::new((corner.x + 1.0) * 0.5, (1.0 - corner.y) * 0.5)
    }
}

impl FrameSource for FakeFrameSource {
    fn has_display_geometry_changed(&self) -> bool {
        self.geometry_changed
    }

    fn transform_ndc_to_texture(&self, corners: &[Vec2; 4]) -> [Vec2; 4] {
        corners.map(Self::transform)
    }

    fn acquire_depth_image(&mut self) -> Option<DepthImage> {
        self.depth_images.pop_front()
    }

    fn set_camera_texture(&mut self, texture_id: u32) {
        self.camera_texture = Some(texture_id);
    }
}
