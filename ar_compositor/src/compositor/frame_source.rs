/// Per-frame inputs from the tracking session

use glam::Vec2;

use crate::error::{Error, Result};

/// Source of camera frames and display geometry
///
/// Implemented on top of the tracking session; the compositor only sees
/// these calls.
pub trait FrameSource {
    /// True when the display rotated or resized since the previous frame
    fn has_display_geometry_changed(&self) -> bool;

    /// Map quad corners in normalized device coordinates to normalized
    /// camera texture coordinates
    fn transform_ndc_to_texture(&self, corners: &[Vec2; 4]) -> [Vec2; 4];

    /// Latest depth image, if one arrived since the previous frame
    fn acquire_depth_image(&mut self) -> Option<DepthImage>;

    /// Tell the session which texture receives camera images
    fn set_camera_texture(&mut self, _texture_id: u32) {}
}

/// Depth image, two 8-bit channels per pixel (millimeters, little endian)
#[derive(Debug, Clone, PartialEq)]
pub struct DepthImage {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl DepthImage {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidArgument(format!(
                "Depth image must not be empty, got {}x{}",
                width, height
            )));
        }
        let expected = width as usize * height as usize * 2;
        if data.len() != expected {
            return Err(Error::InvalidArgument(format!(
                "{}x{} depth image needs {} bytes, got {}",
                width,
                height,
                expected,
                data.len()
            )));
        }
        Ok(Self { width, height, data })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Width / height ratio used to reproject depth samples
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

#[cfg(test)]
#[path = "frame_source_tests.rs"]
mod tests;
