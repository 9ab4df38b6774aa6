/// Assets module - shader sources, images and mesh data by name

pub mod asset_source;
pub mod file_asset_source;
pub mod memory_asset_source;
pub mod image_decoder;

pub use asset_source::*;
pub use file_asset_source::*;
pub use memory_asset_source::*;
pub use image_decoder::*;
