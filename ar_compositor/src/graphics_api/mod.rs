/// Graphics API module - the driver boundary and its checking helpers

// Module declarations
pub mod graphics_api;
pub mod check;

// Re-export everything from graphics_api.rs
pub use graphics_api::*;

// Re-export checking helpers
pub use check::*;

// Mock graphics API for tests (no GPU required)
#[cfg(test)]
pub mod mock_graphics_api;
