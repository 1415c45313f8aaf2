/// Graphics device module - handles, state types and the device trait

// Module declarations
pub mod graphics_device;
pub mod buffer;
pub mod render_target;
pub mod shader;
pub mod state;

// Re-export everything from graphics_device.rs
pub use graphics_device::*;

// Re-export from other modules
pub use buffer::*;
pub use render_target::*;
pub use shader::*;
pub use state::*;

// Mock graphics device for tests (no GPU required)
#[cfg(test)]
pub mod mock_graphics_device;
