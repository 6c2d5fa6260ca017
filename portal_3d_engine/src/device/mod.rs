/// Graphics device module - backend-facing traits and descriptors
///
/// The composer, passes and materials only talk to the GPU through these
/// traits. Concrete backends live outside this crate.

pub mod graphics_device;
pub mod texture;
pub mod pipeline;
pub mod command_list;

pub use graphics_device::*;
pub use texture::*;
pub use pipeline::*;
pub use command_list::*;

// Mock graphics device for tests (no GPU required)
#[cfg(test)]
pub mod mock_graphics_device;
