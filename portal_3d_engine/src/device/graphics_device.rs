/// GraphicsDevice trait - resource factory and command submission

use std::sync::{Arc, Mutex};
use crate::error::Result;
use crate::device::{CommandList, Pipeline, PipelineDesc, Texture, TextureDesc, TextureFormat};

/// Main graphics device trait
///
/// Central factory for GPU resources and the single submission point
/// for recorded command lists. Implemented by backend-specific devices.
pub trait GraphicsDevice: Send + Sync {
    /// Create a texture
    fn create_texture(&mut self, desc: TextureDesc) -> Result<Arc<dyn Texture>>;

    /// Create a graphics pipeline from linked shader source
    fn create_pipeline(&mut self, desc: PipelineDesc) -> Result<Arc<dyn Pipeline>>;

    /// Create a new command list for recording
    fn create_command_list(&self) -> Result<Box<dyn CommandList>>;

    /// Submit recorded command lists for execution, in order
    fn submit(&self, commands: &[&dyn CommandList]) -> Result<()>;

    /// Current size of the visible output surface in pixels
    fn surface_size(&self) -> (u32, u32);

    /// Pixel format of the visible output surface
    fn surface_format(&self) -> TextureFormat;

    /// Notify the device that the output surface has been resized
    fn resize(&mut self, width: u32, height: u32);

    /// Wait for all GPU operations to complete
    fn wait_idle(&self) -> Result<()>;
}

/// Graphics device shared between the composer and scene setup code
pub type SharedDevice = Arc<Mutex<dyn GraphicsDevice>>;
