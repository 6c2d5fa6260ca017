/// Pass trait - one step of a composed frame.
///
/// A composed frame is a flat list of passes executed in order. Each pass
/// reads the buffer produced by the previous one, except the first whose
/// input is implicit (a scene render). Exactly one pass per frame writes
/// the visible surface: the last available pass that is not a save pass.

use std::sync::{Arc, Mutex};
use crate::composer::SharedFrameBuffer;
use crate::device::{CommandList, GraphicsDevice};
use crate::error::Result;
use crate::frame::FrameContext;

/// Category of a pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassKind {
    /// Draws a scene from a camera
    Render,
    /// Full-screen image effects over the previous output
    Effect,
    /// Keeps a copy of its input for the next frame
    Save,
}

/// Everything a pass needs to record its work for one frame
pub struct PassContext<'a> {
    pub device: &'a mut dyn GraphicsDevice,
    pub cmd: &'a mut dyn CommandList,
    pub frame: &'a FrameContext,
}

/// One step of a composed frame
pub trait Pass: Send + Sync {
    /// Debug name
    fn name(&self) -> &str;

    /// Category
    fn kind(&self) -> PassKind;

    /// False when the pass cannot run, e.g. its scene or camera was
    /// dropped. Unavailable passes are skipped without error.
    fn is_available(&self) -> bool {
        true
    }

    /// Route the output to the visible surface instead of an off-screen
    /// buffer.
    fn set_render_to_screen(&mut self, _to_screen: bool) {}

    fn render_to_screen(&self) -> bool {
        false
    }

    /// Follow a surface resize
    fn resize(&mut self, device: &mut dyn GraphicsDevice, width: u32, height: u32) -> Result<()>;

    /// Record this pass.
    ///
    /// Returns the buffer downstream passes should read, or `None` when the
    /// output went to the surface.
    fn render(
        &mut self,
        ctx: &mut PassContext<'_>,
        input: Option<&SharedFrameBuffer>,
    ) -> Result<Option<SharedFrameBuffer>>;

    /// Called once after every pass of the frame has rendered
    fn end_frame(&mut self, _ctx: &mut PassContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Buffers owned by this pass
    fn buffers(&self) -> Vec<SharedFrameBuffer> {
        Vec::new()
    }
}

/// Pass shared between the pipeline registry, its creator and the composer
pub type SharedPass = Arc<Mutex<dyn Pass>>;

/// Wrap a pass into its shared form
pub fn share<P: Pass + 'static>(pass: P) -> SharedPass {
    Arc::new(Mutex::new(pass))
}
