/// Drawables and helpers shared by the composer unit tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use crate::camera::Camera;
use crate::composer::{Drawable, Pass, PassContext, SharedFrameBuffer};
use crate::device::CommandList;
use crate::device::mock_graphics_device::MockGraphicsDevice;
use crate::device::GraphicsDevice;
use crate::error::Result;
use crate::frame::FrameContext;

/// Draws once per frame, labelling the draw `<label>#<n>`
pub struct MarkerScene {
    label: String,
    draws: AtomicU32,
}

impl MarkerScene {
    pub fn shared(label: &str) -> Arc<dyn Drawable> {
        Arc::new(Self { label: label.to_string(), draws: AtomicU32::new(0) })
    }
}

impl Drawable for MarkerScene {
    fn draw(&self, _camera: &Camera, cmd: &mut dyn CommandList) -> Result<()> {
        let n = self.draws.fetch_add(1, Ordering::SeqCst);
        cmd.insert_debug_marker(&format!("{}#{}", self.label, n))?;
        cmd.draw(3, 0)
    }
}

/// Always fails to draw
pub struct FailingScene;

impl Drawable for FailingScene {
    fn draw(&self, _camera: &Camera, _cmd: &mut dyn CommandList) -> Result<()> {
        Err(crate::error::Error::BackendError("scene exploded".to_string()))
    }
}

/// Record and submit a single pass (render + end_frame) outside a composer
pub fn run_pass(
    device: &mut MockGraphicsDevice,
    pass: &mut dyn Pass,
    input: Option<&SharedFrameBuffer>,
) -> Result<Option<SharedFrameBuffer>> {
    let frame = FrameContext::new(0.016, 1.0);
    let mut cmd = device.create_command_list()?;
    cmd.begin()?;
    let output = {
        let mut ctx = PassContext { device: &mut *device, cmd: cmd.as_mut(), frame: &frame };
        let output = pass.render(&mut ctx, input);
        pass.end_frame(&mut ctx)?;
        output
    };
    cmd.end()?;
    device.submit(&[cmd.as_ref()])?;
    output
}
