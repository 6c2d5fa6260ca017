/// SavePass - keeps a copy of its input for the next frame.
///
/// During the frame the input is blitted into a pending buffer; only in
/// `end_frame()`, after every pass has rendered, is the pending copy
/// latched into the saved buffer. Readers of `saved_buffer()` therefore
/// always see the previous frame's content, never a half-written one.
/// Before the first latch the saved buffer is blank.

use crate::composer::{FrameBuffer, FrameBufferDesc, Pass, PassContext, PassKind, SharedFrameBuffer};
use crate::device::{GraphicsDevice, TextureFormat};
use crate::error::{Error, Result};

/// Save pass configuration
#[derive(Debug, Clone, Copy)]
pub struct SavePassConfig {
    /// Fixed resolution; `None` follows the input
    pub resolution: Option<(u32, u32)>,
    pub color_format: TextureFormat,
}

impl Default for SavePassConfig {
    fn default() -> Self {
        Self {
            resolution: None,
            color_format: TextureFormat::R16G16B16A16_SFLOAT,
        }
    }
}

/// Save pass
pub struct SavePass {
    name: String,
    config: SavePassConfig,
    pending: SharedFrameBuffer,
    saved: SharedFrameBuffer,
    has_pending: bool,
    frames_saved: u64,
}

impl SavePass {
    pub fn new(device: &mut dyn GraphicsDevice, name: &str, config: SavePassConfig) -> Result<Self> {
        let (width, height) = config.resolution.unwrap_or((1, 1));
        let desc = |suffix: &str| {
            let desc = FrameBufferDesc::new(&format!("{}.{}", name, suffix), width, height, config.color_format)
                .zero_filled();
            if config.resolution.is_some() { desc.fixed_size() } else { desc }
        };
        Ok(Self {
            name: name.to_string(),
            pending: FrameBuffer::new(device, desc("pending"))?,
            saved: FrameBuffer::new(device, desc("saved"))?,
            config,
            has_pending: false,
            frames_saved: 0,
        })
    }

    /// Buffer holding the previous frame's input. Identity never changes.
    pub fn saved_buffer(&self) -> SharedFrameBuffer {
        self.saved.clone()
    }

    pub fn config(&self) -> &SavePassConfig {
        &self.config
    }

    /// Number of completed latches
    pub fn frames_saved(&self) -> u64 {
        self.frames_saved
    }
}

impl Pass for SavePass {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> PassKind {
        PassKind::Save
    }

    fn resize(&mut self, device: &mut dyn GraphicsDevice, width: u32, height: u32) -> Result<()> {
        self.pending.resize(device, width, height)?;
        self.saved.resize(device, width, height)?;
        Ok(())
    }

    fn render(
        &mut self,
        ctx: &mut PassContext<'_>,
        input: Option<&SharedFrameBuffer>,
    ) -> Result<Option<SharedFrameBuffer>> {
        let Some(input) = input else {
            return Err(Error::InvalidResource(format!("save pass '{}' has no input", self.name)));
        };
        let (width, height) = input.size();
        self.pending.ensure(ctx.device, width, height, self.config.color_format, false)?;
        ctx.cmd.blit_texture(&input.color(), &self.pending.color())?;
        self.has_pending = true;
        Ok(Some(input.clone()))
    }

    fn end_frame(&mut self, ctx: &mut PassContext<'_>) -> Result<()> {
        if !self.has_pending {
            return Ok(());
        }
        self.has_pending = false;
        let (width, height) = self.pending.size();
        self.saved.ensure(ctx.device, width, height, self.config.color_format, false)?;
        ctx.cmd.blit_texture(&self.pending.color(), &self.saved.color())?;
        self.frames_saved += 1;
        Ok(())
    }

    fn buffers(&self) -> Vec<SharedFrameBuffer> {
        vec![self.pending.clone(), self.saved.clone()]
    }
}

#[cfg(test)]
#[path = "save_pass_tests.rs"]
mod tests;
