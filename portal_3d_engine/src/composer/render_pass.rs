/// RenderPass - draws a scene from a camera.
///
/// The pass only holds weak references to its scene and camera; it
/// reports itself unavailable once either has been dropped.

use std::sync::{Arc, PoisonError, RwLock, Weak};
use crate::camera::{Camera, SharedCamera};
use crate::composer::{FrameBuffer, FrameBufferDesc, Pass, PassContext, PassKind, SharedFrameBuffer};
use crate::device::{ClearValue, CommandList, GraphicsDevice, TextureFormat, Viewport};
use crate::error::{Error, Result};

/// Anything that can record draw commands for a camera
pub trait Drawable: Send + Sync {
    fn draw(&self, camera: &Camera, cmd: &mut dyn CommandList) -> Result<()>;
}

/// Scene render pass
pub struct RenderPass {
    name: String,
    scene: Weak<dyn Drawable>,
    camera: Weak<RwLock<Camera>>,
    output: Option<SharedFrameBuffer>,
    color_format: TextureFormat,
    has_depth: bool,
    clear_color: [f32; 4],
    render_to_screen: bool,
    size: Option<(u32, u32)>,
}

impl RenderPass {
    pub fn new(name: &str, scene: &Arc<dyn Drawable>, camera: &SharedCamera) -> Self {
        Self {
            name: name.to_string(),
            scene: Arc::downgrade(scene),
            camera: Arc::downgrade(camera),
            output: None,
            color_format: TextureFormat::R16G16B16A16_SFLOAT,
            has_depth: true,
            clear_color: [0.0, 0.0, 0.0, 1.0],
            render_to_screen: false,
            size: None,
        }
    }

    pub fn with_format(mut self, color_format: TextureFormat, has_depth: bool) -> Self {
        self.color_format = color_format;
        self.has_depth = has_depth;
        self
    }

    pub fn with_clear_color(mut self, clear_color: [f32; 4]) -> Self {
        self.clear_color = clear_color;
        self
    }

    pub fn clear_color(&self) -> [f32; 4] {
        self.clear_color
    }

    /// Off-screen output, once allocated
    pub fn output(&self) -> Option<&SharedFrameBuffer> {
        self.output.as_ref()
    }

    fn ensure_output(&mut self, device: &mut dyn GraphicsDevice) -> Result<SharedFrameBuffer> {
        let (width, height) = self.size.unwrap_or_else(|| device.surface_size());
        match &self.output {
            Some(output) => {
                output.ensure(device, width, height, self.color_format, self.has_depth)?;
                Ok(output.clone())
            }
            None => {
                let desc = FrameBufferDesc::new(&self.name, width, height, self.color_format)
                    .with_depth(self.has_depth);
                let output = FrameBuffer::new(device, desc)?;
                self.output = Some(output.clone());
                Ok(output)
            }
        }
    }
}

impl Pass for RenderPass {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> PassKind {
        PassKind::Render
    }

    fn is_available(&self) -> bool {
        self.scene.strong_count() > 0 && self.camera.strong_count() > 0
    }

    fn set_render_to_screen(&mut self, to_screen: bool) {
        self.render_to_screen = to_screen;
    }

    fn render_to_screen(&self) -> bool {
        self.render_to_screen
    }

    fn resize(&mut self, device: &mut dyn GraphicsDevice, width: u32, height: u32) -> Result<()> {
        self.size = Some((width, height));
        if let Some(output) = &self.output {
            output.resize(device, width, height)?;
        }
        Ok(())
    }

    fn render(
        &mut self,
        ctx: &mut PassContext<'_>,
        _input: Option<&SharedFrameBuffer>,
    ) -> Result<Option<SharedFrameBuffer>> {
        let (Some(scene), Some(camera)) = (self.scene.upgrade(), self.camera.upgrade()) else {
            return Err(Error::InvalidResource(format!("render pass '{}' lost its scene or camera", self.name)));
        };

        let output = if self.render_to_screen {
            None
        } else {
            Some(self.ensure_output(ctx.device)?)
        };
        let (width, height) = match &output {
            Some(output) => output.size(),
            None => ctx.device.surface_size(),
        };
        let color = output.as_ref().map(|output| output.color());
        let depth = output.as_ref().and_then(|output| output.depth());
        let clear_values = [
            ClearValue::Color(self.clear_color),
            ClearValue::DepthStencil { depth: 1.0, stencil: 0 },
        ];

        ctx.cmd.begin_render_pass(color.as_ref(), depth.as_ref(), &clear_values)?;
        ctx.cmd.insert_debug_marker(&self.name)?;
        ctx.cmd.set_viewport(Viewport::full(width, height))?;
        let drawn = {
            let camera = camera.read().unwrap_or_else(PoisonError::into_inner);
            scene.draw(&camera, ctx.cmd)
        };
        ctx.cmd.end_render_pass()?;

        drawn?;
        Ok(output)
    }

    fn buffers(&self) -> Vec<SharedFrameBuffer> {
        self.output.iter().cloned().collect()
    }
}

#[cfg(test)]
#[path = "render_pass_tests.rs"]
mod tests;
