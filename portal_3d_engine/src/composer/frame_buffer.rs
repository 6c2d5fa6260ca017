/// FrameBuffer - off-screen color (+ optional depth) target shared
/// between passes and materials.
///
/// A frame buffer keeps its identity for its whole life: resizing or
/// changing its format swaps the backing textures in place, so anything
/// holding the `SharedFrameBuffer` (a material sampling last frame's
/// output, for instance) always sees the current allocation.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};
use crate::device::{GraphicsDevice, Texture, TextureDesc, TextureFormat, TextureUsage};
use crate::error::{Error, Result};
use crate::engine_debug;

/// Frame buffer shared between its producer and consumers
pub type SharedFrameBuffer = Arc<FrameBuffer>;

/// Descriptor for creating a frame buffer
#[derive(Debug, Clone)]
pub struct FrameBufferDesc {
    /// Debug label (textures get `<label>.color` / `<label>.depth`)
    pub label: String,
    pub width: u32,
    pub height: u32,
    pub color_format: TextureFormat,
    /// Allocate a depth attachment
    pub has_depth: bool,
    /// Ignore surface resizes
    pub fixed_size: bool,
    /// Start (and restart after reallocation) as all-zero
    pub zero_fill: bool,
}

impl FrameBufferDesc {
    pub fn new(label: &str, width: u32, height: u32, color_format: TextureFormat) -> Self {
        Self {
            label: label.to_string(),
            width,
            height,
            color_format,
            has_depth: false,
            fixed_size: false,
            zero_fill: false,
        }
    }

    pub fn with_depth(mut self, has_depth: bool) -> Self {
        self.has_depth = has_depth;
        self
    }

    pub fn fixed_size(mut self) -> Self {
        self.fixed_size = true;
        self
    }

    pub fn zero_filled(mut self) -> Self {
        self.zero_fill = true;
        self
    }
}

struct FrameBufferState {
    width: u32,
    height: u32,
    color_format: TextureFormat,
    has_depth: bool,
    color: Arc<dyn Texture>,
    depth: Option<Arc<dyn Texture>>,
    generation: u64,
}

/// Off-screen render target
pub struct FrameBuffer {
    label: String,
    fixed_size: bool,
    zero_fill: bool,
    state: RwLock<FrameBufferState>,
}

impl FrameBuffer {
    /// Allocate a new frame buffer
    ///
    /// # Errors
    ///
    /// `InvalidResource` for a zero-sized descriptor, or whatever the
    /// device reports for the texture allocations.
    pub fn new(device: &mut dyn GraphicsDevice, desc: FrameBufferDesc) -> Result<SharedFrameBuffer> {
        if desc.width == 0 || desc.height == 0 {
            return Err(Error::InvalidResource(format!(
                "frame buffer '{}' has zero size {}x{}", desc.label, desc.width, desc.height
            )));
        }
        let (color, depth) = allocate(device, &desc.label, desc.width, desc.height, desc.color_format, desc.has_depth, desc.zero_fill)?;

        Ok(Arc::new(Self {
            label: desc.label,
            fixed_size: desc.fixed_size,
            zero_fill: desc.zero_fill,
            state: RwLock::new(FrameBufferState {
                width: desc.width,
                height: desc.height,
                color_format: desc.color_format,
                has_depth: desc.has_depth,
                color,
                depth,
                generation: 0,
            }),
        }))
    }

    /// Small fixed-size, all-zero buffer without depth.
    ///
    /// Stands in wherever a buffer must be sampled before anything has
    /// rendered into it.
    pub fn blank(device: &mut dyn GraphicsDevice, label: &str, format: TextureFormat) -> Result<SharedFrameBuffer> {
        Self::new(device, FrameBufferDesc::new(label, 1, 1, format).fixed_size().zero_filled())
    }

    fn state(&self) -> RwLockReadGuard<'_, FrameBufferState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    // ===== GETTERS =====

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn width(&self) -> u32 {
        self.state().width
    }

    pub fn height(&self) -> u32 {
        self.state().height
    }

    pub fn size(&self) -> (u32, u32) {
        let state = self.state();
        (state.width, state.height)
    }

    pub fn color_format(&self) -> TextureFormat {
        self.state().color_format
    }

    pub fn has_depth(&self) -> bool {
        self.state().has_depth
    }

    pub fn is_fixed_size(&self) -> bool {
        self.fixed_size
    }

    /// Current color texture
    pub fn color(&self) -> Arc<dyn Texture> {
        self.state().color.clone()
    }

    /// Current depth texture, if any
    pub fn depth(&self) -> Option<Arc<dyn Texture>> {
        self.state().depth.clone()
    }

    /// Incremented every time the backing textures are replaced
    pub fn generation(&self) -> u64 {
        self.state().generation
    }

    // ===== REALLOCATION =====

    /// Follow a surface resize. Fixed-size buffers and zero sizes are
    /// ignored.
    ///
    /// Returns true if the textures were reallocated.
    pub fn resize(&self, device: &mut dyn GraphicsDevice, width: u32, height: u32) -> Result<bool> {
        if self.fixed_size {
            return Ok(false);
        }
        if width == 0 || height == 0 {
            engine_debug!("portal3d::FrameBuffer", "'{}' ignoring resize to {}x{}", self.label, width, height);
            return Ok(false);
        }
        let (format, has_depth) = {
            let state = self.state();
            (state.color_format, state.has_depth)
        };
        self.ensure(device, width, height, format, has_depth)
    }

    /// Make the buffer match the expected format, depth attachment and
    /// (unless fixed-size) dimensions, reallocating if anything differs.
    ///
    /// Returns true if the textures were reallocated.
    pub fn ensure(
        &self,
        device: &mut dyn GraphicsDevice,
        width: u32,
        height: u32,
        color_format: TextureFormat,
        has_depth: bool,
    ) -> Result<bool> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let (width, height) = if self.fixed_size || width == 0 || height == 0 {
            (state.width, state.height)
        } else {
            (width, height)
        };
        if state.width == width && state.height == height
            && state.color_format == color_format && state.has_depth == has_depth
        {
            return Ok(false);
        }

        let (color, depth) = allocate(device, &self.label, width, height, color_format, has_depth, self.zero_fill)?;
        engine_debug!("portal3d::FrameBuffer", "'{}' reallocated {}x{} -> {}x{}",
            self.label, state.width, state.height, width, height);
        state.width = width;
        state.height = height;
        state.color_format = color_format;
        state.has_depth = has_depth;
        state.color = color;
        state.depth = depth;
        state.generation += 1;
        Ok(true)
    }
}

fn allocate(
    device: &mut dyn GraphicsDevice,
    label: &str,
    width: u32,
    height: u32,
    color_format: TextureFormat,
    has_depth: bool,
    zero_fill: bool,
) -> Result<(Arc<dyn Texture>, Option<Arc<dyn Texture>>)> {
    let mut color_desc = TextureDesc {
        label: format!("{}.color", label),
        width,
        height,
        format: color_format,
        usage: TextureUsage::SampledAndRenderTarget,
        data: None,
    };
    if zero_fill {
        color_desc.data = Some(vec![0; color_desc.byte_size()]);
    }
    let color = device.create_texture(color_desc)?;

    let depth = if has_depth {
        Some(device.create_texture(TextureDesc {
            label: format!("{}.depth", label),
            width,
            height,
            format: TextureFormat::D32_FLOAT,
            usage: TextureUsage::DepthStencil,
            data: None,
        })?)
    } else {
        None
    };

    Ok((color, depth))
}

#[cfg(test)]
#[path = "frame_buffer_tests.rs"]
mod tests;
