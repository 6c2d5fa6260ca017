/// CommandList trait - for recording rendering commands

use std::sync::Arc;
use bitflags::bitflags;
use crate::error::Result;
use crate::device::{Pipeline, SamplerDesc, Texture};

bitflags! {
    /// Shader stages a push-constant range is visible to
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ShaderStages: u32 {
        const VERTEX = 0b01;
        const FRAGMENT = 0b10;
    }
}

/// Command list for recording rendering commands
///
/// Commands are recorded and later submitted via `GraphicsDevice::submit()`.
pub trait CommandList: Send + Sync {
    /// Begin recording commands
    fn begin(&mut self) -> Result<()>;

    /// End recording commands
    fn end(&mut self) -> Result<()>;

    /// Begin a render pass
    ///
    /// # Arguments
    ///
    /// * `color` - Color attachment, `None` for the visible output surface
    /// * `depth` - Optional depth attachment
    /// * `clear_values` - Clear values; empty keeps the existing contents
    fn begin_render_pass(
        &mut self,
        color: Option<&Arc<dyn Texture>>,
        depth: Option<&Arc<dyn Texture>>,
        clear_values: &[ClearValue],
    ) -> Result<()>;

    /// End the current render pass
    fn end_render_pass(&mut self) -> Result<()>;

    /// Set the viewport
    fn set_viewport(&mut self, viewport: Viewport) -> Result<()>;

    /// Bind a graphics pipeline
    fn bind_pipeline(&mut self, pipeline: &Arc<dyn Pipeline>) -> Result<()>;

    /// Bind a texture and its sampler state to a texture slot
    fn bind_texture(&mut self, slot: u32, texture: &Arc<dyn Texture>, sampler: &SamplerDesc) -> Result<()>;

    /// Push constants to the bound pipeline
    ///
    /// # Arguments
    ///
    /// * `stages` - Shader stages that will access the push constants
    /// * `offset` - Offset in bytes into push constant range
    /// * `data` - Data to push
    fn push_constants(&mut self, stages: ShaderStages, offset: u32, data: &[u8]) -> Result<()>;

    /// Draw vertices
    fn draw(&mut self, vertex_count: u32, first_vertex: u32) -> Result<()>;

    /// Scaled, filtered copy of `src` into `dst` (outside any render pass)
    fn blit_texture(&mut self, src: &Arc<dyn Texture>, dst: &Arc<dyn Texture>) -> Result<()>;

    /// Scaled, filtered copy of `src` onto the visible output surface
    /// (outside any render pass)
    fn blit_to_surface(&mut self, src: &Arc<dyn Texture>) -> Result<()>;

    /// Insert a debug label into the command stream
    fn insert_debug_marker(&mut self, label: &str) -> Result<()>;
}

/// Viewport dimensions and depth range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl Viewport {
    /// Full-target viewport with the standard [0, 1] depth range
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: width as f32,
            height: height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }
}

/// Clear value for an attachment
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClearValue {
    /// Color clear value (RGBA)
    Color([f32; 4]),
    /// Depth/stencil clear value
    DepthStencil { depth: f32, stencil: u32 },
}
