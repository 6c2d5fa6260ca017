/// Pipeline trait and pipeline descriptor

use crate::device::TextureFormat;

/// Color blending applied when a pipeline writes its target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    /// Overwrite destination
    Opaque,
    /// Classic `src * a + dst * (1 - a)`
    AlphaBlend,
    /// `src + dst`
    Additive,
}

/// Descriptor for creating a graphics pipeline
#[derive(Debug, Clone)]
pub struct PipelineDesc {
    /// Debug label
    pub label: String,
    /// Linked shader source (vertex + fragment entry points)
    pub source: String,
    /// Format of the color attachment the pipeline renders into
    pub color_format: TextureFormat,
    /// Blend state
    pub blend: BlendMode,
    /// Enable depth testing/writing
    pub depth_test: bool,
    /// Size of the push-constant block in bytes
    pub push_constant_size: u32,
}

/// Graphics pipeline resource trait
pub trait Pipeline: Send + Sync {
    /// Debug label given at creation
    fn label(&self) -> &str;
}
