//! Multi-pass compositor.
//!
//! A frame is a flat, ordered list of passes: render passes draw a scene,
//! effect passes run full-screen shaders over the previous output, and
//! save passes keep a copy of their input for the next frame. Other
//! subsystems publish pass lists into a [`PipelineRegistry`]; the
//! [`Composer`] splices them in front of its own main render pass.

mod frame_buffer;
mod pass;
mod render_pass;
mod effect;
mod effect_pass;
mod save_pass;
mod pipeline_registry;
mod composer;

pub use frame_buffer::{FrameBuffer, FrameBufferDesc, SharedFrameBuffer};
pub use pass::{Pass, PassKind, PassContext, SharedPass, share};
pub use render_pass::{RenderPass, Drawable};
pub use effect::{Effect, BlendFunction, ColorGrading, ChromaticAberration, Bloom, Noise, Glitch};
pub use effect_pass::EffectPass;
pub use save_pass::{SavePass, SavePassConfig};
pub use pipeline_registry::{PipelineRegistry, SharedPipelineRegistry};
pub use composer::{Composer, ComposerConfig};

// Scenes and helpers for pass tests
#[cfg(test)]
pub(crate) mod test_scenes;
