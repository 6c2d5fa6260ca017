/// HoloFeedback - the pass chain behind the holographic material.
///
/// A hidden scene is rendered on a white background, glitched and
/// grained, and saved. The saved buffer is what `FeedbackMaterial`
/// samples on the next frame. The chain reaches the main composer only
/// through a `PipelineRegistry`.

use std::sync::{Arc, Mutex};
use glam::Vec2;
use crate::camera::{Camera, SharedCamera};
use crate::composer::{
    share, BlendFunction, Drawable, EffectPass, Glitch, Noise, PipelineRegistry, RenderPass,
    SavePass, SavePassConfig, SharedFrameBuffer, SharedPass,
};
use crate::device::{GraphicsDevice, Texture, TextureFormat};
use crate::error::Result;
use crate::engine_info;

/// Holo chain configuration
#[derive(Debug, Clone, Copy)]
pub struct HoloFeedbackConfig {
    pub glitch_strength: Vec2,
    pub noise_opacity: f32,
    pub noise_blend: BlendFunction,
    pub background: [f32; 4],
    /// Format of the render and effect buffers
    pub color_format: TextureFormat,
    pub save: SavePassConfig,
}

impl Default for HoloFeedbackConfig {
    fn default() -> Self {
        Self {
            glitch_strength: Vec2::new(0.1, 0.1),
            noise_opacity: 0.05,
            noise_blend: BlendFunction::ColorDodge,
            background: [1.0, 1.0, 1.0, 1.0],
            color_format: TextureFormat::R16G16B16A16_SFLOAT,
            save: SavePassConfig::default(),
        }
    }
}

/// Owner of the holo scene, its camera and its three passes
pub struct HoloFeedback {
    scene: Arc<dyn Drawable>,
    camera: SharedCamera,
    effect_pass: Arc<Mutex<EffectPass>>,
    saved: SharedFrameBuffer,
    passes: Vec<SharedPass>,
    config: HoloFeedbackConfig,
}

impl HoloFeedback {
    /// Build `[render "holo", effect "glitch", save "feedback"]`.
    ///
    /// The passes only hold weak references to the scene and camera:
    /// once this value is dropped, published passes become unavailable.
    pub fn new(
        device: &mut dyn GraphicsDevice,
        scene: Arc<dyn Drawable>,
        perturbation_map: Arc<dyn Texture>,
        config: HoloFeedbackConfig,
    ) -> Result<Self> {
        let camera = Camera::default().into_shared();
        let render_pass = RenderPass::new("holo", &scene, &camera)
            .with_format(config.color_format, true)
            .with_clear_color(config.background);
        let effect_pass = Arc::new(Mutex::new(
            EffectPass::new("glitch", vec![
                Glitch::new(perturbation_map).with_strength(config.glitch_strength).into(),
                Noise { opacity: config.noise_opacity, blend: config.noise_blend }.into(),
            ])
            .with_format(config.color_format),
        ));
        let save_pass = SavePass::new(device, "feedback", config.save)?;
        let saved = save_pass.saved_buffer();

        let effect_shared: SharedPass = effect_pass.clone();
        let passes = vec![share(render_pass), effect_shared, share(save_pass)];

        Ok(Self { scene, camera, effect_pass, saved, passes, config })
    }

    /// Write the chain into `registry`, replacing whatever was there
    pub fn publish(&self, registry: &PipelineRegistry) {
        registry.set(self.passes.clone());
        engine_info!("portal3d::HoloFeedback", "published {} passes", self.passes.len());
    }

    /// Previous frame of the chain; bind it as a material's feedback buffer
    pub fn saved_buffer(&self) -> SharedFrameBuffer {
        self.saved.clone()
    }

    pub fn passes(&self) -> &[SharedPass] {
        &self.passes
    }

    pub fn scene(&self) -> &Arc<dyn Drawable> {
        &self.scene
    }

    /// Camera of the hidden scene
    pub fn camera(&self) -> &SharedCamera {
        &self.camera
    }

    /// Effect pass, for tuning the glitch and noise between frames
    pub fn effect_pass(&self) -> &Arc<Mutex<EffectPass>> {
        &self.effect_pass
    }

    pub fn config(&self) -> &HoloFeedbackConfig {
        &self.config
    }
}

#[cfg(test)]
#[path = "holo_feedback_tests.rs"]
mod tests;
