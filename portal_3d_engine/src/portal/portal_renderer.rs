/// PortalRenderer - drives one portal view frame by frame.
///
/// Per frame, in this order:
/// 1. the viewer rig turns the frame's input into a viewer pose
/// 2. the off-axis camera is refitted to that pose and the portal
/// 3. feedback materials advance their clocks
/// 4. the composer is recomposed if the registry changed
/// 5. the composer renders

use std::sync::{Arc, PoisonError};
use glam::Vec2;
use crate::camera::{
    OffAxisCamera, PortalConfig, PortalSurface, SharedCamera, ViewerPose, ViewerRig, ViewerRigConfig,
};
use crate::composer::{
    share, Bloom, ChromaticAberration, Composer, ComposerConfig, Drawable, EffectPass,
    SharedPipelineRegistry,
};
use crate::device::SharedDevice;
use crate::error::Result;
use crate::frame::FrameContext;
use crate::material::SharedFeedbackMaterial;
use crate::{engine_debug, engine_trace};

/// Portal renderer configuration
#[derive(Debug, Clone, Copy)]
pub struct PortalRendererConfig {
    pub composer: ComposerConfig,
    pub portal: PortalConfig,
    pub rig: ViewerRigConfig,
    /// Post-processing applied after the portal scene
    pub bloom: Bloom,
    pub chromatic_aberration: ChromaticAberration,
}

impl Default for PortalRendererConfig {
    fn default() -> Self {
        Self {
            composer: ComposerConfig::default(),
            portal: PortalConfig::default(),
            rig: ViewerRigConfig::default(),
            bloom: Bloom {
                luminance_threshold: 0.05,
                luminance_smoothing: 0.01,
                ..Bloom::default()
            },
            chromatic_aberration: ChromaticAberration { offset: Vec2::new(0.003, 0.003) },
        }
    }
}

/// Portal view: viewer rig, off-axis camera and compositor
pub struct PortalRenderer {
    portal: PortalSurface,
    rig: ViewerRig,
    off_axis: OffAxisCamera,
    composer: Composer,
    registry: SharedPipelineRegistry,
    materials: Vec<SharedFeedbackMaterial>,
}

impl PortalRenderer {
    /// Build the composer `[registry..] ++ [scene from the off-axis camera] ++ [bloom, chromatic aberration]`
    pub fn new(
        device: SharedDevice,
        scene: &Arc<dyn Drawable>,
        portal: PortalSurface,
        registry: SharedPipelineRegistry,
        config: PortalRendererConfig,
    ) -> Result<Self> {
        let rig = ViewerRig::new(config.rig, portal.width(), portal.height());
        let off_axis = OffAxisCamera::new(config.portal);
        let format = config.composer.frame_buffer_format;
        let mut composer = Composer::new(device, scene, off_axis.camera(), config.composer);
        composer.configure(vec![
            share(EffectPass::new("bloom", vec![config.bloom.into()]).with_format(format)),
            share(EffectPass::new("chromatic_aberration", vec![config.chromatic_aberration.into()]).with_format(format)),
        ])?;
        composer.compose(&registry)?;

        Ok(Self {
            portal,
            rig,
            off_axis,
            composer,
            registry,
            materials: Vec::new(),
        })
    }

    /// Register a material whose clock follows the frame time.
    ///
    /// Its pipeline is retargeted to the composer's buffer format.
    pub fn add_material(&mut self, material: SharedFeedbackMaterial) -> Result<()> {
        {
            let mut device = self.composer.device().lock().unwrap_or_else(PoisonError::into_inner);
            let mut locked = material.lock().unwrap_or_else(PoisonError::into_inner);
            locked.set_target_format(&mut *device, self.composer.config().frame_buffer_format)?;
        }
        self.materials.push(material);
        Ok(())
    }

    /// Follow a surface resize: the portal keeps the surface's aspect
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.portal.fit_aspect(width as f32 / height as f32);
        self.rig.set_portal_extent(self.portal.width(), self.portal.height());
        engine_debug!("portal3d::PortalRenderer", "portal refitted to {}x{}",
            self.portal.width(), self.portal.height());
        self.composer.resize(width, height)
    }

    /// Produce one frame
    pub fn frame(&mut self, frame: &FrameContext) -> Result<()> {
        let pose = self.rig.update(&frame.input);
        let edges = self.off_axis.update(&pose, &self.portal);
        engine_trace!("portal3d::PortalRenderer", "viewer {:?} frustum {}x{}",
            pose.position, edges.width(), edges.height());

        for material in &self.materials {
            material.lock().unwrap_or_else(PoisonError::into_inner).advance(frame.elapsed_time)?;
        }

        if self.composer.needs_recompose(&self.registry) {
            self.composer.compose(&self.registry)?;
        }
        self.composer.render(frame)
    }

    // ===== GETTERS =====

    pub fn portal(&self) -> &PortalSurface {
        &self.portal
    }

    /// Move or turn the portal; takes effect on the next frame
    pub fn portal_mut(&mut self) -> &mut PortalSurface {
        &mut self.portal
    }

    pub fn viewer_pose(&self) -> ViewerPose {
        self.rig.pose()
    }

    pub fn off_axis_camera(&self) -> &OffAxisCamera {
        &self.off_axis
    }

    pub fn camera(&self) -> &SharedCamera {
        self.off_axis.camera()
    }

    pub fn composer(&self) -> &Composer {
        &self.composer
    }

    pub fn composer_mut(&mut self) -> &mut Composer {
        &mut self.composer
    }

    pub fn registry(&self) -> &SharedPipelineRegistry {
        &self.registry
    }

    pub fn materials(&self) -> &[SharedFeedbackMaterial] {
        &self.materials
    }
}

#[cfg(test)]
#[path = "portal_renderer_tests.rs"]
mod tests;
