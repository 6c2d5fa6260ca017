/// Composer - runs the composed pass chain of one output surface.
///
/// The chain is rebuilt by `compose()` as
/// `[registry passes..] ++ [main render pass] ++ [configured passes..]`.
/// The main render pass always draws the scene and camera the composer
/// was created with. Every frame the passes run in order, each reading
/// the previous pass's output; the last available non-save pass writes
/// the visible surface. After all passes have rendered, each gets an
/// `end_frame()` call, which is where save passes latch their copies.
///
/// A pass that fails is skipped; the rest of the frame still renders. The
/// failure is logged at WARN once per composition, repeats at TRACE. When
/// the surface pass itself fails, the last good buffer is blitted to the
/// surface instead.

use std::sync::{Arc, MutexGuard, PoisonError};
use rustc_hash::FxHashSet;
use crate::camera::SharedCamera;
use crate::composer::{
    share, Drawable, Pass, PassContext, PassKind, PipelineRegistry, RenderPass,
    SharedFrameBuffer, SharedPass,
};
use crate::device::{GraphicsDevice, SharedDevice, TextureFormat};
use crate::error::Result;
use crate::frame::FrameContext;
use crate::{engine_debug, engine_info, engine_trace, engine_warn};

/// Composer configuration
#[derive(Debug, Clone, Copy)]
pub struct ComposerConfig {
    /// Color format of off-screen buffers
    pub frame_buffer_format: TextureFormat,
    /// Give the main render pass a depth attachment
    pub depth_buffer: bool,
    /// Clear color of the main render pass
    pub clear_color: [f32; 4],
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            frame_buffer_format: TextureFormat::R16G16B16A16_SFLOAT,
            depth_buffer: true,
            clear_color: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

fn lock_pass(pass: &SharedPass) -> MutexGuard<'_, dyn Pass + 'static> {
    pass.lock().unwrap_or_else(PoisonError::into_inner)
}

/// WARN the first time `key` fails in the current composition, TRACE after
fn report_failure(reported: &mut FxHashSet<String>, key: String, message: String) {
    if reported.insert(key) {
        engine_warn!("portal3d::Composer", "{}", message);
    } else {
        engine_trace!("portal3d::Composer", "{}", message);
    }
}

/// Multi-pass compositor
pub struct Composer {
    device: SharedDevice,
    config: ComposerConfig,
    main_pass: SharedPass,
    configured: Vec<SharedPass>,
    registry_passes: Vec<SharedPass>,
    passes: Vec<SharedPass>,
    presenter: Option<usize>,
    reported: FxHashSet<String>,
    composed_generation: Option<u64>,
    size: (u32, u32),
    frame_count: u64,
}

impl Composer {
    /// Create a composer whose main render pass draws `scene` from `camera`
    pub fn new(
        device: SharedDevice,
        scene: &Arc<dyn Drawable>,
        camera: &SharedCamera,
        config: ComposerConfig,
    ) -> Self {
        let size = device.lock().unwrap_or_else(PoisonError::into_inner).surface_size();
        let main_pass = share(
            RenderPass::new("main", scene, camera)
                .with_format(config.frame_buffer_format, config.depth_buffer)
                .with_clear_color(config.clear_color),
        );
        let mut composer = Self {
            device,
            config,
            passes: vec![main_pass.clone()],
            main_pass,
            configured: Vec::new(),
            registry_passes: Vec::new(),
            presenter: None,
            reported: FxHashSet::default(),
            composed_generation: None,
            size,
            frame_count: 0,
        };
        composer.update_presenter();
        composer
    }

    // ===== CHAIN =====

    /// Set the composer's own passes, run after the main render pass
    pub fn configure(&mut self, passes: Vec<SharedPass>) -> Result<()> {
        self.configured = passes;
        self.rebuild()
    }

    /// Splice the registry's current passes in front of the main pass
    pub fn compose(&mut self, registry: &PipelineRegistry) -> Result<()> {
        let (passes, generation) = registry.snapshot();
        self.compose_with(passes)?;
        self.composed_generation = Some(generation);
        Ok(())
    }

    /// Splice an explicit pass list in front of the main pass
    ///
    /// Composing twice with the same list yields the same chain.
    pub fn compose_with(&mut self, registry_passes: Vec<SharedPass>) -> Result<()> {
        self.registry_passes = registry_passes;
        self.rebuild()
    }

    /// True when the registry changed since the last `compose()`
    pub fn needs_recompose(&self, registry: &PipelineRegistry) -> bool {
        self.composed_generation != Some(registry.generation())
    }

    fn rebuild(&mut self) -> Result<()> {
        let mut passes = self.registry_passes.clone();
        passes.push(self.main_pass.clone());
        passes.extend(self.configured.iter().cloned());

        // Passes joining the chain are brought to the current size
        let (width, height) = self.size;
        {
            let mut device = self.device.lock().unwrap_or_else(PoisonError::into_inner);
            for pass in &passes {
                if !self.passes.iter().any(|existing| Arc::ptr_eq(existing, pass)) {
                    lock_pass(pass).resize(&mut *device, width, height)?;
                }
            }
        }

        let changed = passes.len() != self.passes.len()
            || passes.iter().zip(&self.passes).any(|(a, b)| !Arc::ptr_eq(a, b));
        self.passes = passes;
        self.update_presenter();
        if changed {
            engine_info!("portal3d::Composer", "composed [{}]", self.pass_names().join(" -> "));
            self.reported.clear();
            self.check_trailing_save();
        }
        Ok(())
    }

    fn check_trailing_save(&self) {
        let trailing_save = self.passes.last()
            .is_some_and(|pass| lock_pass(pass).kind() == PassKind::Save);
        if !trailing_save {
            return;
        }
        match self.presenter {
            Some(index) => engine_warn!("portal3d::Composer",
                "chain ends with a save pass; the surface is written by '{}'",
                lock_pass(&self.passes[index]).name()),
            None => engine_warn!("portal3d::Composer", "chain ends with a save pass; nothing writes the surface"),
        }
    }

    /// Pick the pass that writes the surface: the last available pass
    /// that is not a save pass.
    fn update_presenter(&mut self) {
        let mut presenter = None;
        for (index, pass) in self.passes.iter().enumerate() {
            let pass = lock_pass(pass);
            if pass.is_available() && pass.kind() != PassKind::Save {
                presenter = Some(index);
            }
        }
        for (index, pass) in self.passes.iter().enumerate() {
            lock_pass(pass).set_render_to_screen(Some(index) == presenter);
        }

        if presenter != self.presenter && presenter.is_none() {
            engine_warn!("portal3d::Composer", "no available pass can write the surface");
        }
        self.presenter = presenter;
    }

    // ===== FRAME =====

    /// Follow a surface resize. Zero sizes (minimized window) are ignored.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        if width == 0 || height == 0 {
            engine_debug!("portal3d::Composer", "ignoring resize to {}x{}", width, height);
            return Ok(());
        }
        self.size = (width, height);
        let mut device = self.device.lock().unwrap_or_else(PoisonError::into_inner);
        device.resize(width, height);
        for pass in &self.passes {
            lock_pass(pass).resize(&mut *device, width, height)?;
        }
        Ok(())
    }

    /// Render one frame through the composed chain and submit it
    pub fn render(&mut self, frame: &FrameContext) -> Result<()> {
        self.update_presenter();

        let mut device = self.device.lock().unwrap_or_else(PoisonError::into_inner);
        let mut cmd = device.create_command_list()?;
        cmd.begin()?;
        {
            let mut ctx = PassContext { device: &mut *device, cmd: cmd.as_mut(), frame };
            let mut current: Option<SharedFrameBuffer> = None;

            for (index, pass) in self.passes.iter().enumerate() {
                let mut pass = lock_pass(pass);
                if !pass.is_available() {
                    engine_trace!("portal3d::Composer", "skipping unavailable pass '{}'", pass.name());
                    continue;
                }
                match pass.render(&mut ctx, current.as_ref()) {
                    Ok(Some(output)) => current = Some(output),
                    Ok(None) => {}
                    Err(err) => {
                        report_failure(
                            &mut self.reported,
                            pass.name().to_string(),
                            format!("pass '{}' skipped: {}", pass.name(), err),
                        );
                        if Some(index) == self.presenter {
                            present_fallback(&mut ctx, current.as_ref(), &mut self.reported);
                        }
                    }
                }
            }

            for pass in &self.passes {
                let mut pass = lock_pass(pass);
                if !pass.is_available() {
                    continue;
                }
                if let Err(err) = pass.end_frame(&mut ctx) {
                    report_failure(
                        &mut self.reported,
                        format!("{}:end_frame", pass.name()),
                        format!("pass '{}' end of frame failed: {}", pass.name(), err),
                    );
                }
            }
        }
        cmd.end()?;
        device.submit(&[cmd.as_ref()])?;
        self.frame_count += 1;
        Ok(())
    }

    // ===== GETTERS =====

    /// Current chain, in execution order
    pub fn effective_passes(&self) -> &[SharedPass] {
        &self.passes
    }

    pub fn pass_names(&self) -> Vec<String> {
        self.passes.iter().map(|pass| lock_pass(pass).name().to_string()).collect()
    }

    /// The render pass drawing the composer's own scene
    pub fn main_pass(&self) -> &SharedPass {
        &self.main_pass
    }

    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Number of frames rendered
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn device(&self) -> &SharedDevice {
        &self.device
    }
}

/// Show the last good buffer when the surface pass failed
fn present_fallback(
    ctx: &mut PassContext<'_>,
    current: Option<&SharedFrameBuffer>,
    reported: &mut FxHashSet<String>,
) {
    let Some(buffer) = current else {
        engine_trace!("portal3d::Composer", "surface pass failed before any buffer was written");
        return;
    };
    if let Err(err) = ctx.cmd.blit_to_surface(&buffer.color()) {
        report_failure(reported, "surface fallback".to_string(), format!("fallback present failed: {}", err));
    }
}

#[cfg(test)]
#[path = "composer_tests.rs"]
mod tests;
