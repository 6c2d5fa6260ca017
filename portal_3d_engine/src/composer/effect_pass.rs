/// EffectPass - applies a list of full-screen effects to its input in
/// one draw.
///
/// The effects' stages are linked into one program on first use and
/// relinked only when the effect list changes shape (kinds, order or
/// blend functions) or the target format changes. Parameter tweaks only
/// touch the uniform block.

use std::sync::Arc;
use glam::Vec2;
use crate::composer::{Effect, FrameBuffer, FrameBufferDesc, Pass, PassContext, PassKind, SharedFrameBuffer};
use crate::device::{
    BlendMode, GraphicsDevice, Pipeline, PipelineDesc, SamplerDesc, ShaderStages,
    TextureFormat, Viewport,
};
use crate::error::{Error, Result};
use crate::shader::{BaseShader, LinkedShader, ShaderProgram};
use crate::engine_debug;

struct EffectProgram {
    keys: Vec<String>,
    format: TextureFormat,
    shader: LinkedShader,
    pipeline: Arc<dyn Pipeline>,
}

/// Full-screen effect pass
pub struct EffectPass {
    name: String,
    effects: Vec<Effect>,
    program: Option<EffectProgram>,
    output: Option<SharedFrameBuffer>,
    color_format: TextureFormat,
    render_to_screen: bool,
    size: Option<(u32, u32)>,
}

impl EffectPass {
    pub fn new(name: &str, effects: Vec<Effect>) -> Self {
        Self {
            name: name.to_string(),
            effects,
            program: None,
            output: None,
            color_format: TextureFormat::R16G16B16A16_SFLOAT,
            render_to_screen: false,
            size: None,
        }
    }

    pub fn with_format(mut self, color_format: TextureFormat) -> Self {
        self.color_format = color_format;
        self
    }

    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    /// Mutable access for parameter changes between frames
    pub fn effects_mut(&mut self) -> &mut Vec<Effect> {
        &mut self.effects
    }

    /// Linked program, once built
    pub fn shader(&self) -> Option<&LinkedShader> {
        self.program.as_ref().map(|program| &program.shader)
    }

    pub fn output(&self) -> Option<&SharedFrameBuffer> {
        self.output.as_ref()
    }

    /// Link (or relink) the program if the effect list or target changed
    fn prepare(&mut self, device: &mut dyn GraphicsDevice, format: TextureFormat) -> Result<()> {
        let keys: Vec<String> = self.effects.iter().map(Effect::shader_key).collect();
        if let Some(program) = &self.program {
            if program.keys == keys && program.format == format {
                return Ok(());
            }
        }

        let shader = ShaderProgram::builder(BaseShader::fullscreen())
            .stages(self.effects.iter().map(Effect::stage))
            .link()?;
        let pipeline = device.create_pipeline(PipelineDesc {
            label: format!("{}:{}", self.name, shader.label()),
            source: shader.source().to_string(),
            color_format: format,
            blend: BlendMode::Opaque,
            depth_test: false,
            push_constant_size: shader.uniform_layout().size(),
        })?;
        engine_debug!("portal3d::EffectPass", "'{}' linked [{}]", self.name, keys.join(", "));
        self.program = Some(EffectProgram { keys, format, shader, pipeline });
        Ok(())
    }

    fn ensure_output(&mut self, device: &mut dyn GraphicsDevice) -> Result<SharedFrameBuffer> {
        let (width, height) = self.size.unwrap_or_else(|| device.surface_size());
        match &self.output {
            Some(output) => {
                output.ensure(device, width, height, self.color_format, false)?;
                Ok(output.clone())
            }
            None => {
                let output = FrameBuffer::new(device, FrameBufferDesc::new(&self.name, width, height, self.color_format))?;
                self.output = Some(output.clone());
                Ok(output)
            }
        }
    }
}

impl Pass for EffectPass {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> PassKind {
        PassKind::Effect
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
        input: Option<&SharedFrameBuffer>,
    ) -> Result<Option<SharedFrameBuffer>> {
        let Some(input) = input else {
            return Err(Error::InvalidResource(format!("effect pass '{}' has no input", self.name)));
        };

        let output = if self.render_to_screen {
            None
        } else {
            Some(self.ensure_output(ctx.device)?)
        };
        let (format, (width, height)) = match &output {
            Some(output) => (output.color_format(), output.size()),
            None => (ctx.device.surface_format(), ctx.device.surface_size()),
        };
        self.prepare(ctx.device, format)?;
        let Some(program) = &self.program else {
            return Err(Error::InvalidResource(format!("effect pass '{}' has no program", self.name)));
        };

        let mut uniforms = program.shader.uniform_block();
        uniforms.set_float("time", ctx.frame.elapsed_time)?;
        uniforms.set_vec2("resolution", Vec2::new(width as f32, height as f32))?;
        for effect in &self.effects {
            effect.write_uniforms(&mut uniforms)?;
        }

        let color = output.as_ref().map(|output| output.color());
        ctx.cmd.begin_render_pass(color.as_ref(), None, &[])?;
        ctx.cmd.insert_debug_marker(&self.name)?;
        ctx.cmd.set_viewport(Viewport::full(width, height))?;
        ctx.cmd.bind_pipeline(&program.pipeline)?;
        ctx.cmd.bind_texture(0, &input.color(), &SamplerDesc::clamped())?;
        for (name, texture) in self.effects.iter().filter_map(Effect::texture) {
            if let Some(slot) = program.shader.texture_slot(name) {
                ctx.cmd.bind_texture(slot, texture, &SamplerDesc::repeating())?;
            }
        }
        ctx.cmd.push_constants(ShaderStages::FRAGMENT, 0, uniforms.bytes())?;
        ctx.cmd.draw(3, 0)?;
        ctx.cmd.end_render_pass()?;

        Ok(output)
    }

    fn buffers(&self) -> Vec<SharedFrameBuffer> {
        self.output.iter().cloned().collect()
    }
}

#[cfg(test)]
#[path = "effect_pass_tests.rs"]
mod tests;
