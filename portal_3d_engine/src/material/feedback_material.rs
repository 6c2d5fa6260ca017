/// FeedbackMaterial - surface material sampling last frame's output.
///
/// The material links the physical surface shader with a color stage
/// (and, for rippling presets, a displacement stage) that read a feedback
/// buffer. The buffer is usually a save pass's `saved_buffer()`, so the
/// surface always shows the chain's previous frame.

use std::sync::{Arc, Mutex};
use glam::{Vec2, Vec3};
use crate::composer::SharedFrameBuffer;
use crate::device::{
    BlendMode, CommandList, GraphicsDevice, Pipeline, PipelineDesc, SamplerDesc,
    ShaderStages, Texture, TextureFormat,
};
use crate::error::{Error, Result};
use crate::material::feedback_shading;
use crate::shader::{
    BaseShader, InjectionPoint, LinkedShader, ShaderProgram, ShaderStage, ShaderType, UniformBlock,
};
use crate::{engine_debug, engine_warn};

/// Tuning values of the feedback surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeedbackParams {
    /// Per-channel multiplier on the base color
    pub channel_scale: Vec3,
    /// Weight of the feedback intensity added to every channel
    pub feedback_gain: f32,
    /// Smoothstep edges on the feedback intensity
    pub intensity_edges: Vec2,
    /// Opacity kept when the feedback is dark
    pub alpha_floor: f32,
    /// Smoothstep edges on the normalized surface z
    pub depth_edges: Vec2,
    /// Shader time per elapsed second
    pub time_scale: f32,
    /// Shader time for one full vertical scroll
    pub scroll_period: f32,
    /// Vertex displacement along the normal, if any
    pub displacement_scale: Option<f32>,
}

impl FeedbackParams {
    /// Blue holographic look: red and green damped, blue boosted, slow scroll
    pub fn holo() -> Self {
        Self {
            channel_scale: Vec3::new(0.2, 0.2, 6.0),
            feedback_gain: 0.001,
            intensity_edges: Vec2::new(0.2, 1.0),
            alpha_floor: 0.2,
            depth_edges: Vec2::new(0.65, 1.0),
            time_scale: 1.0 / 128.0,
            scroll_period: 1.0,
            displacement_scale: None,
        }
    }

    /// `holo()` with the silhouette rippling in sync with the color
    pub fn holo_rippling() -> Self {
        Self {
            displacement_scale: Some(0.05),
            ..Self::holo()
        }
    }

    fn validate(&self) -> Result<()> {
        if self.scroll_period.is_nan() || self.scroll_period <= 0.0 {
            return Err(Error::InvalidResource(format!(
                "feedback scroll period must be positive, got {}", self.scroll_period
            )));
        }
        if self.time_scale < 0.0 {
            return Err(Error::InvalidResource(format!(
                "feedback time scale must not be negative, got {}", self.time_scale
            )));
        }
        Ok(())
    }
}

impl Default for FeedbackParams {
    fn default() -> Self {
        Self::holo()
    }
}

/// Feedback material shared between the frame driver and the drawables
pub type SharedFeedbackMaterial = Arc<Mutex<FeedbackMaterial>>;

const FEEDBACK_TEXTURE: &str = "feedback_texture";

fn color_stage() -> ShaderStage {
    ShaderStage::new("feedback_color", InjectionPoint::PostColor)
        .input("diffuse_color", ShaderType::Vec4)
        .input("uv", ShaderType::Vec2)
        .input("surface_position", ShaderType::Vec3)
        .output("diffuse_color", ShaderType::Vec4)
        .uniform(FEEDBACK_TEXTURE, ShaderType::Texture2d)
        .uniform("feedback_time", ShaderType::Float)
        .uniform("feedback_scroll_period", ShaderType::Float)
        .uniform("feedback_channel_scale", ShaderType::Vec3)
        .uniform("feedback_gain", ShaderType::Float)
        .uniform("feedback_intensity_edges", ShaderType::Vec2)
        .uniform("feedback_alpha_floor", ShaderType::Float)
        .uniform("feedback_depth_edges", ShaderType::Vec2)
        .body(concat!(
            "let feedback_uv = vec2<f32>(uv.x, fract(uv.y - fract(u.feedback_time / u.feedback_scroll_period)));\n",
            "let feedback = textureSample(feedback_texture, feedback_texture_sampler, feedback_uv);\n",
            "diffuse_color = vec4<f32>(diffuse_color.rgb * u.feedback_channel_scale + vec3<f32>(u.feedback_gain * feedback.r), diffuse_color.a);\n",
            "diffuse_color.a = diffuse_color.a * (u.feedback_alpha_floor + smoothstep(u.feedback_intensity_edges.x, u.feedback_intensity_edges.y, feedback.r));\n",
            "diffuse_color.a = diffuse_color.a * smoothstep(u.feedback_depth_edges.x, u.feedback_depth_edges.y, surface_position.z);",
        ))
}

// Reads the texture and scroll uniforms declared by the color stage
fn displace_stage() -> ShaderStage {
    ShaderStage::new("feedback_displace", InjectionPoint::PreTransform)
        .input("position", ShaderType::Vec3)
        .input("normal", ShaderType::Vec3)
        .input("uv", ShaderType::Vec2)
        .output("position", ShaderType::Vec3)
        .uniform("feedback_displacement_scale", ShaderType::Float)
        .body(concat!(
            "let displace_uv = vec2<f32>(uv.x, fract(uv.y - fract(u.feedback_time / u.feedback_scroll_period)));\n",
            "let displace_sample = textureSampleLevel(feedback_texture, feedback_texture_sampler, displace_uv, 0.0);\n",
            "position = position + normal * (displace_sample.r * u.feedback_displacement_scale);",
        ))
}

fn link(params: &FeedbackParams) -> Result<LinkedShader> {
    let mut builder = ShaderProgram::builder(BaseShader::physical_surface()).stage(color_stage());
    if params.displacement_scale.is_some() {
        builder = builder.stage(displace_stage());
    }
    builder.link()
}

/// Material whose surface shows the previous frame of a feedback chain
pub struct FeedbackMaterial {
    params: FeedbackParams,
    base_color: Arc<dyn Texture>,
    alpha_map: Arc<dyn Texture>,
    feedback: SharedFrameBuffer,
    target_format: TextureFormat,
    shader: LinkedShader,
    pipeline: Arc<dyn Pipeline>,
    uniforms: UniformBlock,
    elapsed: f32,
    time: f32,
}

impl FeedbackMaterial {
    /// Link the material shader and create its pipeline.
    ///
    /// The pipeline targets `R16G16B16A16_SFLOAT`, the composer's default
    /// buffer format; see `set_target_format()`.
    pub fn new(
        device: &mut dyn GraphicsDevice,
        base_color: Arc<dyn Texture>,
        alpha_map: Arc<dyn Texture>,
        feedback: SharedFrameBuffer,
        params: FeedbackParams,
    ) -> Result<Self> {
        params.validate()?;
        let target_format = TextureFormat::R16G16B16A16_SFLOAT;
        let shader = link(&params)?;
        let pipeline = Self::create_pipeline(device, &shader, target_format)?;
        let mut material = Self {
            params,
            base_color,
            alpha_map,
            feedback,
            target_format,
            uniforms: shader.uniform_block(),
            shader,
            pipeline,
            elapsed: 0.0,
            time: 0.0,
        };
        material.write_uniforms()?;
        Ok(material)
    }

    pub fn into_shared(self) -> SharedFeedbackMaterial {
        Arc::new(Mutex::new(self))
    }

    fn create_pipeline(
        device: &mut dyn GraphicsDevice,
        shader: &LinkedShader,
        color_format: TextureFormat,
    ) -> Result<Arc<dyn Pipeline>> {
        let pipeline = device.create_pipeline(PipelineDesc {
            label: format!("feedback_material:{}", shader.label()),
            source: shader.source().to_string(),
            color_format,
            blend: BlendMode::AlphaBlend,
            depth_test: true,
            push_constant_size: shader.uniform_layout().size(),
        })?;
        engine_debug!("portal3d::FeedbackMaterial", "linked {}", shader.label());
        Ok(pipeline)
    }

    fn write_uniforms(&mut self) -> Result<()> {
        let params = self.params;
        let uniforms = &mut self.uniforms;
        uniforms.set_float("feedback_time", self.time)?;
        uniforms.set_float("feedback_scroll_period", params.scroll_period)?;
        uniforms.set_vec3("feedback_channel_scale", params.channel_scale)?;
        uniforms.set_float("feedback_gain", params.feedback_gain)?;
        uniforms.set_vec2("feedback_intensity_edges", params.intensity_edges)?;
        uniforms.set_float("feedback_alpha_floor", params.alpha_floor)?;
        uniforms.set_vec2("feedback_depth_edges", params.depth_edges)?;
        if let Some(scale) = params.displacement_scale {
            uniforms.set_float("feedback_displacement_scale", scale)?;
        }
        Ok(())
    }

    // ===== PER FRAME =====

    /// Advance the material clock to `elapsed` seconds.
    ///
    /// Time never runs backwards: a smaller value is ignored.
    pub fn advance(&mut self, elapsed: f32) -> Result<()> {
        if elapsed < self.elapsed {
            engine_warn!("portal3d::FeedbackMaterial",
                "ignoring elapsed time {} (already at {})", elapsed, self.elapsed);
            return Ok(());
        }
        self.elapsed = elapsed;
        self.time = elapsed * self.params.time_scale;
        self.uniforms.set_float("feedback_time", self.time)
    }

    /// Bind pipeline, textures and constants for the next draw.
    ///
    /// Call inside a render pass, once per frame, after `advance()`.
    pub fn bind(&self, cmd: &mut dyn CommandList) -> Result<()> {
        cmd.bind_pipeline(&self.pipeline)?;
        cmd.bind_texture(0, &self.base_color, &SamplerDesc::repeating())?;
        cmd.bind_texture(1, &self.alpha_map, &SamplerDesc::repeating())?;
        if let Some(slot) = self.shader.texture_slot(FEEDBACK_TEXTURE) {
            cmd.bind_texture(slot, &self.feedback.color(), &SamplerDesc::vertical_scroll())?;
        }
        cmd.push_constants(ShaderStages::VERTEX | ShaderStages::FRAGMENT, 0, self.uniforms.bytes())
    }

    /// Replace the tuning values. Relinks only when displacement is
    /// switched on or off.
    pub fn set_params(&mut self, device: &mut dyn GraphicsDevice, params: FeedbackParams) -> Result<()> {
        params.validate()?;
        let relink = params.displacement_scale.is_some() != self.params.displacement_scale.is_some();
        if relink {
            let shader = link(&params)?;
            self.pipeline = Self::create_pipeline(device, &shader, self.target_format)?;
            self.uniforms = shader.uniform_block();
            self.shader = shader;
        }
        self.params = params;
        self.time = self.elapsed * params.time_scale;
        self.write_uniforms()
    }

    /// Recreate the pipeline for another color target format
    pub fn set_target_format(&mut self, device: &mut dyn GraphicsDevice, format: TextureFormat) -> Result<()> {
        if format == self.target_format {
            return Ok(());
        }
        self.pipeline = Self::create_pipeline(device, &self.shader, format)?;
        self.target_format = format;
        Ok(())
    }

    // ===== GETTERS =====

    pub fn params(&self) -> &FeedbackParams {
        &self.params
    }

    /// Shader time (elapsed seconds times the time scale)
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Last elapsed time passed to `advance()`
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Current vertical scroll of the feedback sample, in `[0, 1)`
    pub fn scroll_offset(&self) -> f32 {
        feedback_shading::scroll_offset(self.time, self.params.scroll_period)
    }

    pub fn uniforms(&self) -> &UniformBlock {
        &self.uniforms
    }

    pub fn shader(&self) -> &LinkedShader {
        &self.shader
    }

    pub fn pipeline(&self) -> &Arc<dyn Pipeline> {
        &self.pipeline
    }

    pub fn target_format(&self) -> TextureFormat {
        self.target_format
    }

    /// Buffer sampled as the feedback texture
    pub fn feedback_buffer(&self) -> &SharedFrameBuffer {
        &self.feedback
    }
}

#[cfg(test)]
#[path = "feedback_material_tests.rs"]
mod tests;
