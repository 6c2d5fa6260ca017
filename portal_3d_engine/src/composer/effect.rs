/// Full-screen image effects.
///
/// Each effect contributes one shader stage at `ScreenColor` plus its
/// uniform values. An `EffectPass` links the stages of all its effects
/// into a single program, so a pass may hold each effect kind once.

use std::fmt;
use std::sync::Arc;
use glam::Vec2;
use crate::device::Texture;
use crate::error::Result;
use crate::shader::{InjectionPoint, ShaderStage, ShaderType, UniformBlock};

// ===== BLEND FUNCTIONS =====

/// How an effect's result is combined with the incoming color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendFunction {
    Normal,
    Add,
    Screen,
    Multiply,
    ColorDodge,
}

impl BlendFunction {
    fn key(self) -> &'static str {
        match self {
            BlendFunction::Normal => "normal",
            BlendFunction::Add => "add",
            BlendFunction::Screen => "screen",
            BlendFunction::Multiply => "multiply",
            BlendFunction::ColorDodge => "color_dodge",
        }
    }

    /// WGSL expression blending `blend` over `base` (both vec3<f32>)
    fn wgsl(self, base: &str, blend: &str) -> String {
        match self {
            BlendFunction::Normal => blend.to_string(),
            BlendFunction::Add => format!("min({base} + {blend}, vec3<f32>(1.0))"),
            BlendFunction::Screen => format!("vec3<f32>(1.0) - (vec3<f32>(1.0) - {base}) * (vec3<f32>(1.0) - {blend})"),
            BlendFunction::Multiply => format!("{base} * {blend}"),
            BlendFunction::ColorDodge => format!("min({base} / max(vec3<f32>(1.0) - {blend}, vec3<f32>(1e-4)), vec3<f32>(1.0))"),
        }
    }

    /// CPU version of the blend, per channel
    pub fn apply(self, base: f32, blend: f32) -> f32 {
        match self {
            BlendFunction::Normal => blend,
            BlendFunction::Add => (base + blend).min(1.0),
            BlendFunction::Screen => 1.0 - (1.0 - base) * (1.0 - blend),
            BlendFunction::Multiply => base * blend,
            BlendFunction::ColorDodge => (base / (1.0 - blend).max(1e-4)).min(1.0),
        }
    }
}

// ===== EFFECT PARAMETERS =====

/// Brightness / contrast / saturation adjustment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorGrading {
    pub brightness: f32,
    pub contrast: f32,
    pub saturation: f32,
}

impl Default for ColorGrading {
    fn default() -> Self {
        Self { brightness: 0.0, contrast: 0.0, saturation: 0.0 }
    }
}

/// Red and blue channels sampled at opposite offsets
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChromaticAberration {
    /// Offset in UV units
    pub offset: Vec2,
}

impl Default for ChromaticAberration {
    fn default() -> Self {
        Self { offset: Vec2::new(0.001, 0.0005) }
    }
}

/// Glow around pixels brighter than a luminance threshold
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bloom {
    pub luminance_threshold: f32,
    pub luminance_smoothing: f32,
    pub intensity: f32,
    /// Tap spacing in pixels
    pub radius: f32,
}

impl Default for Bloom {
    fn default() -> Self {
        Self {
            luminance_threshold: 0.9,
            luminance_smoothing: 0.025,
            intensity: 1.0,
            radius: 2.0,
        }
    }
}

/// Animated per-pixel noise
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Noise {
    pub opacity: f32,
    pub blend: BlendFunction,
}

impl Default for Noise {
    fn default() -> Self {
        Self { opacity: 1.0, blend: BlendFunction::Screen }
    }
}

/// Column-wise displacement driven by a perturbation texture
#[derive(Clone)]
pub struct Glitch {
    pub perturbation_map: Arc<dyn Texture>,
    /// Maximum displacement in UV units
    pub strength: Vec2,
    /// Number of independently displaced columns
    pub columns: f32,
}

impl Glitch {
    pub fn new(perturbation_map: Arc<dyn Texture>) -> Self {
        Self {
            perturbation_map,
            strength: Vec2::new(0.3, 1.0),
            columns: 0.05,
        }
    }

    pub fn with_strength(mut self, strength: Vec2) -> Self {
        self.strength = strength;
        self
    }
}

impl fmt::Debug for Glitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Glitch")
            .field("strength", &self.strength)
            .field("columns", &self.columns)
            .finish_non_exhaustive()
    }
}

// ===== EFFECT =====

/// Image effect
#[derive(Debug, Clone)]
pub enum Effect {
    ColorGrading(ColorGrading),
    ChromaticAberration(ChromaticAberration),
    Bloom(Bloom),
    Noise(Noise),
    Glitch(Glitch),
}

impl Effect {
    pub fn name(&self) -> &'static str {
        match self {
            Effect::ColorGrading(_) => "color_grading",
            Effect::ChromaticAberration(_) => "chromatic_aberration",
            Effect::Bloom(_) => "bloom",
            Effect::Noise(_) => "noise",
            Effect::Glitch(_) => "glitch",
        }
    }

    /// Identifies the generated shader code; a change requires relinking
    pub fn shader_key(&self) -> String {
        match self {
            Effect::Noise(noise) => format!("noise:{}", noise.blend.key()),
            other => other.name().to_string(),
        }
    }

    /// Shader stage implementing this effect
    pub fn stage(&self) -> ShaderStage {
        let stage = ShaderStage::new(self.name(), InjectionPoint::ScreenColor)
            .input("color", ShaderType::Vec4)
            .input("uv", ShaderType::Vec2)
            .output("color", ShaderType::Vec4);

        match self {
            Effect::ColorGrading(_) => stage
                .uniform("grading_brightness", ShaderType::Float)
                .uniform("grading_contrast", ShaderType::Float)
                .uniform("grading_saturation", ShaderType::Float)
                .body(concat!(
                    "var graded = color.rgb + vec3<f32>(u.grading_brightness);\n",
                    "graded = (graded - vec3<f32>(0.5)) * (1.0 + u.grading_contrast) + vec3<f32>(0.5);\n",
                    "graded = mix(vec3<f32>(luminance(graded)), graded, 1.0 + u.grading_saturation);\n",
                    "color = vec4<f32>(graded, color.a);",
                )),
            Effect::ChromaticAberration(_) => stage
                .uniform("chromatic_aberration_offset", ShaderType::Vec2)
                .body(concat!(
                    "let aberration_r = sample_input(uv + u.chromatic_aberration_offset).r;\n",
                    "let aberration_b = sample_input(uv - u.chromatic_aberration_offset).b;\n",
                    "color = vec4<f32>(aberration_r, color.g, aberration_b, color.a);",
                )),
            Effect::Bloom(_) => stage
                .uniform("bloom_threshold", ShaderType::Float)
                .uniform("bloom_smoothing", ShaderType::Float)
                .uniform("bloom_intensity", ShaderType::Float)
                .uniform("bloom_radius", ShaderType::Float)
                .body(concat!(
                    "var bloom_sum = vec3<f32>(0.0);\n",
                    "let bloom_texel = vec2<f32>(u.bloom_radius) / u.resolution;\n",
                    "for (var i = -2; i <= 2; i = i + 1) {\n",
                    "    for (var j = -2; j <= 2; j = j + 1) {\n",
                    "        let tap = sample_input(uv + vec2<f32>(f32(i), f32(j)) * bloom_texel).rgb;\n",
                    "        let mask = smoothstep(u.bloom_threshold, u.bloom_threshold + u.bloom_smoothing, luminance(tap));\n",
                    "        bloom_sum = bloom_sum + tap * mask;\n",
                    "    }\n",
                    "}\n",
                    "color = vec4<f32>(color.rgb + bloom_sum / 25.0 * u.bloom_intensity, color.a);",
                )),
            Effect::Noise(noise) => stage
                .uniform("noise_opacity", ShaderType::Float)
                .body(&format!(
                    "let noise_value = vec3<f32>(hash(uv * u.resolution + vec2<f32>(u.time * 60.0)));\n\
                     color = vec4<f32>(mix(color.rgb, {}, u.noise_opacity), color.a);",
                    noise.blend.wgsl("color.rgb", "noise_value")
                )),
            Effect::Glitch(_) => stage
                .uniform("glitch_strength", ShaderType::Vec2)
                .uniform("glitch_columns", ShaderType::Float)
                .uniform("glitch_perturbation_map", ShaderType::Texture2d)
                .body(concat!(
                    "let glitch_column = floor(uv.x / max(u.glitch_columns, 1e-3)) * u.glitch_columns;\n",
                    "let glitch_coord = vec2<f32>(glitch_column, uv.y) + vec2<f32>(fract(u.time * 0.5));\n",
                    "let glitch_map = textureSample(glitch_perturbation_map, glitch_perturbation_map_sampler, glitch_coord);\n",
                    "let glitch_shift = (glitch_map.rg - vec2<f32>(0.5)) * u.glitch_strength;\n",
                    "color = vec4<f32>(sample_input(uv + glitch_shift).rgb, color.a);",
                )),
        }
    }

    /// Write this effect's parameters into a linked uniform block
    pub fn write_uniforms(&self, block: &mut UniformBlock) -> Result<()> {
        match self {
            Effect::ColorGrading(grading) => {
                block.set_float("grading_brightness", grading.brightness)?;
                block.set_float("grading_contrast", grading.contrast)?;
                block.set_float("grading_saturation", grading.saturation)
            }
            Effect::ChromaticAberration(aberration) => {
                block.set_vec2("chromatic_aberration_offset", aberration.offset)
            }
            Effect::Bloom(bloom) => {
                block.set_float("bloom_threshold", bloom.luminance_threshold)?;
                block.set_float("bloom_smoothing", bloom.luminance_smoothing)?;
                block.set_float("bloom_intensity", bloom.intensity)?;
                block.set_float("bloom_radius", bloom.radius)
            }
            Effect::Noise(noise) => block.set_float("noise_opacity", noise.opacity),
            Effect::Glitch(glitch) => {
                block.set_vec2("glitch_strength", glitch.strength)?;
                block.set_float("glitch_columns", glitch.columns)
            }
        }
    }

    /// Texture uniform this effect samples, if any
    pub fn texture(&self) -> Option<(&'static str, &Arc<dyn Texture>)> {
        match self {
            Effect::Glitch(glitch) => Some(("glitch_perturbation_map", &glitch.perturbation_map)),
            _ => None,
        }
    }
}

impl From<ColorGrading> for Effect {
    fn from(effect: ColorGrading) -> Self {
        Effect::ColorGrading(effect)
    }
}

impl From<ChromaticAberration> for Effect {
    fn from(effect: ChromaticAberration) -> Self {
        Effect::ChromaticAberration(effect)
    }
}

impl From<Bloom> for Effect {
    fn from(effect: Bloom) -> Self {
        Effect::Bloom(effect)
    }
}

impl From<Noise> for Effect {
    fn from(effect: Noise) -> Self {
        Effect::Noise(effect)
    }
}

impl From<Glitch> for Effect {
    fn from(effect: Glitch) -> Self {
        Effect::Glitch(effect)
    }
}
