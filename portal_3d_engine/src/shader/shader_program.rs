/// Shader program composition and linking.
///
/// A `ShaderProgram` is a base shader plus an ordered list of stages.
/// `link()` type-checks the stages, lays out the uniform block and
/// produces the final source handed to `GraphicsDevice::create_pipeline`.

use std::fmt;
use rustc_hash::FxHashMap;
use glam::{Vec2, Vec3, Vec4};
use crate::error::{Error, Result};

// ===== TYPES =====

/// Type of a shader variable or uniform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderType {
    Float,
    Vec2,
    Vec3,
    Vec4,
    /// Sampled 2D texture (bound to a texture slot, not the uniform block)
    Texture2d,
}

impl ShaderType {
    /// WGSL spelling
    pub fn wgsl(self) -> &'static str {
        match self {
            ShaderType::Float => "f32",
            ShaderType::Vec2 => "vec2<f32>",
            ShaderType::Vec3 => "vec3<f32>",
            ShaderType::Vec4 => "vec4<f32>",
            ShaderType::Texture2d => "texture_2d<f32>",
        }
    }

    /// Number of f32 components (0 for textures)
    pub fn components(self) -> u32 {
        match self {
            ShaderType::Float => 1,
            ShaderType::Vec2 => 2,
            ShaderType::Vec3 => 3,
            ShaderType::Vec4 => 4,
            ShaderType::Texture2d => 0,
        }
    }

    /// Uniform-block alignment in bytes
    fn align(self) -> u32 {
        match self {
            ShaderType::Float => 4,
            ShaderType::Vec2 => 8,
            ShaderType::Vec3 | ShaderType::Vec4 => 16,
            ShaderType::Texture2d => 1,
        }
    }

    pub fn is_texture(self) -> bool {
        self == ShaderType::Texture2d
    }
}

/// Named point in a base shader where stages are spliced in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InjectionPoint {
    /// Vertex stage, before the model/view/projection transform
    PreTransform,
    /// Vertex stage, after the transform
    PostTransform,
    /// Fragment stage, after the surface color is sampled, before lighting
    PostColor,
    /// Full-screen fragment stage, after the input color is sampled
    ScreenColor,
}

impl InjectionPoint {
    /// Marker name used in base shader templates (`//@inject <name>`)
    pub fn marker(self) -> &'static str {
        match self {
            InjectionPoint::PreTransform => "pre_transform",
            InjectionPoint::PostTransform => "post_transform",
            InjectionPoint::PostColor => "post_color",
            InjectionPoint::ScreenColor => "screen_color",
        }
    }

    fn from_marker(marker: &str) -> Option<Self> {
        [
            InjectionPoint::PreTransform,
            InjectionPoint::PostTransform,
            InjectionPoint::PostColor,
            InjectionPoint::ScreenColor,
        ]
        .into_iter()
        .find(|point| point.marker() == marker)
    }
}

impl fmt::Display for InjectionPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.marker())
    }
}

/// Typed, named shader variable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderVariable {
    pub name: String,
    pub ty: ShaderType,
}

impl ShaderVariable {
    pub fn new(name: &str, ty: ShaderType) -> Self {
        Self { name: name.to_string(), ty }
    }
}

// ===== BASE SHADER =====

/// Shader template with injection points
///
/// Template markers: `//@inject <point>` (stage bodies), `//@uniforms`
/// (generated push-constant block) and `//@textures` (stage texture
/// bindings). Base textures are declared by the template itself, two
/// bindings per slot (texture, sampler).
#[derive(Debug, Clone)]
pub struct BaseShader {
    name: String,
    template: String,
    points: Vec<(InjectionPoint, Vec<ShaderVariable>)>,
    uniforms: Vec<ShaderVariable>,
    textures: Vec<String>,
}

impl BaseShader {
    pub fn new(name: &str, template: &str) -> Self {
        Self {
            name: name.to_string(),
            template: template.to_string(),
            points: Vec::new(),
            uniforms: Vec::new(),
            textures: Vec::new(),
        }
    }

    /// Declare an injection point and the variables in scope there
    pub fn provides(mut self, point: InjectionPoint, variables: &[(&str, ShaderType)]) -> Self {
        let variables = variables.iter().map(|(name, ty)| ShaderVariable::new(name, *ty)).collect();
        self.points.push((point, variables));
        self
    }

    /// Declare a uniform that is always part of the uniform block
    pub fn uniform(mut self, name: &str, ty: ShaderType) -> Self {
        self.uniforms.push(ShaderVariable::new(name, ty));
        self
    }

    /// Declare a texture slot bound by the template itself
    pub fn texture(mut self, name: &str) -> Self {
        self.textures.push(name.to_string());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn has_point(&self, point: InjectionPoint) -> bool {
        self.points.iter().any(|(p, _)| *p == point)
    }
}

// ===== STAGE =====

/// Shader fragment injected at one point of a base shader
///
/// Inputs must be in scope at the injection point. Outputs that are not
/// yet in scope are declared by the linker; outputs that already exist
/// are assigned in place and must keep their type. Uniforms are read as
/// `u.<name>` in the body; texture uniforms get `<name>` and
/// `<name>_sampler` bindings.
#[derive(Debug, Clone)]
pub struct ShaderStage {
    name: String,
    point: InjectionPoint,
    inputs: Vec<ShaderVariable>,
    outputs: Vec<ShaderVariable>,
    uniforms: Vec<ShaderVariable>,
    body: String,
}

impl ShaderStage {
    pub fn new(name: &str, point: InjectionPoint) -> Self {
        Self {
            name: name.to_string(),
            point,
            inputs: Vec::new(),
            outputs: Vec::new(),
            uniforms: Vec::new(),
            body: String::new(),
        }
    }

    pub fn input(mut self, name: &str, ty: ShaderType) -> Self {
        self.inputs.push(ShaderVariable::new(name, ty));
        self
    }

    pub fn output(mut self, name: &str, ty: ShaderType) -> Self {
        self.outputs.push(ShaderVariable::new(name, ty));
        self
    }

    pub fn uniform(mut self, name: &str, ty: ShaderType) -> Self {
        self.uniforms.push(ShaderVariable::new(name, ty));
        self
    }

    pub fn body(mut self, body: &str) -> Self {
        self.body = body.to_string();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn point(&self) -> InjectionPoint {
        self.point
    }

    pub fn inputs(&self) -> &[ShaderVariable] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[ShaderVariable] {
        &self.outputs
    }

    pub fn uniforms(&self) -> &[ShaderVariable] {
        &self.uniforms
    }
}

// ===== PROGRAM BUILDER =====

/// Entry point for composing shader programs
///
/// # Example
///
/// ```
/// use portal_3d_engine::portal3d::shader::*;
///
/// let linked = ShaderProgram::builder(BaseShader::fullscreen())
///     .stage(ShaderStage::new("invert", InjectionPoint::ScreenColor)
///         .input("color", ShaderType::Vec4)
///         .output("color", ShaderType::Vec4)
///         .body("color = vec4<f32>(1.0 - color.rgb, color.a);"))
///     .link()
///     .unwrap();
/// assert_eq!(linked.stage_names(), ["invert"]);
/// ```
pub struct ShaderProgram;

impl ShaderProgram {
    pub fn builder(base: BaseShader) -> ShaderProgramBuilder {
        ShaderProgramBuilder { base, stages: Vec::new() }
    }
}

/// Ordered list of stages on top of a base shader
pub struct ShaderProgramBuilder {
    base: BaseShader,
    stages: Vec<ShaderStage>,
}

impl ShaderProgramBuilder {
    /// Append a stage; stages at the same point run in insertion order
    pub fn stage(mut self, stage: ShaderStage) -> Self {
        self.stages.push(stage);
        self
    }

    /// Append several stages
    pub fn stages(mut self, stages: impl IntoIterator<Item = ShaderStage>) -> Self {
        self.stages.extend(stages);
        self
    }

    /// Type-check all stages and produce the final program
    pub fn link(self) -> Result<LinkedShader> {
        let base = &self.base;
        let fail = |message: String| {
            Err(Error::ShaderLinkFailed(format!("{}: {}", base.name, message)))
        };

        let mut scopes: FxHashMap<InjectionPoint, Vec<ShaderVariable>> = base.points.iter().cloned().collect();
        let mut declared: FxHashMap<String, ShaderType> = FxHashMap::default();
        let mut uniforms: Vec<ShaderVariable> = Vec::new();
        let mut textures: Vec<String> = base.textures.clone();
        let mut new_outputs: FxHashMap<String, Vec<ShaderVariable>> = FxHashMap::default();

        for uniform in &base.uniforms {
            declared.insert(uniform.name.clone(), uniform.ty);
            uniforms.push(uniform.clone());
        }
        for texture in &base.textures {
            declared.insert(texture.clone(), ShaderType::Texture2d);
        }

        for (index, stage) in self.stages.iter().enumerate() {
            if self.stages[..index].iter().any(|other| other.name == stage.name) {
                return fail(format!("duplicate stage '{}'", stage.name));
            }

            let Some(scope) = scopes.get_mut(&stage.point) else {
                return fail(format!("stage '{}' targets missing injection point '{}'", stage.name, stage.point));
            };

            for input in &stage.inputs {
                match scope.iter().find(|var| var.name == input.name) {
                    None => {
                        return fail(format!(
                            "stage '{}' requires '{}' ({}) which is not available at '{}'",
                            stage.name, input.name, input.ty.wgsl(), stage.point
                        ));
                    }
                    Some(var) if var.ty != input.ty => {
                        return fail(format!(
                            "stage '{}' expects '{}' as {} but '{}' provides {}",
                            stage.name, input.name, input.ty.wgsl(), stage.point, var.ty.wgsl()
                        ));
                    }
                    Some(_) => {}
                }
            }

            let mut declared_here = Vec::new();
            for output in &stage.outputs {
                match scope.iter().find(|var| var.name == output.name) {
                    Some(var) if var.ty != output.ty => {
                        return fail(format!(
                            "stage '{}' writes '{}' as {} but it is {}",
                            stage.name, output.name, output.ty.wgsl(), var.ty.wgsl()
                        ));
                    }
                    Some(_) => {}
                    None => {
                        scope.push(output.clone());
                        declared_here.push(output.clone());
                    }
                }
            }
            new_outputs.insert(stage.name.clone(), declared_here);

            for uniform in &stage.uniforms {
                if declared.contains_key(&uniform.name) {
                    return fail(format!("stage '{}' redeclares uniform '{}'", stage.name, uniform.name));
                }
                declared.insert(uniform.name.clone(), uniform.ty);
                if uniform.ty.is_texture() {
                    textures.push(uniform.name.clone());
                } else {
                    uniforms.push(uniform.clone());
                }
            }
        }

        let layout = UniformLayout::build(&uniforms);
        let source = generate_source(base, &self.stages, &new_outputs, &layout, &textures);
        let stage_names: Vec<String> = self.stages.iter().map(|stage| stage.name.clone()).collect();
        let label = if stage_names.is_empty() {
            base.name.clone()
        } else {
            format!("{}+{}", base.name, stage_names.join("+"))
        };

        Ok(LinkedShader {
            label,
            source,
            stage_names,
            layout,
            textures,
        })
    }
}

fn generate_source(
    base: &BaseShader,
    stages: &[ShaderStage],
    new_outputs: &FxHashMap<String, Vec<ShaderVariable>>,
    layout: &UniformLayout,
    textures: &[String],
) -> String {
    let mut out = String::with_capacity(base.template.len() + 1024);

    for line in base.template.lines() {
        let trimmed = line.trim();
        if trimmed == "//@uniforms" {
            if !layout.slots.is_empty() {
                out.push_str("struct Uniforms {\n");
                for slot in &layout.slots {
                    out.push_str(&format!("    {}: {},\n", slot.name, slot.ty.wgsl()));
                }
                out.push_str("};\n\nvar<push_constant> u: Uniforms;\n");
            }
        } else if trimmed == "//@textures" {
            for (slot, name) in textures.iter().enumerate().skip(base.textures.len()) {
                out.push_str(&format!(
                    "@group(0) @binding({}) var {}: texture_2d<f32>;\n@group(0) @binding({}) var {}_sampler: sampler;\n",
                    slot * 2, name, slot * 2 + 1, name
                ));
            }
        } else if let Some(point) = trimmed.strip_prefix("//@inject ").and_then(InjectionPoint::from_marker) {
            for stage in stages.iter().filter(|stage| stage.point == point) {
                out.push_str(&format!("    // stage: {}\n", stage.name));
                for var in new_outputs.get(&stage.name).into_iter().flatten() {
                    out.push_str(&format!("    var {}: {};\n", var.name, var.ty.wgsl()));
                }
                for body_line in stage.body.lines() {
                    out.push_str("    ");
                    out.push_str(body_line.trim_end());
                    out.push('\n');
                }
            }
        } else {
            out.push_str(line);
            out.push('\n');
        }
    }

    out
}

// ===== LINKED SHADER =====

/// Result of a successful link
#[derive(Debug, Clone)]
pub struct LinkedShader {
    label: String,
    source: String,
    stage_names: Vec<String>,
    layout: UniformLayout,
    textures: Vec<String>,
}

impl LinkedShader {
    /// `base+stage+stage` label, used for pipeline debug names
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Final shader source
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn stage_names(&self) -> &[String] {
        &self.stage_names
    }

    pub fn uniform_layout(&self) -> &UniformLayout {
        &self.layout
    }

    /// Fresh zero-filled uniform block for this program
    pub fn uniform_block(&self) -> UniformBlock {
        UniformBlock::new(self.layout.clone())
    }

    /// Texture slot names, base textures first
    pub fn textures(&self) -> &[String] {
        &self.textures
    }

    /// Slot index of a texture uniform
    pub fn texture_slot(&self, name: &str) -> Option<u32> {
        self.textures.iter().position(|texture| texture == name).map(|slot| slot as u32)
    }
}

// ===== UNIFORM BLOCK =====

/// One field of the uniform block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformSlot {
    pub name: String,
    pub ty: ShaderType,
    /// Byte offset inside the block
    pub offset: u32,
}

/// Uniform block layout (WGSL alignment rules, size rounded to 16 bytes)
#[derive(Debug, Clone, Default)]
pub struct UniformLayout {
    slots: Vec<UniformSlot>,
    index: FxHashMap<String, usize>,
    size: u32,
}

impl UniformLayout {
    fn build(uniforms: &[ShaderVariable]) -> Self {
        let mut layout = UniformLayout::default();
        let mut offset = 0u32;
        for uniform in uniforms {
            let align = uniform.ty.align();
            offset = offset.div_ceil(align) * align;
            layout.index.insert(uniform.name.clone(), layout.slots.len());
            layout.slots.push(UniformSlot {
                name: uniform.name.clone(),
                ty: uniform.ty,
                offset,
            });
            offset += uniform.ty.components() * 4;
        }
        layout.size = offset.div_ceil(16) * 16;
        layout
    }

    pub fn slots(&self) -> &[UniformSlot] {
        &self.slots
    }

    pub fn slot(&self, name: &str) -> Option<&UniformSlot> {
        self.index.get(name).map(|&index| &self.slots[index])
    }

    /// Block size in bytes
    pub fn size(&self) -> u32 {
        self.size
    }
}

/// CPU-side uniform values laid out for upload
#[derive(Debug, Clone)]
pub struct UniformBlock {
    layout: UniformLayout,
    data: Vec<f32>,
}

impl UniformBlock {
    pub fn new(layout: UniformLayout) -> Self {
        let data = vec![0.0; (layout.size / 4) as usize];
        Self { layout, data }
    }

    pub fn layout(&self) -> &UniformLayout {
        &self.layout
    }

    pub fn set_float(&mut self, name: &str, value: f32) -> Result<()> {
        self.write(name, ShaderType::Float, &[value])
    }

    pub fn set_vec2(&mut self, name: &str, value: Vec2) -> Result<()> {
        self.write(name, ShaderType::Vec2, &value.to_array())
    }

    pub fn set_vec3(&mut self, name: &str, value: Vec3) -> Result<()> {
        self.write(name, ShaderType::Vec3, &value.to_array())
    }

    pub fn set_vec4(&mut self, name: &str, value: Vec4) -> Result<()> {
        self.write(name, ShaderType::Vec4, &value.to_array())
    }

    /// Components of a uniform, if it exists
    pub fn get(&self, name: &str) -> Option<&[f32]> {
        let slot = self.layout.slot(name)?;
        let start = (slot.offset / 4) as usize;
        Some(&self.data[start..start + slot.ty.components() as usize])
    }

    /// Raw bytes for `CommandList::push_constants`
    pub fn bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }

    fn write(&mut self, name: &str, ty: ShaderType, values: &[f32]) -> Result<()> {
        let Some(slot) = self.layout.slot(name) else {
            return Err(Error::InvalidResource(format!("unknown uniform '{}'", name)));
        };
        if slot.ty != ty {
            return Err(Error::InvalidResource(format!(
                "uniform '{}' is {}, not {}", name, slot.ty.wgsl(), ty.wgsl()
            )));
        }
        let start = (slot.offset / 4) as usize;
        self.data[start..start + values.len()].copy_from_slice(values);
        Ok(())
    }
}

#[cfg(test)]
#[path = "shader_program_tests.rs"]
mod tests;
