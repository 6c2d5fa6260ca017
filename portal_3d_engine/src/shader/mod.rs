//! Shader composition.
//!
//! Materials and effects extend a base shader by injecting typed stages
//! at named points. Linking checks every stage against the variables in
//! scope at its injection point and fails with `Error::ShaderLinkFailed`
//! before any GPU pipeline is created.

mod shader_program;
mod base_shaders;

pub use shader_program::{
    ShaderType, InjectionPoint, ShaderVariable, BaseShader, ShaderStage,
    ShaderProgram, ShaderProgramBuilder, LinkedShader,
    UniformSlot, UniformLayout, UniformBlock,
};
