/// Built-in base shaders.

use crate::shader::{BaseShader, InjectionPoint, ShaderType};

const PHYSICAL_SURFACE_WGSL: &str = r#"
struct FrameUniforms {
    model: mat4x4<f32>,
    view_projection: mat4x4<f32>,
    camera_position: vec4<f32>,
    light_direction: vec4<f32>,
};

struct MaterialUniforms {
    color: vec4<f32>,
    roughness: f32,
    metalness: f32,
};

@group(1) @binding(0) var<uniform> frame: FrameUniforms;
@group(1) @binding(1) var<uniform> material: MaterialUniforms;

@group(0) @binding(0) var base_color_map: texture_2d<f32>;
@group(0) @binding(1) var base_color_map_sampler: sampler;
@group(0) @binding(2) var alpha_map: texture_2d<f32>;
@group(0) @binding(3) var alpha_map_sampler: sampler;
//@textures

//@uniforms

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
    @location(3) surface_position: vec3<f32>,
};

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    var position = in.position;
    let normal = in.normal;
    let uv = in.uv;
//@inject pre_transform
    let world = frame.model * vec4<f32>(position, 1.0);
    let world_position = world.xyz;
    var clip_position = frame.view_projection * world;
    var surface_position = normalize(position);
//@inject post_transform
    var out: VertexOutput;
    out.clip_position = clip_position;
    out.world_position = world_position;
    out.world_normal = normalize((frame.model * vec4<f32>(normal, 0.0)).xyz);
    out.uv = uv;
    out.surface_position = surface_position;
    return out;
}

fn shade_physical(albedo: vec3<f32>, normal: vec3<f32>, world_position: vec3<f32>) -> vec3<f32> {
    let n = normalize(normal);
    let l = normalize(-frame.light_direction.xyz);
    let v = normalize(frame.camera_position.xyz - world_position);
    let h = normalize(l + v);
    let diffuse = albedo * (1.0 - material.metalness) * max(dot(n, l), 0.0);
    let shininess = mix(256.0, 4.0, material.roughness);
    let f0 = mix(vec3<f32>(0.04), albedo, material.metalness);
    let specular = f0 * pow(max(dot(n, h), 0.0), shininess);
    return diffuse + specular + albedo * 0.03;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let uv = in.uv;
    let surface_position = in.surface_position;
    let world_normal = in.world_normal;
    var diffuse_color = material.color * textureSample(base_color_map, base_color_map_sampler, uv);
    diffuse_color.a = diffuse_color.a * textureSample(alpha_map, alpha_map_sampler, uv).g;
//@inject post_color
    let lit = shade_physical(diffuse_color.rgb, world_normal, in.world_position);
    return vec4<f32>(lit, diffuse_color.a);
}
"#;

const FULLSCREEN_WGSL: &str = r#"
@group(0) @binding(0) var input_texture: texture_2d<f32>;
@group(0) @binding(1) var input_texture_sampler: sampler;
//@textures

//@uniforms

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_main(@builtin(vertex_index) index: u32) -> VertexOutput {
    var out: VertexOutput;
    let x = f32((index << 1u) & 2u);
    let y = f32(index & 2u);
    out.clip_position = vec4<f32>(x * 2.0 - 1.0, 1.0 - y * 2.0, 0.0, 1.0);
    out.uv = vec2<f32>(x, y);
    return out;
}

fn sample_input(coord: vec2<f32>) -> vec4<f32> {
    return textureSample(input_texture, input_texture_sampler, coord);
}

fn luminance(color: vec3<f32>) -> f32 {
    return dot(color, vec3<f32>(0.2126, 0.7152, 0.0722));
}

fn hash(p: vec2<f32>) -> f32 {
    return fract(sin(dot(p, vec2<f32>(12.9898, 78.233))) * 43758.5453);
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let uv = in.uv;
    var color = sample_input(uv);
//@inject screen_color
    return color;
}
"#;

impl BaseShader {
    /// Lit surface shader with a base color map and an alpha map.
    ///
    /// Injection points:
    /// * `PreTransform`: `position` (mutable), `normal`, `uv`
    /// * `PostTransform`: `clip_position` (mutable), `surface_position`
    ///   (normalized object-space position, mutable), `world_position`
    /// * `PostColor`: `diffuse_color` (mutable), `uv`, `surface_position`,
    ///   `world_normal`
    pub fn physical_surface() -> Self {
        BaseShader::new("physical_surface", PHYSICAL_SURFACE_WGSL)
            .texture("base_color_map")
            .texture("alpha_map")
            .provides(InjectionPoint::PreTransform, &[
                ("position", ShaderType::Vec3),
                ("normal", ShaderType::Vec3),
                ("uv", ShaderType::Vec2),
            ])
            .provides(InjectionPoint::PostTransform, &[
                ("clip_position", ShaderType::Vec4),
                ("surface_position", ShaderType::Vec3),
                ("world_position", ShaderType::Vec3),
            ])
            .provides(InjectionPoint::PostColor, &[
                ("diffuse_color", ShaderType::Vec4),
                ("uv", ShaderType::Vec2),
                ("surface_position", ShaderType::Vec3),
                ("world_normal", ShaderType::Vec3),
            ])
    }

    /// Full-screen triangle reading one input texture.
    ///
    /// `ScreenColor` provides `color` (mutable) and `uv`. Stage bodies may
    /// call `sample_input(coord)`, `luminance(rgb)` and `hash(p)`.
    /// Uniforms `time` and `resolution` are always present.
    pub fn fullscreen() -> Self {
        BaseShader::new("fullscreen", FULLSCREEN_WGSL)
            .texture("input_texture")
            .uniform("time", ShaderType::Float)
            .uniform("resolution", ShaderType::Vec2)
            .provides(InjectionPoint::ScreenColor, &[
                ("color", ShaderType::Vec4),
                ("uv", ShaderType::Vec2),
            ])
    }
}
