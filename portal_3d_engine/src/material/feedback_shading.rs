/// CPU reference of the feedback surface math.
///
/// These functions mirror the WGSL stages linked by `FeedbackMaterial`
/// line for line. They are what the tests check, and what tooling uses
/// to predict a frame without a GPU.

use glam::{Vec2, Vec3, Vec4};
use crate::material::FeedbackParams;

/// Hermite step between `edge0` and `edge1`.
///
/// Degenerate edges (`edge1 <= edge0`) behave as a hard step at `edge0`.
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if edge1 <= edge0 {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Vertical scroll offset in `[0, 1)` for shader time `time`.
///
/// The offset completes one full turn every `period` units of time.
/// A non-positive period disables scrolling.
pub fn scroll_offset(time: f32, period: f32) -> f32 {
    if period <= 0.0 {
        return 0.0;
    }
    time.rem_euclid(period) / period
}

/// Coordinate used to sample the feedback texture: V scrolls and wraps,
/// U is left to the sampler.
pub fn feedback_uv(uv: Vec2, time: f32, period: f32) -> Vec2 {
    Vec2::new(uv.x, (uv.y - scroll_offset(time, period)).rem_euclid(1.0))
}

/// Shade one fragment.
///
/// `base` is the surface color (alpha map already applied), `sample` the
/// feedback texel and `surface_z` the z of the normalized object-space
/// position.
pub fn shade(params: &FeedbackParams, base: Vec4, sample: Vec4, surface_z: f32) -> Vec4 {
    let rgb = base.truncate() * params.channel_scale + Vec3::splat(params.feedback_gain * sample.x);
    let intensity = params.alpha_floor
        + smoothstep(params.intensity_edges.x, params.intensity_edges.y, sample.x);
    let depth = smoothstep(params.depth_edges.x, params.depth_edges.y, surface_z);
    rgb.extend(base.w * intensity * depth)
}

/// Displace a vertex along its normal by the feedback intensity.
///
/// Returns `position` unchanged when the preset has no displacement.
pub fn displace(params: &FeedbackParams, position: Vec3, normal: Vec3, sample: Vec4) -> Vec3 {
    match params.displacement_scale {
        Some(scale) => position + normal * (sample.x * scale),
        None => position,
    }
}

#[cfg(test)]
#[path = "feedback_shading_tests.rs"]
mod tests;
