use glam::Vec2;
use super::*;
use crate::composer::{Bloom, BlendFunction, ChromaticAberration, Glitch, Noise};
use crate::composer::test_scenes::run_pass;
use crate::device::mock_graphics_device::{MockGraphicsDevice, mock_content};

fn input(device: &mut MockGraphicsDevice, content: &str) -> SharedFrameBuffer {
    let buffer = FrameBuffer::new(device, FrameBufferDesc::new("input", 800, 600, TextureFormat::R16G16B16A16_SFLOAT)).unwrap();
    crate::device::mock_graphics_device::as_mock(&buffer.color()).set_content(content);
    buffer
}

#[test]
fn test_applies_effects_to_input() {
    let mut device = MockGraphicsDevice::new(800, 600);
    let source = input(&mut device, "scene");
    let mut pass = EffectPass::new("bloom", vec![Bloom::default().into()]);

    let output = run_pass(&mut device, &mut pass, Some(&source)).unwrap().unwrap();

    assert_eq!(mock_content(&output.color()), "bloom[scene]");
    assert_eq!(output.size(), (800, 600));
    assert_eq!(pass.shader().unwrap().stage_names(), ["bloom"]);
}

#[test]
fn test_binds_effect_textures() {
    let mut device = MockGraphicsDevice::new(800, 600);
    let source = input(&mut device, "holo");
    let perturbation = device.uploaded_texture("perturbation").unwrap();
    let effects = vec![
        Glitch::new(perturbation).with_strength(Vec2::new(0.1, 0.1)).into(),
        Noise { opacity: 0.05, blend: BlendFunction::ColorDodge }.into(),
    ];
    let mut pass = EffectPass::new("glitch", effects);

    let output = run_pass(&mut device, &mut pass, Some(&source)).unwrap().unwrap();

    assert_eq!(mock_content(&output.color()), "glitch[holo,uploaded:perturbation]");
    let shader = pass.shader().unwrap();
    assert_eq!(shader.texture_slot("glitch_perturbation_map"), Some(1));
    assert!(shader.source().contains("// stage: noise"));
}

#[test]
fn test_renders_to_screen() {
    let mut device = MockGraphicsDevice::new(800, 600);
    let source = input(&mut device, "scene");
    let mut pass = EffectPass::new("aberration", vec![ChromaticAberration::default().into()]);
    pass.set_render_to_screen(true);

    assert!(run_pass(&mut device, &mut pass, Some(&source)).unwrap().is_none());
    assert_eq!(device.surface_content(), "aberration[scene]");
    assert!(pass.output().is_none());
}

#[test]
fn test_missing_input_fails() {
    let mut device = MockGraphicsDevice::new(800, 600);
    let mut pass = EffectPass::new("bloom", vec![Bloom::default().into()]);

    assert!(matches!(run_pass(&mut device, &mut pass, None), Err(Error::InvalidResource(_))));
}

#[test]
fn test_uniform_values_are_pushed() {
    let mut device = MockGraphicsDevice::new(800, 600);
    let source = input(&mut device, "scene");
    let bloom = Bloom { luminance_threshold: 0.05, luminance_smoothing: 0.01, ..Bloom::default() };
    let mut pass = EffectPass::new("bloom", vec![bloom.into()]);

    run_pass(&mut device, &mut pass, Some(&source)).unwrap();

    let layout = pass.shader().unwrap().uniform_layout().clone();
    let pushed = device.state().last_push_constants.clone();
    assert_eq!(pushed.len(), layout.size() as usize);
    let offset = layout.slot("bloom_threshold").unwrap().offset as usize;
    assert_eq!(&pushed[offset..offset + 4], &0.05f32.to_ne_bytes());
    // time is the frame's elapsed time
    assert_eq!(&pushed[0..4], &1.0f32.to_ne_bytes());
}

#[test]
fn test_relinks_only_when_shape_changes() {
    let mut device = MockGraphicsDevice::new(800, 600);
    let source = input(&mut device, "scene");
    let mut pass = EffectPass::new("noise", vec![Noise::default().into()]);

    run_pass(&mut device, &mut pass, Some(&source)).unwrap();
    run_pass(&mut device, &mut pass, Some(&source)).unwrap();
    assert_eq!(device.state().pipelines_created.len(), 1);

    if let Some(Effect::Noise(noise)) = pass.effects_mut().first_mut() {
        noise.opacity = 0.5;
    }
    run_pass(&mut device, &mut pass, Some(&source)).unwrap();
    assert_eq!(device.state().pipelines_created.len(), 1);

    if let Some(Effect::Noise(noise)) = pass.effects_mut().first_mut() {
        noise.blend = BlendFunction::ColorDodge;
    }
    run_pass(&mut device, &mut pass, Some(&source)).unwrap();
    assert_eq!(device.state().pipelines_created.len(), 2);
}

#[test]
fn test_duplicate_effect_kind_fails_to_link() {
    let mut device = MockGraphicsDevice::new(800, 600);
    let source = input(&mut device, "scene");
    let mut pass = EffectPass::new("double", vec![Bloom::default().into(), Bloom::default().into()]);

    assert!(matches!(run_pass(&mut device, &mut pass, Some(&source)), Err(Error::ShaderLinkFailed(_))));
}

#[test]
fn test_blend_functions() {
    assert_eq!(BlendFunction::Normal.apply(0.2, 0.6), 0.6);
    assert_eq!(BlendFunction::Add.apply(0.7, 0.6), 1.0);
    assert!((BlendFunction::Screen.apply(0.5, 0.5) - 0.75).abs() < 1e-6);
    assert!((BlendFunction::Multiply.apply(0.5, 0.5) - 0.25).abs() < 1e-6);
    assert!((BlendFunction::ColorDodge.apply(0.25, 0.5) - 0.5).abs() < 1e-6);
    assert_eq!(BlendFunction::ColorDodge.apply(0.5, 1.0), 1.0);
}
