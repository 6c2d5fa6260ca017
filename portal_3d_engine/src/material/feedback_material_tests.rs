use std::sync::Arc;
use serial_test::serial;
use super::*;
use crate::composer::FrameBuffer;
use crate::device::{ClearValue, GraphicsDevice};
use crate::device::mock_graphics_device::MockGraphicsDevice;
use crate::engine::Engine;
use crate::log::{LogEntry, LogSeverity, Logger};

fn make_material(device: &mut MockGraphicsDevice, params: FeedbackParams) -> FeedbackMaterial {
    let base_color = device.uploaded_texture("base").unwrap();
    let alpha_map = device.uploaded_texture("alpha").unwrap();
    let feedback = FrameBuffer::blank(device, "feedback", TextureFormat::R16G16B16A16_SFLOAT).unwrap();
    FeedbackMaterial::new(device, base_color, alpha_map, feedback, params).unwrap()
}

struct CountingLogger {
    warnings: Arc<std::sync::Mutex<Vec<String>>>,
}

impl Logger for CountingLogger {
    fn log(&self, entry: &LogEntry) {
        if entry.severity == LogSeverity::Warn && entry.source == "portal3d::FeedbackMaterial" {
            self.warnings.lock().unwrap().push(entry.message.clone());
        }
    }
}

// ============================================================================
// Linking
// ============================================================================

#[test]
fn test_holo_links_color_stage_only() {
    let mut device = MockGraphicsDevice::new(64, 64);
    let material = make_material(&mut device, FeedbackParams::holo());

    assert_eq!(material.shader().stage_names(), ["feedback_color"]);
    assert_eq!(material.shader().texture_slot("feedback_texture"), Some(2));
    assert_eq!(material.pipeline().label(), "feedback_material:physical_surface+feedback_color");
    assert!(material.uniforms().layout().slot("feedback_displacement_scale").is_none());
}

#[test]
fn test_rippling_links_displacement_stage() {
    let mut device = MockGraphicsDevice::new(64, 64);
    let material = make_material(&mut device, FeedbackParams::holo_rippling());

    assert_eq!(material.shader().stage_names(), ["feedback_color", "feedback_displace"]);
    assert_eq!(material.uniforms().get("feedback_displacement_scale"), Some(&[0.05][..]));
    let source = material.shader().source();
    let displace_at = source.find("// stage: feedback_displace").unwrap();
    let color_at = source.find("// stage: feedback_color").unwrap();
    assert!(displace_at < color_at, "vertex stage is injected before the fragment stage");
}

#[test]
fn test_params_are_written_to_uniforms() {
    let mut device = MockGraphicsDevice::new(64, 64);
    let material = make_material(&mut device, FeedbackParams::holo());
    let uniforms = material.uniforms();

    assert_eq!(uniforms.get("feedback_channel_scale"), Some(&[0.2, 0.2, 6.0][..]));
    assert_eq!(uniforms.get("feedback_intensity_edges"), Some(&[0.2, 1.0][..]));
    assert_eq!(uniforms.get("feedback_depth_edges"), Some(&[0.65, 1.0][..]));
    assert_eq!(uniforms.get("feedback_alpha_floor"), Some(&[0.2][..]));
    assert_eq!(uniforms.get("feedback_time"), Some(&[0.0][..]));
}

#[test]
fn test_invalid_scroll_period_is_rejected() {
    let mut device = MockGraphicsDevice::new(64, 64);
    let base_color = device.uploaded_texture("base").unwrap();
    let alpha_map = device.uploaded_texture("alpha").unwrap();
    let feedback = FrameBuffer::blank(&mut device, "feedback", TextureFormat::R16G16B16A16_SFLOAT).unwrap();
    let params = FeedbackParams { scroll_period: 0.0, ..FeedbackParams::holo() };

    let result = FeedbackMaterial::new(&mut device, base_color, alpha_map, feedback, params);
    assert!(matches!(result, Err(Error::InvalidResource(_))));
}

// ============================================================================
// Clock
// ============================================================================

#[test]
fn test_advance_scales_elapsed_time() {
    let mut device = MockGraphicsDevice::new(64, 64);
    let mut material = make_material(&mut device, FeedbackParams::holo());

    material.advance(64.0).unwrap();

    assert_eq!(material.elapsed(), 64.0);
    assert!((material.time() - 0.5).abs() < 1e-6);
    assert!((material.scroll_offset() - 0.5).abs() < 1e-6);
    assert_eq!(material.uniforms().get("feedback_time"), Some(&[0.5][..]));

    material.advance(128.0).unwrap();
    assert!(material.scroll_offset().abs() < 1e-6);
}

#[test]
#[serial]
fn test_advance_ignores_time_going_backwards() {
    let warnings = Arc::new(std::sync::Mutex::new(Vec::new()));
    Engine::set_logger(CountingLogger { warnings: warnings.clone() });

    let mut device = MockGraphicsDevice::new(64, 64);
    let mut material = make_material(&mut device, FeedbackParams::holo());
    material.advance(10.0).unwrap();
    material.advance(5.0).unwrap();

    Engine::reset_logger();

    assert_eq!(material.elapsed(), 10.0);
    assert!((material.time() - 10.0 / 128.0).abs() < 1e-6);
    assert_eq!(warnings.lock().unwrap().len(), 1);
}

// ============================================================================
// Binding
// ============================================================================

#[test]
fn test_bind_samples_current_feedback_content() {
    let mut device = MockGraphicsDevice::new(64, 64);
    let material = make_material(&mut device, FeedbackParams::holo());

    let mut cmd = device.create_command_list().unwrap();
    cmd.begin().unwrap();
    cmd.begin_render_pass(None, None, &[ClearValue::Color([0.0; 4])]).unwrap();
    material.bind(cmd.as_mut()).unwrap();
    cmd.draw(6, 0).unwrap();
    cmd.end_render_pass().unwrap();
    cmd.end().unwrap();

    assert_eq!(
        device.surface_content(),
        "feedback_material:physical_surface+feedback_color[uploaded:base,uploaded:alpha,blank]"
    );
    let size = material.uniforms().bytes().len();
    assert_eq!(device.state().last_push_constants.len(), size);
}

#[test]
fn test_feedback_reallocation_is_followed() {
    let mut device = MockGraphicsDevice::new(64, 64);
    let material = make_material(&mut device, FeedbackParams::holo());
    let feedback = material.feedback_buffer().clone();
    let before = feedback.color();

    // Blank buffers are fixed-size; a format change still reallocates
    assert!(feedback.ensure(&mut device, 1, 1, TextureFormat::R8G8B8A8_UNORM, false).unwrap());

    assert!(!Arc::ptr_eq(&before, &feedback.color()));
    assert!(Arc::ptr_eq(material.feedback_buffer(), &feedback));
}

// ============================================================================
// Parameter changes
// ============================================================================

#[test]
fn test_set_params_relinks_only_on_displacement_toggle() {
    let mut device = MockGraphicsDevice::new(64, 64);
    let mut material = make_material(&mut device, FeedbackParams::holo());
    assert_eq!(device.state().pipelines_created.len(), 1);

    let brighter = FeedbackParams { alpha_floor: 0.5, ..FeedbackParams::holo() };
    material.set_params(&mut device, brighter).unwrap();
    assert_eq!(device.state().pipelines_created.len(), 1);
    assert_eq!(material.uniforms().get("feedback_alpha_floor"), Some(&[0.5][..]));

    material.set_params(&mut device, FeedbackParams::holo_rippling()).unwrap();
    assert_eq!(device.state().pipelines_created.len(), 2);
    assert_eq!(material.shader().stage_names().len(), 2);
    assert_eq!(material.uniforms().get("feedback_alpha_floor"), Some(&[0.2][..]));
}

#[test]
fn test_set_params_keeps_clock() {
    let mut device = MockGraphicsDevice::new(64, 64);
    let mut material = make_material(&mut device, FeedbackParams::holo());
    material.advance(32.0).unwrap();

    let faster = FeedbackParams { time_scale: 1.0 / 64.0, ..FeedbackParams::holo() };
    material.set_params(&mut device, faster).unwrap();

    assert_eq!(material.elapsed(), 32.0);
    assert!((material.time() - 0.5).abs() < 1e-6);
}

#[test]
fn test_set_target_format_recreates_pipeline() {
    let mut device = MockGraphicsDevice::new(64, 64);
    let mut material = make_material(&mut device, FeedbackParams::holo());

    material.set_target_format(&mut device, TextureFormat::R16G16B16A16_SFLOAT).unwrap();
    assert_eq!(device.state().pipelines_created.len(), 1);

    material.set_target_format(&mut device, TextureFormat::B8G8R8A8_SRGB).unwrap();
    assert_eq!(device.state().pipelines_created.len(), 2);
    assert_eq!(material.target_format(), TextureFormat::B8G8R8A8_SRGB);
}
