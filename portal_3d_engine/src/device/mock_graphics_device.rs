/// Mock graphics device for unit tests (no GPU required)
///
/// Commands execute immediately while they are recorded. Every texture
/// carries a content string instead of pixels so tests can follow what
/// each pass wrote and what each draw sampled:
///
/// * a color clear writes `"clear"`
/// * a draw writes the last debug marker (or the pipeline label), followed
///   by the contents of the bound textures in slot order: `"marker[a,b]"`
/// * a blit copies the source content into the destination (or the surface)
/// * a texture created with all-zero data starts as `"blank"`, one created
///   with other data as `"uploaded:<label>"`, and one without data as
///   `"undefined"`

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use crate::device::{
    GraphicsDevice, Texture, TextureDesc, TextureInfo, TextureFormat,
    Pipeline, PipelineDesc, CommandList, ClearValue, SamplerDesc,
    ShaderStages, Viewport,
};
use crate::error::Result;
use crate::engine_bail;

// ============================================================================
// Shared mock state
// ============================================================================

/// Everything the mock device and its command lists observed
#[derive(Debug, Default)]
pub struct MockState {
    /// Flat command log of every command list created by the device
    pub commands: Vec<String>,
    /// Content of the visible output surface
    pub surface: String,
    /// Number of draws that landed on the surface
    pub surface_writes: u32,
    /// Number of `submit()` calls
    pub submits: u32,
    /// `"label:WxH"` of every created texture
    pub textures_created: Vec<String>,
    /// Labels of every created pipeline
    pub pipelines_created: Vec<String>,
    /// Last push-constant payload
    pub last_push_constants: Vec<u8>,
}

fn lock_state(state: &Mutex<MockState>) -> MutexGuard<'_, MockState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

// ============================================================================
// Mock Texture
// ============================================================================

#[derive(Debug)]
pub struct MockTexture {
    pub info: TextureInfo,
    pub label: String,
    content: Mutex<String>,
}

impl MockTexture {
    pub fn new(label: &str, width: u32, height: u32, format: TextureFormat) -> Self {
        Self {
            info: TextureInfo {
                width,
                height,
                format,
                usage: crate::device::TextureUsage::Sampled,
            },
            label: label.to_string(),
            content: Mutex::new("undefined".to_string()),
        }
    }

    pub fn content(&self) -> String {
        self.content.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn set_content(&self, content: &str) {
        *self.content.lock().unwrap_or_else(PoisonError::into_inner) = content.to_string();
    }
}

impl Texture for MockTexture {
    fn info(&self) -> &TextureInfo {
        &self.info
    }
}

/// View a texture created by the mock device as a `MockTexture`
///
/// Only valid for textures produced by this module.
pub fn as_mock(texture: &Arc<dyn Texture>) -> &MockTexture {
    unsafe { &*(Arc::as_ptr(texture) as *const MockTexture) }
}

/// Content string of a texture created by the mock device
pub fn mock_content(texture: &Arc<dyn Texture>) -> String {
    as_mock(texture).content()
}

// ============================================================================
// Mock Pipeline
// ============================================================================

#[derive(Debug)]
pub struct MockPipeline {
    pub label: String,
    pub source: String,
}

impl Pipeline for MockPipeline {
    fn label(&self) -> &str {
        &self.label
    }
}

// ============================================================================
// Mock CommandList
// ============================================================================

enum MockTarget {
    Surface,
    Texture(Arc<dyn Texture>),
}

pub struct MockCommandList {
    state: Arc<Mutex<MockState>>,
    recording: bool,
    target: Option<MockTarget>,
    marker: String,
    pipeline: Option<String>,
    bound: Vec<(u32, String)>,
}

impl MockCommandList {
    fn new(state: Arc<Mutex<MockState>>) -> Self {
        Self {
            state,
            recording: false,
            target: None,
            marker: String::new(),
            pipeline: None,
            bound: Vec::new(),
        }
    }

    fn record(&self, command: String) {
        lock_state(&self.state).commands.push(command);
    }

    fn write_target(&self, content: &str) {
        match &self.target {
            Some(MockTarget::Surface) => {
                let mut state = lock_state(&self.state);
                state.surface = content.to_string();
                state.surface_writes += 1;
            }
            Some(MockTarget::Texture(texture)) => as_mock(texture).set_content(content),
            None => {}
        }
    }
}

impl CommandList for MockCommandList {
    fn begin(&mut self) -> Result<()> {
        if self.recording {
            engine_bail!("portal3d::MockCommandList", "begin() called while already recording");
        }
        self.recording = true;
        self.record("begin".to_string());
        Ok(())
    }

    fn end(&mut self) -> Result<()> {
        if self.target.is_some() {
            engine_bail!("portal3d::MockCommandList", "end() called inside a render pass");
        }
        self.recording = false;
        self.record("end".to_string());
        Ok(())
    }

    fn begin_render_pass(
        &mut self,
        color: Option<&Arc<dyn Texture>>,
        _depth: Option<&Arc<dyn Texture>>,
        clear_values: &[ClearValue],
    ) -> Result<()> {
        if self.target.is_some() {
            engine_bail!("portal3d::MockCommandList", "render pass already active");
        }
        let (target, name) = match color {
            Some(texture) => (MockTarget::Texture(texture.clone()), as_mock(texture).label.clone()),
            None => (MockTarget::Surface, "surface".to_string()),
        };
        self.target = Some(target);
        self.marker.clear();
        self.pipeline = None;
        self.bound.clear();
        self.record(format!("begin_render_pass:{}", name));

        if clear_values.iter().any(|value| matches!(value, ClearValue::Color(_))) {
            self.write_target("clear");
        }
        Ok(())
    }

    fn end_render_pass(&mut self) -> Result<()> {
        if self.target.take().is_none() {
            engine_bail!("portal3d::MockCommandList", "end_render_pass() without an active render pass");
        }
        self.record("end_render_pass".to_string());
        Ok(())
    }

    fn set_viewport(&mut self, viewport: Viewport) -> Result<()> {
        self.record(format!("set_viewport:{}x{}", viewport.width, viewport.height));
        Ok(())
    }

    fn bind_pipeline(&mut self, pipeline: &Arc<dyn Pipeline>) -> Result<()> {
        self.pipeline = Some(pipeline.label().to_string());
        self.record(format!("bind_pipeline:{}", pipeline.label()));
        Ok(())
    }

    fn bind_texture(&mut self, slot: u32, texture: &Arc<dyn Texture>, _sampler: &SamplerDesc) -> Result<()> {
        let mock = as_mock(texture);
        self.bound.retain(|(bound_slot, _)| *bound_slot != slot);
        self.bound.push((slot, mock.content()));
        self.bound.sort_by_key(|(bound_slot, _)| *bound_slot);
        self.record(format!("bind_texture:{}:{}", slot, mock.label));
        Ok(())
    }

    fn push_constants(&mut self, _stages: ShaderStages, offset: u32, data: &[u8]) -> Result<()> {
        let mut state = lock_state(&self.state);
        state.last_push_constants = data.to_vec();
        state.commands.push(format!("push_constants:{}:{}", offset, data.len()));
        Ok(())
    }

    fn draw(&mut self, vertex_count: u32, _first_vertex: u32) -> Result<()> {
        if self.target.is_none() {
            engine_bail!("portal3d::MockCommandList", "draw() outside a render pass");
        }
        let name = if !self.marker.is_empty() {
            self.marker.clone()
        } else {
            self.pipeline.clone().unwrap_or_else(|| "draw".to_string())
        };
        let content = if self.bound.is_empty() {
            name
        } else {
            let inputs: Vec<&str> = self.bound.iter().map(|(_, content)| content.as_str()).collect();
            format!("{}[{}]", name, inputs.join(","))
        };
        self.write_target(&content);
        self.record(format!("draw:{}", vertex_count));
        Ok(())
    }

    fn blit_texture(&mut self, src: &Arc<dyn Texture>, dst: &Arc<dyn Texture>) -> Result<()> {
        if self.target.is_some() {
            engine_bail!("portal3d::MockCommandList", "blit_texture() inside a render pass");
        }
        let (src, dst) = (as_mock(src), as_mock(dst));
        dst.set_content(&src.content());
        self.record(format!("blit:{}->{}", src.label, dst.label));
        Ok(())
    }

    fn blit_to_surface(&mut self, src: &Arc<dyn Texture>) -> Result<()> {
        if self.target.is_some() {
            engine_bail!("portal3d::MockCommandList", "blit_to_surface() inside a render pass");
        }
        let src = as_mock(src);
        {
            let mut state = lock_state(&self.state);
            state.surface = src.content();
            state.surface_writes += 1;
        }
        self.record(format!("blit:{}->surface", src.label));
        Ok(())
    }

    fn insert_debug_marker(&mut self, label: &str) -> Result<()> {
        self.marker = label.to_string();
        self.record(format!("marker:{}", label));
        Ok(())
    }
}

// ============================================================================
// Mock GraphicsDevice
// ============================================================================

pub struct MockGraphicsDevice {
    state: Arc<Mutex<MockState>>,
    width: u32,
    height: u32,
    /// When set, `create_texture` fails with `OutOfMemory`
    pub fail_allocations: bool,
}

impl MockGraphicsDevice {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState::default())),
            width,
            height,
            fail_allocations: false,
        }
    }

    /// Wrap into the shared form used by the composer
    pub fn shared(width: u32, height: u32) -> Arc<Mutex<MockGraphicsDevice>> {
        Arc::new(Mutex::new(Self::new(width, height)))
    }

    pub fn state(&self) -> MutexGuard<'_, MockState> {
        lock_state(&self.state)
    }

    pub fn surface_content(&self) -> String {
        self.state().surface.clone()
    }

    pub fn commands(&self) -> Vec<String> {
        self.state().commands.clone()
    }

    pub fn clear_commands(&self) {
        self.state().commands.clear();
    }

    /// Create a sampled texture with all-zero data
    pub fn blank_texture(&mut self, label: &str, width: u32, height: u32) -> Result<Arc<dyn Texture>> {
        let format = TextureFormat::R8G8B8A8_UNORM;
        self.create_texture(TextureDesc {
            label: label.to_string(),
            width,
            height,
            format,
            usage: crate::device::TextureUsage::Sampled,
            data: Some(vec![0; (width * height * format.bytes_per_pixel()) as usize]),
        })
    }

    /// Create a sampled texture carrying non-zero data
    pub fn uploaded_texture(&mut self, label: &str) -> Result<Arc<dyn Texture>> {
        self.create_texture(TextureDesc {
            label: label.to_string(),
            width: 2,
            height: 2,
            format: TextureFormat::R8G8B8A8_UNORM,
            usage: crate::device::TextureUsage::Sampled,
            data: Some(vec![255; 16]),
        })
    }
}

impl GraphicsDevice for MockGraphicsDevice {
    fn create_texture(&mut self, desc: TextureDesc) -> Result<Arc<dyn Texture>> {
        if self.fail_allocations {
            return Err(crate::error::Error::OutOfMemory);
        }
        let mut texture = MockTexture::new(&desc.label, desc.width, desc.height, desc.format);
        texture.info.usage = desc.usage;
        match &desc.data {
            Some(data) if data.iter().all(|byte| *byte == 0) => texture.set_content("blank"),
            Some(_) => texture.set_content(&format!("uploaded:{}", desc.label)),
            None => {}
        }
        self.state().textures_created.push(format!("{}:{}x{}", desc.label, desc.width, desc.height));
        Ok(Arc::new(texture))
    }

    fn create_pipeline(&mut self, desc: PipelineDesc) -> Result<Arc<dyn Pipeline>> {
        self.state().pipelines_created.push(desc.label.clone());
        Ok(Arc::new(MockPipeline {
            label: desc.label,
            source: desc.source,
        }))
    }

    fn create_command_list(&self) -> Result<Box<dyn CommandList>> {
        Ok(Box::new(MockCommandList::new(self.state.clone())))
    }

    fn submit(&self, _commands: &[&dyn CommandList]) -> Result<()> {
        self.state().submits += 1;
        Ok(())
    }

    fn surface_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn surface_format(&self) -> TextureFormat {
        TextureFormat::B8G8R8A8_SRGB
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    fn wait_idle(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
#[path = "mock_graphics_device_tests.rs"]
mod tests;
