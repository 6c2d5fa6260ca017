/// Per-frame context handed to the portal renderer and every pass.

use crate::camera::ViewInput;

/// Timing and input for one frame
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameContext {
    /// Seconds since the previous frame
    pub delta_time: f32,
    /// Seconds since rendering started (monotonic)
    pub elapsed_time: f32,
    /// Pointer or tilt input sampled for this frame
    pub input: ViewInput,
}

impl FrameContext {
    pub fn new(delta_time: f32, elapsed_time: f32) -> Self {
        Self { delta_time, elapsed_time, input: ViewInput::None }
    }

    pub fn with_input(mut self, input: ViewInput) -> Self {
        self.input = input;
        self
    }

    /// Context for the frame following this one
    pub fn next(&self, delta_time: f32) -> Self {
        Self {
            delta_time,
            elapsed_time: self.elapsed_time + delta_time,
            input: self.input,
        }
    }
}
