//! Portal view driving.
//!
//! `PortalRenderer` owns the per-frame order for one portal: viewer rig,
//! off-axis camera, material clocks, recomposition and rendering.
//! `HoloFeedback` builds the feedback chain that a holographic material
//! samples, and publishes it through a pipeline registry.

mod holo_feedback;
mod portal_renderer;

pub use holo_feedback::{HoloFeedback, HoloFeedbackConfig};
pub use portal_renderer::{PortalRenderer, PortalRendererConfig};
