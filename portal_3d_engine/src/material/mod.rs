//! Surface materials.
//!
//! `FeedbackMaterial` samples a buffer written by a previous frame of a
//! pass chain. The free functions in this module are the CPU reference
//! of its shader math.

mod feedback_material;
mod feedback_shading;

pub use feedback_material::{FeedbackMaterial, FeedbackParams, SharedFeedbackMaterial};
pub use feedback_shading::{smoothstep, scroll_offset, feedback_uv, shade, displace};
