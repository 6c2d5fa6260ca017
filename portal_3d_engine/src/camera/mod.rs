//! Camera module: posed cameras, the off-axis portal camera and the
//! viewer rig that drives it.
//!
//! Cameras are owned by the caller. The composer and render passes only
//! hold weak references and read them once per frame.

mod camera;
mod portal_surface;
mod off_axis_camera;
mod viewer_rig;

pub use camera::{Camera, SharedCamera};
pub use portal_surface::PortalSurface;
pub use off_axis_camera::{OffAxisCamera, FrustumEdges, PortalConfig, off_axis_projection};
pub use viewer_rig::{ViewerRig, ViewerRigConfig, ViewerPose, ViewInput};
