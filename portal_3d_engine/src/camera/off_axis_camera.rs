/// OffAxisCamera - asymmetric-frustum camera that renders the world
/// behind a portal as seen from the viewer's eye.
///
/// Each frame the camera takes the viewer's position and the portal's
/// orientation, then fits a frustum whose near-plane edges are the
/// portal's edges scaled onto the near plane. The result is that the
/// rendered image lines up exactly with the portal rectangle on screen,
/// which produces motion parallax as the viewer moves.

use std::sync::PoisonError;
use glam::{Mat4, Vec3, Vec4};
use crate::camera::{Camera, SharedCamera, PortalSurface, ViewerPose};

/// Portal camera configuration
#[derive(Debug, Clone, Copy)]
pub struct PortalConfig {
    /// Near clip distance of the portal camera
    pub near: f32,
    /// Far clip distance of the portal camera
    pub far: f32,
    /// Lower bound on the viewer-to-portal-plane distance. Keeps the
    /// frustum finite when the viewer touches the portal plane.
    pub min_distance: f32,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            near: 0.1,
            far: 100.0,
            min_distance: 1e-4,
        }
    }
}

/// Near-plane frustum edges, in camera space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrustumEdges {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
    pub near: f32,
    pub far: f32,
}

impl FrustumEdges {
    /// Fit near-plane edges to a portal rectangle.
    ///
    /// `portal_local` is the portal center in camera space; the camera
    /// shares the portal's orientation so the rectangle stays axis-aligned.
    pub fn fit(portal_local: Vec3, half_width: f32, half_height: f32, config: &PortalConfig) -> Self {
        let distance = portal_local.z.abs().max(config.min_distance);
        let scale = config.near / distance;
        Self {
            left: (portal_local.x - half_width) * scale,
            right: (portal_local.x + half_width) * scale,
            bottom: (portal_local.y - half_height) * scale,
            top: (portal_local.y + half_height) * scale,
            near: config.near,
            far: config.far,
        }
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.top - self.bottom
    }
}

/// Right-handed asymmetric perspective projection with [0, 1] depth,
/// matching glam's `Mat4::perspective_rh` convention.
pub fn off_axis_projection(edges: &FrustumEdges) -> Mat4 {
    let FrustumEdges { left, right, bottom, top, near, far } = *edges;
    let inv_width = 1.0 / (right - left);
    let inv_height = 1.0 / (top - bottom);
    let r = far / (near - far);
    Mat4::from_cols(
        Vec4::new(2.0 * near * inv_width, 0.0, 0.0, 0.0),
        Vec4::new(0.0, 2.0 * near * inv_height, 0.0, 0.0),
        Vec4::new((right + left) * inv_width, (top + bottom) * inv_height, r, -1.0),
        Vec4::new(0.0, 0.0, r * near, 0.0),
    )
}

/// Portal camera driver
///
/// Owns the shared camera that the portal composer's render pass draws
/// with; `update()` rewrites its pose and projection in place.
pub struct OffAxisCamera {
    camera: SharedCamera,
    config: PortalConfig,
    edges: FrustumEdges,
}

impl OffAxisCamera {
    pub fn new(config: PortalConfig) -> Self {
        let edges = FrustumEdges::fit(Vec3::new(0.0, 0.0, -1.0), 0.5, 0.5, &config);
        let camera = Camera::new(
            Vec3::new(0.0, 0.0, 1.0),
            glam::Quat::IDENTITY,
            off_axis_projection(&edges),
            config.near,
            config.far,
        );
        Self {
            camera: camera.into_shared(),
            config,
            edges,
        }
    }

    /// Shared camera, for render passes
    pub fn camera(&self) -> &SharedCamera {
        &self.camera
    }

    pub fn config(&self) -> &PortalConfig {
        &self.config
    }

    /// Edges installed by the last `update()`
    pub fn edges(&self) -> FrustumEdges {
        self.edges
    }

    /// Place the camera at the viewer's eye with the portal's orientation
    /// and install the matching off-axis projection.
    pub fn update(&mut self, viewer: &ViewerPose, portal: &PortalSurface) -> FrustumEdges {
        let mut camera = self.camera.write().unwrap_or_else(PoisonError::into_inner);
        camera.set_pose(viewer.position, portal.orientation);
        let portal_local = camera.world_to_local(portal.position);
        self.edges = FrustumEdges::fit(portal_local, portal.half_width, portal.half_height, &self.config);
        camera.set_projection(off_axis_projection(&self.edges), self.config.near, self.config.far);
        self.edges
    }
}

#[cfg(test)]
#[path = "off_axis_camera_tests.rs"]
mod tests;
