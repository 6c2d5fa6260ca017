/// PortalSurface - the rectangular window the off-axis camera looks through.

use glam::{Quat, Vec3};

/// Flat rectangle in world space.
///
/// The rectangle lies in its local XY plane and faces local +Z, towards
/// the viewer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortalSurface {
    pub position: Vec3,
    pub orientation: Quat,
    pub half_width: f32,
    pub half_height: f32,
}

impl PortalSurface {
    pub fn new(position: Vec3, orientation: Quat, half_width: f32, half_height: f32) -> Self {
        Self { position, orientation, half_width, half_height }
    }

    /// Portal at the origin filling the view's short side.
    ///
    /// Landscape views get a portal one unit wide, portrait views one unit
    /// tall; the other side follows the aspect ratio.
    pub fn from_aspect(aspect: f32) -> Self {
        let (half_width, half_height) = Self::extent_for_aspect(aspect);
        Self::new(Vec3::ZERO, Quat::IDENTITY, half_width, half_height)
    }

    /// Half extents of a portal fitted to `aspect` (width / height).
    pub fn extent_for_aspect(aspect: f32) -> (f32, f32) {
        if aspect > 1.0 {
            (0.5, 0.5 / aspect)
        } else {
            (0.5 * aspect, 0.5)
        }
    }

    /// Refit the extents to a new aspect ratio, keeping the pose.
    pub fn fit_aspect(&mut self, aspect: f32) {
        let (half_width, half_height) = Self::extent_for_aspect(aspect);
        self.half_width = half_width;
        self.half_height = half_height;
    }

    pub fn width(&self) -> f32 {
        self.half_width * 2.0
    }

    pub fn height(&self) -> f32 {
        self.half_height * 2.0
    }

    /// Unit normal on the viewer side.
    pub fn normal(&self) -> Vec3 {
        self.orientation * Vec3::Z
    }

    /// World-space corners: bottom-left, bottom-right, top-right, top-left.
    pub fn corners(&self) -> [Vec3; 4] {
        let right = self.orientation * Vec3::X * self.half_width;
        let up = self.orientation * Vec3::Y * self.half_height;
        [
            self.position - right - up,
            self.position + right - up,
            self.position + right + up,
            self.position - right + up,
        ]
    }
}

impl Default for PortalSurface {
    fn default() -> Self {
        Self::from_aspect(1.0)
    }
}
