/// ViewerRig - turns pointer or device-tilt input into the viewer's eye pose.
///
/// The viewer hovers in front of the portal and always looks at its
/// center. Horizontal and vertical input slide the eye sideways; the eye
/// pulls closer to the portal the further it moves off-center.

use glam::{Quat, Vec3};

/// Input sampled once per frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ViewInput {
    /// No new input, keep the current pose
    #[default]
    None,
    /// Pointer position in normalized device coordinates ([-1, 1], +Y up),
    /// with the visible world extent at the portal's depth
    Pointer {
        x: f32,
        y: f32,
        viewport_width: f32,
        viewport_height: f32,
    },
    /// Device orientation angles in degrees (front-back `beta`,
    /// left-right `gamma`)
    Tilt { beta: f32, gamma: f32 },
}

/// Viewer eye pose in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewerPose {
    pub position: Vec3,
    pub orientation: Quat,
}

impl ViewerPose {
    pub fn new(position: Vec3, orientation: Quat) -> Self {
        Self { position, orientation }
    }

    /// Pose at `position` looking at `target` with +Y up.
    pub fn looking_at(position: Vec3, target: Vec3) -> Self {
        let mut camera = crate::camera::Camera::default();
        camera.set_position(position);
        camera.look_at(target, Vec3::Y);
        Self::new(position, camera.orientation())
    }
}

impl Default for ViewerPose {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 0.0, 1.0), Quat::IDENTITY)
    }
}

/// Viewer rig configuration
#[derive(Debug, Clone, Copy)]
pub struct ViewerRigConfig {
    /// Starting eye position
    pub home: Vec3,
    /// Point the eye always looks at
    pub look_target: Vec3,
    /// Pointer offset to angle gain, per world unit of viewport
    pub pointer_gain: f32,
    /// Angle limit in degrees, scaled by the portal's width or height
    pub max_angle: f32,
    /// Degrees per world unit of eye offset for pointer input
    pub pointer_divisor: f32,
    /// Degrees per world unit of eye offset for tilt input
    pub tilt_divisor: f32,
    /// Per-frame interpolation factor towards the pointer target
    pub smoothing: f32,
    /// How much the eye approaches the portal when fully off-center
    pub dolly: f32,
}

impl Default for ViewerRigConfig {
    fn default() -> Self {
        Self {
            home: Vec3::new(0.0, 0.0, 1.0),
            look_target: Vec3::ZERO,
            pointer_gain: 200.0,
            max_angle: 45.0,
            pointer_divisor: 120.0,
            tilt_divisor: 90.0,
            smoothing: 0.1,
            dolly: 0.5,
        }
    }
}

/// Viewer rig
pub struct ViewerRig {
    config: ViewerRigConfig,
    pose: ViewerPose,
    /// Portal width and height, bounding the input angles
    extent: (f32, f32),
}

impl ViewerRig {
    pub fn new(config: ViewerRigConfig, portal_width: f32, portal_height: f32) -> Self {
        Self {
            pose: ViewerPose::looking_at(config.home, config.look_target),
            config,
            extent: (portal_width, portal_height),
        }
    }

    pub fn pose(&self) -> ViewerPose {
        self.pose
    }

    pub fn config(&self) -> &ViewerRigConfig {
        &self.config
    }

    /// Update the angle bounds after the portal was refitted
    pub fn set_portal_extent(&mut self, width: f32, height: f32) {
        self.extent = (width, height);
    }

    /// Advance one frame.
    ///
    /// Pointer input eases towards its target; tilt input snaps.
    pub fn update(&mut self, input: &ViewInput) -> ViewerPose {
        let (width, height) = self.extent;
        let limit_x = (self.config.max_angle * width).abs();
        let limit_y = (self.config.max_angle * height).abs();

        match *input {
            ViewInput::None => return self.pose,
            ViewInput::Pointer { x, y, viewport_width, viewport_height } => {
                let beta = -(y * viewport_height * self.config.pointer_gain).clamp(-limit_y, limit_y);
                let gamma = -(x * viewport_width * self.config.pointer_gain).clamp(-limit_x, limit_x);
                let current = self.pose.position;
                let target = Vec3::new(
                    gamma / self.config.pointer_divisor,
                    beta / self.config.pointer_divisor,
                    self.dolly_depth(current.x, current.y),
                );
                self.pose.position = current.lerp(target, self.config.smoothing);
            }
            ViewInput::Tilt { beta, gamma } => {
                let beta = beta.clamp(-limit_y, limit_y);
                let gamma = gamma.clamp(-limit_x, limit_x);
                let x = -gamma / self.config.tilt_divisor;
                let y = beta / self.config.tilt_divisor;
                self.pose.position = Vec3::new(x, y, self.dolly_depth(x, y));
            }
        }

        self.pose = ViewerPose::looking_at(self.pose.position, self.config.look_target);
        self.pose
    }

    fn dolly_depth(&self, x: f32, y: f32) -> f32 {
        self.config.home.z - self.config.dolly * (x.abs() + y.abs()).min(1.0)
    }
}

#[cfg(test)]
#[path = "viewer_rig_tests.rs"]
mod tests;
