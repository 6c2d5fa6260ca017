/// Camera - posed perspective camera.
///
/// Holds a world-space pose (position + orientation) and a projection
/// matrix. The view matrix is always derived from the pose; the
/// projection is whatever the owner last set, which lets the off-axis
/// portal camera install asymmetric frusta every frame.

use std::sync::{Arc, RwLock};
use glam::{Mat4, Quat, Vec3};

/// Camera shared between its driver and the passes that draw with it
pub type SharedCamera = Arc<RwLock<Camera>>;

/// Posed camera
#[derive(Debug, Clone)]
pub struct Camera {
    position: Vec3,
    orientation: Quat,
    projection_matrix: Mat4,
    near: f32,
    far: f32,
}

impl Camera {
    /// Create a camera at the origin, looking down -Z, with a symmetric
    /// perspective projection.
    pub fn perspective(fov_y_radians: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self::new(
            Vec3::ZERO,
            Quat::IDENTITY,
            Mat4::perspective_rh(fov_y_radians, aspect, near, far),
            near,
            far,
        )
    }

    /// Create a camera from an explicit pose and projection.
    pub fn new(position: Vec3, orientation: Quat, projection: Mat4, near: f32, far: f32) -> Self {
        Self {
            position,
            orientation: orientation.normalize(),
            projection_matrix: projection,
            near,
            far,
        }
    }

    /// Wrap into the shared form held by render passes
    pub fn into_shared(self) -> SharedCamera {
        Arc::new(RwLock::new(self))
    }

    // ===== GETTERS =====

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn orientation(&self) -> Quat {
        self.orientation
    }

    pub fn near(&self) -> f32 {
        self.near
    }

    pub fn far(&self) -> f32 {
        self.far
    }

    /// Camera-to-world transform.
    pub fn world_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation, self.position)
    }

    /// View matrix (inverse of the camera's world transform).
    pub fn view_matrix(&self) -> Mat4 {
        self.world_matrix().inverse()
    }

    /// Projection matrix (symmetric or off-axis).
    pub fn projection_matrix(&self) -> &Mat4 {
        &self.projection_matrix
    }

    /// Combined view-projection matrix (projection * view).
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix * self.view_matrix()
    }

    /// Express a world-space point in this camera's local frame.
    pub fn world_to_local(&self, point: Vec3) -> Vec3 {
        self.view_matrix().transform_point3(point)
    }

    /// Express a camera-local point in world space.
    pub fn local_to_world(&self, point: Vec3) -> Vec3 {
        self.world_matrix().transform_point3(point)
    }

    // ===== SETTERS =====

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn set_orientation(&mut self, orientation: Quat) {
        self.orientation = orientation.normalize();
    }

    /// Set position and orientation at once.
    pub fn set_pose(&mut self, position: Vec3, orientation: Quat) {
        self.position = position;
        self.orientation = orientation.normalize();
    }

    /// Install a new projection along with its clip distances.
    pub fn set_projection(&mut self, projection: Mat4, near: f32, far: f32) {
        self.projection_matrix = projection;
        self.near = near;
        self.far = far;
    }

    /// Rotate so that -Z points at `target`.
    ///
    /// Does nothing when `target` coincides with the camera position.
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        if (target - self.position).length_squared() <= f32::EPSILON {
            return;
        }
        let view = Mat4::look_at_rh(self.position, target, up);
        self.orientation = Quat::from_mat4(&view.inverse()).normalize();
    }
}

impl Default for Camera {
    /// 50 degree vertical field of view, square aspect, 0.1..2000 clip range.
    fn default() -> Self {
        Self::perspective(50f32.to_radians(), 1.0, 0.1, 2000.0)
    }
}

#[cfg(test)]
#[path = "camera_tests.rs"]
mod tests;
