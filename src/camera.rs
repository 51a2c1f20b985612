use glam::{Mat4, Vec3};

use crate::math::Matrix4;

#[derive(Debug, Clone)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    /// The transform handed to the scene root as its parent transform.
    ///
    /// Scene space is right-handed with Z up.
    pub fn view_projection(&self, aspect_ratio: f32) -> Matrix4 {
        let view = Mat4::look_at_rh(self.eye, self.target, self.up);
        let projection = Mat4::perspective_rh(self.fov_y, aspect_ratio, self.near, self.far);
        Matrix4::from(projection * view)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, -5.0, 3.5),
            target: Vec3::new(0.0, 0.0, 0.5),
            up: Vec3::Z,
            fov_y: 45f32.to_radians(),
            near: 0.1,
            far: 100.0,
        }
    }
}
