//! Perspective camera
//!
//! The camera is placed like any node: a row-vector world matrix whose Z axis
//! is the view direction. The view matrix is its affine inverse; the
//! projection is left-handed with depth mapped to [0, 1].

use crate::core::ControlSettings;
use crate::foundation::math::{
    matrix_from_prs, matrix_rotation_x, matrix_rotation_y, utils, Mat4, Mat4Ext, Vec3, Vector4,
};
use crate::input::{CameraKeys, InputState};

/// Perspective camera
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    world: Mat4,
    fov_y: f32,
    aspect: f32,
    near: f32,
    far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            world: Mat4::identity(),
            fov_y: utils::deg_to_rad(60.0),
            aspect: 16.0 / 9.0,
            near: 1.0,
            far: 10_000.0,
        }
    }
}

impl Camera {
    /// Camera at `position` with Euler `rotation` (radians) and default projection
    pub fn new(position: Vec3, rotation: Vec3) -> Self {
        Self {
            world: matrix_from_prs(&position, &rotation, &Vec3::repeat(1.0)),
            ..Self::default()
        }
    }

    /// Replace the projection parameters; `fov_y` in radians
    pub fn with_projection(mut self, fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
        self.fov_y = fov_y;
        self.aspect = aspect;
        self.near = near;
        self.far = far;
        self
    }

    /// World matrix
    pub fn world_matrix(&self) -> &Mat4 {
        &self.world
    }

    /// World position
    pub fn position(&self) -> Vec3 {
        self.world.position()
    }

    /// Euler rotation in radians
    pub fn rotation(&self) -> Vec3 {
        self.world.euler_angles()
    }

    /// Move the camera
    pub fn set_position(&mut self, position: Vec3) {
        self.world.set_row3(3, &position);
    }

    /// Rotate the camera to absolute Euler angles
    pub fn set_rotation(&mut self, rotation: Vec3) {
        self.world = matrix_from_prs(&self.position(), &rotation, &Vec3::repeat(1.0));
    }

    /// Look at a world point
    pub fn face_target(&mut self, target: Vec3) {
        self.world.face_target(&target);
    }

    /// Update the aspect ratio after a resize
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    /// Vertical field of view in radians
    pub fn fov_y(&self) -> f32 {
        self.fov_y
    }

    /// World to camera
    pub fn view_matrix(&self) -> Mat4 {
        self.world.inverse_affine()
    }

    /// Camera to clip, left-handed, depth 0 at `near` and 1 at `far`
    #[rustfmt::skip]
    pub fn projection_matrix(&self) -> Mat4 {
        let y_scale = 1.0 / (self.fov_y * 0.5).tan();
        let x_scale = y_scale / self.aspect;
        let q = self.far / (self.far - self.near);
        Mat4::new(
            x_scale, 0.0, 0.0, 0.0,
            0.0, y_scale, 0.0, 0.0,
            0.0, 0.0, q, 1.0,
            0.0, 0.0, -q * self.near, 0.0,
        )
    }

    /// World to clip
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.view_matrix() * self.projection_matrix()
    }

    /// Project a world point to normalized device coordinates
    pub fn project(&self, point: &Vec3) -> Vec3 {
        let clip = Vector4::new(point.x, point.y, point.z, 1.0).transpose() * self.view_projection_matrix();
        Vec3::new(clip[0], clip[1], clip[2]) / clip[3]
    }

    /// Keyboard fly control: pitch about the local X axis, yaw about world Y,
    /// move along the local Z and X axes
    pub fn control(&mut self, frame_time: f32, input: &dyn InputState, keys: &CameraKeys, settings: &ControlSettings) {
        let angle = settings.rotation_speed * frame_time;
        if input.key_held(keys.turn_down) {
            self.world = matrix_rotation_x(angle) * self.world;
        }
        if input.key_held(keys.turn_up) {
            self.world = matrix_rotation_x(-angle) * self.world;
        }
        if input.key_held(keys.turn_right) {
            self.yaw(angle);
        }
        if input.key_held(keys.turn_left) {
            self.yaw(-angle);
        }

        let distance = settings.movement_speed * frame_time;
        let forward = self.world.z_axis().normalize() * distance;
        let right = self.world.x_axis().normalize() * distance;
        let mut position = self.position();
        if input.key_held(keys.move_forward) {
            position += forward;
        }
        if input.key_held(keys.move_backward) {
            position -= forward;
        }
        if input.key_held(keys.move_right) {
            position += right;
        }
        if input.key_held(keys.move_left) {
            position -= right;
        }
        self.set_position(position);
    }

    fn yaw(&mut self, angle: f32) {
        let position = self.position();
        self.world.set_row3(3, &Vec3::zeros());
        self.world *= matrix_rotation_y(angle);
        self.world.set_row3(3, &position);
    }
}
