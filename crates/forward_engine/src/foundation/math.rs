//! Math utilities and types
//!
//! The engine stores transforms as 4x4 matrices in **row-vector** convention:
//! a point is transformed as `p' = p * M`, so the translation lives in row 3
//! and rows 0-2 are the scaled local X, Y and Z axes. Composition reads left
//! to right: `child * parent` takes a child-relative matrix into the parent's
//! space. Rotations are left-handed (positive angles turn clockwise when
//! looking down the axis towards the origin).

pub use nalgebra::{Matrix3, Matrix4, Vector2, Vector3, Vector4};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// 2 * Pi
    pub const TAU: f32 = 2.0 * PI;

    /// Pi / 2
    pub const HALF_PI: f32 = PI * 0.5;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f32 = 180.0 / PI;
}

/// Math utility functions
pub mod utils {
    use super::constants;

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Convert radians to degrees
    pub fn rad_to_deg(radians: f32) -> f32 {
        radians * constants::RAD_TO_DEG
    }
}

/// Below this cosine of the X rotation the Euler decomposition treats the
/// matrix as gimbal locked and folds the Z rotation into Y.
const GIMBAL_COS_THRESHOLD: f32 = 0.001;

/// Translation matrix placing `translation` in row 3
pub fn matrix_translation(translation: &Vec3) -> Mat4 {
    let mut m = Mat4::identity();
    m.set_row3(3, translation);
    m
}

/// Left-handed rotation about the X axis
#[rustfmt::skip]
pub fn matrix_rotation_x(angle: f32) -> Mat4 {
    let (s, c) = angle.sin_cos();
    Mat4::new(
        1.0, 0.0, 0.0, 0.0,
        0.0, c, s, 0.0,
        0.0, -s, c, 0.0,
        0.0, 0.0, 0.0, 1.0,
    )
}

/// Left-handed rotation about the Y axis
#[rustfmt::skip]
pub fn matrix_rotation_y(angle: f32) -> Mat4 {
    let (s, c) = angle.sin_cos();
    Mat4::new(
        c, 0.0, -s, 0.0,
        0.0, 1.0, 0.0, 0.0,
        s, 0.0, c, 0.0,
        0.0, 0.0, 0.0, 1.0,
    )
}

/// Left-handed rotation about the Z axis
#[rustfmt::skip]
pub fn matrix_rotation_z(angle: f32) -> Mat4 {
    let (s, c) = angle.sin_cos();
    Mat4::new(
        c, s, 0.0, 0.0,
        -s, c, 0.0, 0.0,
        0.0, 0.0, 1.0, 0.0,
        0.0, 0.0, 0.0, 1.0,
    )
}

/// Per-axis scaling matrix
pub fn matrix_scaling(scale: &Vec3) -> Mat4 {
    Mat4::new_nonuniform_scaling(scale)
}

/// Uniform scaling matrix
pub fn matrix_uniform_scaling(scale: f32) -> Mat4 {
    Mat4::new_scaling(scale)
}

/// Compose a matrix from position, Euler rotation (radians) and scale.
///
/// The order is scale, then Z, X and Y rotations, then translation. This is
/// the inverse of [`Mat4Ext::euler_angles`] / [`Mat4Ext::scale_factors`] /
/// [`Mat4Ext::position`] for non-degenerate inputs.
pub fn matrix_from_prs(position: &Vec3, rotation: &Vec3, scale: &Vec3) -> Mat4 {
    matrix_scaling(scale)
        * matrix_rotation_z(rotation.z)
        * matrix_rotation_x(rotation.x)
        * matrix_rotation_y(rotation.y)
        * matrix_translation(position)
}

/// Row-vector helpers on [`Mat4`]
pub trait Mat4Ext {
    /// First three components of a row
    fn row3(&self, row: usize) -> Vec3;

    /// Overwrite the first three components of a row
    fn set_row3(&mut self, row: usize, value: &Vec3);

    /// Local X axis (row 0), including scale
    fn x_axis(&self) -> Vec3;

    /// Local Y axis (row 1), including scale
    fn y_axis(&self) -> Vec3;

    /// Local Z axis (row 2), including scale. This is the facing direction.
    fn z_axis(&self) -> Vec3;

    /// Translation (row 3)
    fn position(&self) -> Vec3;

    /// Lengths of the three axis rows
    fn scale_factors(&self) -> Vec3;

    /// Euler angles (radians, X/Y/Z) matching [`matrix_from_prs`]
    fn euler_angles(&self) -> Vec3;

    /// Inverse of an affine matrix (rows 0-2 linear, row 3 translation)
    fn inverse_affine(&self) -> Mat4;

    /// Turn the Z axis towards `target`, keeping position and scale
    fn face_target(&mut self, target: &Vec3);

    /// Row-major array copy, row 3 holding the translation
    fn to_row_major(&self) -> [[f32; 4]; 4];
}

impl Mat4Ext for Mat4 {
    fn row3(&self, row: usize) -> Vec3 {
        Vec3::new(self[(row, 0)], self[(row, 1)], self[(row, 2)])
    }

    fn set_row3(&mut self, row: usize, value: &Vec3) {
        self[(row, 0)] = value.x;
        self[(row, 1)] = value.y;
        self[(row, 2)] = value.z;
    }

    fn x_axis(&self) -> Vec3 {
        self.row3(0)
    }

    fn y_axis(&self) -> Vec3 {
        self.row3(1)
    }

    fn z_axis(&self) -> Vec3 {
        self.row3(2)
    }

    fn position(&self) -> Vec3 {
        self.row3(3)
    }

    fn scale_factors(&self) -> Vec3 {
        Vec3::new(
            self.x_axis().norm(),
            self.y_axis().norm(),
            self.z_axis().norm(),
        )
    }

    fn euler_angles(&self) -> Vec3 {
        let scale = self.scale_factors();

        let sin_x = (-self[(2, 1)] / scale.z).clamp(-1.0, 1.0);
        let cos_x = (1.0 - sin_x * sin_x).sqrt();

        let (sin_y, cos_y, sin_z, cos_z) = if cos_x.abs() > GIMBAL_COS_THRESHOLD {
            (
                self[(2, 0)] / (cos_x * scale.z),
                self[(2, 2)] / (cos_x * scale.z),
                self[(0, 1)] / (cos_x * scale.x),
                self[(1, 1)] / (cos_x * scale.y),
            )
        } else {
            // Gimbal lock: Z is folded into Y
            (
                -self[(0, 2)] / scale.x,
                self[(0, 0)] / scale.x,
                0.0,
                1.0,
            )
        };

        Vec3::new(
            sin_x.atan2(cos_x),
            sin_y.atan2(cos_y),
            sin_z.atan2(cos_z),
        )
    }

    fn inverse_affine(&self) -> Mat4 {
        let linear = Mat3::new(
            self[(0, 0)], self[(0, 1)], self[(0, 2)],
            self[(1, 0)], self[(1, 1)], self[(1, 2)],
            self[(2, 0)], self[(2, 1)], self[(2, 2)],
        );
        let inverse = linear.try_inverse().unwrap_or_else(Mat3::identity);
        // Row vector t maps to -t * A^-1
        let translation = -(inverse.transpose() * self.position());

        let mut result = Mat4::identity();
        for row in 0..3 {
            for col in 0..3 {
                result[(row, col)] = inverse[(row, col)];
            }
        }
        result.set_row3(3, &translation);
        result
    }

    fn face_target(&mut self, target: &Vec3) {
        let Some(z_axis) = (target - self.position()).try_normalize(f32::EPSILON) else {
            return;
        };
        let Some(x_axis) = Vec3::y().cross(&z_axis).try_normalize(f32::EPSILON) else {
            return;
        };
        let y_axis = z_axis.cross(&x_axis);

        let scale = self.scale_factors();
        self.set_row3(0, &(x_axis * scale.x));
        self.set_row3(1, &(y_axis * scale.y));
        self.set_row3(2, &(z_axis * scale.z));
    }

    fn to_row_major(&self) -> [[f32; 4]; 4] {
        let mut rows = [[0.0; 4]; 4];
        for (r, row) in rows.iter_mut().enumerate() {
            for (c, value) in row.iter_mut().enumerate() {
                *value = self[(r, c)];
            }
        }
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-5;

    fn transform_point(m: &Mat4, p: &Vec3) -> Vec3 {
        let row = Vector4::new(p.x, p.y, p.z, 1.0).transpose() * m;
        Vec3::new(row[0], row[1], row[2])
    }

    #[test]
    fn test_translation_lives_in_row_three() {
        let m = matrix_translation(&Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(m.position(), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(m[(0, 3)], 0.0);

        let moved = transform_point(&m, &Vec3::new(1.0, 1.0, 1.0));
        assert_relative_eq!(moved, Vec3::new(2.0, 3.0, 4.0), epsilon = EPSILON);
    }

    #[test]
    fn test_rotation_y_is_left_handed() {
        // Quarter turn about Y takes +X to -Z
        let m = matrix_rotation_y(constants::HALF_PI);
        let turned = transform_point(&m, &Vec3::x());
        assert_relative_eq!(turned, Vec3::new(0.0, 0.0, -1.0), epsilon = EPSILON);
    }

    #[test]
    fn test_child_times_parent_composition() {
        let parent = matrix_translation(&Vec3::new(10.0, 0.0, 0.0));
        let child = matrix_translation(&Vec3::new(0.0, 5.0, 0.0));
        let absolute = child * parent;
        assert_relative_eq!(absolute.position(), Vec3::new(10.0, 5.0, 0.0), epsilon = EPSILON);
    }

    #[test]
    fn test_euler_round_trip() {
        let rotation = Vec3::new(0.3, -1.1, 2.0);
        let m = matrix_from_prs(&Vec3::new(4.0, 5.0, 6.0), &rotation, &Vec3::new(1.0, 1.0, 1.0));
        assert_relative_eq!(m.euler_angles(), rotation, epsilon = 1e-4);
    }

    #[test]
    fn test_euler_round_trip_with_non_uniform_scale() {
        let rotation = Vec3::new(-0.7, 0.4, -0.2);
        let scale = Vec3::new(2.0, 0.5, 3.0);
        let m = matrix_from_prs(&Vec3::zeros(), &rotation, &scale);
        assert_relative_eq!(m.scale_factors(), scale, epsilon = 1e-4);
        assert_relative_eq!(m.euler_angles(), rotation, epsilon = 1e-4);
    }

    #[test]
    fn test_euler_gimbal_lock_folds_z_into_y() {
        let m = matrix_from_prs(
            &Vec3::zeros(),
            &Vec3::new(constants::HALF_PI, 0.5, 0.0),
            &Vec3::new(1.0, 1.0, 1.0),
        );
        let angles = m.euler_angles();
        assert_relative_eq!(angles.x, constants::HALF_PI, epsilon = 1e-3);
        assert_relative_eq!(angles.z, 0.0, epsilon = EPSILON);
        assert_relative_eq!(angles.y, 0.5, epsilon = 1e-3);
    }

    #[test]
    fn test_inverse_affine() {
        let m = matrix_from_prs(
            &Vec3::new(3.0, -2.0, 7.0),
            &Vec3::new(0.2, 0.9, -0.4),
            &Vec3::new(2.0, 2.0, 2.0),
        );
        let product = m * m.inverse_affine();
        assert_relative_eq!(product, Mat4::identity(), epsilon = 1e-4);
    }

    #[test]
    fn test_face_target_keeps_scale_and_position() {
        let mut m = matrix_uniform_scaling(2.0) * matrix_translation(&Vec3::new(0.0, 0.0, -5.0));
        m.face_target(&Vec3::new(5.0, 0.0, -5.0));

        assert_relative_eq!(m.z_axis(), Vec3::new(2.0, 0.0, 0.0), epsilon = EPSILON);
        assert_relative_eq!(m.scale_factors(), Vec3::new(2.0, 2.0, 2.0), epsilon = EPSILON);
        assert_relative_eq!(m.position(), Vec3::new(0.0, 0.0, -5.0), epsilon = EPSILON);
    }

    #[test]
    fn test_degree_conversion() {
        assert_relative_eq!(utils::deg_to_rad(180.0), constants::PI, epsilon = EPSILON);
        assert_relative_eq!(utils::rad_to_deg(constants::HALF_PI), 90.0, epsilon = 1e-4);
    }
}
