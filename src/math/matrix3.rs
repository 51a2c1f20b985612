use std::ops::{Mul, MulAssign};

use glam::Vec2;

/// A 2D affine transform stored as a column-major 3x3 matrix.
///
/// The upper-left 2x2 block holds rotation/scale, the third column holds the
/// translation and the bottom row is `[0, 0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix3 {
    pub mat: [f32; 9],
}

impl Matrix3 {
    pub const IDENTITY: Matrix3 = Matrix3 {
        mat: [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
    };

    pub fn from_translation(x: f32, y: f32) -> Self {
        let mut m = Self::IDENTITY;
        m.set_translation(x, y);
        m
    }

    pub fn from_rotation(pivot: Vec2, theta: f32) -> Self {
        let mut m = Self::IDENTITY;
        m.set_rotation(pivot.x, pivot.y, theta);
        m
    }

    pub fn set_identity(&mut self) {
        *self = Self::IDENTITY;
    }

    /// Rotation by `theta` radians about the pivot `(x, y)`.
    ///
    /// Equivalent to `T(x, y) * R(theta) * T(-x, -y)` collapsed into a single
    /// set of coefficients.
    pub fn set_rotation(&mut self, x: f32, y: f32, theta: f32) {
        let (s, c) = theta.sin_cos();
        self.mat = [
            c,
            s,
            0.0,
            -s,
            c,
            0.0,
            -c * x + s * y + x,
            -s * x - c * y + y,
            1.0,
        ];
    }

    /// Pure translation; discards any previous rotation or scale.
    pub fn set_translation(&mut self, x: f32, y: f32) {
        self.mat = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, x, y, 1.0];
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.mat[6] += dx;
        self.mat[7] += dy;
    }

    /// Scales the basis columns only, i.e. `self * S(sx, sy)`.
    pub fn scale(&mut self, sx: f32, sy: f32) {
        for row in 0..2 {
            self.mat[row] *= sx;
            self.mat[3 + row] *= sy;
        }
    }

    /// Scales every row including the translation, i.e. `S(sx, sy) * self`.
    ///
    /// The translation ends up scaled along with the basis, so a point
    /// translated before scaling moves by the scaled amount.
    pub fn scale_with_translation(&mut self, sx: f32, sy: f32) {
        for column in 0..3 {
            self.mat[column * 3] *= sx;
            self.mat[column * 3 + 1] *= sy;
        }
    }

    pub fn transpose(&mut self) {
        self.mat.swap(1, 3);
        self.mat.swap(2, 6);
        self.mat.swap(5, 7);
    }

    pub fn translation(&self) -> Vec2 {
        Vec2::new(self.mat[6], self.mat[7])
    }

    pub fn transform_point(&self, point: Vec2) -> Vec2 {
        Vec2::new(
            self.mat[0] * point.x + self.mat[3] * point.y + self.mat[6],
            self.mat[1] * point.x + self.mat[4] * point.y + self.mat[7],
        )
    }

    pub fn approx_eq(&self, other: &Matrix3, epsilon: f32) -> bool {
        self.mat
            .iter()
            .zip(other.mat.iter())
            .all(|(a, b)| (a - b).abs() <= epsilon)
    }
}

impl Default for Matrix3 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul<&Matrix3> for &Matrix3 {
    type Output = Matrix3;

    fn mul(self, rhs: &Matrix3) -> Matrix3 {
        let mut mat = [0.0; 9];
        for (i, out) in mat.iter_mut().enumerate() {
            let row = i % 3;
            let column = (i / 3) * 3;
            *out = self.mat[row] * rhs.mat[column]
                + self.mat[row + 3] * rhs.mat[column + 1]
                + self.mat[row + 6] * rhs.mat[column + 2];
        }
        Matrix3 { mat }
    }
}

impl Mul for Matrix3 {
    type Output = Matrix3;

    fn mul(self, rhs: Matrix3) -> Matrix3 {
        &self * &rhs
    }
}

impl MulAssign<&Matrix3> for Matrix3 {
    fn mul_assign(&mut self, rhs: &Matrix3) {
        *self = &*self * rhs;
    }
}

impl MulAssign for Matrix3 {
    fn mul_assign(&mut self, rhs: Matrix3) {
        *self = &*self * &rhs;
    }
}
