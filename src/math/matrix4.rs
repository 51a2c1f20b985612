use std::ops::{Mul, MulAssign};

use anyhow::Context;
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

/// A 3D affine transform stored as a column-major 4x4 matrix.
///
/// Rotation/scale live in the upper-left 3x3 block, the translation in the
/// fourth column, and the bottom row is `[0, 0, 0, 1]`. The layout matches
/// what WGSL expects for a `mat4x4<f32>` uniform, so a `Matrix4` can be
/// written to a GPU buffer as-is.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Matrix4 {
    pub mat: [f32; 16],
}

impl Matrix4 {
    pub const IDENTITY: Matrix4 = Matrix4 {
        mat: [
            1.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ],
    };

    pub fn from_translation(offset: Vec3) -> Self {
        let mut m = Self::IDENTITY;
        m.set_translation(offset.x, offset.y, offset.z);
        m
    }

    pub fn from_rotation(axis: Vec3, theta: f32) -> anyhow::Result<Self> {
        let mut m = Self::IDENTITY;
        m.set_rotation(axis, theta)?;
        Ok(m)
    }

    fn from_columns(x: Vec3, y: Vec3, z: Vec3, w: Vec3) -> Self {
        Self {
            mat: [
                x.x, x.y, x.z, 0.0, //
                y.x, y.y, y.z, 0.0, //
                z.x, z.y, z.z, 0.0, //
                w.x, w.y, w.z, 1.0,
            ],
        }
    }

    pub fn set_identity(&mut self) {
        *self = Self::IDENTITY;
    }

    /// Pure translation; discards any previous rotation or scale.
    pub fn set_translation(&mut self, x: f32, y: f32, z: f32) {
        *self = Self::IDENTITY;
        self.mat[12] = x;
        self.mat[13] = y;
        self.mat[14] = z;
    }

    /// Rotation by `theta` radians about `axis`, which passes through the origin.
    ///
    /// The axis is normalized and extended to an orthonormal basis `A`, and the
    /// result is `A * Rx(theta) * transpose(A)`. Fails without touching `self`
    /// if the axis has zero length or is not finite.
    pub fn set_rotation(&mut self, axis: Vec3, theta: f32) -> anyhow::Result<()> {
        let a = axis
            .try_normalize()
            .with_context(|| format!("rotation axis {axis} cannot be normalized"))?;
        let reference = if a.dot(Vec3::X).abs() > 0.9 {
            Vec3::Y
        } else {
            Vec3::X
        };
        let u2 = a.cross(reference).normalize();
        let u3 = a.cross(u2);

        let basis = Self::from_columns(a, u2, u3, Vec3::ZERO);
        let mut basis_inverse = basis;
        basis_inverse.transpose_3x3();

        let (s, c) = theta.sin_cos();
        let rotate_x = Self::from_columns(
            Vec3::X,
            Vec3::new(0.0, c, s),
            Vec3::new(0.0, -s, c),
            Vec3::ZERO,
        );

        *self = basis * rotate_x * basis_inverse;
        Ok(())
    }

    pub fn translate(&mut self, dx: f32, dy: f32, dz: f32) {
        self.mat[12] += dx;
        self.mat[13] += dy;
        self.mat[14] += dz;
    }

    /// Scales the basis columns only, i.e. `self * S(sx, sy, sz)`.
    pub fn scale(&mut self, sx: f32, sy: f32, sz: f32) {
        for row in 0..3 {
            self.mat[row] *= sx;
            self.mat[4 + row] *= sy;
            self.mat[8 + row] *= sz;
        }
    }

    /// Scales every row including the translation, i.e. `S(sx, sy, sz) * self`.
    pub fn scale_with_translation(&mut self, sx: f32, sy: f32, sz: f32) {
        for column in 0..4 {
            self.mat[column * 4] *= sx;
            self.mat[column * 4 + 1] *= sy;
            self.mat[column * 4 + 2] *= sz;
        }
    }

    pub fn transpose(&mut self) {
        for column in 0..4 {
            for row in (column + 1)..4 {
                self.mat.swap(column * 4 + row, row * 4 + column);
            }
        }
    }

    /// Transposes the upper-left 3x3 block, leaving the translation column and
    /// bottom row in place. For a pure rotation this yields its inverse.
    pub fn transpose_3x3(&mut self) {
        self.mat.swap(1, 4);
        self.mat.swap(2, 8);
        self.mat.swap(6, 9);
    }

    pub fn translation(&self) -> Vec3 {
        Vec3::new(self.mat[12], self.mat[13], self.mat[14])
    }

    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        let m = &self.mat;
        Vec3::new(
            m[0] * point.x + m[4] * point.y + m[8] * point.z + m[12],
            m[1] * point.x + m[5] * point.y + m[9] * point.z + m[13],
            m[2] * point.x + m[6] * point.y + m[10] * point.z + m[14],
        )
    }

    pub fn approx_eq(&self, other: &Matrix4, epsilon: f32) -> bool {
        self.mat
            .iter()
            .zip(other.mat.iter())
            .all(|(a, b)| (a - b).abs() <= epsilon)
    }
}

impl Default for Matrix4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<Mat4> for Matrix4 {
    fn from(m: Mat4) -> Self {
        Self {
            mat: m.to_cols_array(),
        }
    }
}

impl From<Matrix4> for Mat4 {
    fn from(m: Matrix4) -> Self {
        Mat4::from_cols_array(&m.mat)
    }
}

impl Mul<&Matrix4> for &Matrix4 {
    type Output = Matrix4;

    fn mul(self, rhs: &Matrix4) -> Matrix4 {
        let mut mat = [0.0; 16];
        for (i, out) in mat.iter_mut().enumerate() {
            let row = i % 4;
            let column = (i / 4) * 4;
            *out = self.mat[row] * rhs.mat[column]
                + self.mat[row + 4] * rhs.mat[column + 1]
                + self.mat[row + 8] * rhs.mat[column + 2]
                + self.mat[row + 12] * rhs.mat[column + 3];
        }
        Matrix4 { mat }
    }
}

impl Mul for Matrix4 {
    type Output = Matrix4;

    fn mul(self, rhs: Matrix4) -> Matrix4 {
        &self * &rhs
    }
}

impl MulAssign<&Matrix4> for Matrix4 {
    fn mul_assign(&mut self, rhs: &Matrix4) {
        *self = &*self * rhs;
    }
}

impl MulAssign for Matrix4 {
    fn mul_assign(&mut self, rhs: Matrix4) {
        *self = &*self * &rhs;
    }
}
