#![warn(missing_docs)]

//! Math types for the shapebuf intersection kernel.
//!
//! Thin wrappers around nalgebra in single precision, matching the
//! `f32` float parameter buffers that shapes are packed into. The
//! [`Transform`] type is the host-side way to build the affine maps
//! that transform instances store in packed (inverted) form.

use nalgebra::{Matrix3, Matrix4, Vector3, Vector4};

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f32>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f32>;

/// A 3x3 matrix, used for the linear part of affine maps.
pub type Mat3 = Matrix3<f32>;

/// Number of floats an affine map occupies when packed:
/// a row-major 3x3 linear part followed by a translation.
pub const AFFINE_FLOATS: usize = 12;

/// A 4x4 affine transformation matrix (local space to world space).
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// The underlying 4x4 matrix.
    pub matrix: Matrix4<f32>,
}

impl Transform {
    /// Identity transform.
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Translation by `(dx, dy, dz)`.
    pub fn translation(dx: f32, dy: f32, dz: f32) -> Self {
        let mut m = Matrix4::identity();
        m[(0, 3)] = dx;
        m[(1, 3)] = dy;
        m[(2, 3)] = dz;
        Self { matrix: m }
    }

    /// Non-uniform scale by `(sx, sy, sz)`.
    pub fn scale(sx: f32, sy: f32, sz: f32) -> Self {
        let mut m = Matrix4::identity();
        m[(0, 0)] = sx;
        m[(1, 1)] = sy;
        m[(2, 2)] = sz;
        Self { matrix: m }
    }

    /// Rotation about the X axis by `angle` radians.
    pub fn rotation_x(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        let mut m = Matrix4::identity();
        m[(1, 1)] = c;
        m[(1, 2)] = -s;
        m[(2, 1)] = s;
        m[(2, 2)] = c;
        Self { matrix: m }
    }

    /// Rotation about the Y axis by `angle` radians.
    pub fn rotation_y(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        let mut m = Matrix4::identity();
        m[(0, 0)] = c;
        m[(0, 2)] = s;
        m[(2, 0)] = -s;
        m[(2, 2)] = c;
        Self { matrix: m }
    }

    /// Rotation about the Z axis by `angle` radians.
    pub fn rotation_z(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        let mut m = Matrix4::identity();
        m[(0, 0)] = c;
        m[(0, 1)] = -s;
        m[(1, 0)] = s;
        m[(1, 1)] = c;
        Self { matrix: m }
    }

    /// Rotation from Euler angles in radians, applied as X, then Y, then Z.
    pub fn rotation_xyz(ax: f32, ay: f32, az: f32) -> Self {
        Self::rotation_z(az)
            .then(&Self::rotation_y(ay))
            .then(&Self::rotation_x(ax))
    }

    /// Compose: `self * other`, so `other` is applied first.
    pub fn then(&self, other: &Transform) -> Self {
        Self {
            matrix: self.matrix * other.matrix,
        }
    }

    /// Transform a point.
    pub fn apply_point(&self, p: &Point3) -> Point3 {
        let v = self.matrix * Vector4::new(p.x, p.y, p.z, 1.0);
        Point3::new(v.x, v.y, v.z)
    }

    /// Transform a direction vector (ignores translation).
    pub fn apply_vec(&self, v: &Vec3) -> Vec3 {
        let r = self.matrix * Vector4::new(v.x, v.y, v.z, 0.0);
        Vec3::new(r.x, r.y, r.z)
    }

    /// The upper-left 3x3 linear part.
    pub fn linear(&self) -> Mat3 {
        self.matrix.fixed_view::<3, 3>(0, 0).into_owned()
    }

    /// The translation column.
    pub fn translation_part(&self) -> Vec3 {
        Vec3::new(self.matrix[(0, 3)], self.matrix[(1, 3)], self.matrix[(2, 3)])
    }

    /// Inverse of this transform, if it exists.
    pub fn inverse(&self) -> Option<Self> {
        self.matrix.try_inverse().map(|matrix| Self { matrix })
    }

    /// Pack the inverse map (world space to local space) as
    /// [`AFFINE_FLOATS`] floats: row-major linear part, then translation.
    ///
    /// Returns `None` for singular transforms.
    pub fn pack_inverse(&self) -> Option<[f32; AFFINE_FLOATS]> {
        let inv = self.inverse()?;
        let lin = inv.linear();
        let tr = inv.translation_part();
        let mut out = [0.0f32; AFFINE_FLOATS];
        for row in 0..3 {
            for col in 0..3 {
                out[row * 3 + col] = lin[(row, col)];
            }
        }
        out[9..12].copy_from_slice(tr.as_slice());
        Some(out)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Read a packed affine map (see [`Transform::pack_inverse`]).
///
/// # Panics
///
/// Panics if `floats` holds fewer than [`AFFINE_FLOATS`] values.
#[inline]
pub fn unpack_affine(floats: &[f32]) -> (Mat3, Vec3) {
    let lin = Mat3::from_row_slice(&floats[0..9]);
    let tr = Vec3::new(floats[9], floats[10], floats[11]);
    (lin, tr)
}

/// Tolerance constants for intersection arithmetic.
#[derive(Debug, Clone, Copy)]
pub struct Tolerance {
    /// Below this magnitude a denominator or length is treated as zero.
    pub zero: f32,
    /// Comparison slack for unit-length checks.
    pub unit: f32,
}

impl Tolerance {
    /// Default single-precision tolerances.
    pub const DEFAULT: Self = Self {
        zero: 1e-8,
        unit: 1e-4,
    };

    /// Check if a scalar is effectively zero.
    pub fn is_zero(&self, d: f32) -> bool {
        d.abs() < self.zero
    }

    /// Check if a vector has unit length within tolerance.
    pub fn is_unit(&self, v: &Vec3) -> bool {
        (v.norm() - 1.0).abs() < self.unit
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}
