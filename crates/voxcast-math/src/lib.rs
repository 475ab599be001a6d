#![warn(missing_docs)]

//! Math types for voxel raycasting.
//!
//! Thin wrappers around nalgebra in single precision: points, vectors,
//! integer cell coordinates, affine transforms and axis-aligned boxes.

mod aabb;

pub use aabb::Aabb3;

use nalgebra::{Matrix4, Vector3, Vector4};

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f32>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f32>;

/// An integer lattice coordinate identifying a voxel cell.
pub type Vec3i = Vector3<i32>;

/// Cell containing `p`, rounding each component towards negative infinity.
#[inline]
pub fn floor_to_cell(p: &Point3) -> Vec3i {
    Vec3i::new(p.x.floor() as i32, p.y.floor() as i32, p.z.floor() as i32)
}

/// Lower corner of a cell as a point.
#[inline]
pub fn cell_to_point(cell: &Vec3i) -> Point3 {
    Point3::new(cell.x as f32, cell.y as f32, cell.z as f32)
}

/// A 4x4 affine transformation matrix.
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

    /// Uniform scale by `s` on all axes.
    pub fn uniform_scale(s: f32) -> Self {
        Self::scale(s, s, s)
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

    /// Transform a point.
    pub fn apply_point(&self, p: &Point3) -> Point3 {
        let v = self.matrix * Vector4::new(p.x, p.y, p.z, 1.0);
        Point3::new(v.x, v.y, v.z)
    }

    /// Inverse of this transform, if it exists.
    pub fn inverse(&self) -> Option<Self> {
        self.matrix.try_inverse().map(|matrix| Self { matrix })
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}
