//! Immutable affine coordinate frames.
//!
//! An [`AffineFrame`] wraps the 4x4 matrix accumulated by every operation
//! applied so far. Operations post-multiply: each new transform is expressed
//! in the current frame's local space, so a chain reads parent to child.

use nalgebra::Matrix4;
use serde::{Deserialize, Serialize};

use super::point::Point3d;
use super::quaternion::Quaternion;
use super::vector::Vec3;
use crate::error::GeometryError;

/// A coordinate frame backed by a column-major 4x4 affine matrix.
///
/// Angles are in degrees. Frames are values: every operation returns a new
/// frame and leaves `self` untouched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 16]", into = "[f64; 16]")]
pub struct AffineFrame {
    m: [f64; 16],
}

impl AffineFrame {
    /// i = (1,0,0), j = (0,1,0), k = (0,0,1), origin at (0,0,0).
    pub fn identity() -> Self {
        Self::from_axes(Vec3::X, Vec3::Y, Vec3::Z, Point3d::ORIGIN)
    }

    /// Frame with the given axes and its origin at (0,0,0).
    pub fn from_basis(i: Vec3, j: Vec3, k: Vec3) -> Self {
        Self::from_axes(i, j, k, Point3d::ORIGIN)
    }

    /// Frame whose columns are `i`, `j`, `k` and `origin`.
    pub fn from_axes(i: Vec3, j: Vec3, k: Vec3, origin: Point3d) -> Self {
        #[rustfmt::skip]
        let m = [
            i.x,      i.y,      i.z,      0.0,
            j.x,      j.y,      j.z,      0.0,
            k.x,      k.y,      k.z,      0.0,
            origin.x, origin.y, origin.z, 1.0,
        ];
        Self { m }
    }

    /// Frenet frame at `point` for a curve heading along `tangent`.
    ///
    /// `i = normalize(-t.z, 0, t.x)`, `j = normalize(i x t)`, `k = normalize(t)`.
    /// For a horizontal tangent, `j` is world up. A tangent with no horizontal
    /// component (zero or vertical) leaves `i` undefined and is rejected.
    pub fn frenet(point: Point3d, tangent: Vec3) -> Result<Self, GeometryError> {
        let i = Vec3::new(-tangent.z, 0.0, tangent.x)
            .normalized()
            .ok_or(GeometryError::DegenerateTangent {
                x: tangent.x,
                y: tangent.y,
                z: tangent.z,
            })?;
        let j = i.cross(&tangent).normalize();
        let k = tangent.normalize();
        Ok(Self::from_axes(i, j, k, point))
    }

    pub fn translate(&self, x: f64, y: f64, z: f64) -> Self {
        #[rustfmt::skip]
        let m = [
            1.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            x,   y,   z,   1.0,
        ];
        self.then(&Self { m })
    }

    pub fn translate_by(&self, v: Vec3) -> Self {
        self.translate(v.x, v.y, v.z)
    }

    pub fn rotate_x(&self, degrees: f64) -> Self {
        let (s, c) = degrees.to_radians().sin_cos();
        #[rustfmt::skip]
        let m = [
            1.0, 0.0, 0.0, 0.0,
            0.0, c,   s,   0.0,
            0.0, -s,  c,   0.0,
            0.0, 0.0, 0.0, 1.0,
        ];
        self.then(&Self { m })
    }

    pub fn rotate_y(&self, degrees: f64) -> Self {
        let (s, c) = degrees.to_radians().sin_cos();
        #[rustfmt::skip]
        let m = [
            c,   0.0, -s,  0.0,
            0.0, 1.0, 0.0, 0.0,
            s,   0.0, c,   0.0,
            0.0, 0.0, 0.0, 1.0,
        ];
        self.then(&Self { m })
    }

    pub fn rotate_z(&self, degrees: f64) -> Self {
        let (s, c) = degrees.to_radians().sin_cos();
        #[rustfmt::skip]
        let m = [
            c,   s,   0.0, 0.0,
            -s,  c,   0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ];
        self.then(&Self { m })
    }

    /// Rotate about X, then Y, then Z. The order is fixed.
    pub fn rotate(&self, theta_x: f64, theta_y: f64, theta_z: f64) -> Self {
        self.rotate_x(theta_x).rotate_y(theta_y).rotate_z(theta_z)
    }

    /// Rotate by a quaternion, which must be normalized.
    ///
    /// The quaternion is not checked; a non-unit input also scales.
    pub fn rotate_by(&self, q: &Quaternion) -> Self {
        self.then(&q.to_frame())
    }

    pub fn scale(&self, x: f64, y: f64, z: f64) -> Self {
        #[rustfmt::skip]
        let m = [
            x,   0.0, 0.0, 0.0,
            0.0, y,   0.0, 0.0,
            0.0, 0.0, z,   0.0,
            0.0, 0.0, 0.0, 1.0,
        ];
        self.then(&Self { m })
    }

    pub fn uniform_scale(&self, s: f64) -> Self {
        self.scale(s, s, s)
    }

    /// Compose two frames: `self * child`. The child is expressed in `self`.
    pub fn then(&self, child: &AffineFrame) -> AffineFrame {
        let mut result = [0.0f64; 16];
        for col in 0..4 {
            for row in 0..4 {
                let mut sum = 0.0;
                for k in 0..4 {
                    sum += self.at(row, k) * child.at(k, col);
                }
                result[col * 4 + row] = sum;
            }
        }
        AffineFrame { m: result }
    }

    /// Inverse frame, or `None` when the matrix is singular (e.g. a zero scale).
    pub fn inverse(&self) -> Option<Self> {
        let inv = Matrix4::from(*self).try_inverse()?;
        let mut m = [0.0f64; 16];
        m.copy_from_slice(inv.as_slice());
        Some(Self { m })
    }

    /// Apply the frame to a homogeneous point (w = 1).
    pub fn transform_point(&self, p: &Point3d) -> Point3d {
        let [x, y, z, w] = self.apply([p.x, p.y, p.z, 1.0]);
        Point3d::new(x / w, y / w, z / w)
    }

    /// Apply the frame to a homogeneous vector (w = 0); translation is ignored.
    pub fn transform_vector(&self, v: &Vec3) -> Vec3 {
        let [x, y, z, _] = self.apply([v.x, v.y, v.z, 0.0]);
        Vec3::new(x, y, z)
    }

    pub fn i_axis(&self) -> Vec3 {
        Vec3::new(self.m[0], self.m[1], self.m[2])
    }

    pub fn j_axis(&self) -> Vec3 {
        Vec3::new(self.m[4], self.m[5], self.m[6])
    }

    pub fn k_axis(&self) -> Vec3 {
        Vec3::new(self.m[8], self.m[9], self.m[10])
    }

    pub fn origin(&self) -> Point3d {
        Point3d::new(self.m[12], self.m[13], self.m[14])
    }

    /// Column-major matrix entries.
    pub fn matrix(&self) -> [f64; 16] {
        self.m
    }

    /// Column-major entries narrowed for GPU uniform upload.
    pub fn to_cols_array_f32(&self) -> [f32; 16] {
        self.m.map(|v| v as f32)
    }

    /// Matrix element access (row, col), 0-indexed.
    fn at(&self, row: usize, col: usize) -> f64 {
        self.m[col * 4 + row]
    }

    fn apply(&self, v: [f64; 4]) -> [f64; 4] {
        let mut out = [0.0f64; 4];
        for (row, slot) in out.iter_mut().enumerate() {
            *slot = (0..4).map(|col| self.at(row, col) * v[col]).sum();
        }
        out
    }
}

impl Default for AffineFrame {
    fn default() -> Self {
        Self::identity()
    }
}

impl From<AffineFrame> for Matrix4<f64> {
    fn from(frame: AffineFrame) -> Self {
        Matrix4::from_column_slice(&frame.m)
    }
}

impl From<AffineFrame> for [f64; 16] {
    fn from(frame: AffineFrame) -> Self {
        frame.m
    }
}

impl TryFrom<[f64; 16]> for AffineFrame {
    type Error = GeometryError;

    fn try_from(m: [f64; 16]) -> Result<Self, Self::Error> {
        if m[3] != 0.0 || m[7] != 0.0 || m[11] != 0.0 || m[15] != 1.0 {
            return Err(GeometryError::ProjectiveMatrix);
        }
        Ok(Self { m })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const EPS: f64 = 1e-12;

    #[test]
    fn test_identity_axes() {
        let f = AffineFrame::identity();
        assert_eq!(f.i_axis(), Vec3::X);
        assert_eq!(f.j_axis(), Vec3::Y);
        assert_eq!(f.k_axis(), Vec3::Z);
        assert_eq!(f.origin(), Point3d::ORIGIN);
    }

    #[test]
    fn test_zero_rotations_are_identity() {
        let f = AffineFrame::identity().rotate_x(0.0).rotate_y(0.0).rotate_z(0.0);
        let p = Point3d::new(1.0, -2.0, 3.5);
        assert_abs_diff_eq!(f.transform_point(&p), p, epsilon = EPS);
    }

    #[test]
    fn test_translation() {
        let f = AffineFrame::identity().translate(10.0, 20.0, 30.0);
        let p = f.transform_point(&Point3d::new(1.0, 2.0, 3.0));
        assert_abs_diff_eq!(p, Point3d::new(11.0, 22.0, 33.0), epsilon = EPS);
    }

    #[test]
    fn test_vectors_ignore_translation() {
        let f = AffineFrame::identity().translate(5.0, 5.0, 5.0);
        assert_abs_diff_eq!(f.transform_vector(&Vec3::X), Vec3::X, epsilon = EPS);
    }

    #[test]
    fn test_rotations_are_counter_clockwise() {
        let id = AffineFrame::identity();
        assert_abs_diff_eq!(id.rotate_z(90.0).transform_vector(&Vec3::X), Vec3::Y, epsilon = EPS);
        assert_abs_diff_eq!(id.rotate_x(90.0).transform_vector(&Vec3::Y), Vec3::Z, epsilon = EPS);
        assert_abs_diff_eq!(id.rotate_y(90.0).transform_vector(&Vec3::Z), Vec3::X, epsilon = EPS);
    }

    #[test]
    fn test_post_multiplication_order() {
        // Translate then rotate: the rotation happens in the translated frame,
        // so the origin stays put while local axes turn.
        let f = AffineFrame::identity().translate(1.0, 0.0, 0.0).rotate_z(90.0);
        assert_abs_diff_eq!(f.origin(), Point3d::new(1.0, 0.0, 0.0), epsilon = EPS);
        let p = f.transform_point(&Point3d::new(1.0, 0.0, 0.0));
        assert_abs_diff_eq!(p, Point3d::new(1.0, 1.0, 0.0), epsilon = EPS);

        let g = AffineFrame::identity().rotate_z(90.0).translate(1.0, 0.0, 0.0);
        assert_abs_diff_eq!(g.origin(), Point3d::new(0.0, 1.0, 0.0), epsilon = EPS);
    }

    #[test]
    fn test_rotate_triple_matches_chain() {
        let a = AffineFrame::identity().rotate(30.0, 45.0, 60.0);
        let b = AffineFrame::identity().rotate_x(30.0).rotate_y(45.0).rotate_z(60.0);
        let c = AffineFrame::identity().rotate_z(60.0).rotate_y(45.0).rotate_x(30.0);
        let p = Point3d::new(1.0, 2.0, 3.0);
        assert_abs_diff_eq!(a.transform_point(&p), b.transform_point(&p), epsilon = EPS);
        assert!(a.transform_point(&p).distance_to(&c.transform_point(&p)) > 1e-3);
    }

    #[test]
    fn test_scale() {
        let f = AffineFrame::identity().scale(2.0, 3.0, 4.0);
        let p = f.transform_point(&Point3d::new(1.0, 1.0, 1.0));
        assert_abs_diff_eq!(p, Point3d::new(2.0, 3.0, 4.0), epsilon = EPS);
    }

    #[test]
    fn test_translate_round_trip() {
        let f = AffineFrame::identity()
            .rotate(10.0, 20.0, 30.0)
            .translate(3.0, -4.0, 5.0)
            .translate(-3.0, 4.0, -5.0);
        let g = AffineFrame::identity().rotate(10.0, 20.0, 30.0);
        let p = Point3d::new(-7.0, 0.5, 2.0);
        assert_abs_diff_eq!(f.transform_point(&p), g.transform_point(&p), epsilon = 1e-9);
    }

    #[test]
    fn test_frenet_horizontal_tangent() {
        let f = AffineFrame::frenet(Point3d::new(2.0, 0.0, 1.0), Vec3::new(3.0, 0.0, 0.0))
            .unwrap();
        assert_abs_diff_eq!(f.i_axis(), Vec3::Z, epsilon = EPS);
        assert_abs_diff_eq!(f.j_axis(), Vec3::Y, epsilon = EPS);
        assert_abs_diff_eq!(f.k_axis(), Vec3::X, epsilon = EPS);
        assert_abs_diff_eq!(f.origin(), Point3d::new(2.0, 0.0, 1.0), epsilon = EPS);
    }

    #[test]
    fn test_frenet_rejects_degenerate_tangents() {
        assert!(matches!(
            AffineFrame::frenet(Point3d::ORIGIN, Vec3::ZERO),
            Err(GeometryError::DegenerateTangent { .. })
        ));
        assert!(matches!(
            AffineFrame::frenet(Point3d::ORIGIN, Vec3::Y),
            Err(GeometryError::DegenerateTangent { .. })
        ));
    }

    #[test]
    fn test_inverse() {
        let f = AffineFrame::identity()
            .translate(5.0, -3.0, 7.0)
            .rotate_y(33.0)
            .scale(2.0, 2.0, 2.0);
        let inv = f.inverse().unwrap();
        let p = Point3d::new(1.0, 2.0, 3.0);
        assert_abs_diff_eq!(inv.transform_point(&f.transform_point(&p)), p, epsilon = 1e-9);
        assert!(AffineFrame::identity().scale(0.0, 1.0, 1.0).inverse().is_none());
    }

    #[test]
    fn test_then_composes_parent_child() {
        let parent = AffineFrame::identity().translate(0.0, 10.0, 0.0);
        let child = AffineFrame::identity().translate(1.0, 0.0, 0.0);
        let world = parent.then(&child);
        assert_abs_diff_eq!(world.origin(), Point3d::new(1.0, 10.0, 0.0), epsilon = EPS);
    }

    #[test]
    fn test_rejects_projective_matrix() {
        let mut m = AffineFrame::identity().matrix();
        m[3] = 0.5;
        assert_eq!(AffineFrame::try_from(m), Err(GeometryError::ProjectiveMatrix));
    }
}
