use approx::{AbsDiffEq, RelativeEq};
use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

use super::frame::AffineFrame;
use super::vector::Vec3;

/// A rotation quaternion: scalar part `w` and vector part `v`.
///
/// Nothing here normalizes implicitly. Conversions to a frame assume a unit
/// quaternion; keeping it unit is the caller's job.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub w: f64,
    pub v: Vec3,
}

impl Quaternion {
    pub const IDENTITY: Self = Self {
        w: 1.0,
        v: Vec3::ZERO,
    };

    pub const fn new(w: f64, x: f64, y: f64, z: f64) -> Self {
        Self {
            w,
            v: Vec3::new(x, y, z),
        }
    }

    pub const fn from_parts(w: f64, v: Vec3) -> Self {
        Self { w, v }
    }

    /// Rotation of `degrees` about `axis`. The axis must be non-zero.
    pub fn from_axis_angle(axis: Vec3, degrees: f64) -> Self {
        Self::from_axis_angle_radians(axis, degrees.to_radians())
    }

    pub fn from_axis_angle_radians(axis: Vec3, radians: f64) -> Self {
        let (s, c) = (radians / 2.0).sin_cos();
        Self::from_parts(c, axis.normalize() * s)
    }

    /// `Rx(dx) * Ry(dy) * Rz(dz)`, matching [`AffineFrame::rotate`].
    pub fn from_euler_angles(dx: f64, dy: f64, dz: f64) -> Self {
        Self::from_axis_angle(Vec3::X, dx)
            * Self::from_axis_angle(Vec3::Y, dy)
            * Self::from_axis_angle(Vec3::Z, dz)
    }

    pub fn length_squared(&self) -> f64 {
        self.w * self.w + self.v.dot(&self.v)
    }

    pub fn length(&self) -> f64 {
        self.length_squared().sqrt()
    }

    pub fn is_normalized(&self, tolerance: f64) -> bool {
        (self.length() - 1.0).abs() <= tolerance
    }

    /// Divide by the length without checking it; a zero quaternion gives NaN.
    pub fn normalize(&self) -> Self {
        let len = self.length();
        Self::from_parts(self.w / len, self.v / len)
    }

    pub fn normalized(&self) -> Option<Self> {
        let len = self.length();
        if len < 1e-15 {
            None
        } else {
            Some(Self::from_parts(self.w / len, self.v / len))
        }
    }

    pub fn conjugate(&self) -> Self {
        Self::from_parts(self.w, -self.v)
    }

    pub fn dot(&self, other: &Self) -> f64 {
        self.w * other.w + self.v.dot(&other.v)
    }

    /// Hamilton product `self * other`; `other` is applied first.
    pub fn multiply(&self, other: &Self) -> Self {
        let w = self.w * other.w - self.v.dot(&other.v);
        let v = other.v * self.w + self.v * other.w + self.v.cross(&other.v);
        Self::from_parts(w, v)
    }

    /// Rotate a vector by this (unit) quaternion: `q * (0, v) * q*`.
    pub fn rotate_vector(&self, v: &Vec3) -> Vec3 {
        self.multiply(&Self::from_parts(0.0, *v))
            .multiply(&self.conjugate())
            .v
    }

    /// Rotation frame from the inhomogeneous expression.
    ///
    /// Diagonal terms are `1 - 2(..)`, which is only a rotation for a unit
    /// quaternion.
    pub fn to_frame(&self) -> AffineFrame {
        let (w, x, y, z) = (self.w, self.v.x, self.v.y, self.v.z);
        let i = Vec3::new(
            1.0 - 2.0 * (y * y + z * z),
            2.0 * (x * y + w * z),
            2.0 * (x * z - w * y),
        );
        let j = Vec3::new(
            2.0 * (x * y - w * z),
            1.0 - 2.0 * (x * x + z * z),
            2.0 * (y * z + w * x),
        );
        let k = Vec3::new(
            2.0 * (x * z + w * y),
            2.0 * (y * z - w * x),
            1.0 - 2.0 * (x * x + y * y),
        );
        AffineFrame::from_basis(i, j, k)
    }

    /// Rotation frame from the homogeneous expression.
    ///
    /// Diagonal terms are `w² ± x² ± y² ± z²`, so no `1` stands in for the
    /// squared norm. For a non-unit input the result is the rotation scaled
    /// by `|q|²`.
    pub fn to_frame_homogeneous(&self) -> AffineFrame {
        let (w, x, y, z) = (self.w, self.v.x, self.v.y, self.v.z);
        let (ww, xx, yy, zz) = (w * w, x * x, y * y, z * z);
        let i = Vec3::new(
            ww + xx - yy - zz,
            2.0 * (x * y + w * z),
            2.0 * (x * z - w * y),
        );
        let j = Vec3::new(
            2.0 * (x * y - w * z),
            ww - xx + yy - zz,
            2.0 * (y * z + w * x),
        );
        let k = Vec3::new(
            2.0 * (x * z + w * y),
            2.0 * (y * z - w * x),
            ww - xx - yy + zz,
        );
        AffineFrame::from_basis(i, j, k)
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Quaternion {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self::Output {
        self.multiply(&rhs)
    }
}

impl Add for Quaternion {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self::from_parts(self.w + rhs.w, self.v + rhs.v)
    }
}

impl Sub for Quaternion {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self::from_parts(self.w - rhs.w, self.v - rhs.v)
    }
}

impl AbsDiffEq for Quaternion {
    type Epsilon = f64;

    fn default_epsilon() -> f64 {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
        self.w.abs_diff_eq(&other.w, epsilon) && self.v.abs_diff_eq(&other.v, epsilon)
    }
}

impl RelativeEq for Quaternion {
    fn default_max_relative() -> f64 {
        f64::default_max_relative()
    }

    fn relative_eq(&self, other: &Self, epsilon: f64, max_relative: f64) -> bool {
        self.w.relative_eq(&other.w, epsilon, max_relative)
            && self.v.relative_eq(&other.v, epsilon, max_relative)
    }
}
