use serde::{Deserialize, Serialize};

use super::point::Point3d;
use super::vector::Vec3;
use crate::error::GeometryError;

/// A chain of cubic Bezier segments sharing endpoints.
///
/// Holds `3k + 1` control points for `k >= 1` segments; segment `i` uses
/// points `3i..=3i+3`. The curve lives on the ground plane: evaluation reads
/// only the X and Z of each control point and returns Y = 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Point3d>", into = "Vec<Point3d>")]
pub struct BezierSpine {
    points: Vec<Point3d>,
}

impl BezierSpine {
    pub fn new(points: Vec<Point3d>) -> Result<Self, GeometryError> {
        let len = points.len();
        if len < 4 || (len - 1) % 3 != 0 {
            return Err(GeometryError::InvalidSpineLength { len });
        }
        Ok(Self { points })
    }

    pub fn control_points(&self) -> &[Point3d] {
        &self.points
    }

    pub fn segment_count(&self) -> usize {
        (self.points.len() - 1) / 3
    }

    /// Largest valid parameter; `t` ranges over `[0, segment_count]`.
    pub fn max_parameter(&self) -> f64 {
        self.segment_count() as f64
    }

    pub fn start(&self) -> Point3d {
        self.points[0]
    }

    pub fn end(&self) -> Point3d {
        self.points[self.points.len() - 1]
    }

    /// Position at parameter `t`, with Y fixed at 0.
    pub fn point_at(&self, t: f64) -> Point3d {
        let ([p0, p1, p2, p3], u) = self.segment(t);
        let v = 1.0 - u;
        let b0 = v * v * v;
        let b1 = 3.0 * v * v * u;
        let b2 = 3.0 * v * u * u;
        let b3 = u * u * u;
        Point3d::new(
            b0 * p0.x + b1 * p1.x + b2 * p2.x + b3 * p3.x,
            0.0,
            b0 * p0.z + b1 * p1.z + b2 * p2.z + b3 * p3.z,
        )
    }

    /// Derivative with respect to `t`, with Y fixed at 0.
    pub fn tangent_at(&self, t: f64) -> Vec3 {
        let ([p0, p1, p2, p3], u) = self.segment(t);
        let v = 1.0 - u;
        let d0 = p1 - p0;
        let d1 = p2 - p1;
        let d2 = p3 - p2;
        let x = v * v * d0.x + 2.0 * v * u * d1.x + u * u * d2.x;
        let z = v * v * d0.z + 2.0 * v * u * d1.z + u * u * d2.z;
        Vec3::new(3.0 * x, 0.0, 3.0 * z)
    }

    /// Parameters `0, 1/n, 2/n, .., segment_count`, `n` per segment.
    ///
    /// Stepped by integer index so the last sample is exactly
    /// [`BezierSpine::max_parameter`]. `n` must be at least 1.
    pub fn samples(&self, per_segment: usize) -> impl Iterator<Item = f64> + '_ {
        let steps = self.segment_count() * per_segment;
        let per_segment = per_segment as f64;
        (0..=steps).map(move |step| step as f64 / per_segment)
    }

    /// Control points and local parameter for global parameter `t`.
    ///
    /// `t` is clamped to the domain; at the far end the last segment is
    /// evaluated at `u = 1` instead of stepping past it.
    fn segment(&self, t: f64) -> ([Point3d; 4], f64) {
        let last = self.segment_count() - 1;
        let t = t.clamp(0.0, self.max_parameter());
        let index = t.floor() as usize;
        let (index, u) = if index > last {
            (last, 1.0)
        } else {
            (index, t - index as f64)
        };
        let base = index * 3;
        (
            [
                self.points[base],
                self.points[base + 1],
                self.points[base + 2],
                self.points[base + 3],
            ],
            u,
        )
    }
}

impl TryFrom<Vec<Point3d>> for BezierSpine {
    type Error = GeometryError;

    fn try_from(points: Vec<Point3d>) -> Result<Self, Self::Error> {
        Self::new(points)
    }
}

impl From<BezierSpine> for Vec<Point3d> {
    fn from(spine: BezierSpine) -> Self {
        spine.points
    }
}
