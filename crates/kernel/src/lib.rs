pub mod error;
pub mod geometry;
pub mod terrain;

use serde::{Deserialize, Serialize};

// Re-export the value types at crate root for convenience.
pub use error::GeometryError;
pub use geometry::{
    normalize_degrees, AffineFrame, BezierSpine, BoundingBox, Point2d, Point3d, Quaternion, Vec3,
};
pub use terrain::HeightField;

/// Tolerances for degeneracy checks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerance {
    /// Vectors whose components are all within this of zero count as zero.
    pub zero_length: f64,
    /// Allowed deviation of a quaternion's length from 1.
    pub unit_length: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            zero_length: 1e-12,
            unit_length: 1e-6,
        }
    }
}

impl Tolerance {
    pub fn is_zero_vector(&self, v: &Vec3) -> bool {
        v.is_zero(self.zero_length)
    }

    pub fn is_unit(&self, q: &Quaternion) -> bool {
        q.is_normalized(self.unit_length)
    }
}

/// Default tolerance.
pub fn default_tolerance() -> Tolerance {
    Tolerance::default()
}
