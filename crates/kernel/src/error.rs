use thiserror::Error;

/// Construction-time failures of the geometry core.
///
/// Each variant is a violated precondition: the caller handed in data the
/// core cannot turn into a valid value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("spine has {len} control points, expected 3k+1 with k >= 1")]
    InvalidSpineLength { len: usize },

    #[error("tangent ({x}, {y}, {z}) has no horizontal component, cannot build a Frenet frame")]
    DegenerateTangent { x: f64, y: f64, z: f64 },

    #[error("matrix bottom row must be (0, 0, 0, 1) for an affine frame")]
    ProjectiveMatrix,

    #[error("height field must be at least 1x1, got {width}x{depth}")]
    GridTooSmall { width: usize, depth: usize },

    #[error("height field of {width}x{depth} needs {expected} altitudes, got {provided}")]
    AltitudeCountMismatch {
        width: usize,
        depth: usize,
        expected: usize,
        provided: usize,
    },

    #[error("vertex at ({x}, {z}) lies outside the {width}x{depth} grid")]
    VertexOutsideGrid {
        x: f64,
        z: f64,
        width: usize,
        depth: usize,
    },
}
