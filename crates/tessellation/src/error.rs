use scene_kernel::GeometryError;
use thiserror::Error;

/// Failures while turning geometry into meshes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TessellationError {
    #[error("{parameter} must be positive and finite, got {value}")]
    InvalidDimension { parameter: &'static str, value: f64 },

    #[error("need at least 1 sample per segment, got {samples}")]
    InvalidSampling { samples: usize },

    #[error("curve has zero length: every sampled tangent is zero")]
    ZeroLengthCurve,

    #[error(transparent)]
    Geometry(#[from] GeometryError),
}
