use scene_kernel::GeometryError;
use scene_tessellation::TessellationError;
use thiserror::Error;

use crate::scene::GeometryId;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SceneError {
    #[error("geometry {0:?} is not in the scene")]
    UnknownGeometry(GeometryId),

    /// Reported by a [`MeshSink`](crate::render::MeshSink).
    #[error("render backend failed: {reason}")]
    Render { reason: String },

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Tessellation(#[from] TessellationError),
}
