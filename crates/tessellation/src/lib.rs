//! Mesh generation for terrain scenes: road ribbons extruded along Bezier
//! spines and the terrain surface itself.

pub mod error;
pub mod mesh;
pub mod road;
pub mod terrain;

pub use error::TessellationError;
pub use mesh::{audit_mesh, mesh_to_obj, MeshAudit, MeshDefect, SurfaceMesh};
pub use road::{Road, RoadConfig, RoadMeshBuilder, SAMPLES_PER_SEGMENT};
pub use terrain::tessellate_height_field;
