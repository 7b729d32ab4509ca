//! Scene composition: shared meshes, placed instances and the boundary to the
//! rendering backend.

pub mod error;
pub mod render;
pub mod scene;
pub mod terrain_scene;

#[cfg(test)]
mod testing;

pub use error::SceneError;
pub use render::{MeshSink, Renderable};
pub use scene::{GeometryId, Instance, InstanceId, Scene};
pub use terrain_scene::{TerrainScene, Tree};
