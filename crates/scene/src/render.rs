//! The boundary to the rendering backend.

use scene_kernel::AffineFrame;
use scene_tessellation::SurfaceMesh;

use crate::error::SceneError;
use crate::scene::GeometryId;

/// Receives meshes and draw calls. Implemented by the GPU layer.
pub trait MeshSink {
    /// Make `mesh` drawable under `id`.
    fn upload(&mut self, id: GeometryId, mesh: &SurfaceMesh) -> Result<(), SceneError>;

    /// Draw a previously uploaded mesh with the given model frame.
    fn draw(&mut self, id: GeometryId, frame: &AffineFrame) -> Result<(), SceneError>;

    fn release(&mut self, id: GeometryId);
}

/// Anything that owns GPU-side resources and can draw itself.
pub trait Renderable<S: MeshSink> {
    fn init(&mut self, sink: &mut S) -> Result<(), SceneError>;

    /// Draw relative to `frame`, the parent's world frame.
    fn draw(&self, sink: &mut S, frame: &AffineFrame) -> Result<(), SceneError>;

    fn destroy(&mut self, sink: &mut S);
}
