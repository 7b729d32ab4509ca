use scene_kernel::AffineFrame;
use scene_tessellation::SurfaceMesh;

use crate::error::SceneError;
use crate::render::MeshSink;
use crate::scene::GeometryId;

#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    /// Geometry and its vertex count.
    Upload(GeometryId, usize),
    Draw(GeometryId, AffineFrame),
    Release(GeometryId),
}

/// Sink that records every call instead of talking to a GPU.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<SinkEvent>,
    /// Fail every upload once this many have succeeded.
    pub fail_after: Option<usize>,
}

impl RecordingSink {
    /// Geometries uploaded and not yet released, in upload order.
    pub fn live(&self) -> Vec<GeometryId> {
        let mut live = Vec::new();
        for event in &self.events {
            match event {
                SinkEvent::Upload(id, _) => live.push(*id),
                SinkEvent::Release(id) => live.retain(|l| l != id),
                SinkEvent::Draw(..) => {}
            }
        }
        live
    }
}

impl MeshSink for RecordingSink {
    fn upload(&mut self, id: GeometryId, mesh: &SurfaceMesh) -> Result<(), SceneError> {
        let uploads = self
            .events
            .iter()
            .filter(|e| matches!(e, SinkEvent::Upload(..)))
            .count();
        if self.fail_after.is_some_and(|n| uploads >= n) {
            return Err(SceneError::Render {
                reason: "out of buffer memory".into(),
            });
        }
        self.events.push(SinkEvent::Upload(id, mesh.vertex_count()));
        Ok(())
    }

    fn draw(&mut self, id: GeometryId, frame: &AffineFrame) -> Result<(), SceneError> {
        self.events.push(SinkEvent::Draw(id, *frame));
        Ok(())
    }

    fn release(&mut self, id: GeometryId) {
        self.events.push(SinkEvent::Release(id));
    }
}
