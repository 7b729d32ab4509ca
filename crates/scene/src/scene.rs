use scene_kernel::AffineFrame;
use scene_tessellation::SurfaceMesh;
use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};
use tracing::{debug, info, instrument, warn};

use crate::error::SceneError;
use crate::render::{MeshSink, Renderable};

new_key_type! {
    pub struct GeometryId;
    pub struct InstanceId;
}

/// One placement of a shared geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    pub geometry: GeometryId,
    /// Model frame relative to the scene root.
    pub frame: AffineFrame,
}

/// Meshes stored once and drawn any number of times.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scene {
    geometries: SlotMap<GeometryId, SurfaceMesh>,
    instances: SlotMap<InstanceId, Instance>,
    #[serde(skip)]
    initialized: bool,
    /// Geometries currently live in the sink.
    #[serde(skip)]
    uploaded: Vec<GeometryId>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_geometry(&mut self, mesh: SurfaceMesh) -> GeometryId {
        let id = self.geometries.insert(mesh);
        debug!(?id, "geometry added");
        id
    }

    pub fn geometry(&self, id: GeometryId) -> Option<&SurfaceMesh> {
        self.geometries.get(id)
    }

    pub fn geometry_count(&self) -> usize {
        self.geometries.len()
    }

    pub fn add_instance(
        &mut self,
        geometry: GeometryId,
        frame: AffineFrame,
    ) -> Result<InstanceId, SceneError> {
        if !self.geometries.contains_key(geometry) {
            return Err(SceneError::UnknownGeometry(geometry));
        }
        Ok(self.instances.insert(Instance { geometry, frame }))
    }

    pub fn instance(&self, id: InstanceId) -> Option<&Instance> {
        self.instances.get(id)
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    pub fn instances_of(
        &self,
        geometry: GeometryId,
    ) -> impl Iterator<Item = (InstanceId, &Instance)> + '_ {
        self.instances
            .iter()
            .filter(move |(_, inst)| inst.geometry == geometry)
    }

    /// Remove a geometry together with every instance of it.
    pub fn remove_geometry(&mut self, id: GeometryId) -> Option<SurfaceMesh> {
        let mesh = self.geometries.remove(id)?;
        self.instances.retain(|_, inst| inst.geometry != id);
        Some(mesh)
    }

    /// World frame of every instance under `root`.
    pub fn world_frames(&self, root: &AffineFrame) -> Vec<(GeometryId, AffineFrame)> {
        self.instances
            .values()
            .map(|inst| (inst.geometry, root.then(&inst.frame)))
            .collect()
    }
}

impl<S: MeshSink> Renderable<S> for Scene {
    /// Upload every geometry. A second call is a no-op. If an upload fails,
    /// the geometries uploaded so far are released before returning.
    #[instrument(skip_all, fields(geometries = self.geometries.len()))]
    fn init(&mut self, sink: &mut S) -> Result<(), SceneError> {
        if self.initialized {
            return Ok(());
        }
        for (id, mesh) in &self.geometries {
            if let Err(err) = sink.upload(id, mesh) {
                warn!(?id, %err, "upload failed, releasing partial scene");
                for live in self.uploaded.drain(..) {
                    sink.release(live);
                }
                return Err(err);
            }
            self.uploaded.push(id);
        }
        self.initialized = true;
        info!(instances = self.instances.len(), "scene uploaded");
        Ok(())
    }

    fn draw(&self, sink: &mut S, frame: &AffineFrame) -> Result<(), SceneError> {
        if !self.initialized {
            return Err(SceneError::Render {
                reason: "scene drawn before init".into(),
            });
        }
        for (geometry, world) in self.world_frames(frame) {
            sink.draw(geometry, &world)?;
        }
        Ok(())
    }

    fn destroy(&mut self, sink: &mut S) {
        for id in self.uploaded.drain(..) {
            sink.release(id);
        }
        if self.initialized {
            self.initialized = false;
            debug!("scene released");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingSink, SinkEvent};
    use scene_kernel::Point3d;

    fn scene_with_two_boxes() -> (Scene, GeometryId) {
        let mut scene = Scene::new();
        let id = scene.add_geometry(SurfaceMesh::new());
        let id_frame = AffineFrame::identity();
        scene.add_instance(id, id_frame).unwrap();
        scene.add_instance(id, id_frame.translate(5.0, 0.0, 0.0)).unwrap();
        (scene, id)
    }

    #[test]
    fn test_instances_share_geometry() {
        let (scene, id) = scene_with_two_boxes();
        assert_eq!(scene.geometry_count(), 1);
        assert_eq!(scene.instances_of(id).count(), 2);
    }

    #[test]
    fn test_unknown_geometry_rejected() {
        let (mut scene, id) = scene_with_two_boxes();
        scene.remove_geometry(id).unwrap();
        assert_eq!(
            scene.add_instance(id, AffineFrame::identity()),
            Err(SceneError::UnknownGeometry(id))
        );
    }

    #[test]
    fn test_remove_geometry_drops_instances() {
        let (mut scene, id) = scene_with_two_boxes();
        let other = scene.add_geometry(SurfaceMesh::new());
        scene.add_instance(other, AffineFrame::identity()).unwrap();
        assert!(scene.remove_geometry(id).is_some());
        assert_eq!(scene.instance_count(), 1);
        assert!(scene.remove_geometry(id).is_none());
    }

    #[test]
    fn test_world_frames_compose_with_root() {
        let (scene, _) = scene_with_two_boxes();
        let root = AffineFrame::identity().translate(0.0, 1.0, 0.0);
        let mut origins: Vec<Point3d> = scene
            .world_frames(&root)
            .iter()
            .map(|(_, f)| f.origin())
            .collect();
        origins.sort_by(|a, b| a.x.total_cmp(&b.x));
        assert_eq!(origins, vec![Point3d::new(0.0, 1.0, 0.0), Point3d::new(5.0, 1.0, 0.0)]);
    }

    #[test]
    fn test_render_lifecycle() {
        let (mut scene, id) = scene_with_two_boxes();
        let mut sink = RecordingSink::default();

        assert!(scene.draw(&mut sink, &AffineFrame::identity()).is_err());
        scene.init(&mut sink).unwrap();
        scene.draw(&mut sink, &AffineFrame::identity()).unwrap();
        scene.destroy(&mut sink);
        scene.destroy(&mut sink);

        let draws = sink.events.iter().filter(|e| matches!(e, SinkEvent::Draw(..))).count();
        assert_eq!(sink.events[0], SinkEvent::Upload(id, 0));
        assert_eq!(draws, 2);
        assert_eq!(sink.events.last(), Some(&SinkEvent::Release(id)));
        assert_eq!(sink.events.iter().filter(|e| **e == SinkEvent::Release(id)).count(), 1);
    }

    #[test]
    fn test_failed_init_releases_partial_uploads() {
        let (mut scene, _) = scene_with_two_boxes();
        scene.add_geometry(SurfaceMesh::new());
        let mut sink = RecordingSink {
            fail_after: Some(1),
            ..RecordingSink::default()
        };
        assert!(matches!(scene.init(&mut sink), Err(SceneError::Render { .. })));
        let uploads = sink.events.iter().filter(|e| matches!(e, SinkEvent::Upload(..))).count();
        assert_eq!(uploads, 1);
        assert!(sink.live().is_empty());

        scene.destroy(&mut sink);
        assert!(sink.live().is_empty());
        assert!(scene.draw(&mut sink, &AffineFrame::identity()).is_err());
    }

    #[test]
    fn test_init_twice_uploads_once() {
        let (mut scene, id) = scene_with_two_boxes();
        let mut sink = RecordingSink::default();
        scene.init(&mut sink).unwrap();
        scene.init(&mut sink).unwrap();
        assert_eq!(sink.live(), vec![id]);
        scene.destroy(&mut sink);
        assert!(sink.live().is_empty());
    }

    #[test]
    fn test_sink_failure_propagates() {
        let (mut scene, _) = scene_with_two_boxes();
        let mut sink = RecordingSink {
            fail_after: Some(0),
            ..RecordingSink::default()
        };
        assert!(matches!(scene.init(&mut sink), Err(SceneError::Render { .. })));
    }
}
