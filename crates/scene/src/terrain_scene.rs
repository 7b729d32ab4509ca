//! A level: terrain, the roads laid over it and trees standing on it.

use scene_kernel::{normalize_degrees, AffineFrame, HeightField};
use scene_tessellation::{tessellate_height_field, Road, RoadConfig, SurfaceMesh};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{info, instrument};

use crate::error::SceneError;
use crate::render::{MeshSink, Renderable};
use crate::scene::{GeometryId, Scene};

/// A tree placement on the ground plane.
///
/// `yaw` is in degrees, kept in `[-180, 180)` by both [`Tree::new`] and
/// deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub x: f64,
    pub z: f64,
    #[serde(default, deserialize_with = "wrapped_degrees")]
    pub yaw: f64,
}

fn wrapped_degrees<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    f64::deserialize(deserializer).map(normalize_degrees)
}

impl Tree {
    pub fn new(x: f64, z: f64, yaw: f64) -> Self {
        Self {
            x,
            z,
            yaw: normalize_degrees(yaw),
        }
    }

    /// Model frame standing on `terrain`, turned by `yaw` about the vertical.
    pub fn frame(&self, terrain: &HeightField) -> AffineFrame {
        let ground = terrain.surface_point(self.x, self.z);
        AffineFrame::identity()
            .translate(ground.x, ground.y, ground.z)
            .rotate_y(self.yaw)
    }
}

#[derive(Debug, Clone)]
pub struct TerrainScene {
    pub scene: Scene,
    pub terrain: GeometryId,
    pub roads: Vec<GeometryId>,
    pub tree: GeometryId,
}

impl TerrainScene {
    /// Tessellate the terrain and every road, and place one instance of
    /// `tree_mesh` per tree.
    #[instrument(skip_all, fields(roads = roads.len(), trees = trees.len()))]
    pub fn build(
        height_field: &HeightField,
        roads: &[Road],
        trees: &[Tree],
        tree_mesh: SurfaceMesh,
        config: RoadConfig,
    ) -> Result<Self, SceneError> {
        let mut scene = Scene::new();
        let world = AffineFrame::identity();

        let terrain = scene.add_geometry(tessellate_height_field(height_field));
        scene.add_instance(terrain, world)?;

        let mut road_ids = Vec::with_capacity(roads.len());
        for road in roads {
            let id = scene.add_geometry(road.tessellate(height_field, config)?);
            scene.add_instance(id, world)?;
            road_ids.push(id);
        }

        let tree = scene.add_geometry(tree_mesh);
        for t in trees {
            scene.add_instance(tree, t.frame(height_field))?;
        }

        info!(
            geometries = scene.geometry_count(),
            instances = scene.instance_count(),
            "terrain scene built"
        );
        Ok(Self {
            scene,
            terrain,
            roads: road_ids,
            tree,
        })
    }
}

impl<S: MeshSink> Renderable<S> for TerrainScene {
    fn init(&mut self, sink: &mut S) -> Result<(), SceneError> {
        self.scene.init(sink)
    }

    fn draw(&self, sink: &mut S, frame: &AffineFrame) -> Result<(), SceneError> {
        self.scene.draw(sink, frame)
    }

    fn destroy(&mut self, sink: &mut S) {
        self.scene.destroy(sink)
    }
}
