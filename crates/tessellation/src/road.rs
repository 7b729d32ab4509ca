//! Ribbon meshes extruded along a Bezier spine.
//!
//! The spine is walked at a fixed number of samples per segment. At each
//! sample a Frenet frame is built from the curve position and tangent, and
//! the two ends of a flat cross-section are carried through it. Consecutive
//! pairs of edge points are stitched into quads.

use scene_kernel::geometry::point::Point3d;
use scene_kernel::geometry::vector::Vec3;
use scene_kernel::{AffineFrame, BezierSpine, HeightField, Tolerance};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::error::TessellationError;
use crate::mesh::SurfaceMesh;

/// Default number of samples taken per Bezier segment.
pub const SAMPLES_PER_SEGMENT: usize = 16;

/// Sampling parameters for road tessellation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoadConfig {
    /// Steps per Bezier segment; the parameter advances by `1 / n` each step.
    pub samples_per_segment: usize,
    pub tolerance: Tolerance,
}

impl Default for RoadConfig {
    fn default() -> Self {
        Self {
            samples_per_segment: SAMPLES_PER_SEGMENT,
            tolerance: Tolerance::default(),
        }
    }
}

impl RoadConfig {
    /// Few samples, for distant or preview geometry.
    pub fn coarse() -> Self {
        Self {
            samples_per_segment: 4,
            ..Self::default()
        }
    }

    pub fn fine() -> Self {
        Self {
            samples_per_segment: 64,
            ..Self::default()
        }
    }

    pub fn with_samples_per_segment(self, samples_per_segment: usize) -> Self {
        Self {
            samples_per_segment,
            ..self
        }
    }
}

/// A road: full width plus the spine it follows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Road {
    pub width: f64,
    pub spine: BezierSpine,
}

impl Road {
    pub fn new(width: f64, spine: BezierSpine) -> Self {
        Self { width, spine }
    }

    pub fn half_width(&self) -> f64 {
        self.width / 2.0
    }

    /// Tessellate this road over `terrain`.
    pub fn tessellate(
        &self,
        terrain: &HeightField,
        config: RoadConfig,
    ) -> Result<SurfaceMesh, TessellationError> {
        RoadMeshBuilder::new(&self.spine, self.half_width(), terrain)
            .with_config(config)
            .build()
    }
}

/// Builds the ribbon mesh for one spine.
#[derive(Debug, Clone)]
pub struct RoadMeshBuilder<'a> {
    spine: &'a BezierSpine,
    half_width: f64,
    terrain: &'a HeightField,
    config: RoadConfig,
}

impl<'a> RoadMeshBuilder<'a> {
    pub fn new(spine: &'a BezierSpine, half_width: f64, terrain: &'a HeightField) -> Self {
        Self {
            spine,
            half_width,
            terrain,
            config: RoadConfig::default(),
        }
    }

    pub fn with_config(mut self, config: RoadConfig) -> Self {
        self.config = config;
        self
    }

    /// Walk the spine and emit the ribbon.
    ///
    /// The ribbon sits at the terrain altitude under the spine's first
    /// control point, for its whole length. Vertices come in (left, right)
    /// pairs; normals point straight up and texture coordinates are each
    /// vertex's (x, z). A zero tangent reuses the previous sample's tangent;
    /// at the start it borrows the first non-zero tangent further along.
    #[instrument(skip(self), fields(segments = self.spine.segment_count(), half_width = self.half_width))]
    pub fn build(&self) -> Result<SurfaceMesh, TessellationError> {
        if !(self.half_width.is_finite() && self.half_width > 0.0) {
            return Err(TessellationError::InvalidDimension {
                parameter: "half_width",
                value: self.half_width,
            });
        }
        let samples = self.config.samples_per_segment;
        if samples == 0 {
            return Err(TessellationError::InvalidSampling { samples });
        }

        let tolerance = self.config.tolerance;
        let start = self.spine.start();
        let y = self.terrain.altitude(start.x, start.z);
        let left_edge = Point3d::new(-self.half_width, y, 0.0);
        let right_edge = Point3d::new(self.half_width, y, 0.0);

        let params: Vec<f64> = self.spine.samples(samples).collect();
        let mut previous = params
            .iter()
            .map(|&t| self.spine.tangent_at(t))
            .find(|tangent| !tolerance.is_zero_vector(tangent))
            .ok_or(TessellationError::ZeroLengthCurve)?;

        let pairs = params.len();
        let mut mesh = SurfaceMesh::with_capacity(pairs * 2, (pairs - 1) * 6);
        for &t in &params {
            let phi = self.spine.point_at(t);
            let mut tangent = self.spine.tangent_at(t);
            if tolerance.is_zero_vector(&tangent) {
                debug!(t, "zero tangent, reusing previous sample's");
                tangent = previous;
            }

            let frame = AffineFrame::frenet(phi, tangent)?;
            for edge in [left_edge, right_edge] {
                let p = frame.transform_point(&edge);
                mesh.add_vertex(p, Vec3::Y, p.xz());
            }
            previous = tangent;
        }

        for quad in 0..pairs as u32 - 1 {
            let i = quad * 2;
            mesh.add_triangle(i, i + 1, i + 2);
            mesh.add_triangle(i + 3, i + 2, i + 1);
        }

        info!(
            vertices = mesh.vertex_count(),
            triangles = mesh.triangle_count(),
            "road tessellated"
        );
        Ok(mesh)
    }
}
