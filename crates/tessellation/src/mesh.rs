use std::fmt::Write;

use scene_kernel::geometry::point::{BoundingBox, Point2d, Point3d};
use scene_kernel::geometry::vector::Vec3;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

/// Triangle mesh buffers ready for upload.
///
/// `normals` and `tex_coords` run parallel to `vertices`; `indices` holds
/// three vertex indices per triangle, counter-clockwise seen from the side
/// the normals point to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SurfaceMesh {
    pub vertices: Vec<Point3d>,
    pub normals: Vec<Vec3>,
    pub tex_coords: Vec<Point2d>,
    pub indices: Vec<u32>,
}

impl SurfaceMesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(vertices: usize, indices: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertices),
            normals: Vec::with_capacity(vertices),
            tex_coords: Vec::with_capacity(vertices),
            indices: Vec::with_capacity(indices),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn add_vertex(&mut self, pos: Point3d, normal: Vec3, uv: Point2d) -> u32 {
        let idx = self.vertex_count() as u32;
        self.vertices.push(pos);
        self.normals.push(normal);
        self.tex_coords.push(uv);
        idx
    }

    pub fn add_triangle(&mut self, i0: u32, i1: u32, i2: u32) {
        self.indices.extend_from_slice(&[i0, i1, i2]);
    }

    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|c| [c[0], c[1], c[2]])
    }

    pub fn merge(&mut self, other: &SurfaceMesh) {
        let offset = self.vertex_count() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.normals.extend_from_slice(&other.normals);
        self.tex_coords.extend_from_slice(&other.tex_coords);
        self.indices.extend(other.indices.iter().map(|idx| idx + offset));
    }

    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::from_points(&self.vertices)
    }

    /// Positions flattened to `[x, y, z, x, y, z, ...]`.
    pub fn positions_f32(&self) -> Vec<f32> {
        self.vertices
            .iter()
            .flat_map(|p| [p.x as f32, p.y as f32, p.z as f32])
            .collect()
    }

    pub fn normals_f32(&self) -> Vec<f32> {
        self.normals
            .iter()
            .flat_map(|n| [n.x as f32, n.y as f32, n.z as f32])
            .collect()
    }

    pub fn tex_coords_f32(&self) -> Vec<f32> {
        self.tex_coords
            .iter()
            .flat_map(|uv| [uv.x as f32, uv.y as f32])
            .collect()
    }
}

/// Problems found by [`audit_mesh`].
#[derive(Debug, Clone, PartialEq)]
pub enum MeshDefect {
    /// A per-vertex buffer does not match the vertex count.
    BufferLengthMismatch { buffer: &'static str, len: usize, vertices: usize },
    /// Index count is not a multiple of three.
    DanglingIndices { count: usize },
    IndexOutOfRange { triangle: usize, index: u32 },
    NonFiniteVertex { vertex: usize },
    /// Triangle with (near-)zero area.
    DegenerateTriangle { triangle: usize },
}

#[derive(Debug, Clone, Default)]
pub struct MeshAudit {
    pub vertex_count: usize,
    pub triangle_count: usize,
    pub defects: Vec<MeshDefect>,
}

impl MeshAudit {
    pub fn is_valid(&self) -> bool {
        self.defects.is_empty()
    }
}

/// Check buffer consistency, index ranges and triangle areas.
#[instrument(skip(mesh), fields(vertices = mesh.vertex_count()))]
pub fn audit_mesh(mesh: &SurfaceMesh) -> MeshAudit {
    let vertices = mesh.vertex_count();
    let mut defects = Vec::new();

    for (buffer, len) in [("normals", mesh.normals.len()), ("tex_coords", mesh.tex_coords.len())] {
        if len != vertices {
            defects.push(MeshDefect::BufferLengthMismatch { buffer, len, vertices });
        }
    }
    if mesh.indices.len() % 3 != 0 {
        defects.push(MeshDefect::DanglingIndices {
            count: mesh.indices.len(),
        });
    }
    for (vertex, p) in mesh.vertices.iter().enumerate() {
        if !p.is_finite() {
            defects.push(MeshDefect::NonFiniteVertex { vertex });
        }
    }

    for (triangle, tri) in mesh.triangles().enumerate() {
        if let Some(&index) = tri.iter().find(|&&i| i as usize >= vertices) {
            defects.push(MeshDefect::IndexOutOfRange { triangle, index });
            continue;
        }
        let [a, b, c] = tri.map(|i| mesh.vertices[i as usize]);
        if (b - a).cross(&(c - a)).length() < 1e-12 {
            defects.push(MeshDefect::DegenerateTriangle { triangle });
        }
    }

    let audit = MeshAudit {
        vertex_count: vertices,
        triangle_count: mesh.triangle_count(),
        defects,
    };
    if audit.is_valid() {
        info!(triangles = audit.triangle_count, "mesh audit passed");
    } else {
        warn!(defects = audit.defects.len(), "mesh audit found defects");
    }
    audit
}

/// Wavefront OBJ text with positions, texture coordinates and normals.
pub fn mesh_to_obj(mesh: &SurfaceMesh) -> String {
    let mut out = String::new();
    for v in &mesh.vertices {
        let _ = writeln!(out, "v {} {} {}", v.x, v.y, v.z);
    }
    for uv in &mesh.tex_coords {
        let _ = writeln!(out, "vt {} {}", uv.x, uv.y);
    }
    for n in &mesh.normals {
        let _ = writeln!(out, "vn {} {} {}", n.x, n.y, n.z);
    }
    for [a, b, c] in mesh.triangles() {
        // OBJ indices are 1-based; position, uv and normal share an index.
        let (a, b, c) = (a + 1, b + 1, c + 1);
        let _ = writeln!(out, "f {a}/{a}/{a} {b}/{b}/{b} {c}/{c}/{c}");
    }
    out
}
