use scene_kernel::geometry::point::Point3d;
use scene_kernel::geometry::vector::Vec3;
use scene_kernel::HeightField;
use tracing::{info, instrument};

use crate::mesh::SurfaceMesh;

/// Tessellate a height field into its own surface mesh.
///
/// One vertex per sample at `(x, altitude, z)`, texture coordinates `(x, z)`.
/// Each cell is split along the top-right to bottom-left diagonal, the same
/// split [`HeightField::altitude`] interpolates across, so the mesh and the
/// altitude query describe the same surface.
#[instrument(skip(terrain), fields(width = terrain.width(), depth = terrain.depth()))]
pub fn tessellate_height_field(terrain: &HeightField) -> SurfaceMesh {
    let (w, d) = (terrain.width(), terrain.depth());
    let cells = w.saturating_sub(1) * d.saturating_sub(1);
    let mut mesh = SurfaceMesh::with_capacity(w * d, cells * 6);

    for z in 0..d {
        for x in 0..w {
            let p = Point3d::new(x as f64, terrain.altitude_at(x, z), z as f64);
            mesh.add_vertex(p, Vec3::Y, p.xz());
        }
    }

    let w32 = w as u32;
    for z in 0..d.saturating_sub(1) {
        for x in 0..w.saturating_sub(1) {
            let i = (z * w + x) as u32;
            mesh.add_triangle(i, i + w32, i + 1);
            mesh.add_triangle(i + 1, i + w32, i + w32 + 1);
        }
    }

    smooth_normals(&mut mesh);
    info!(
        vertices = mesh.vertex_count(),
        triangles = mesh.triangle_count(),
        "terrain tessellated"
    );
    mesh
}

/// Replace vertex normals with the normalized sum of adjacent face normals.
/// Unnormalized cross products weight each face by its area. Vertices with
/// no adjacent area keep pointing up.
fn smooth_normals(mesh: &mut SurfaceMesh) {
    let mut sums = vec![Vec3::ZERO; mesh.vertex_count()];
    for [a, b, c] in mesh.triangles() {
        let (pa, pb, pc) = (
            mesh.vertices[a as usize],
            mesh.vertices[b as usize],
            mesh.vertices[c as usize],
        );
        let face = (pb - pa).cross(&(pc - pa));
        for idx in [a, b, c] {
            sums[idx as usize] = sums[idx as usize] + face;
        }
    }
    mesh.normals = sums
        .into_iter()
        .map(|n| n.normalized().unwrap_or(Vec3::Y))
        .collect();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::audit_mesh;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_grid_layout() {
        let hf = HeightField::new(3, 2, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        let mesh = tessellate_height_field(&hf);
        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.triangle_count(), 4);
        assert_eq!(mesh.vertices[4], Point3d::new(1.0, 4.0, 1.0));
        assert_eq!(&mesh.indices[..6], &[0, 3, 1, 1, 3, 4]);
        assert!(audit_mesh(&mesh).is_valid());
    }

    #[test]
    fn test_flat_terrain_normals_point_up() {
        let hf = HeightField::new(4, 4, vec![2.0; 16]).unwrap();
        let mesh = tessellate_height_field(&hf);
        for n in &mesh.normals {
            assert_abs_diff_eq!(*n, Vec3::Y, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_slope_normals_lean_downhill() {
        // Altitude rises with x, so normals tilt towards -x.
        let alts = (0..9).map(|i| (i % 3) as f64).collect();
        let hf = HeightField::new(3, 3, alts).unwrap();
        let mesh = tessellate_height_field(&hf);
        let expected = Vec3::new(-1.0, 1.0, 0.0).normalize();
        for n in &mesh.normals {
            assert_abs_diff_eq!(*n, expected, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_mesh_vertices_agree_with_altitude_query() {
        let hf = HeightField::new(3, 3, vec![0.0, 1.0, 0.0, 2.0, 5.0, 1.0, 0.0, 3.0, 4.0]).unwrap();
        let mesh = tessellate_height_field(&hf);
        for v in &mesh.vertices {
            assert_abs_diff_eq!(v.y, hf.altitude(v.x, v.z), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_single_row_has_no_triangles() {
        let hf = HeightField::new(4, 1, vec![1.0; 4]).unwrap();
        let mesh = tessellate_height_field(&hf);
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 0);
        assert!(mesh.normals.iter().all(|&n| n == Vec3::Y));
    }
}
