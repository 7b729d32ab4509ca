use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::GeometryError;
use crate::geometry::point::Point3d;

/// A `width x depth` grid of altitude samples.
///
/// Sample `(x, z)` sits at world position `(x, altitude, z)`. Rows run along
/// X and are stacked along Z. Read-only once built, so a shared reference can
/// be queried from any number of threads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "HeightFieldRaw")]
pub struct HeightField {
    width: usize,
    depth: usize,
    /// Row-major: index `z * width + x`.
    altitudes: Vec<f64>,
}

/// Unvalidated wire form of a [`HeightField`].
#[derive(Debug, Clone, Deserialize)]
struct HeightFieldRaw {
    width: usize,
    depth: usize,
    altitudes: Vec<f64>,
}

impl TryFrom<HeightFieldRaw> for HeightField {
    type Error = GeometryError;

    fn try_from(raw: HeightFieldRaw) -> Result<Self, Self::Error> {
        Self::new(raw.width, raw.depth, raw.altitudes)
    }
}

impl HeightField {
    /// Build from row-major altitudes (`altitudes[z * width + x]`).
    pub fn new(width: usize, depth: usize, altitudes: Vec<f64>) -> Result<Self, GeometryError> {
        if width == 0 || depth == 0 {
            return Err(GeometryError::GridTooSmall { width, depth });
        }
        let expected = width * depth;
        if altitudes.len() != expected {
            return Err(GeometryError::AltitudeCountMismatch {
                width,
                depth,
                expected,
                provided: altitudes.len(),
            });
        }
        debug!(width, depth, "height field built");
        Ok(Self {
            width,
            depth,
            altitudes,
        })
    }

    /// Build from sample vertices `(x, altitude, z)`.
    ///
    /// X and Z are truncated to grid indices; a later vertex for the same
    /// cell overwrites an earlier one and cells with no vertex stay at 0.
    pub fn from_vertices(
        width: usize,
        depth: usize,
        vertices: &[Point3d],
    ) -> Result<Self, GeometryError> {
        let mut field = Self::new(width, depth, vec![0.0; width * depth])?;
        for v in vertices {
            if !(v.x >= 0.0 && v.z >= 0.0 && v.x < width as f64 && v.z < depth as f64) {
                return Err(GeometryError::VertexOutsideGrid {
                    x: v.x,
                    z: v.z,
                    width,
                    depth,
                });
            }
            let idx = v.z as usize * width + v.x as usize;
            field.altitudes[idx] = v.y;
        }
        Ok(field)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Row-major altitudes, `z * width + x`.
    pub fn altitudes(&self) -> &[f64] {
        &self.altitudes
    }

    /// Direct sample lookup for indices known to be inside the grid.
    ///
    /// No bounds policy: callers clamp upstream. An index past the backing
    /// storage panics; a column past `width` is only caught in debug builds.
    pub fn altitude_at(&self, x: usize, z: usize) -> f64 {
        debug_assert!(x < self.width && z < self.depth, "grid index ({x}, {z}) out of range");
        self.altitudes[z * self.width + x]
    }

    /// Checked sample lookup.
    pub fn get(&self, x: usize, z: usize) -> Option<f64> {
        (x < self.width && z < self.depth).then(|| self.altitudes[z * self.width + x])
    }

    /// True if `(x, z)` is inside the half-open extent `[0, width) x [0, depth)`.
    pub fn contains(&self, x: f64, z: f64) -> bool {
        x >= 0.0 && z >= 0.0 && x < self.width as f64 && z < self.depth as f64
    }

    /// Interpolated altitude at an arbitrary ground position.
    ///
    /// Outside the grid the altitude is 0. Inside a cell the surface is the
    /// plane of one of two triangles split along the top-right to bottom-left
    /// diagonal; along the last column or row it is linear along the edge.
    pub fn altitude(&self, x: f64, z: f64) -> f64 {
        if !self.contains(x, z) {
            return 0.0;
        }

        let l = x.floor() as usize;
        let r = l + 1;
        let t = z.floor() as usize;
        let b = t + 1;
        let (lf, rf, tf, bf) = (l as f64, r as f64, t as f64, b as f64);

        let right_out = r >= self.width;
        let bottom_out = b >= self.depth;
        match (right_out, bottom_out) {
            (true, true) => return self.altitude_at(l, t),
            (true, false) => {
                return self.altitude_at(l, b) * (z - tf) + self.altitude_at(l, t) * (bf - z);
            }
            (false, true) => {
                return self.altitude_at(l, t) * (rf - x) + self.altitude_at(r, t) * (x - lf);
            }
            (false, false) => {}
        }

        let top_left = self.altitude_at(l, t);
        let top_right = self.altitude_at(r, t);
        let bottom_left = self.altitude_at(l, b);
        let bottom_right = self.altitude_at(r, b);

        let dt = z - tf;
        let db = bf - z;
        let dl = x - lf;
        let dr = rf - x;

        // The diagonal is where dl == db (equivalently dr == dt). Ties land
        // in the top-left triangle.
        if dl * dt <= dr * db {
            // Intercepts on the left edge and on the diagonal at this z, then
            // interpolate across by distance from each.
            let left = bottom_left * dt + top_left * db;
            let diagonal = bottom_left * dt + top_right * db;
            let to_diagonal = db - dl;
            (diagonal * dl + left * to_diagonal) / (dl + to_diagonal)
        } else {
            let right = bottom_right * dt + top_right * db;
            let diagonal = bottom_left * dt + top_right * db;
            let to_diagonal = dt - dr;
            (diagonal * dr + right * to_diagonal) / (dr + to_diagonal)
        }
    }

    /// The point on the surface above `(x, z)`.
    pub fn surface_point(&self, x: f64, z: f64) -> Point3d {
        Point3d::new(x, self.altitude(x, z), z)
    }
}
