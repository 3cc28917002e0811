//! Triangle mesh with optional topology.

use crate::Aabb;
use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A mesh decoded from a CAD file.
///
/// Decoders always fill `positions`. Tessellators usually provide `indices`;
/// line-based sources (DXF polylines, IGES curves) provide an ordered
/// position buffer with no faces, which downstream estimators treat as a
/// line strip. `normals` may come from the tessellator or be computed after
/// the fact with [`TriMesh::ensure_normals`].
///
/// # Invariants
///
/// - All positions are finite (decoders drop non-finite vertices).
/// - When `indices` is present, every index references a valid vertex.
/// - When `normals` is present, it has one entry per vertex.
///
/// # Example
///
/// ```
/// use cad_mesh::TriMesh;
///
/// let mut mesh = TriMesh::from_raw(
///     &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
///     Some(&[0, 1, 2]),
/// );
/// mesh.ensure_normals();
/// assert_eq!(mesh.normals.as_ref().map(Vec::len), Some(3));
/// ```
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TriMesh {
    /// Vertex positions, in the source file's units.
    pub positions: Vec<Point3<f64>>,
    /// Triangle faces as vertex indices, absent for line-strip meshes.
    pub indices: Option<Vec<[u32; 3]>>,
    /// Per-vertex unit normals, when known.
    pub normals: Option<Vec<Vector3<f64>>>,
}

impl TriMesh {
    /// Create a mesh from positions alone (a line strip).
    #[must_use]
    pub const fn from_positions(positions: Vec<Point3<f64>>) -> Self {
        Self {
            positions,
            indices: None,
            normals: None,
        }
    }

    /// Create a mesh from flat coordinate and optional index buffers.
    ///
    /// Coordinates come in `[x0, y0, z0, x1, y1, z1, ...]` order. Non-finite
    /// vertices are dropped along with any face that references them; a
    /// trailing partial triple is ignored.
    #[must_use]
    pub fn from_raw(coords: &[f64], indices: Option<&[u32]>) -> Self {
        let mut positions = Vec::with_capacity(coords.len() / 3);
        let mut remap = Vec::with_capacity(coords.len() / 3);
        for c in coords.chunks_exact(3) {
            if c.iter().all(|v| v.is_finite()) {
                remap.push(Some(positions.len() as u32));
                positions.push(Point3::new(c[0], c[1], c[2]));
            } else {
                remap.push(None);
            }
        }

        let indices = indices.map(|raw| {
            raw.chunks_exact(3)
                .filter_map(|f| {
                    let a = *remap.get(f[0] as usize)?;
                    let b = *remap.get(f[1] as usize)?;
                    let c = *remap.get(f[2] as usize)?;
                    Some([a?, b?, c?])
                })
                .collect()
        });

        Self {
            positions,
            indices,
            normals: None,
        }
    }

    /// Number of vertices.
    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangle faces (zero for line strips).
    #[inline]
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.as_ref().map_or(0, Vec::len)
    }

    /// True if this mesh is an ordered path rather than a surface.
    #[inline]
    #[must_use]
    pub fn is_line_strip(&self) -> bool {
        self.indices.is_none()
    }

    /// Axis-aligned bounds of all vertices.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(self.positions.iter())
    }

    /// Iterate triangles as vertex-position triples.
    pub fn triangles(&self) -> impl Iterator<Item = [Point3<f64>; 3]> + '_ {
        self.indices.iter().flatten().map(|&[a, b, c]| {
            [
                self.positions[a as usize],
                self.positions[b as usize],
                self.positions[c as usize],
            ]
        })
    }

    /// Compute per-vertex normals when absent.
    ///
    /// Normals are the area-weighted average of adjacent face normals. Line
    /// strips have no faces and are left without normals.
    pub fn ensure_normals(&mut self) {
        if self.normals.is_some() {
            return;
        }
        let Some(faces) = &self.indices else {
            return;
        };

        let mut normals = vec![Vector3::zeros(); self.positions.len()];
        for &[a, b, c] in faces {
            let v0 = self.positions[a as usize];
            let v1 = self.positions[b as usize];
            let v2 = self.positions[c as usize];
            // Cross product length is twice the face area, so summing the
            // raw cross products is already area weighting.
            let face = (v1 - v0).cross(&(v2 - v0));
            for &vi in &[a, b, c] {
                normals[vi as usize] += face;
            }
        }
        for n in &mut normals {
            let len = n.norm();
            if len > f64::EPSILON {
                *n /= len;
            }
        }
        self.normals = Some(normals);
    }

    /// Translate every vertex by `offset`.
    pub fn translate(&mut self, offset: Vector3<f64>) {
        for p in &mut self.positions {
            *p += offset;
        }
    }

    /// Scale every vertex uniformly around the origin.
    pub fn scale(&mut self, factor: f64) {
        for p in &mut self.positions {
            p.coords *= factor;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn from_raw_builds_triangle() {
        let mesh = TriMesh::from_raw(
            &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            Some(&[0, 1, 2]),
        );
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangle_count(), 1);
        assert!(!mesh.is_line_strip());
    }

    #[test]
    fn from_raw_drops_non_finite_vertices_and_their_faces() {
        let coords = [
            0.0, 0.0, 0.0, // vertex 0
            f64::NAN, 0.0, 0.0, // vertex 1, dropped
            0.0, 1.0, 0.0, // vertex 2
            1.0, 1.0, 0.0, // vertex 3
        ];
        let mesh = TriMesh::from_raw(&coords, Some(&[0, 1, 2, 0, 2, 3]));
        assert_eq!(mesh.vertex_count(), 3);
        // First face referenced the NaN vertex and is gone.
        assert_eq!(mesh.triangle_count(), 1);
    }

    #[test]
    fn from_raw_ignores_out_of_range_indices() {
        let mesh = TriMesh::from_raw(&[0.0, 0.0, 0.0, 1.0, 0.0, 0.0], Some(&[0, 1, 9]));
        assert_eq!(mesh.triangle_count(), 0);
    }

    #[test]
    fn line_strip_has_no_triangles() {
        let mesh = TriMesh::from_positions(vec![
            Point3::origin(),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        ]);
        assert!(mesh.is_line_strip());
        assert_eq!(mesh.triangle_count(), 0);
    }

    #[test]
    fn ensure_normals_unit_length() {
        let mut mesh = TriMesh::from_raw(
            &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            Some(&[0, 1, 2]),
        );
        mesh.ensure_normals();
        let normals = mesh.normals.unwrap();
        for n in &normals {
            assert_relative_eq!(n.norm(), 1.0, epsilon = 1e-12);
            // Flat triangle in the XY plane: normal along +Z.
            assert_relative_eq!(n.z, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn ensure_normals_keeps_existing() {
        let mut mesh = TriMesh::from_raw(
            &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            Some(&[0, 1, 2]),
        );
        mesh.normals = Some(vec![Vector3::x(); 3]);
        mesh.ensure_normals();
        assert_relative_eq!(mesh.normals.unwrap()[0].x, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn ensure_normals_noop_for_line_strip() {
        let mut mesh = TriMesh::from_positions(vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0)]);
        mesh.ensure_normals();
        assert!(mesh.normals.is_none());
    }

    #[test]
    fn translate_and_scale() {
        let mut mesh = TriMesh::from_positions(vec![Point3::new(1.0, 0.0, 0.0)]);
        mesh.scale(2.0);
        mesh.translate(Vector3::new(0.0, 3.0, 0.0));
        assert_relative_eq!(mesh.positions[0].x, 2.0, epsilon = 1e-12);
        assert_relative_eq!(mesh.positions[0].y, 3.0, epsilon = 1e-12);
    }
}
