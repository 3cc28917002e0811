//! Ordered collection of meshes decoded from one file.

use crate::{Aabb, TriMesh};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The meshes produced from a single file, in decode order.
///
/// The set exclusively owns its meshes for the duration of an analysis; the
/// pipeline never shares geometry between files or invocations.
///
/// # Example
///
/// ```
/// use cad_mesh::{MeshSet, TriMesh, Point3};
///
/// let mut set = MeshSet::new();
/// assert!(set.is_empty_geometry());
///
/// set.push(TriMesh::from_positions(vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0)]));
/// assert_eq!(set.total_vertex_count(), 2);
/// ```
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MeshSet {
    meshes: Vec<TriMesh>,
}

impl MeshSet {
    /// Create an empty set.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { meshes: Vec::new() }
    }

    /// Create a set from decoded meshes.
    #[must_use]
    pub const fn from_meshes(meshes: Vec<TriMesh>) -> Self {
        Self { meshes }
    }

    /// Append a mesh.
    pub fn push(&mut self, mesh: TriMesh) {
        self.meshes.push(mesh);
    }

    /// Number of meshes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    /// True if the set holds no meshes.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// True if no mesh in the set carries any vertex.
    #[must_use]
    pub fn is_empty_geometry(&self) -> bool {
        self.meshes.iter().all(|m| m.positions.is_empty())
    }

    /// Sum of vertex counts across the set.
    #[must_use]
    pub fn total_vertex_count(&self) -> usize {
        self.meshes.iter().map(TriMesh::vertex_count).sum()
    }

    /// Sum of triangle counts across the set.
    #[must_use]
    pub fn total_triangle_count(&self) -> usize {
        self.meshes.iter().map(TriMesh::triangle_count).sum()
    }

    /// Union bounds of every mesh.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        self.meshes
            .iter()
            .fold(Aabb::empty(), |acc, m| acc.union(&m.bounds()))
    }

    /// The mesh with the most vertices, if any have vertices.
    #[must_use]
    pub fn largest_mesh(&self) -> Option<&TriMesh> {
        self.meshes
            .iter()
            .filter(|m| !m.positions.is_empty())
            .max_by_key(|m| m.vertex_count())
    }

    /// Keep only meshes matching the predicate, preserving order.
    pub fn retain(&mut self, f: impl FnMut(&TriMesh) -> bool) {
        self.meshes.retain(f);
    }

    /// Iterate the meshes in decode order.
    pub fn iter(&self) -> std::slice::Iter<'_, TriMesh> {
        self.meshes.iter()
    }

    /// Iterate the meshes mutably.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, TriMesh> {
        self.meshes.iter_mut()
    }
}

impl<'a> IntoIterator for &'a MeshSet {
    type Item = &'a TriMesh;
    type IntoIter = std::slice::Iter<'a, TriMesh>;

    fn into_iter(self) -> Self::IntoIter {
        self.meshes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    #[test]
    fn empty_set_reports_empty_geometry() {
        let set = MeshSet::new();
        assert!(set.is_empty());
        assert!(set.is_empty_geometry());
        assert!(set.largest_mesh().is_none());
    }

    #[test]
    fn vertexless_mesh_is_still_empty_geometry() {
        let set = MeshSet::from_meshes(vec![TriMesh::default()]);
        assert!(!set.is_empty());
        assert!(set.is_empty_geometry());
    }

    #[test]
    fn largest_mesh_wins_by_vertex_count() {
        let small = TriMesh::from_positions(vec![Point3::origin()]);
        let big = TriMesh::from_positions(vec![
            Point3::origin(),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        ]);
        let set = MeshSet::from_meshes(vec![small, big]);
        assert_eq!(set.largest_mesh().map(TriMesh::vertex_count), Some(3));
        assert_eq!(set.total_vertex_count(), 4);
    }

    #[test]
    fn bounds_union_across_meshes() {
        let a = TriMesh::from_positions(vec![Point3::origin(), Point3::new(1.0, 1.0, 1.0)]);
        let b = TriMesh::from_positions(vec![Point3::new(5.0, -2.0, 0.0)]);
        let set = MeshSet::from_meshes(vec![a, b]);
        let bounds = set.bounds();
        assert!((bounds.max.x - 5.0).abs() < f64::EPSILON);
        assert!((bounds.min.y - (-2.0)).abs() < f64::EPSILON);
    }
}
