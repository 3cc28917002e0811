//! Surface sampling from mesh position buffers.

use cad_mesh::{MeshSet, Point3};

/// Uniformly stride the concatenated position buffers down to roughly
/// `target` points, preserving buffer order.
pub(crate) fn collect(meshes: &MeshSet, target: usize) -> Vec<Point3<f64>> {
    let total = meshes.total_vertex_count();
    if total == 0 || target == 0 {
        return Vec::new();
    }
    let stride = (total / target).max(1);

    meshes
        .iter()
        .flat_map(|m| m.positions.iter())
        .step_by(stride)
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cad_mesh::TriMesh;

    fn strip(n: usize) -> TriMesh {
        TriMesh::from_positions((0..n).map(|i| Point3::new(i as f64, 0.0, 0.0)).collect())
    }

    #[test]
    fn small_buffers_are_taken_whole() {
        let meshes = MeshSet::from_meshes(vec![strip(10)]);
        assert_eq!(collect(&meshes, 100).len(), 10);
    }

    #[test]
    fn large_buffers_are_strided() {
        let meshes = MeshSet::from_meshes(vec![strip(10_000)]);
        let samples = collect(&meshes, 1000);
        // stride 10 over 10_000 positions
        assert_eq!(samples.len(), 1000);
        assert!((samples[1].x - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn spans_multiple_meshes_in_order() {
        let meshes = MeshSet::from_meshes(vec![strip(5), strip(5)]);
        let samples = collect(&meshes, 100);
        assert_eq!(samples.len(), 10);
        assert!((samples[5].x).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_set_yields_nothing() {
        assert!(collect(&MeshSet::new(), 100).is_empty());
    }
}
