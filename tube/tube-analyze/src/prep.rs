//! Geometry preparation.
//!
//! Analysis geometry stays in the source file's units, untouched except for
//! filling in missing vertex normals. Viewers want something else entirely:
//! a centered, uniformly scaled copy. The two concerns never mix; nothing
//! downstream of the estimators ever sees the display copy.

use cad_mesh::{MeshSet, Vector3};

/// Default longest extent of a display copy.
pub const DISPLAY_TARGET_EXTENT: f64 = 10.0;

/// Prepare the analysis copy in place: ensure per-vertex normals on every
/// triangle mesh. Positions are never modified.
pub fn prepare(meshes: &mut MeshSet) {
    for mesh in meshes.iter_mut() {
        mesh.ensure_normals();
    }
}

/// Produce a centered, auto-scaled clone for viewers.
///
/// The copy is translated so its bounds center on the origin and scaled
/// uniformly so the longest extent equals `target_extent`. Degenerate
/// geometry is returned centered but unscaled.
#[must_use]
pub fn display_copy(meshes: &MeshSet, target_extent: f64) -> MeshSet {
    let bounds = meshes.bounds();
    let mut copy = meshes.clone();
    if bounds.is_empty() {
        return copy;
    }

    let center = bounds.center();
    let offset = Vector3::new(-center.x, -center.y, -center.z);
    let extent = bounds.max_extent();
    let scale = if extent > 0.0 { target_extent / extent } else { 1.0 };

    for mesh in copy.iter_mut() {
        mesh.translate(offset);
        mesh.scale(scale);
    }
    copy
}

#[cfg(test)]
mod tests {
    use super::*;
    use cad_mesh::{Point3, TriMesh};

    fn triangle() -> TriMesh {
        TriMesh::from_raw(
            &[0.0, 0.0, 0.0, 100.0, 0.0, 0.0, 0.0, 50.0, 0.0],
            Some(&[0, 1, 2]),
        )
    }

    #[test]
    fn prepare_fills_normals_without_touching_positions() {
        let mut meshes = MeshSet::from_meshes(vec![triangle()]);
        prepare(&mut meshes);
        let mesh = meshes.iter().next().unwrap();
        assert!(mesh.normals.is_some());
        assert!((mesh.positions[1].x - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn display_copy_is_centered_and_scaled() {
        let meshes = MeshSet::from_meshes(vec![triangle()]);
        let copy = display_copy(&meshes, DISPLAY_TARGET_EXTENT);

        let bounds = copy.bounds();
        assert!((bounds.max_extent() - DISPLAY_TARGET_EXTENT).abs() < 1e-9);
        let center = bounds.center();
        assert!(center.coords.norm() < 1e-9);

        // The analysis copy is untouched.
        assert!((meshes.bounds().max_extent() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn display_copy_of_point_is_centered_only() {
        let meshes = MeshSet::from_meshes(vec![TriMesh::from_positions(vec![Point3::new(
            5.0, 5.0, 5.0,
        )])]);
        let copy = display_copy(&meshes, DISPLAY_TARGET_EXTENT);
        assert!(copy.bounds().center().coords.norm() < 1e-9);
    }
}
